//! Follow-up detection — ordered action rules with a reply-marker default.

use regex::Regex;

use crate::pipeline::normalize::NormalizedMessage;

/// Closed set of follow-up action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpAction {
    SendReply,
    ProvideDocument,
    ScheduleMeeting,
    ConfirmAttendance,
}

impl FollowUpAction {
    /// Display label for the action-items list.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SendReply => "Send reply",
            Self::ProvideDocument => "Provide document",
            Self::ScheduleMeeting => "Schedule meeting",
            Self::ConfirmAttendance => "Confirm attendance",
        }
    }
}

impl std::fmt::Display for FollowUpAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single (action, pattern) rule.
#[derive(Debug, Clone)]
pub struct ActionRule {
    pub action: FollowUpAction,
    pub regex: Regex,
}

/// Ordered first-match follow-up detector.
pub struct FollowUpDetector {
    rules: Vec<ActionRule>,
    reply_marker: Regex,
}

impl FollowUpDetector {
    /// Create a detector with an explicit rule list. Order is priority.
    pub fn new(rules: Vec<ActionRule>) -> Self {
        Self {
            rules,
            reply_marker: Regex::new(r"(?i)^re:\s*").unwrap(),
        }
    }

    /// The built-in action rule list.
    pub fn default_rules() -> Self {
        let rule = |action, pattern: &str| ActionRule {
            action,
            regex: Regex::new(pattern).unwrap(),
        };

        Self::new(vec![
            rule(
                FollowUpAction::SendReply,
                r"(?i)(please\s+reply|need\s+response|awaiting\s+your\s+reply)",
            ),
            rule(
                FollowUpAction::ProvideDocument,
                r"(?i)(send|provide|need).+?(lease|photo|headshot|picture|bc|birth certificate|invoice|attachment|document)",
            ),
            rule(
                FollowUpAction::ScheduleMeeting,
                r"(?i)(schedule|book|arrange).+?(call|meeting|appointment)",
            ),
            rule(
                FollowUpAction::ConfirmAttendance,
                r"(?i)(rsvp|confirm).+?(attendance|presence)",
            ),
        ])
    }

    /// Detect whether `message` needs a follow-up and which action.
    ///
    /// Rules are matched against subject + summary + snippet; a subject
    /// starting with a reply marker defaults to [`FollowUpAction::SendReply`].
    pub fn detect(&self, message: &NormalizedMessage, summary: &str) -> Option<FollowUpAction> {
        let hay = format!("{} {} {}", message.subject, summary, message.snippet);
        for rule in &self.rules {
            if rule.regex.is_match(&hay) {
                return Some(rule.action);
            }
        }
        if self.reply_marker.is_match(&message.subject) {
            return Some(FollowUpAction::SendReply);
        }
        None
    }
}

impl Default for FollowUpDetector {
    fn default() -> Self {
        Self::default_rules()
    }
}
