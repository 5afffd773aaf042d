//! Category classification — ordered first-match rules over subject + sender.
//!
//! Rule order is load-bearing: family terms are checked before newsletter
//! terms so a family member's message is never filed as a newsletter. The
//! list ends with a rule that always matches, so every message gets
//! exactly one category.

use regex::Regex;

use crate::pipeline::normalize::NormalizedMessage;

/// Closed category set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Family,
    School,
    Activities,
    MarketUpdate,
    BillsFinance,
    Housing,
    PurchasesOffers,
    MeetingsInvites,
    Newsletters,
    Work,
    Personal,
    Other,
}

impl Category {
    /// Display label for group headings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Family => "Family",
            Self::School => "School",
            Self::Activities => "Activities",
            Self::MarketUpdate => "Market Update",
            Self::BillsFinance => "Bills & Finance",
            Self::Housing => "Housing",
            Self::PurchasesOffers => "Purchases & Offers",
            Self::MeetingsInvites => "Meetings & Invites",
            Self::Newsletters => "Newsletters",
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Other => "Other",
        }
    }

    /// Fixed display order for the digest, matching rule priority order.
    pub const DISPLAY_ORDER: [Category; 12] = [
        Self::Family,
        Self::School,
        Self::Activities,
        Self::MarketUpdate,
        Self::BillsFinance,
        Self::Housing,
        Self::PurchasesOffers,
        Self::MeetingsInvites,
        Self::Newsletters,
        Self::Work,
        Self::Personal,
        Self::Other,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single (category, pattern) rule.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: Category,
    pub regex: Regex,
}

/// Ordered first-match classifier.
pub struct Classifier {
    rules: Vec<CategoryRule>,
}

impl Classifier {
    /// Create a classifier with an explicit rule list. Order is priority.
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// The built-in rule list. The final Personal rule matches everything.
    pub fn default_rules() -> Self {
        let rule = |category, pattern: &str| CategoryRule {
            category,
            regex: Regex::new(pattern).unwrap(),
        };

        Self::new(vec![
            rule(
                Category::Family,
                r"(?i)\b(gilmara|lucas|jo[aã]o ?pedro|alvaro|sonia|m[ãa]e|pai)\b",
            ),
            rule(
                Category::School,
                r"(?i)(highlands|naperville203|talk203|kennedy\s+junior\s+high|elementary|teacher|district\s*203|infinitecampus|screening results|language acquisition)",
            ),
            rule(
                Category::Activities,
                r"(?i)(soccer|\bnsa\b|ice cream social|tour|camp|clinic)",
            ),
            rule(
                Category::MarketUpdate,
                r"(?i)(usiminas|analises@bb|\bbb-bi\b|@valor\.com|valor\b|market\s+update)",
            ),
            rule(
                Category::BillsFinance,
                r"(?i)(invoice|bill|payment|transfer|investment|statement|funded|usage limits|cartola|boleto|fatura|openai)",
            ),
            rule(
                Category::Housing,
                r"(?i)(rental|lease|property|realt(y|or)|zillow|redfin|mls listing)",
            ),
            rule(
                Category::PurchasesOffers,
                r"(?i)(order|receipt|reward|promo|offer|shopping|amazon)",
            ),
            rule(
                Category::MeetingsInvites,
                r"(?i)(invitation|event|meet|reuni[ãa]o|\.ics|calendar)",
            ),
            rule(
                Category::Newsletters,
                r"(?i)(mckinsey\.com|emails?\.hbr\.org|hbr\.org|@interactive\.wsj\.com|newsletter|weekly digest|digest update)",
            ),
            // Work is a single employer domain, nothing broader.
            rule(Category::Work, r"(?i)@arcelormittal"),
            // Catch-all: everything unmatched is Personal.
            rule(Category::Personal, r""),
        ])
    }

    /// Assign exactly one category, first matching rule wins.
    pub fn classify(&self, message: &NormalizedMessage) -> Category {
        let hay = format!("{} {}", message.subject, message.sender).to_lowercase();
        for rule in &self.rules {
            if rule.regex.is_match(&hay) {
                return rule.category;
            }
        }
        Category::Other
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::default_rules()
    }
}
