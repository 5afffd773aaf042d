//! inbox-digest — personal email-digest generator.

pub mod config;
pub mod error;
pub mod llm;
pub mod mailbox;
pub mod notion;
pub mod pipeline;
