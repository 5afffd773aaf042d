use std::sync::Arc;

use inbox_digest::config::DigestConfig;
use inbox_digest::llm::{GeneratorConfig, LlmBackend, create_generator};
use inbox_digest::mailbox::{AuthConfig, GmailClient, TokenManager};
use inbox_digest::notion::{NotionConfig, NotionLogger};
use inbox_digest::pipeline::DigestPipeline;
use inbox_digest::pipeline::assemble::Assembler;
use inbox_digest::pipeline::classify::Classifier;
use inbox_digest::pipeline::followup::FollowUpDetector;
use inbox_digest::pipeline::summarize::Summarizer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = DigestConfig::from_env()?;

    // LLM backend: OpenAI unless overridden.
    let backend = match std::env::var("DIGEST_LLM_BACKEND").as_deref() {
        Ok("anthropic") => LlmBackend::Anthropic,
        _ => LlmBackend::OpenAi,
    };
    let (key_var, default_model) = match backend {
        LlmBackend::OpenAi => ("OPENAI_API_KEY", "gpt-4o"),
        LlmBackend::Anthropic => ("ANTHROPIC_API_KEY", "claude-sonnet-4-20250514"),
    };
    let api_key = std::env::var(key_var).unwrap_or_else(|_| {
        eprintln!("Error: {key_var} not set");
        std::process::exit(1);
    });
    let model = std::env::var("DIGEST_MODEL").unwrap_or_else(|_| default_model.to_string());

    let notion_config = NotionConfig::from_env();

    eprintln!("📬 inbox-digest v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {model}");
    eprintln!("   Send to: {}", config.send_to);
    eprintln!("   Window: {}s", config.window.as_secs());
    eprintln!(
        "   Notion: {}",
        if notion_config.is_some() { "enabled" } else { "disabled" }
    );

    let generator = create_generator(&GeneratorConfig::new(
        backend,
        secrecy::SecretString::from(api_key),
        model,
    ));

    let auth = TokenManager::new(AuthConfig::from_env()?);

    let run = async {
        let access_token = auth.access_token().await?;
        let mailbox = Arc::new(GmailClient::new(access_token, config.window));

        let pipeline = DigestPipeline::new(
            mailbox,
            Summarizer::new(generator),
            Classifier::default_rules(),
            Assembler::new(FollowUpDetector::default_rules()),
            notion_config.map(NotionLogger::new),
            config.clone(),
        );
        pipeline.run().await
    };

    match run.await {
        Ok(summary) => {
            println!(
                "✅ Digest emailed — {} messages ({} important), {} attachments, {} follow-ups",
                summary.total, summary.important, summary.attachments, summary.followups,
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Digest run failed: {e}");
            std::process::exit(1);
        }
    }
}
