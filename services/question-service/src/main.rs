use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use shared::ai_client;
use shared::config::Settings;
use shared::dto::GenerateRequest;
use shared::history::HistoryStore;

mod service;

use service::QuestionService;

fn request_from_args() -> GenerateRequest {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let include_answers = args.iter().any(|a| a == "--answers");
    args.retain(|a| a != "--answers");

    let mut args = args.into_iter();
    GenerateRequest {
        role: args.next().unwrap_or_else(|| "Software Engineer".into()),
        topic: args.next().unwrap_or_else(|| "Rust".into()),
        difficulty: args.next().unwrap_or_else(|| "medium".into()),
        include_answers,
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    info!("starting question-service");

    let settings = match Settings::new() {
        Ok(s) => s,
        Err(e) => {
            error!(%e, "failed to load settings");
            std::process::exit(1);
        }
    };

    let request = request_from_args();
    info!(
        "generating questions for role: {}, topic: {}, difficulty: {}",
        request.role, request.topic, request.difficulty
    );

    let provider = ai_client::from_settings(&settings);
    let history = Arc::new(HistoryStore::new());
    let service = QuestionService::new(provider, history.clone());

    let questions = service.generate(&request).await?;
    println!("{}", serde_json::to_string_pretty(&questions)?);

    let recent = history.recent(settings.history_limit).await;
    info!("history now holds {} run(s)", recent.len());
    Ok(())
}
