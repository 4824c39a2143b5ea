use serde::Deserialize;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::completion::QuestionKey;
use crate::services::QuestionService;

#[derive(Debug, Deserialize)]
struct QuestionFile {
    questions: Vec<QuestionKey>,
}

/// `census questions <file>` - replace the required-question set.
///
/// The denominator of every completion figure is owned by whoever
/// produces this file; the API only reads it.
pub async fn handle(file: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(&file).await?;
    let payload: QuestionFile = serde_json::from_str(&raw)?;

    let service = QuestionService::new().await?;
    let count = service.replace_required(&payload.questions).await?;

    output_success(
        &output_format,
        &format!("Required-question set replaced ({} questions)", count),
        Some(json!({ "questions": count })),
    )
}
