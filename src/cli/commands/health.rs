use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

/// `census health --url <base>` - GET /health on a running server.
pub async fn handle(url: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let endpoint = format!("{}/health", url.trim_end_matches('/'));

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()?;

    let response = match client.get(&endpoint).send().await {
        Ok(r) => r,
        Err(e) => {
            output_error(&output_format, &format!("Could not reach {}: {}", endpoint, e))?;
            std::process::exit(1);
        }
    };

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        output_success(
            &output_format,
            &format!("{} is healthy", endpoint),
            Some(json!({ "response": body })),
        )
    } else {
        output_error(
            &output_format,
            &format!("{} returned {} ({})", endpoint, status, body),
        )?;
        std::process::exit(1);
    }
}
