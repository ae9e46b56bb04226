//! Fire-and-forget outbound webhook notifications.
//!
//! After a successful ingestion the analysis result is POSTed to each
//! configured URL. Failures are logged and swallowed; they never reach
//! the caller and never block the ingestion response.

use std::time::Duration;

use tracing::{error, info};

use crate::analysis::Analysis;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Spawn notification tasks for every configured URL and return
/// immediately.
pub fn notify(urls: Vec<String>, analysis: Analysis) {
    if urls.is_empty() {
        return;
    }
    let client = reqwest::Client::new();
    for url in urls {
        let client = client.clone();
        let payload = analysis.clone();
        tokio::spawn(async move {
            let result = client
                .post(&url)
                .timeout(WEBHOOK_TIMEOUT)
                .json(&payload)
                .send()
                .await;
            match result {
                Ok(response) if response.status().is_success() => {
                    info!(url = %url, "webhook delivered");
                }
                Ok(response) => {
                    error!(url = %url, status = %response.status(), "webhook rejected");
                }
                Err(e) => {
                    error!(url = %url, error = %e, "webhook failed");
                }
            }
        });
    }
}
