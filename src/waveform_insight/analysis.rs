/* ----------------- External Analysis Boundary ------------------ */

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::types::{BaselineMetrics, WaveformError};

/// Collaborator that produces a narrative/structured analysis for a batch,
/// typically by calling a language model. The payload it returns is treated
/// as untrusted: any leaf may be absent, null or malformed, and the merger
/// validates every one against the deterministic baseline.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn analyze(&self, baseline: &BaselineMetrics) -> Result<Value, WaveformError>;
}

/// Bounded retry with exponential backoff for the provider call. The
/// deterministic core never waits on this; a caller that cannot obtain an
/// external analysis merges with `None` and still gets a complete result.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/*
* @brief Call the analysis provider with bounded exponential backoff.
* @param provider External analysis collaborator
* @param baseline Deterministic metrics handed to the provider
* @param policy Retry bounds
* @return The provider payload, or AnalysisFailed after the last attempt
* @note Delay doubles after every failed attempt: base, 2x base, 4x base...
*       No delay is spent after the final failure.
*/
pub async fn fetch_with_retry(
    provider: &dyn AnalysisProvider,
    baseline: &BaselineMetrics,
    policy: &RetryPolicy,
) -> Result<Value, WaveformError> {
    let attempts = policy.max_attempts.max(1);
    let mut delay = policy.base_delay;
    let mut last_message = String::new();

    for attempt in 1..=attempts {
        match provider.analyze(baseline).await {
            Ok(payload) => return Ok(payload),
            Err(err) => {
                log::warn!("external analysis attempt {attempt}/{attempts} failed: {err}");
                last_message = err.to_string();
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    Err(WaveformError::AnalysisFailed {
        attempts,
        message: last_message,
    })
}
