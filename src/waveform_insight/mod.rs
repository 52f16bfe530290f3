pub mod analysis;
pub mod baseline;
pub mod frequency;
pub mod generate_signal;
pub mod harmonics;
pub mod merge;
pub mod phase;
pub mod power;
pub mod print;
pub mod stats;
pub mod types;

use serde_json::Value;

use analysis::{fetch_with_retry, AnalysisProvider, RetryPolicy};
use types::{AnalyzerConfig, BaselineMetrics, MergedResult, WaveformBatch};

/// Entry point of the deterministic engine. Stateless between requests:
/// every call builds a fresh metrics object from the batch it is given.
#[derive(Debug, Clone, Default)]
pub struct WaveformAnalyzer {
    pub config: AnalyzerConfig,
}

impl WaveformAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Compute the complete deterministic baseline for one batch.
    pub fn analyze(&self, batch: &WaveformBatch) -> BaselineMetrics {
        baseline::build_baseline(batch, &self.config)
    }

    /// Compute the baseline and merge an already-obtained external analysis
    /// over it. `None` or a malformed payload yields the baseline verbatim.
    pub fn analyze_with_external(
        &self,
        batch: &WaveformBatch,
        external: Option<&Value>,
    ) -> MergedResult {
        let baseline = self.analyze(batch);
        merge::merge_analysis(&baseline, external)
    }

    /// Compute the baseline, then call the external collaborator with
    /// bounded retry and merge whatever it returns. A provider that keeps
    /// failing degrades to the baseline instead of failing the request.
    pub async fn analyze_with_provider(
        &self,
        batch: &WaveformBatch,
        provider: &dyn AnalysisProvider,
        policy: &RetryPolicy,
    ) -> MergedResult {
        let baseline = self.analyze(batch);

        match fetch_with_retry(provider, &baseline, policy).await {
            Ok(payload) => merge::merge_analysis(&baseline, Some(&payload)),
            Err(err) => {
                log::warn!("continuing with deterministic baseline only: {err}");
                merge::merge_analysis(&baseline, None)
            }
        }
    }
}
