pub mod waveform_insight;

pub use waveform_insight::analysis::{AnalysisProvider, RetryPolicy};
pub use waveform_insight::generate_signal::{generate_batch, SignalParams};
pub use waveform_insight::types::{
    AnalyzerConfig, BaselineMetrics, MergedResult, Phase, WaveformBatch, WaveformError,
};
pub use waveform_insight::WaveformAnalyzer;
