use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FREQ_NOMINAL_50: f64 = 50.0;
pub const FREQ_NOMINAL_60: f64 = 60.0;

/// Harmonic orders evaluated by the Goertzel estimator (fundamental x 1..=10).
pub const NUMBER_HARMONICS: usize = 10;

/// Errors produced at the boundaries of the analyzer. The deterministic
/// computation itself never fails once a batch has been constructed.
#[derive(Debug, Error)]
pub enum WaveformError {
    #[error("invalid waveform batch: {0}")]
    InvalidBatch(String),

    #[error("external analysis failed after {attempts} attempts: {message}")]
    AnalysisFailed { attempts: usize, message: String },
}

/// Phase identifier of a three-phase system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    L1,
    L2,
    L3,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::L1, Phase::L2, Phase::L3];
}

/// Initial configuration.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Fallback fundamental frequency when zero-crossing estimation fails.
    pub nominal_frequency_hz: f64,
    /// Highest harmonic order included in the THD sum.
    pub harmonic_count: usize,
    /// Correlation lag window in samples; defaults to one estimated period.
    pub max_lag_override: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            nominal_frequency_hz: FREQ_NOMINAL_50,
            harmonic_count: NUMBER_HARMONICS,
            max_lag_override: None,
        }
    }
}

impl AnalyzerConfig {
    /*
    * @brief Configuration with the fallback frequency snapped to the nearest
    *        standard grid nominal (50 or 60 Hz).
    * @param frequency_hz Expected fundamental frequency
    * @return AnalyzerConfig with the matching nominal fallback
    */
    pub fn for_grid_frequency(frequency_hz: f64) -> Self {
        let to_50 = (frequency_hz - FREQ_NOMINAL_50).abs();
        let to_60 = (frequency_hz - FREQ_NOMINAL_60).abs();
        Self {
            nominal_frequency_hz: if to_60 < to_50 { FREQ_NOMINAL_60 } else { FREQ_NOMINAL_50 },
            ..Self::default()
        }
    }
}

/// One synchronized capture of a three-phase system: three voltage channels,
/// three current channels and the sampling rate they share.
///
/// The batch is immutable once constructed; `new` re-asserts the shape
/// invariant (equal lengths >= 2, finite samples, positive sampling rate)
/// so the computation downstream never has to.
#[derive(Debug, Clone)]
pub struct WaveformBatch {
    voltage: [Vec<f64>; 3],
    current: [Vec<f64>; 3],
    sampling_rate_hz: f64,
}

impl WaveformBatch {
    pub fn new(
        voltage_l1: Vec<f64>,
        voltage_l2: Vec<f64>,
        voltage_l3: Vec<f64>,
        current_l1: Vec<f64>,
        current_l2: Vec<f64>,
        current_l3: Vec<f64>,
        sampling_rate_hz: f64,
    ) -> Result<Self, WaveformError> {
        if !(sampling_rate_hz.is_finite() && sampling_rate_hz > 0.0) {
            return Err(WaveformError::InvalidBatch(format!(
                "sampling rate must be positive, got {sampling_rate_hz}"
            )));
        }

        let channels = [
            ("voltage_L1", &voltage_l1),
            ("voltage_L2", &voltage_l2),
            ("voltage_L3", &voltage_l3),
            ("current_L1", &current_l1),
            ("current_L2", &current_l2),
            ("current_L3", &current_l3),
        ];

        let length = voltage_l1.len();
        if length < 2 {
            return Err(WaveformError::InvalidBatch(format!(
                "channels must hold at least 2 samples, got {length}"
            )));
        }

        for (name, samples) in channels {
            if samples.len() != length {
                return Err(WaveformError::InvalidBatch(format!(
                    "{name} holds {} samples, expected {length}",
                    samples.len()
                )));
            }
            if samples.iter().any(|s| !s.is_finite()) {
                return Err(WaveformError::InvalidBatch(format!(
                    "{name} contains a non-finite sample"
                )));
            }
        }

        Ok(Self {
            voltage: [voltage_l1, voltage_l2, voltage_l3],
            current: [current_l1, current_l2, current_l3],
            sampling_rate_hz,
        })
    }

    pub fn voltage(&self, phase: Phase) -> &[f64] {
        &self.voltage[phase as usize]
    }

    pub fn current(&self, phase: Phase) -> &[f64] {
        &self.current[phase as usize]
    }

    pub fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }

    pub fn len(&self) -> usize {
        self.voltage[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.voltage[0].is_empty()
    }
}

/// Per-phase triple of values, serialized under the `L1`/`L2`/`L3` keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseTriple {
    #[serde(rename = "L1")]
    pub l1: f64,
    #[serde(rename = "L2")]
    pub l2: f64,
    #[serde(rename = "L3")]
    pub l3: f64,
}

impl PhaseTriple {
    pub fn get(&self, phase: Phase) -> f64 {
        match phase {
            Phase::L1 => self.l1,
            Phase::L2 => self.l2,
            Phase::L3 => self.l3,
        }
    }
}

/// Line-to-line voltage triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineTriple {
    #[serde(rename = "L1_L2")]
    pub l1_l2: f64,
    #[serde(rename = "L2_L3")]
    pub l2_l3: f64,
    #[serde(rename = "L3_L1")]
    pub l3_l1: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RmsValues {
    pub voltage: PhaseTriple,
    pub current: PhaseTriple,
    pub line_to_line: LineTriple,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakValues {
    pub voltage: PhaseTriple,
    pub current: PhaseTriple,
}

/// Angular offsets in degrees, normalized into (-180, 180].
///
/// Voltage-to-voltage pairs measure phase separation (about +-120 deg on a
/// balanced system); voltage-to-current pairs measure the load angle per
/// phase, negative when current lags voltage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseAngles {
    #[serde(rename = "voltage_L1_vs_L2")]
    pub voltage_l1_vs_l2: f64,
    #[serde(rename = "voltage_L2_vs_L3")]
    pub voltage_l2_vs_l3: f64,
    #[serde(rename = "voltage_L3_vs_L1")]
    pub voltage_l3_vs_l1: f64,
    #[serde(rename = "voltage_L1_vs_current_L1")]
    pub voltage_l1_vs_current_l1: f64,
    #[serde(rename = "voltage_L2_vs_current_L2")]
    pub voltage_l2_vs_current_l2: f64,
    #[serde(rename = "voltage_L3_vs_current_L3")]
    pub voltage_l3_vs_current_l3: f64,
}

/// Per-phase power values plus their scalar sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerTriple {
    #[serde(rename = "L1")]
    pub l1: f64,
    #[serde(rename = "L2")]
    pub l2: f64,
    #[serde(rename = "L3")]
    pub l3: f64,
    pub total: f64,
}

/// Reactive power per phase. A phase with zero apparent power carries no
/// defined reactive value, hence the optional leaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactiveTriple {
    #[serde(rename = "L1")]
    pub l1: Option<f64>,
    #[serde(rename = "L2")]
    pub l2: Option<f64>,
    #[serde(rename = "L3")]
    pub l3: Option<f64>,
    pub total: Option<f64>,
}

/// Power factor per phase, undefined where apparent power is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerFactorSummary {
    #[serde(rename = "L1")]
    pub l1: Option<f64>,
    #[serde(rename = "L2")]
    pub l2: Option<f64>,
    #[serde(rename = "L3")]
    pub l3: Option<f64>,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerAnalysis {
    pub active_power_kw: PowerTriple,
    pub reactive_power_kvar: ReactiveTriple,
    pub apparent_power_kva: PowerTriple,
    pub power_factor: PowerFactorSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub voltage_unbalance_percent: f64,
    pub current_unbalance_percent: f64,
    pub voltage_thd_percent: PhaseTriple,
    pub current_thd_percent: PhaseTriple,
}

/// The complete deterministic output for one batch. Every leaf is populated;
/// the only optional leaves are the power-factor/reactive values that are
/// mathematically undefined at zero apparent power.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineMetrics {
    pub frequency_hz: f64,
    /// Coarse rotation label: "positive" or "unknown". Heuristic, derived
    /// from two correlator angles, not a validated phase-rotation detector.
    pub phase_sequence: String,
    pub rms_values: RmsValues,
    pub peak_values: PeakValues,
    pub phase_angles_degrees: PhaseAngles,
    pub power_analysis: PowerAnalysis,
    pub quality_metrics: QualityMetrics,
}

/// Final merged output: the baseline shape with external values overlaid
/// where they were present and well-formed, plus free-form narrative blocks
/// passed through verbatim from the external analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedResult {
    #[serde(flatten)]
    pub metrics: BaselineMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<serde_json::Value>,
}

/// Load character of one phase, derived from the sign of the V-I angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseDirection {
    Inductive,  // current lags voltage (negative angle)
    Capacitive, // current leads voltage (positive angle)
    InPhase,    // no phase difference (almost 0 deg)
}

impl Default for PhaseDirection {
    fn default() -> Self {
        PhaseDirection::InPhase
    }
}

impl PhaseDirection {
    pub fn from_angle_degrees(angle: f64) -> Self {
        if angle < -1e-6 {
            PhaseDirection::Inductive
        } else if angle > 1e-6 {
            PhaseDirection::Capacitive
        } else {
            PhaseDirection::InPhase
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseDirection::Inductive => "Inductive (current lags voltage)",
            PhaseDirection::Capacitive => "Capacitive (current leads voltage)",
            PhaseDirection::InPhase => "In phase (no phase difference)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn batch_rejects_unequal_lengths() {
        let err = WaveformBatch::new(
            ramp(8),
            ramp(8),
            ramp(7),
            ramp(8),
            ramp(8),
            ramp(8),
            1000.0,
        )
        .unwrap_err();
        assert!(matches!(err, WaveformError::InvalidBatch(_)));
    }

    #[test]
    fn batch_rejects_non_finite_samples() {
        let mut bad = ramp(8);
        bad[3] = f64::NAN;
        let err =
            WaveformBatch::new(ramp(8), ramp(8), ramp(8), bad, ramp(8), ramp(8), 1000.0)
                .unwrap_err();
        assert!(matches!(err, WaveformError::InvalidBatch(_)));
    }

    #[test]
    fn batch_rejects_non_positive_sampling_rate() {
        let err = WaveformBatch::new(
            ramp(8),
            ramp(8),
            ramp(8),
            ramp(8),
            ramp(8),
            ramp(8),
            0.0,
        )
        .unwrap_err();
        assert!(matches!(err, WaveformError::InvalidBatch(_)));
    }

    #[test]
    fn batch_rejects_short_channels() {
        let err = WaveformBatch::new(
            ramp(1),
            ramp(1),
            ramp(1),
            ramp(1),
            ramp(1),
            ramp(1),
            1000.0,
        )
        .unwrap_err();
        assert!(matches!(err, WaveformError::InvalidBatch(_)));
    }

    #[test]
    fn metrics_serialize_with_wire_names() {
        let metrics = BaselineMetrics {
            frequency_hz: 50.0,
            phase_sequence: "positive".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["frequency_hz"], 50.0);
        assert!(json["rms_values"]["voltage"]["L1"].is_number());
        assert!(json["phase_angles_degrees"]["voltage_L1_vs_current_L1"].is_number());
        assert!(json["power_analysis"]["power_factor"]["average"].is_null());
    }

    #[test]
    fn grid_config_snaps_to_nearest_nominal() {
        assert_eq!(AnalyzerConfig::for_grid_frequency(59.7).nominal_frequency_hz, 60.0);
        assert_eq!(AnalyzerConfig::for_grid_frequency(50.2).nominal_frequency_hz, 50.0);
        assert_eq!(AnalyzerConfig::for_grid_frequency(55.0).nominal_frequency_hz, 50.0);
    }

    #[test]
    fn direction_follows_angle_sign() {
        assert_eq!(
            PhaseDirection::from_angle_degrees(-30.0),
            PhaseDirection::Inductive
        );
        assert_eq!(
            PhaseDirection::from_angle_degrees(30.0),
            PhaseDirection::Capacitive
        );
        assert_eq!(
            PhaseDirection::from_angle_degrees(0.0),
            PhaseDirection::InPhase
        );
    }
}
