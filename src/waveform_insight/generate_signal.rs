use ndarray::Array1;
use rand::Rng;
use std::f64::consts::PI;

use super::types::{WaveformBatch, WaveformError};

// Phase offsets of a positive-sequence system: L2 lags L1 by 120 degrees.
const PHASE_OFFSETS_DEG: [f64; 3] = [0.0, -120.0, 120.0];

/// Parameters of a synthetic three-phase capture.
#[derive(Debug, Clone)]
pub struct SignalParams {
    pub frequency_hz: f64,
    pub voltage_rms: f64,
    pub current_rms: f64,
    /// Degrees the current lags the voltage on every phase (positive value
    /// models an inductive load).
    pub current_lag_degrees: f64,
    pub sampling_rate_hz: f64,
    pub samples: usize,
    /// Harmonic order injected into every channel, 0 disables injection.
    pub harmonic_order: usize,
    /// Injected harmonic amplitude as a percentage of the fundamental.
    pub harmonic_percent: f64,
    /// Uniform random noise amplitude as a percentage of the peak.
    pub noise_percent: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            frequency_hz: 50.0,
            voltage_rms: 230.0,
            current_rms: 10.0,
            current_lag_degrees: 30.0,
            sampling_rate_hz: 7812.5,
            samples: 1024,
            harmonic_order: 0,
            harmonic_percent: 0.0,
            noise_percent: 0.0,
        }
    }
}

/*
* @brief Generate a synthetic three-phase waveform batch.
* @param params Signal parameters
* @return Validated WaveformBatch
* @note Voltages follow the positive-sequence offsets 0/-120/+120; currents
*       repeat the pattern shifted by the configured lag. Optional harmonic
*       injection and uniform noise exercise the THD and estimator paths.
*/
pub fn generate_batch(params: &SignalParams) -> Result<WaveformBatch, WaveformError> {
    let mut rng = rand::thread_rng();
    let samples = Array1::range(0.0, params.samples as f64, 1.0);

    let omega = 2.0 * PI * params.frequency_hz / params.sampling_rate_hz;
    let voltage_peak = params.voltage_rms * 2.0_f64.sqrt();
    let current_peak = params.current_rms * 2.0_f64.sqrt();

    let [v1, v2, v3] = PHASE_OFFSETS_DEG.map(|offset_deg| {
        synth_channel(
            &samples,
            voltage_peak,
            offset_deg.to_radians(),
            omega,
            params,
            &mut rng,
        )
    });

    let [i1, i2, i3] = PHASE_OFFSETS_DEG.map(|offset_deg| {
        synth_channel(
            &samples,
            current_peak,
            (offset_deg - params.current_lag_degrees).to_radians(),
            omega,
            params,
            &mut rng,
        )
    });

    WaveformBatch::new(v1, v2, v3, i1, i2, i3, params.sampling_rate_hz)
}

fn synth_channel(
    samples: &Array1<f64>,
    peak: f64,
    offset_rad: f64,
    omega: f64,
    params: &SignalParams,
    rng: &mut impl Rng,
) -> Vec<f64> {
    let harmonic_peak = peak * params.harmonic_percent / 100.0;
    let noise_peak = peak * params.noise_percent / 100.0;

    samples
        .iter()
        .map(|&s| {
            let mut value = peak * (offset_rad + omega * s).sin();

            if params.harmonic_order > 1 && harmonic_peak > 0.0 {
                let k = params.harmonic_order as f64;
                value += harmonic_peak * (k * (offset_rad + omega * s)).sin();
            }

            if noise_peak > 0.0 {
                value += rng.gen_range(-noise_peak..noise_peak);
            }

            value
        })
        .collect()
}
