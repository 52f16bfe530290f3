/* ----------------- Harmonic Estimator ------------------ */

use core::f64::consts::PI;
use num_complex::Complex;

/// Magnitudes below this floor count as a dead fundamental; THD is reported
/// as 0.0 rather than dividing by a vanishing value.
const FUNDAMENTAL_EPSILON: f64 = 1e-12;

/*
* @brief Calculate the spectral magnitude of a signal at one target frequency.
* @param signal Demeaned sample buffer
* @param target_hz Frequency to evaluate
* @param sampling_rate_hz Sampling rate in Hz
* @return Magnitude sqrt(re^2 + im^2) / N, 0.0 for frequencies at or above
*         Nyquist or for an empty buffer
* @note Goertzel second-order resonator with coefficient 2*cos(2*pi*f/fs);
*       evaluates a single DFT bin without a full spectral transform, which
*       is all the THD sum needs.
*/
pub fn goertzel_magnitude(signal: &[f64], target_hz: f64, sampling_rate_hz: f64) -> f64 {
    let n = signal.len();
    if n == 0 || !(target_hz > 0.0) || target_hz >= sampling_rate_hz / 2.0 {
        return 0.0;
    }

    let omega = 2.0 * PI * target_hz / sampling_rate_hz;
    let coeff = 2.0 * omega.cos();

    let mut s1: f64 = 0.0;
    let mut s2: f64 = 0.0;
    for &sample in signal {
        let s0 = sample + coeff * s1 - s2;
        s2 = s1;
        s1 = s0;
    }

    let bin = Complex::new(s1 - s2 * omega.cos(), s2 * omega.sin());

    bin.norm() / n as f64
}

/*
* @brief Calculate the total harmonic distortion of a signal.
* @param signal Demeaned sample buffer
* @param fundamental_hz Fundamental frequency
* @param sampling_rate_hz Sampling rate in Hz
* @param harmonic_count Highest harmonic order included in the sum
* @return THD as a percentage of the fundamental magnitude; 0.0 when the
*         fundamental magnitude is below the epsilon floor
* @note THD% = 100 * sqrt(sum of squared magnitudes at f*k, k=2..count)
*       divided by the magnitude at f. Harmonics at or above Nyquist
*       contribute zero.
*/
pub fn thd_percent(
    signal: &[f64],
    fundamental_hz: f64,
    sampling_rate_hz: f64,
    harmonic_count: usize,
) -> f64 {
    let fundamental = goertzel_magnitude(signal, fundamental_hz, sampling_rate_hz);

    if fundamental < FUNDAMENTAL_EPSILON {
        return 0.0;
    }

    let mut harmonic_power_sum: f64 = 0.0;
    for order in 2..=harmonic_count {
        let magnitude =
            goertzel_magnitude(signal, fundamental_hz * order as f64, sampling_rate_hz);
        harmonic_power_sum += magnitude * magnitude;
    }

    100.0 * harmonic_power_sum.sqrt() / fundamental
}
