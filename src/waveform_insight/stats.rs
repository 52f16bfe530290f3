/* ----------------- Statistics Primitives ------------------ */

/*
* @brief Calculate the arithmetic mean of a sample buffer.
* @param signal Sample buffer
* @return Mean value, NaN for an empty buffer
* @note Batches are validated to hold at least 2 samples, so the NaN branch
*       is defensive only.
*/
pub fn mean(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return f64::NAN;
    }

    signal.iter().sum::<f64>() / signal.len() as f64
}

/*
* @brief Calculate the RMS value of a sample buffer.
* @param signal Sample buffer
* @return sqrt(mean(x^2)), 0.0 when the mean square is not positive
*/
pub fn rms(signal: &[f64]) -> f64 {
    let power = mean_of_products(signal, signal);

    if power > 0.0 {
        power.sqrt()
    } else {
        0.0
    }
}

/*
* @brief Calculate the largest absolute sample of a buffer.
* @param signal Sample buffer
* @return max(|x|), 0.0 for an empty buffer
*/
pub fn peak_abs(signal: &[f64]) -> f64 {
    signal.iter().fold(0.0, |max, &s| {
        let abs = s.abs();
        if abs > max {
            abs
        } else {
            max
        }
    })
}

/*
* @brief Remove the DC offset from a signal.
* @param signal Sample buffer
* @return New buffer with the mean subtracted from every sample
* @note A DC offset biases zero-crossing counts and correlation peaks, so
*       every frequency/phase/harmonic operation runs on a demeaned buffer.
*/
pub fn demean(signal: &[f64]) -> Vec<f64> {
    let offset = mean(signal);
    signal.iter().map(|&s| s - offset).collect()
}

/*
* @brief Calculate the mean of the elementwise product of two buffers.
* @param signal1 First sample buffer
* @param signal2 Second sample buffer
* @return mean(x1 * x2) over the shorter overlap, 0.0 when empty
* @note mean(v * i) is instantaneous power; mean(x * x) is signal power.
*/
pub fn mean_of_products(signal1: &[f64], signal2: &[f64]) -> f64 {
    let length = signal1.len().min(signal2.len());
    if length == 0 {
        return 0.0;
    }

    let mut square: f64 = 0.0;
    for i in 0..length {
        square += signal1[i] * signal2[i];
    }

    square / length as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(amplitude: f64, cycles: usize, samples_per_cycle: usize) -> Vec<f64> {
        let n = cycles * samples_per_cycle;
        (0..n)
            .map(|i| amplitude * (2.0 * PI * i as f64 / samples_per_cycle as f64).sin())
            .collect()
    }

    #[test]
    fn mean_of_empty_is_nan() {
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn rms_of_pure_sine_is_amplitude_over_sqrt2() {
        let signal = sine(325.0, 10, 200);
        let expected = 325.0 / 2.0_f64.sqrt();
        assert!((rms(&signal) - expected).abs() < 0.01 * expected);
    }

    #[test]
    fn peak_abs_of_pure_sine_is_amplitude() {
        let signal = sine(325.0, 10, 200);
        assert!((peak_abs(&signal) - 325.0).abs() < 0.1);
    }

    #[test]
    fn peak_abs_sees_negative_excursions() {
        assert_eq!(peak_abs(&[1.0, -3.0, 2.0]), 3.0);
    }

    #[test]
    fn demean_removes_dc_offset() {
        let signal: Vec<f64> = sine(10.0, 4, 100).iter().map(|s| s + 7.5).collect();
        let centered = demean(&signal);
        assert!(mean(&centered).abs() < 1e-9);
    }

    #[test]
    fn mean_of_products_matches_signal_power() {
        let signal = sine(2.0, 5, 100);
        let power = mean_of_products(&signal, &signal);
        assert!((power.sqrt() - rms(&signal)).abs() < 1e-12);
    }
}
