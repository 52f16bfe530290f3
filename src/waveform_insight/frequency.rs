/* ----------------- Frequency Estimator ------------------ */

/*
* @brief Estimate the fundamental frequency of a demeaned signal.
* @param signal Demeaned sample buffer
* @param sampling_rate_hz Sampling rate in Hz
* @return Frequency in Hz, NaN when fewer than 2 crossings are found
* @note Positive-going crossings only: an index i counts when
*       signal[i-1] <= 0 and signal[i] > 0. The average sample distance
*       between consecutive crossings is one period. No interpolation is
*       applied across the crossing, so accuracy is limited to one sample;
*       adequate for power frequencies (45-65 Hz) sampled at >= 1 kHz.
*/
pub fn zero_crossing_frequency(signal: &[f64], sampling_rate_hz: f64) -> f64 {
    let crossings = positive_going_crossings(signal);

    if crossings.len() < 2 {
        return f64::NAN;
    }

    let mut sum: f64 = 0.0;
    for p in 0..crossings.len() - 1 {
        sum += (crossings[p + 1] - crossings[p]) as f64;
    }
    let avg_period_samples = sum / (crossings.len() - 1) as f64;

    sampling_rate_hz / avg_period_samples
}

/*
* @brief Collect the indices of positive-going zero crossings.
* @param signal Demeaned sample buffer
* @return Sample indices where the signal crosses from <= 0 to > 0
*/
fn positive_going_crossings(signal: &[f64]) -> Vec<usize> {
    let mut crossings = Vec::new();

    for i in 1..signal.len() {
        if signal[i - 1] <= 0.0 && signal[i] > 0.0 {
            crossings.push(i);
        }
    }

    crossings
}
