/* ----------------- Phase Correlator ------------------ */

const CORRELATION_EPSILON: f64 = 1e-12;

/*
* @brief Estimate the angular offset of signal b relative to signal a.
* @param a Demeaned reference signal
* @param b Demeaned compared signal
* @param max_lag Lag window in samples, scanned over [-max_lag, +max_lag]
* @param samples_per_period Samples in one period of the fundamental
* @return Angle in degrees, normalized into (-180, 180]
* @note Sign convention: a negative angle means b lags a (b is delayed),
*       a positive angle means b leads a. On a balanced positive-sequence
*       system the L1->L2 and L2->L3 voltage angles are both about -120.
*/
pub fn correlation_phase_angle(a: &[f64], b: &[f64], max_lag: usize, samples_per_period: f64) -> f64 {
    if !(samples_per_period > 0.0) {
        return 0.0;
    }

    let lag = best_correlation_lag(a, b, max_lag);
    let degrees = -(lag as f64 / samples_per_period) * 360.0;

    normalize_degrees(degrees)
}

/*
* @brief Find the integer lag with the largest normalized cross-correlation.
* @param a Demeaned reference signal
* @param b Demeaned compared signal
* @param max_lag Lag window in samples
* @return Lag in samples, in [-max_lag, +max_lag]
* @note The coefficient is dot(a[i], b[i+lag]) over the overlapping range,
*       normalized by sqrt(sum(a^2) * sum(b^2)), bounded in [-1, 1]. Lags
*       are scanned in ascending order and ties keep the first maximum
*       found (strict greater-than comparison).
*/
fn best_correlation_lag(a: &[f64], b: &[f64], max_lag: usize) -> i64 {
    let energy_a: f64 = a.iter().map(|x| x * x).sum();
    let energy_b: f64 = b.iter().map(|x| x * x).sum();
    let denom = (energy_a * energy_b).sqrt();

    if denom < CORRELATION_EPSILON {
        return 0;
    }

    let max_lag = max_lag as i64;
    let mut best_lag: i64 = 0;
    let mut best_coeff = f64::NEG_INFINITY;

    for lag in -max_lag..=max_lag {
        let mut dot: f64 = 0.0;
        for i in 0..a.len() as i64 {
            let j = i + lag;
            if j >= 0 && (j as usize) < b.len() {
                dot += a[i as usize] * b[j as usize];
            }
        }

        let coeff = dot / denom;
        if coeff > best_coeff {
            best_coeff = coeff;
            best_lag = lag;
        }
    }

    best_lag
}

/*
* @brief Normalize an angle into (-180, 180].
* @param degrees Angle in degrees
* @return Normalized angle
*/
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = ((degrees + 180.0) % 360.0 + 360.0) % 360.0 - 180.0;

    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}
