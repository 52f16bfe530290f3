/* ----------------- Power & Balance Calculator ------------------ */

use super::stats::mean_of_products;

/// Power figures for a single phase. Power factor and reactive power are
/// undefined when the phase carries no apparent power.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhasePower {
    pub active_kw: f64,
    pub apparent_kva: f64,
    pub reactive_kvar: Option<f64>,
    pub power_factor: Option<f64>,
}

/*
* @brief Calculate the power figures of one phase.
* @param voltage Voltage samples of the phase
* @param current Current samples of the phase
* @param voltage_rms RMS value of the voltage channel
* @param current_rms RMS value of the current channel
* @return PhasePower with active (kW), apparent (kVA), reactive (kVAR) and
*         power factor
* @note Active power is mean(v * i); apparent power is Vrms * Irms. The
*       power factor is clamped into [-1, 1] to absorb rounding. Reactive
*       power follows the power triangle, floored at zero so that
*       apparent^2 >= active^2 always yields a valid non-negative value.
*/
pub fn calculate_phase_power(
    voltage: &[f64],
    current: &[f64],
    voltage_rms: f64,
    current_rms: f64,
) -> PhasePower {
    let active_kw = mean_of_products(voltage, current) / 1000.0;
    let apparent_kva = voltage_rms * current_rms / 1000.0;

    let power_factor = if apparent_kva > 0.0 {
        Some((active_kw / apparent_kva).clamp(-1.0, 1.0))
    } else {
        None
    };

    let reactive_kvar = power_factor
        .map(|_| (apparent_kva.powi(2) - active_kw.powi(2)).max(0.0).sqrt());

    PhasePower {
        active_kw,
        apparent_kva,
        reactive_kvar,
        power_factor,
    }
}

/*
* @brief Calculate the unbalance percentage of a three-phase triple.
* @param a First phase value (typically an RMS)
* @param b Second phase value
* @param c Third phase value
* @return 100 * max deviation from the average, divided by the average;
*         0.0 when the average is zero
*/
pub fn unbalance_percent(a: f64, b: f64, c: f64) -> f64 {
    let avg = (a + b + c) / 3.0;

    if avg == 0.0 {
        return 0.0;
    }

    let deviation = (a - avg).abs().max((b - avg).abs()).max((c - avg).abs());

    100.0 * deviation / avg
}
