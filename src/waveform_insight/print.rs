use super::types::{MergedResult, PhaseDirection};

/*
* @brief Functions to print the merged analysis report.
* @param result Pointer to the MergedResult structure.
* @note This file contains functions to print the merged analysis report.
*/
pub fn print_frequency(result: &MergedResult) {
    log::info!("Frequency: {:.3} Hz", result.metrics.frequency_hz);
    log::info!("Phase sequence: {}\n", result.metrics.phase_sequence);
}

/*
* @brief Print the RMS and peak values.
* @param result Pointer to the MergedResult structure.
*/
pub fn print_rms_and_peak(result: &MergedResult) {
    let rms = &result.metrics.rms_values;
    let peak = &result.metrics.peak_values;

    log::info!("Voltage:");
    log::info!("  RMS: L1 {:.3} V, L2 {:.3} V, L3 {:.3} V", rms.voltage.l1, rms.voltage.l2, rms.voltage.l3);
    log::info!("  Peak: L1 {:.3} V, L2 {:.3} V, L3 {:.3} V", peak.voltage.l1, peak.voltage.l2, peak.voltage.l3);
    log::info!(
        "  Line-to-line RMS: L1-L2 {:.3} V, L2-L3 {:.3} V, L3-L1 {:.3} V\n",
        rms.line_to_line.l1_l2,
        rms.line_to_line.l2_l3,
        rms.line_to_line.l3_l1
    );
    log::info!("Current:");
    log::info!("  RMS: L1 {:.3} A, L2 {:.3} A, L3 {:.3} A", rms.current.l1, rms.current.l2, rms.current.l3);
    log::info!("  Peak: L1 {:.3} A, L2 {:.3} A, L3 {:.3} A\n", peak.current.l1, peak.current.l2, peak.current.l3);
}

/*
* @brief Print the phase angle data.
* @param result Pointer to the MergedResult structure.
*/
pub fn print_phase_angles(result: &MergedResult) {
    let angles = &result.metrics.phase_angles_degrees;

    log::info!("Phase Angles:");
    log::info!("  V L1->L2: {:.2} deg", angles.voltage_l1_vs_l2);
    log::info!("  V L2->L3: {:.2} deg", angles.voltage_l2_vs_l3);
    log::info!("  V L3->L1: {:.2} deg", angles.voltage_l3_vs_l1);

    for (label, angle) in [
        ("L1", angles.voltage_l1_vs_current_l1),
        ("L2", angles.voltage_l2_vs_current_l2),
        ("L3", angles.voltage_l3_vs_current_l3),
    ] {
        let direction = PhaseDirection::from_angle_degrees(angle);
        log::info!("  V->I {label}: {angle:.2} deg, {}", direction.as_str());
    }
    log::info!("");
}

/*
* @brief Print the power data.
* @param result Pointer to the MergedResult structure.
*/
pub fn print_power(result: &MergedResult) {
    let power = &result.metrics.power_analysis;
    let fmt_opt = |value: Option<f64>| match value {
        Some(v) => format!("{v:.3}"),
        None => "undefined".to_string(),
    };

    log::info!("Power:");
    log::info!("  Active: {:.3} kW (L1 {:.3}, L2 {:.3}, L3 {:.3})",
        power.active_power_kw.total, power.active_power_kw.l1, power.active_power_kw.l2, power.active_power_kw.l3);
    log::info!("  Apparent: {:.3} kVA (L1 {:.3}, L2 {:.3}, L3 {:.3})",
        power.apparent_power_kva.total, power.apparent_power_kva.l1, power.apparent_power_kva.l2, power.apparent_power_kva.l3);
    log::info!("  Reactive: {} kVAR (L1 {}, L2 {}, L3 {})",
        fmt_opt(power.reactive_power_kvar.total), fmt_opt(power.reactive_power_kvar.l1),
        fmt_opt(power.reactive_power_kvar.l2), fmt_opt(power.reactive_power_kvar.l3));
    log::info!("  Factor: {} (L1 {}, L2 {}, L3 {})\n",
        fmt_opt(power.power_factor.average), fmt_opt(power.power_factor.l1),
        fmt_opt(power.power_factor.l2), fmt_opt(power.power_factor.l3));
}

/*
* @brief Print the quality metrics.
* @param result Pointer to the MergedResult structure.
*/
pub fn print_quality(result: &MergedResult) {
    let quality = &result.metrics.quality_metrics;

    log::info!("Quality:");
    log::info!("  Voltage unbalance: {:.2} %", quality.voltage_unbalance_percent);
    log::info!("  Current unbalance: {:.2} %", quality.current_unbalance_percent);
    log::info!(
        "  Voltage THD: L1 {:.2} %, L2 {:.2} %, L3 {:.2} %",
        quality.voltage_thd_percent.l1,
        quality.voltage_thd_percent.l2,
        quality.voltage_thd_percent.l3
    );
    log::info!(
        "  Current THD: L1 {:.2} %, L2 {:.2} %, L3 {:.2} %\n",
        quality.current_thd_percent.l1,
        quality.current_thd_percent.l2,
        quality.current_thd_percent.l3
    );
}

/*
* @brief Print the narrative blocks carried over from the external analysis.
* @param result Pointer to the MergedResult structure.
*/
pub fn print_narrative(result: &MergedResult) {
    if let Some(summary) = &result.summary {
        log::info!("Summary: {summary}");
    }
    if let Some(recommendations) = &result.recommendations {
        log::info!("Recommendations: {recommendations}");
    }
}

/*
* @brief Print the full analysis report.
* @param result Pointer to the MergedResult structure.
*/
pub fn print_all(result: &MergedResult) {
    print_frequency(result);
    print_rms_and_peak(result);
    print_phase_angles(result);
    print_power(result);
    print_quality(result);
    print_narrative(result);
}
