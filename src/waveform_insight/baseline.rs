/* ----------------- Baseline Metrics Builder ------------------ */

use super::frequency::zero_crossing_frequency;
use super::harmonics::thd_percent;
use super::phase::correlation_phase_angle;
use super::power::{calculate_phase_power, unbalance_percent, PhasePower};
use super::stats::{demean, peak_abs, rms};
use super::types::*;

/*
* @brief Build the complete deterministic metrics object for one batch.
* @param batch Validated waveform batch
* @param config Analyzer configuration
* @return BaselineMetrics with every leaf populated
* @note This is pure orchestration over the estimator modules; it never
*       fails and never produces NaN leaves. The unestimable-frequency
*       sentinel is resolved here against the configured nominal fallback,
*       and the only optional leaves are the power-factor/reactive values
*       of phases with zero apparent power.
*/
pub fn build_baseline(batch: &WaveformBatch, config: &AnalyzerConfig) -> BaselineMetrics {
    let fs = batch.sampling_rate_hz();

    let demeaned_voltage: [Vec<f64>; 3] = Phase::ALL.map(|p| demean(batch.voltage(p)));
    let demeaned_current: [Vec<f64>; 3] = Phase::ALL.map(|p| demean(batch.current(p)));

    // Fundamental frequency from voltage L1, nominal fallback when the
    // crossing count is too low to estimate.
    let estimated = zero_crossing_frequency(&demeaned_voltage[0], fs);
    let frequency_hz = if estimated.is_finite() && estimated > 0.0 {
        estimated
    } else {
        log::debug!(
            "zero-crossing estimation failed, falling back to {} Hz",
            config.nominal_frequency_hz
        );
        config.nominal_frequency_hz
    };

    let samples_per_period = fs / frequency_hz;
    let max_lag = config
        .max_lag_override
        .unwrap_or(samples_per_period.round() as usize)
        .min(batch.len().saturating_sub(1));

    let rms_values = RmsValues {
        voltage: phase_triple(|p| rms(batch.voltage(p))),
        current: phase_triple(|p| rms(batch.current(p))),
        line_to_line: line_to_line_rms(batch),
    };

    let peak_values = PeakValues {
        voltage: phase_triple(|p| peak_abs(batch.voltage(p))),
        current: phase_triple(|p| peak_abs(batch.current(p))),
    };

    let angle = |a: &[f64], b: &[f64]| correlation_phase_angle(a, b, max_lag, samples_per_period);

    let phase_angles_degrees = PhaseAngles {
        voltage_l1_vs_l2: angle(&demeaned_voltage[0], &demeaned_voltage[1]),
        voltage_l2_vs_l3: angle(&demeaned_voltage[1], &demeaned_voltage[2]),
        voltage_l3_vs_l1: angle(&demeaned_voltage[2], &demeaned_voltage[0]),
        voltage_l1_vs_current_l1: angle(&demeaned_voltage[0], &demeaned_current[0]),
        voltage_l2_vs_current_l2: angle(&demeaned_voltage[1], &demeaned_current[1]),
        voltage_l3_vs_current_l3: angle(&demeaned_voltage[2], &demeaned_current[2]),
    };

    let per_phase: [PhasePower; 3] = Phase::ALL.map(|p| {
        calculate_phase_power(
            batch.voltage(p),
            batch.current(p),
            rms_values.voltage.get(p),
            rms_values.current.get(p),
        )
    });

    let power_analysis = build_power_analysis(&per_phase);

    let quality_metrics = QualityMetrics {
        voltage_unbalance_percent: unbalance_percent(
            rms_values.voltage.l1,
            rms_values.voltage.l2,
            rms_values.voltage.l3,
        ),
        current_unbalance_percent: unbalance_percent(
            rms_values.current.l1,
            rms_values.current.l2,
            rms_values.current.l3,
        ),
        voltage_thd_percent: PhaseTriple {
            l1: thd_percent(&demeaned_voltage[0], frequency_hz, fs, config.harmonic_count),
            l2: thd_percent(&demeaned_voltage[1], frequency_hz, fs, config.harmonic_count),
            l3: thd_percent(&demeaned_voltage[2], frequency_hz, fs, config.harmonic_count),
        },
        current_thd_percent: PhaseTriple {
            l1: thd_percent(&demeaned_current[0], frequency_hz, fs, config.harmonic_count),
            l2: thd_percent(&demeaned_current[1], frequency_hz, fs, config.harmonic_count),
            l3: thd_percent(&demeaned_current[2], frequency_hz, fs, config.harmonic_count),
        },
    };

    let phase_sequence = classify_phase_sequence(&phase_angles_degrees);

    log::debug!(
        "baseline built: f={frequency_hz:.2} Hz, spp={samples_per_period:.1}, max_lag={max_lag}"
    );

    BaselineMetrics {
        frequency_hz,
        phase_sequence,
        rms_values,
        peak_values,
        phase_angles_degrees,
        power_analysis,
        quality_metrics,
    }
}

fn phase_triple(f: impl Fn(Phase) -> f64) -> PhaseTriple {
    PhaseTriple {
        l1: f(Phase::L1),
        l2: f(Phase::L2),
        l3: f(Phase::L3),
    }
}

/*
* @brief Calculate the RMS of the three line-to-line voltage differences.
* @param batch Validated waveform batch
* @return RMS of L1-L2, L2-L3 and L3-L1 sample differences
*/
fn line_to_line_rms(batch: &WaveformBatch) -> LineTriple {
    let diff = |a: &[f64], b: &[f64]| -> f64 {
        let d: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
        rms(&d)
    };

    LineTriple {
        l1_l2: diff(batch.voltage(Phase::L1), batch.voltage(Phase::L2)),
        l2_l3: diff(batch.voltage(Phase::L2), batch.voltage(Phase::L3)),
        l3_l1: diff(batch.voltage(Phase::L3), batch.voltage(Phase::L1)),
    }
}

/*
* @brief Aggregate per-phase power figures into the power analysis block.
* @param phases Per-phase power values in L1, L2, L3 order
* @return PowerAnalysis with scalar totals
* @note Totals are plain sums across phases, not vector addition; adequate
*       for near-balanced systems. The reactive total skips undefined
*       phases and is None only when no phase defines a value. The average
*       power factor is total active over total apparent.
*/
fn build_power_analysis(phases: &[PhasePower; 3]) -> PowerAnalysis {
    let active_total: f64 = phases.iter().map(|p| p.active_kw).sum();
    let apparent_total: f64 = phases.iter().map(|p| p.apparent_kva).sum();

    let defined_reactive: Vec<f64> = phases.iter().filter_map(|p| p.reactive_kvar).collect();
    let reactive_total = if defined_reactive.is_empty() {
        None
    } else {
        Some(defined_reactive.iter().sum())
    };

    let average_pf = if apparent_total > 0.0 {
        Some((active_total / apparent_total).clamp(-1.0, 1.0))
    } else {
        None
    };

    PowerAnalysis {
        active_power_kw: PowerTriple {
            l1: phases[0].active_kw,
            l2: phases[1].active_kw,
            l3: phases[2].active_kw,
            total: active_total,
        },
        reactive_power_kvar: ReactiveTriple {
            l1: phases[0].reactive_kvar,
            l2: phases[1].reactive_kvar,
            l3: phases[2].reactive_kvar,
            total: reactive_total,
        },
        apparent_power_kva: PowerTriple {
            l1: phases[0].apparent_kva,
            l2: phases[1].apparent_kva,
            l3: phases[2].apparent_kva,
            total: apparent_total,
        },
        power_factor: PowerFactorSummary {
            l1: phases[0].power_factor,
            l2: phases[1].power_factor,
            l3: phases[2].power_factor,
            average: average_pf,
        },
    }
}

/*
* @brief Derive the coarse phase-sequence label from two voltage angles.
* @param angles Correlator output angles
* @return "positive" when both L1->L2 and L2->L3 fall in (-180, 0),
*         "unknown" otherwise
* @note Approximate heuristic over two correlator outputs, not a validated
*       phase-rotation detector.
*/
fn classify_phase_sequence(angles: &PhaseAngles) -> String {
    let in_lagging_range = |a: f64| a > -180.0 && a < 0.0;

    if in_lagging_range(angles.voltage_l1_vs_l2) && in_lagging_range(angles.voltage_l2_vs_l3) {
        "positive".to_string()
    } else {
        "unknown".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const FS: f64 = 10000.0;
    const F: f64 = 50.0;
    const N: usize = 2000;

    fn wave(amplitude: f64, offset_degrees: f64) -> Vec<f64> {
        (0..N)
            .map(|i| {
                amplitude * (offset_degrees.to_radians() + 2.0 * PI * F * i as f64 / FS).sin()
            })
            .collect()
    }

    fn balanced_batch() -> WaveformBatch {
        WaveformBatch::new(
            wave(325.0, 0.0),
            wave(325.0, -120.0),
            wave(325.0, 120.0),
            wave(14.14, -30.0),
            wave(14.14, -150.0),
            wave(14.14, 90.0),
            FS,
        )
        .unwrap()
    }

    #[test]
    fn balanced_system_labels_positive_sequence() {
        let metrics = build_baseline(&balanced_batch(), &AnalyzerConfig::default());
        assert_eq!(metrics.phase_sequence, "positive");
        assert!(metrics.phase_angles_degrees.voltage_l1_vs_l2 < 0.0);
        assert!(metrics.phase_angles_degrees.voltage_l2_vs_l3 < 0.0);
    }

    #[test]
    fn balanced_system_has_zero_unbalance() {
        let metrics = build_baseline(&balanced_batch(), &AnalyzerConfig::default());
        assert!(metrics.quality_metrics.voltage_unbalance_percent < 0.5);
        assert!(metrics.quality_metrics.current_unbalance_percent < 0.5);
    }

    #[test]
    fn line_to_line_rms_is_sqrt3_of_phase_rms() {
        let metrics = build_baseline(&balanced_batch(), &AnalyzerConfig::default());
        let expected = metrics.rms_values.voltage.l1 * 3.0_f64.sqrt();
        let actual = metrics.rms_values.line_to_line.l1_l2;
        assert!(
            (actual - expected).abs() < 0.02 * expected,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn flat_voltage_falls_back_to_nominal_frequency() {
        let batch = WaveformBatch::new(
            vec![0.0; N],
            vec![0.0; N],
            vec![0.0; N],
            vec![0.0; N],
            vec![0.0; N],
            vec![0.0; N],
            FS,
        )
        .unwrap();
        let metrics = build_baseline(&batch, &AnalyzerConfig::default());
        assert_eq!(metrics.frequency_hz, FREQ_NOMINAL_50);
        assert_eq!(metrics.phase_sequence, "unknown");
        assert_eq!(metrics.power_analysis.power_factor.l1, None);
        assert_eq!(metrics.power_analysis.reactive_power_kvar.total, None);
    }

    #[test]
    fn baseline_has_no_nan_leaves() {
        let metrics = build_baseline(&balanced_batch(), &AnalyzerConfig::default());
        let json = serde_json::to_value(&metrics).unwrap();
        assert_no_nan(&json);
    }

    fn assert_no_nan(value: &serde_json::Value) {
        match value {
            serde_json::Value::Object(map) => map.values().for_each(assert_no_nan),
            serde_json::Value::Array(items) => items.iter().for_each(assert_no_nan),
            serde_json::Value::Number(n) => assert!(n.as_f64().unwrap().is_finite()),
            // A NaN leaf serializes to null; a loaded balanced batch defines
            // every optional leaf, so nothing may be null here.
            serde_json::Value::Null => panic!("unexpected null leaf"),
            _ => {}
        }
    }
}
