use std::f64::consts::PI;

use serde_json::json;

use waveform_insight::{
    AnalysisProvider, AnalyzerConfig, BaselineMetrics, RetryPolicy, WaveformAnalyzer,
    WaveformBatch, WaveformError,
};

/// Scenario from the field: 60 Hz balanced system, 120 V RMS and 15 A RMS
/// per phase, current lagging 30 degrees, 1 kHz sampling, 100 samples.
fn sixty_hz_batch() -> WaveformBatch {
    const FS: f64 = 1000.0;
    const F: f64 = 60.0;
    const N: usize = 100;

    let wave = |amplitude_rms: f64, offset_degrees: f64| -> Vec<f64> {
        let peak = amplitude_rms * 2.0_f64.sqrt();
        (0..N)
            .map(|i| peak * (offset_degrees.to_radians() + 2.0 * PI * F * i as f64 / FS).sin())
            .collect()
    };

    WaveformBatch::new(
        wave(120.0, 0.0),
        wave(120.0, -120.0),
        wave(120.0, 120.0),
        wave(15.0, -30.0),
        wave(15.0, -150.0),
        wave(15.0, 90.0),
        FS,
    )
    .unwrap()
}

#[test]
fn end_to_end_sixty_hertz_scenario() {
    let analyzer = WaveformAnalyzer::new(AnalyzerConfig::default());
    let metrics = analyzer.analyze(&sixty_hz_batch());

    assert!((metrics.frequency_hz - 60.0).abs() < 2.0, "f {}", metrics.frequency_hz);

    for rms in [
        metrics.rms_values.voltage.l1,
        metrics.rms_values.voltage.l2,
        metrics.rms_values.voltage.l3,
    ] {
        assert!((rms - 120.0).abs() < 2.0, "voltage rms {rms}");
    }
    for rms in [
        metrics.rms_values.current.l1,
        metrics.rms_values.current.l2,
        metrics.rms_values.current.l3,
    ] {
        assert!((rms - 15.0).abs() < 0.3, "current rms {rms}");
    }

    // 16.7 samples per period quantizes lags to about 22 degrees, so the
    // V-I angle can only land within one lag step of -30.
    for angle in [
        metrics.phase_angles_degrees.voltage_l1_vs_current_l1,
        metrics.phase_angles_degrees.voltage_l2_vs_current_l2,
        metrics.phase_angles_degrees.voltage_l3_vs_current_l3,
    ] {
        assert!((angle - (-30.0)).abs() < 22.0, "v-i angle {angle}");
        assert!(angle < 0.0, "current should lag, angle {angle}");
    }

    let expected_pf = 30.0_f64.to_radians().cos();
    for pf in [
        metrics.power_analysis.power_factor.l1.unwrap(),
        metrics.power_analysis.power_factor.l2.unwrap(),
        metrics.power_analysis.power_factor.l3.unwrap(),
        metrics.power_analysis.power_factor.average.unwrap(),
    ] {
        assert!((pf - expected_pf).abs() < 0.03, "pf {pf}");
    }

    assert!(metrics.quality_metrics.voltage_unbalance_percent < 1.0);
    assert_eq!(metrics.phase_sequence, "positive");
}

#[test]
fn merge_precedence_over_public_api() {
    let analyzer = WaveformAnalyzer::new(AnalyzerConfig::default());
    let batch = sixty_hz_batch();
    let baseline = analyzer.analyze(&batch);

    let external = json!({
        "frequency_hz": 59.95,
        "rms_values": { "voltage": { "L1": 119.7, "L2": null } },
        "quality_metrics": { "voltage_thd_percent": { "L1": "low" } },
        "summary": "Balanced 60 Hz system under inductive load."
    });

    let merged = analyzer.analyze_with_external(&batch, Some(&external));

    assert_eq!(merged.metrics.frequency_hz, 59.95);
    assert_eq!(merged.metrics.rms_values.voltage.l1, 119.7);
    // Null and malformed leaves fall back to the deterministic values.
    assert_eq!(merged.metrics.rms_values.voltage.l2, baseline.rms_values.voltage.l2);
    assert_eq!(
        merged.metrics.quality_metrics.voltage_thd_percent.l1,
        baseline.quality_metrics.voltage_thd_percent.l1
    );
    assert_eq!(
        merged.summary,
        Some(json!("Balanced 60 Hz system under inductive load."))
    );
}

#[test]
fn missing_external_returns_complete_baseline() {
    let analyzer = WaveformAnalyzer::new(AnalyzerConfig::default());
    let batch = sixty_hz_batch();
    let merged = analyzer.analyze_with_external(&batch, None);
    assert_eq!(merged.metrics, analyzer.analyze(&batch));
    assert_eq!(merged.summary, None);
}

struct AlwaysFailing;

#[async_trait::async_trait]
impl AnalysisProvider for AlwaysFailing {
    async fn analyze(&self, _baseline: &BaselineMetrics) -> Result<serde_json::Value, WaveformError> {
        Err(WaveformError::AnalysisFailed {
            attempts: 1,
            message: "model unavailable".to_string(),
        })
    }
}

#[tokio::test(start_paused = true)]
async fn failing_provider_degrades_to_baseline() {
    let analyzer = WaveformAnalyzer::new(AnalyzerConfig::default());
    let batch = sixty_hz_batch();
    let policy = RetryPolicy {
        max_attempts: 2,
        base_delay: std::time::Duration::from_millis(50),
    };

    let merged = analyzer
        .analyze_with_provider(&batch, &AlwaysFailing, &policy)
        .await;

    assert_eq!(merged.metrics, analyzer.analyze(&batch));
}

struct CannedProvider(serde_json::Value);

#[async_trait::async_trait]
impl AnalysisProvider for CannedProvider {
    async fn analyze(&self, _baseline: &BaselineMetrics) -> Result<serde_json::Value, WaveformError> {
        Ok(self.0.clone())
    }
}

#[tokio::test]
async fn provider_payload_is_merged() {
    let analyzer = WaveformAnalyzer::new(AnalyzerConfig::default());
    let batch = sixty_hz_batch();

    let merged = analyzer
        .analyze_with_provider(
            &batch,
            &CannedProvider(json!({ "frequency_hz": 60.02, "summary": "ok" })),
            &RetryPolicy::default(),
        )
        .await;

    assert_eq!(merged.metrics.frequency_hz, 60.02);
    assert_eq!(merged.summary, Some(json!("ok")));
}
