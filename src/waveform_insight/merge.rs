/* ----------------- Result Merger ------------------ */

use serde_json::Value;

use super::types::*;

/*
* @brief Merge an untrusted external analysis over a complete baseline.
* @param baseline Deterministic metrics, every leaf populated
* @param external External analysis payload, arbitrary completeness
* @return MergedResult taking each leaf from the external payload when it is
*         present, non-null and well-formed, and from the baseline otherwise
* @note The merged structure is built field by field into a new value; the
*       baseline is never mutated, so sub-objects can be shared across
*       concurrent requests. A top-level payload that is absent or not a
*       JSON object counts as "no external input". Free-form narrative
*       blocks pass through verbatim with no fallback since the baseline
*       has no equivalent.
*/
pub fn merge_analysis(baseline: &BaselineMetrics, external: Option<&Value>) -> MergedResult {
    let ext = external.filter(|v| v.is_object());

    if ext.is_none() {
        log::debug!("no usable external analysis, returning baseline");
    }

    let metrics = BaselineMetrics {
        frequency_hz: number(ext, &[&["frequency_hz"]], baseline.frequency_hz),
        phase_sequence: string(ext, &["phase_sequence"], &baseline.phase_sequence),
        rms_values: RmsValues {
            voltage: phase_triple(ext, &["rms_values", "voltage"], baseline.rms_values.voltage),
            current: phase_triple(ext, &["rms_values", "current"], baseline.rms_values.current),
            line_to_line: line_triple(
                ext,
                &["rms_values", "line_to_line"],
                baseline.rms_values.line_to_line,
            ),
        },
        peak_values: PeakValues {
            voltage: phase_triple(ext, &["peak_values", "voltage"], baseline.peak_values.voltage),
            current: phase_triple(ext, &["peak_values", "current"], baseline.peak_values.current),
        },
        phase_angles_degrees: merge_phase_angles(ext, &baseline.phase_angles_degrees),
        power_analysis: merge_power_analysis(ext, &baseline.power_analysis),
        quality_metrics: QualityMetrics {
            voltage_unbalance_percent: number(
                ext,
                &[&["quality_metrics", "voltage_unbalance_percent"]],
                baseline.quality_metrics.voltage_unbalance_percent,
            ),
            current_unbalance_percent: number(
                ext,
                &[&["quality_metrics", "current_unbalance_percent"]],
                baseline.quality_metrics.current_unbalance_percent,
            ),
            voltage_thd_percent: phase_triple(
                ext,
                &["quality_metrics", "voltage_thd_percent"],
                baseline.quality_metrics.voltage_thd_percent,
            ),
            current_thd_percent: phase_triple(
                ext,
                &["quality_metrics", "current_thd_percent"],
                baseline.quality_metrics.current_thd_percent,
            ),
        },
    };

    MergedResult {
        metrics,
        summary: narrative(ext, "summary"),
        recommendations: narrative(ext, "recommendations"),
    }
}

/*
* @brief Walk a key path into a JSON value.
* @param value Root value
* @param path Object keys, outermost first
* @return The leaf value when every key exists
*/
fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(*key))
}

/*
* @brief Resolve a required numeric leaf.
* @param ext External payload, if usable
* @param paths Candidate key paths, tried in order
* @param baseline Baseline value to fall back to
* @return First external value that is a finite number, else the baseline
*/
fn number(ext: Option<&Value>, paths: &[&[&str]], baseline: f64) -> f64 {
    finite_at(ext, paths).unwrap_or(baseline)
}

/*
* @brief Resolve an optional numeric leaf (power factor, reactive power).
* @note A valid external number wins; anything else keeps the baseline
*       value, including a baseline None.
*/
fn optional_number(ext: Option<&Value>, paths: &[&[&str]], baseline: Option<f64>) -> Option<f64> {
    finite_at(ext, paths).map(Some).unwrap_or(baseline)
}

fn finite_at(ext: Option<&Value>, paths: &[&[&str]]) -> Option<f64> {
    let ext = ext?;
    paths
        .iter()
        .filter_map(|path| lookup(ext, path))
        .filter_map(Value::as_f64)
        .find(|n| n.is_finite())
}

fn string(ext: Option<&Value>, path: &[&str], baseline: &str) -> String {
    ext.and_then(|v| lookup(v, path))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| baseline.to_string())
}

/*
* @brief Pass a free-form narrative block through verbatim.
*/
fn narrative(ext: Option<&Value>, key: &str) -> Option<Value> {
    ext.and_then(|v| v.get(key)).filter(|v| !v.is_null()).cloned()
}

fn phase_triple(ext: Option<&Value>, group: &[&str], baseline: PhaseTriple) -> PhaseTriple {
    let leaf = |key: &str, base: f64| {
        let path: Vec<&str> = group.iter().copied().chain([key]).collect();
        number(ext, &[path.as_slice()], base)
    };

    PhaseTriple {
        l1: leaf("L1", baseline.l1),
        l2: leaf("L2", baseline.l2),
        l3: leaf("L3", baseline.l3),
    }
}

fn line_triple(ext: Option<&Value>, group: &[&str], baseline: LineTriple) -> LineTriple {
    let leaf = |key: &str, base: f64| {
        let path: Vec<&str> = group.iter().copied().chain([key]).collect();
        number(ext, &[path.as_slice()], base)
    };

    LineTriple {
        l1_l2: leaf("L1_L2", baseline.l1_l2),
        l2_l3: leaf("L2_L3", baseline.l2_l3),
        l3_l1: leaf("L3_L1", baseline.l3_l1),
    }
}

/*
* @brief Merge the phase-angle block, probing known alternate nestings.
* @note External payloads have been seen nesting the angles under a bare
*       "phase_angles" key or spelling the pairs with "_to_" instead of
*       "_vs_"; each alternate is tried before falling back.
*/
fn merge_phase_angles(ext: Option<&Value>, baseline: &PhaseAngles) -> PhaseAngles {
    let leaf = |name: &str, base: f64| {
        let alt = name.replace("_vs_", "_to_");
        number(
            ext,
            &[
                &["phase_angles_degrees", name],
                &["phase_angles", name],
                &["phase_angles_degrees", alt.as_str()],
            ],
            base,
        )
    };

    PhaseAngles {
        voltage_l1_vs_l2: leaf("voltage_L1_vs_L2", baseline.voltage_l1_vs_l2),
        voltage_l2_vs_l3: leaf("voltage_L2_vs_L3", baseline.voltage_l2_vs_l3),
        voltage_l3_vs_l1: leaf("voltage_L3_vs_L1", baseline.voltage_l3_vs_l1),
        voltage_l1_vs_current_l1: leaf(
            "voltage_L1_vs_current_L1",
            baseline.voltage_l1_vs_current_l1,
        ),
        voltage_l2_vs_current_l2: leaf(
            "voltage_L2_vs_current_L2",
            baseline.voltage_l2_vs_current_l2,
        ),
        voltage_l3_vs_current_l3: leaf(
            "voltage_L3_vs_current_L3",
            baseline.voltage_l3_vs_current_l3,
        ),
    }
}

fn merge_power_analysis(ext: Option<&Value>, baseline: &PowerAnalysis) -> PowerAnalysis {
    let required = |group: &str, key: &str, base: f64| {
        number(ext, &[&["power_analysis", group, key]], base)
    };
    let optional = |group: &str, key: &str, base: Option<f64>| {
        optional_number(ext, &[&["power_analysis", group, key]], base)
    };

    PowerAnalysis {
        active_power_kw: PowerTriple {
            l1: required("active_power_kw", "L1", baseline.active_power_kw.l1),
            l2: required("active_power_kw", "L2", baseline.active_power_kw.l2),
            l3: required("active_power_kw", "L3", baseline.active_power_kw.l3),
            total: required("active_power_kw", "total", baseline.active_power_kw.total),
        },
        reactive_power_kvar: ReactiveTriple {
            l1: optional("reactive_power_kvar", "L1", baseline.reactive_power_kvar.l1),
            l2: optional("reactive_power_kvar", "L2", baseline.reactive_power_kvar.l2),
            l3: optional("reactive_power_kvar", "L3", baseline.reactive_power_kvar.l3),
            total: optional(
                "reactive_power_kvar",
                "total",
                baseline.reactive_power_kvar.total,
            ),
        },
        apparent_power_kva: PowerTriple {
            l1: required("apparent_power_kva", "L1", baseline.apparent_power_kva.l1),
            l2: required("apparent_power_kva", "L2", baseline.apparent_power_kva.l2),
            l3: required("apparent_power_kva", "L3", baseline.apparent_power_kva.l3),
            total: required("apparent_power_kva", "total", baseline.apparent_power_kva.total),
        },
        power_factor: PowerFactorSummary {
            l1: optional("power_factor", "L1", baseline.power_factor.l1),
            l2: optional("power_factor", "L2", baseline.power_factor.l2),
            l3: optional("power_factor", "L3", baseline.power_factor.l3),
            average: optional("power_factor", "average", baseline.power_factor.average),
        },
    }
}
