//! Decoding simulator output into host results.
//!
//! The engine prints a single JSON document:
//!
//! ```text
//! { "counts": { "<basis state>": n, .. },
//!   "snapshots": { "<index>": { "statevector": ["<re>+<im>i", ..],
//!                               "probabilities": [p, ..],
//!                               "probabilities_ket": { "<ket>": p, .. } } } }
//! ```
//!
//! Basis-state keys index qubits from the left, and arrays are enumerated with
//! qubit 0 as the most significant bit. Both are corrected here.

use std::collections::BTreeMap;

use num_complex::Complex64;
use qjku_hal::Counts;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bits::{bit_reversal_table, clbit_string, group_bits, reorder};
use crate::config::OutputField;
use crate::error::{JkuError, JkuResult};
use crate::measurement::MeasurementPlan;

/// The engine's document, as printed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineOutput {
    #[serde(default)]
    pub counts: Option<FxHashMap<String, u64>>,
    #[serde(default)]
    pub snapshots: Option<BTreeMap<String, RawSnapshot>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub statevector: Option<Vec<String>>,
    #[serde(default)]
    pub probabilities: Option<Vec<f64>>,
    #[serde(default)]
    pub probabilities_ket: Option<BTreeMap<String, f64>>,
}

/// One decoded snapshot, in host bit order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statevector: Option<Vec<Complex64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities_ket: Option<BTreeMap<String, f64>>,
}

/// Result of decoding one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecodedResult {
    /// Register-grouped classical strings and their counts.
    pub counts: Counts,
    /// Final statevector, taken from the trailing snapshot.
    pub statevector: Vec<Complex64>,
    /// Final probabilities, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<f64>>,
    /// Final probabilities by ket, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities_ket: Option<BTreeMap<String, f64>>,
    /// Every snapshot in the output keyed by index, the trailing one included.
    pub snapshots: BTreeMap<String, SnapshotData>,
}

/// Parse the engine's document.
///
/// Text before the first `{` and after the last `}` is ignored. Older engine
/// builds print single-quoted keys; those are accepted too.
pub fn parse_output(raw: &str) -> JkuResult<EngineOutput> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(JkuError::MalformedOutput(
            "no JSON document in simulator output".into(),
        ));
    };
    if end < start {
        return Err(JkuError::MalformedOutput(
            "no JSON document in simulator output".into(),
        ));
    }
    let document = &raw[start..=end];

    match serde_json::from_str(document) {
        Ok(output) => Ok(output),
        Err(strict) if document.contains('\'') => {
            debug!("Strict parse failed ({}), retrying with normalised quotes", strict);
            serde_json::from_str(&document.replace('\'', "\""))
                .map_err(|e| JkuError::MalformedOutput(e.to_string()))
        }
        Err(e) => Err(JkuError::MalformedOutput(e.to_string())),
    }
}

/// Parse an amplitude printed as `<re><sign><im>i`.
pub fn parse_amplitude(token: &str) -> JkuResult<Complex64> {
    let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .replace('j', "i")
        .parse::<Complex64>()
        .map_err(|_| JkuError::MalformedOutput(format!("invalid amplitude '{token}'")))
}

/// Decode raw engine output for one circuit.
pub fn decode(
    raw: &str,
    plan: &MeasurementPlan,
    max_snapshot_index: u64,
    fields: &[OutputField],
) -> JkuResult<DecodedResult> {
    let output = parse_output(raw)?;
    // Built on first use, once an array of the right length has been seen.
    let mut table = None;

    let counts = match &output.counts {
        Some(raw_counts) => convert_counts(raw_counts, plan)?,
        None => Counts::new(),
    };

    let mut snapshots = BTreeMap::new();
    for (key, raw_snapshot) in output.snapshots.unwrap_or_default() {
        let snapshot = convert_snapshot(&key, raw_snapshot, plan.num_qubits, &mut table, fields)?;
        snapshots.insert(key, snapshot);
    }

    let final_key = max_snapshot_index.to_string();
    let Some(last) = snapshots.get(&final_key) else {
        return Err(JkuError::MalformedOutput(format!(
            "final snapshot {final_key} missing from simulator output"
        )));
    };
    let Some(statevector) = last.statevector.clone() else {
        return Err(JkuError::MalformedOutput(format!(
            "final snapshot {final_key} has no statevector"
        )));
    };

    Ok(DecodedResult {
        counts,
        statevector,
        probabilities: last.probabilities.clone(),
        probabilities_ket: last.probabilities_ket.clone(),
        snapshots,
    })
}

/// Map engine basis-state counts onto register-grouped classical strings.
///
/// Keys that collapse onto the same classical string are summed. With no
/// classical bits there is nothing to report and the map stays empty.
pub fn convert_counts(raw: &FxHashMap<String, u64>, plan: &MeasurementPlan) -> JkuResult<Counts> {
    let min_len = plan.max_measured_qubit().map_or(0, |q| q.index() + 1);
    let sizes = plan.layout.sizes();
    let mut counts = Counts::new();

    for (key, &count) in raw {
        let bits = key.as_bytes();
        if bits.len() < min_len || !bits.iter().all(|b| matches!(b, b'0' | b'1')) {
            return Err(JkuError::MalformedOutput(format!(
                "count key '{key}' is not a bit string over {min_len} qubit(s)"
            )));
        }
        match clbit_string(bits, &plan.mapping, plan.num_clbits) {
            Some(flat) => counts.insert(group_bits(&flat, &sizes), count),
            None => {
                warn!("Dropping {} shot(s) for '{}': circuit has no classical bits", count, key);
            }
        }
    }

    Ok(counts)
}

fn convert_snapshot(
    key: &str,
    raw: RawSnapshot,
    num_qubits: usize,
    table: &mut Option<Vec<usize>>,
    fields: &[OutputField],
) -> JkuResult<SnapshotData> {
    // `None` when 2^num_qubits does not fit in a usize; no array can match.
    let expected = u32::try_from(num_qubits)
        .ok()
        .and_then(|n| 1usize.checked_shl(n));
    let check_len = |what: &str, len: usize| {
        if Some(len) == expected {
            Ok(())
        } else {
            Err(JkuError::MalformedOutput(format!(
                "snapshot {key} {what} has {len} entries, expected 2^{num_qubits}"
            )))
        }
    };

    let statevector = match raw.statevector {
        Some(tokens) => {
            check_len("statevector", tokens.len())?;
            let amplitudes = tokens
                .iter()
                .map(|t| parse_amplitude(t))
                .collect::<JkuResult<Vec<_>>>()?;
            let table = table.get_or_insert_with(|| bit_reversal_table(num_qubits));
            Some(reorder(&amplitudes, table))
        }
        None => None,
    };

    let probabilities = match raw.probabilities {
        Some(values) if fields.contains(&OutputField::Probabilities) => {
            check_len("probabilities", values.len())?;
            let table = table.get_or_insert_with(|| bit_reversal_table(num_qubits));
            Some(reorder(&values, table))
        }
        _ => None,
    };

    let probabilities_ket = match raw.probabilities_ket {
        Some(kets) if fields.contains(&OutputField::ProbabilitiesKet) => Some(
            kets.into_iter()
                .map(|(ket, p)| (ket.chars().rev().collect::<String>(), p))
                .collect(),
        ),
        _ => None,
    };

    Ok(SnapshotData {
        statevector,
        probabilities,
        probabilities_ket,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::MeasurementMap;
    use qjku_ir::{ClassicalRegister, ClbitId, QubitId, RegisterLayout};

    fn plan(num_qubits: usize, measured: &[(u32, u32)], registers: &[(&str, usize)]) -> MeasurementPlan {
        let layout = RegisterLayout::from_registers(
            registers.iter().map(|(n, s)| ClassicalRegister::new(*n, *s)),
        );
        let mapping: MeasurementMap = measured
            .iter()
            .map(|&(q, c)| (QubitId(q), ClbitId(c)))
            .collect();
        MeasurementPlan {
            mapping,
            num_qubits,
            num_clbits: layout.total_bits(),
            layout,
        }
    }

    const BELL_OUTPUT: &str = r#"{
        "counts": {"00": 500, "11": 500},
        "snapshots": {
            "0": {
                "statevector": ["0.707107+0i", "0+0i", "0+0i", "0.707107+0i"],
                "probabilities": [0.5, 0.0, 0.0, 0.5],
                "probabilities_ket": {"00": 0.5, "11": 0.5}
            }
        }
    }"#;

    #[test]
    fn test_parse_amplitude() {
        assert_eq!(parse_amplitude("0.5+0.25i").unwrap(), Complex64::new(0.5, 0.25));
        assert_eq!(parse_amplitude("-0-1i").unwrap(), Complex64::new(0.0, -1.0));
        assert_eq!(parse_amplitude("1e-05-2j").unwrap(), Complex64::new(1e-05, -2.0));
        assert_eq!(parse_amplitude(" 1 + 0i ").unwrap(), Complex64::new(1.0, 0.0));
        assert!(matches!(parse_amplitude("nope"), Err(JkuError::MalformedOutput(_))));
    }

    #[test]
    fn test_decode_bell() {
        let plan = plan(2, &[(0, 0), (1, 1)], &[("c", 2)]);
        let result = decode(BELL_OUTPUT, &plan, 0, &[]).unwrap();

        assert_eq!(result.counts.get("00"), 500);
        assert_eq!(result.counts.get("11"), 500);
        assert_eq!(result.counts.len(), 2);
        assert_eq!(result.statevector.len(), 4);
        assert!((result.statevector[0].norm() - result.statevector[3].norm()).abs() < 1e-12);
        assert_eq!(result.statevector[1].norm(), 0.0);
        assert_eq!(result.statevector[2].norm(), 0.0);
        assert_eq!(result.probabilities, None);
        assert_eq!(result.probabilities_ket, None);
    }

    #[test]
    fn test_requested_probabilities_kept() {
        let plan = plan(2, &[(0, 0), (1, 1)], &[("c", 2)]);
        let fields = [OutputField::Probabilities, OutputField::ProbabilitiesKet];
        let result = decode(BELL_OUTPUT, &plan, 0, &fields).unwrap();

        assert_eq!(result.probabilities, Some(vec![0.5, 0.0, 0.0, 0.5]));
        let kets = result.probabilities_ket.unwrap();
        assert_eq!(kets.get("11"), Some(&0.5));
    }

    #[test]
    fn test_statevector_bit_order_corrected() {
        // Engine index 1 is |q0=0, q1=1>, host index 2.
        let raw = r#"{"snapshots": {"0": {"statevector": ["0+0i", "1+0i", "0+0i", "0+0i"]}}}"#;
        let plan = plan(2, &[], &[]);
        let result = decode(raw, &plan, 0, &[]).unwrap();
        assert_eq!(result.statevector[2], Complex64::new(1.0, 0.0));
        assert_eq!(result.statevector[1], Complex64::new(0.0, 0.0));
        assert!(result.counts.is_empty());
    }

    #[test]
    fn test_probabilities_ket_keys_reversed() {
        let raw = r#"{"snapshots": {"0": {
            "statevector": ["0+0i", "0+0i", "1+0i", "0+0i"],
            "probabilities_ket": {"10": 1.0}
        }}}"#;
        let plan = plan(2, &[], &[]);
        let result = decode(raw, &plan, 0, &[OutputField::ProbabilitiesKet]).unwrap();
        let kets = result.probabilities_ket.unwrap();
        assert_eq!(kets.get("01"), Some(&1.0));
        assert_eq!(kets.get("10"), None);
    }

    #[test]
    fn test_multi_register_counts() {
        // c0 and c1 of two bits each, X on qubits 1 and 2.
        let raw = r#"{"counts": {"0110": 1024},
            "snapshots": {"0": {"statevector": [
                "0+0i","0+0i","0+0i","0+0i","0+0i","0+0i","1+0i","0+0i",
                "0+0i","0+0i","0+0i","0+0i","0+0i","0+0i","0+0i","0+0i"]}}}"#;
        let plan = plan(4, &[(0, 0), (1, 1), (2, 2), (3, 3)], &[("c0", 2), ("c1", 2)]);
        let result = decode(raw, &plan, 0, &[]).unwrap();
        assert_eq!(result.counts.get("01 10"), 1024);
        assert_eq!(result.statevector[6], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_counts_collapse_and_sum() {
        // Only qubit 0 is measured, so the second character never matters.
        let raw = r#"{"counts": {"00": 3, "01": 4, "10": 5, "11": 6},
            "snapshots": {"1": {"statevector": ["1+0i","0+0i","0+0i","0+0i"]}}}"#;
        let plan = plan(2, &[(0, 0)], &[("c", 1)]);
        let result = decode(raw, &plan, 1, &[]).unwrap();
        assert_eq!(result.counts.get("0"), 7);
        assert_eq!(result.counts.get("1"), 11);
        assert_eq!(result.counts.total_shots(), 18);
    }

    #[test]
    fn test_single_quoted_output_accepted() {
        let raw = "Simulation finished\n{'counts': {'1': 8}, 'snapshots': {'0': {'statevector': ['0+0i', '1+0i']}}}\n";
        let plan = plan(1, &[(0, 0)], &[("c", 1)]);
        let result = decode(raw, &plan, 0, &[]).unwrap();
        assert_eq!(result.counts.get("1"), 8);
        assert_eq!(result.statevector[1], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_all_snapshots_decoded() {
        let raw = r#"{"snapshots": {
            "4": {"statevector": ["1+0i", "0+0i"]},
            "5": {"statevector": ["0+0i", "1+0i"]}
        }}"#;
        let plan = plan(1, &[], &[]);
        let result = decode(raw, &plan, 5, &[]).unwrap();
        assert_eq!(result.snapshots.len(), 2);
        assert_eq!(
            result.snapshots["4"].statevector.as_deref(),
            Some(&[Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)][..])
        );
        assert_eq!(result.statevector[1], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_malformed_outputs() {
        let plan1 = plan(1, &[(0, 0)], &[("c", 1)]);

        assert!(matches!(decode("segfault", &plan1, 0, &[]), Err(JkuError::MalformedOutput(_))));
        assert!(matches!(decode("{not json}", &plan1, 0, &[]), Err(JkuError::MalformedOutput(_))));

        // Final snapshot missing.
        let raw = r#"{"snapshots": {"0": {"statevector": ["1+0i", "0+0i"]}}}"#;
        assert!(matches!(decode(raw, &plan1, 1, &[]), Err(JkuError::MalformedOutput(_))));

        // Wrong statevector length.
        let raw = r#"{"snapshots": {"0": {"statevector": ["1+0i"]}}}"#;
        assert!(matches!(decode(raw, &plan1, 0, &[]), Err(JkuError::MalformedOutput(_))));

        // Count key too short for the measured qubit.
        let plan2 = plan(2, &[(1, 0)], &[("c", 1)]);
        let raw = r#"{"counts": {"1": 2}, "snapshots": {"0": {"statevector": ["1+0i","0+0i","0+0i","0+0i"]}}}"#;
        assert!(matches!(decode(raw, &plan2, 0, &[]), Err(JkuError::MalformedOutput(_))));
    }

    #[test]
    fn test_wide_register_without_matching_snapshot() {
        // 2^64 amplitudes can never be printed, so nothing here is decodable.
        let wide = plan(64, &[], &[]);
        assert!(matches!(decode("{}", &wide, 0, &[]), Err(JkuError::MalformedOutput(_))));

        let raw = r#"{"snapshots": {"0": {"statevector": ["1+0i"], "probabilities": [1.0]}}}"#;
        assert!(matches!(
            decode(raw, &wide, 0, &[OutputField::Probabilities]),
            Err(JkuError::MalformedOutput(msg)) if msg.contains("2^64")
        ));

        let wider = plan(200, &[], &[]);
        assert!(matches!(decode(raw, &wider, 0, &[]), Err(JkuError::MalformedOutput(_))));
    }
}
