use super::*;
use std::collections::BTreeSet;

use crate::config::{AcquisitionMode, MatchConfig};
use crate::features::Feature;
use crate::library::{FragmentColumn, Library, LibraryEntry};
use crate::matching::{match_library, MatchedCandidate};
use crate::spectrum::{Peak, Scan, ScanSet};

fn pc_library() -> Library {
    Library {
        name: "PC_H".to_string(),
        id_header: "ID".to_string(),
        precursor_header: "Precursor".to_string(),
        fragment_columns: vec![FragmentColumn {
            name: "PC head group".to_string(),
            library_column: 3,
        }],
        metadata_columns: vec![],
        entries: vec![LibraryEntry {
            id: "PC(34:1)+H".to_string(),
            precursor_mz: 760.5851,
            fragment_mz: vec![Some(184.0733)],
            metadata: vec![],
        }],
    }
}

fn scenario_config() -> MatchConfig {
    MatchConfig {
        intensity_cutoff: 1000.0,
        scan_cutoff: 1,
        ppm_window: 10.0,
        retention_time_window: 0.2,
        precursor_mass_accuracy: 0.01,
        ..Default::default()
    }
}

fn ms2_scan(scan_number: u64, rt: f64, precursor: Option<f64>, peaks: &[(f64, f64)]) -> Scan {
    Scan {
        scan_number,
        retention_time: rt,
        precursor_mz: precursor,
        peaks: peaks.iter().map(|&(mz, i)| Peak::new(mz, i)).collect(),
    }
}

fn candidates(library: &Library, config: &MatchConfig) -> Vec<MatchedCandidate> {
    let features = vec![Feature::new(760.5853, 5.00, "1")];
    match_library(library, &features, config).candidates().to_vec()
}

#[test]
fn test_end_to_end_confirmed() {
    let library = pc_library();
    let config = scenario_config();
    let candidates = candidates(&library, &config);
    assert_eq!(candidates.len(), 1);

    let scans = ScanSet::new(vec![ms2_scan(1, 5.00, Some(760.5850), &[(184.0735, 5000.0)])]);
    let evidence = confirm_candidates(&library, &candidates, &scans, AcquisitionMode::DdMs, &config);

    let fragment = evidence[0].fragments[0];
    assert!(fragment.confirmed);
    assert_eq!(fragment.max_intensity, 5000.0);
    assert_eq!(fragment.scan_count, 1);
    assert_eq!(fragment.rt_at_max_intensity, 5.00);
    assert!((fragment.average_mz - 184.0735).abs() < 1e-9);
}

#[test]
fn test_scan_outside_rt_window() {
    let library = pc_library();
    let config = scenario_config();
    let candidates = candidates(&library, &config);

    let scans = ScanSet::new(vec![ms2_scan(1, 5.30, Some(760.5850), &[(184.0735, 5000.0)])]);
    let evidence = confirm_candidates(&library, &candidates, &scans, AcquisitionMode::DdMs, &config);

    assert_eq!(evidence[0].fragments[0], FragmentEvidence::default());
}

#[test]
fn test_ddms_requires_precursor_selection() {
    let library = pc_library();
    let config = scenario_config();
    let candidates = candidates(&library, &config);

    // isolated a different precursor, and a scan with no precursor at all
    let scans = ScanSet::new(vec![
        ms2_scan(1, 5.00, Some(782.5670), &[(184.0735, 5000.0)]),
        ms2_scan(2, 5.01, None, &[(184.0735, 5000.0)]),
    ]);
    let ddms = confirm_candidates(&library, &candidates, &scans, AcquisitionMode::DdMs, &config);
    assert!(!ddms[0].fragments[0].confirmed);
    assert_eq!(ddms[0].fragments[0].scan_count, 0);

    // AIF ignores isolation entirely
    let aif_config = MatchConfig {
        min_aif_scans: 2,
        ..config
    };
    let aif = confirm_candidates(&library, &candidates, &scans, AcquisitionMode::Aif, &aif_config);
    assert!(aif[0].fragments[0].confirmed);
    assert_eq!(aif[0].fragments[0].scan_count, 2);
}

#[test]
fn test_multiple_peaks_per_scan_are_all_counted() {
    let config = scenario_config();
    let scans = [ms2_scan(
        1,
        5.0,
        None,
        &[(184.0731, 100.0), (184.0735, 3000.0), (190.0, 9000.0)],
    )];
    let evidence = fragment_evidence(scans.iter(), 184.0733, 1, &config);
    assert_eq!(evidence.scan_count, 1);
    assert_eq!(evidence.max_intensity, 3000.0);
    assert!((evidence.average_mz - 184.0733).abs() < 1e-9);
}

#[test]
fn test_ppm_boundary() {
    let config = MatchConfig {
        ppm_window: 10.0,
        intensity_cutoff: 0.0,
        ..Default::default()
    };
    let theoretical = 184.0733;

    let exact = [ms2_scan(1, 1.0, None, &[(theoretical, 10.0)])];
    assert!(fragment_evidence(exact.iter(), theoretical, 1, &config).confirmed);

    let outside = theoretical * (1.0 + 5.0e-6 + 1.0e-7);
    let beyond = [ms2_scan(1, 1.0, None, &[(outside, 10.0)])];
    let evidence = fragment_evidence(beyond.iter(), theoretical, 1, &config);
    assert!(!evidence.confirmed);
    assert_eq!(evidence.scan_count, 0);

    // ±5 ppm of 500 is ±0.0025, written as decimals
    let edges = [
        ms2_scan(1, 1.0, None, &[(500.0025, 10.0)]),
        ms2_scan(2, 1.1, None, &[(499.9975, 10.0)]),
    ];
    assert_eq!(fragment_evidence(edges.iter(), 500.0, 1, &config).scan_count, 2);
}

#[test]
fn test_selection_on_decimal_bound() {
    let library = pc_library();
    let config = MatchConfig {
        selection_accuracy: 0.2,
        ..scenario_config()
    };
    let candidates = candidates(&library, &config);

    // 760.5851 + 0.1
    let scans = ScanSet::new(vec![ms2_scan(1, 5.00, Some(760.6851), &[(184.0735, 5000.0)])]);
    let evidence = confirm_candidates(&library, &candidates, &scans, AcquisitionMode::DdMs, &config);
    assert_eq!(evidence[0].fragments[0].scan_count, 1);
}

#[test]
fn test_thresholds() {
    let config = MatchConfig {
        intensity_cutoff: 5000.0,
        ..scenario_config()
    };
    // intensity must exceed the cutoff, not merely reach it
    let scans = [ms2_scan(1, 5.0, None, &[(184.0733, 5000.0)])];
    assert!(!fragment_evidence(scans.iter(), 184.0733, 1, &config).confirmed);

    let scans = [
        ms2_scan(1, 5.0, None, &[(184.0733, 6000.0)]),
        ms2_scan(2, 5.1, None, &[(184.0733, 10.0)]),
    ];
    assert!(fragment_evidence(scans.iter(), 184.0733, 2, &config).confirmed);
    assert!(!fragment_evidence(scans.iter(), 184.0733, 3, &config).confirmed);
}

#[test]
fn test_missing_theoretical_fragment() {
    let mut library = pc_library();
    library.entries[0].fragment_mz = vec![None];
    let config = scenario_config();
    let candidates = candidates(&library, &config);
    let scans = ScanSet::new(vec![ms2_scan(1, 5.00, Some(760.5850), &[(184.0735, 5000.0)])]);

    let evidence = confirm_candidates(&library, &candidates, &scans, AcquisitionMode::DdMs, &config);
    assert_eq!(evidence[0].fragments, vec![FragmentEvidence::default()]);
}

fn set(columns: &[usize]) -> BTreeSet<usize> {
    columns.iter().copied().collect()
}

#[test]
fn test_rule_vacuous_groups() {
    let rule = ConfirmationRule::default();
    assert!(rule.is_empty());
    assert!(rule.is_satisfied(&[false, false]));
    assert!(rule.is_satisfied(&[]));
}

#[test]
fn test_rule_and_group() {
    let rule = ConfirmationRule::new(set(&[0]), BTreeSet::new());
    assert!(rule.is_satisfied(&[true, false]));
    assert!(!rule.is_satisfied(&[false, true]));

    // with a non-empty OR group the same row needs an OR hit as well
    let rule = ConfirmationRule::new(set(&[0]), set(&[1, 2]));
    assert!(!rule.is_satisfied(&[true, false, false]));
    assert!(rule.is_satisfied(&[true, false, true]));
}

#[test]
fn test_rule_or_group() {
    let rule = ConfirmationRule::new(BTreeSet::new(), set(&[1, 2]));
    assert!(rule.and_truth(&[false, false, false]));
    assert!(!rule.or_truth(&[true, false, false]));
    assert!(rule.is_satisfied(&[false, false, true]));
    assert_eq!(rule.columns(), set(&[1, 2]));
}

#[test]
fn test_rule_out_of_range_column_is_unconfirmed() {
    let rule = ConfirmationRule::new(set(&[5]), BTreeSet::new());
    assert!(!rule.is_satisfied(&[true]));
}

#[test]
fn test_select_rows() {
    let library = pc_library();
    let config = scenario_config();
    let candidates = candidates(&library, &config);
    let scans = ScanSet::new(vec![ms2_scan(1, 5.00, Some(760.5850), &[(184.0735, 5000.0)])]);
    let evidence = confirm_candidates(&library, &candidates, &scans, AcquisitionMode::DdMs, &config);

    let rule = ConfirmationRule::new(set(&[0]), BTreeSet::new());
    assert_eq!(rule.select(&evidence), vec![0]);

    let strict = MatchConfig {
        intensity_cutoff: 10_000.0,
        ..config
    };
    let weak = confirm_candidates(&library, &candidates, &scans, AcquisitionMode::DdMs, &strict);
    assert!(rule.select(&weak).is_empty());
}
