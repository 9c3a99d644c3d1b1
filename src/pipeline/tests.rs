use super::*;
use std::collections::BTreeSet;

use crate::library::{FragmentColumn, LibraryEntry};
use crate::spectrum::{Peak, Scan};

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

fn aif_config() -> MatchConfig {
    MatchConfig {
        retention_time_window: 0.2,
        intensity_cutoff: 1000.0,
        min_aif_scans: 5,
        min_adjusted_r2: 0.6,
        ..Default::default()
    }
}

fn scan(scan_number: u64, rt: f64, mz: f64, intensity: f64) -> Scan {
    Scan {
        scan_number,
        retention_time: rt,
        precursor_mz: None,
        peaks: vec![Peak::new(mz, intensity)],
    }
}

/// Odd MS1 scans with rising precursor intensity
fn ms1_scans() -> ScanSet {
    (0..=6u64)
        .map(|k| scan(2 * k + 1, 4.95 + k as f64 * 0.01, 760.5851, 2000.0 * (k as f64 + 1.0)))
        .collect()
}

/// Even MS2 scans, each fragment intensity given by `fragment(k)`
fn ms2_scans(fragment: impl Fn(u64) -> f64) -> ScanSet {
    (0..6u64)
        .map(|k| scan(2 * k + 2, 4.955 + k as f64 * 0.01, 184.0733, fragment(k)))
        .collect()
}

fn and_rule() -> ConfirmationRule {
    ConfirmationRule::new(BTreeSet::from([0]), BTreeSet::new())
}

fn features() -> Vec<Feature> {
    vec![Feature::new(760.5853, 5.00, "1")]
}

#[test]
fn test_anti_correlated_fragment_is_dropped() {
    let library = pc_library();
    let rule = and_rule();
    let features = features();
    let ms1 = ms1_scans();
    // falls while the precursor rises
    let ms2 = ms2_scans(|k| 20000.0 - 2000.0 * k as f64);
    let config = aif_config();

    let pairing = Pairing {
        library: &library,
        rule: &rule,
        features: &features,
        ms2: &ms2,
        ms1: Some(&ms1),
        mode: AcquisitionMode::Aif,
    };
    let PairingOutcome::Evaluated { rows, confirmed } = run_pairing(&pairing, &config) else {
        panic!("expected evaluated outcome");
    };

    assert_eq!(rows.len(), 1);
    assert!(rows[0].fragments[0].confirmed);
    assert_eq!(rule.select(&rows), vec![0]);
    assert!(confirmed.is_empty());
}

#[test]
fn test_flat_fragment_is_dropped() {
    let library = pc_library();
    let rule = and_rule();
    let features = features();
    let ms1 = ms1_scans();
    let ms2 = ms2_scans(|_| 5000.0);
    let config = aif_config();

    let pairing = Pairing {
        library: &library,
        rule: &rule,
        features: &features,
        ms2: &ms2,
        ms1: Some(&ms1),
        mode: AcquisitionMode::Aif,
    };
    let outcome = run_pairing(&pairing, &config);
    assert_eq!(outcome.matched(), 1);
    assert_eq!(outcome.confirmed(), 0);
}

#[test]
fn test_co_eluting_fragment_is_kept_with_diagnostics() {
    let library = pc_library();
    let rule = and_rule();
    let features = features();
    let ms1 = ms1_scans();
    // twice the averaged neighbouring precursor intensity
    let ms2 = ms2_scans(|k| 2.0 * 2000.0 * (k as f64 + 1.5));
    let config = aif_config();

    let pairing = Pairing {
        library: &library,
        rule: &rule,
        features: &features,
        ms2: &ms2,
        ms1: Some(&ms1),
        mode: AcquisitionMode::Aif,
    };
    let PairingOutcome::Evaluated { confirmed, .. } = run_pairing(&pairing, &config) else {
        panic!("expected evaluated outcome");
    };

    assert_eq!(confirmed.len(), 1);
    let correlations = confirmed[0].correlations.as_ref().unwrap();
    let result = correlations[0].unwrap();
    assert_eq!(result.slope, Some(2.0));
    assert_eq!(result.adjusted_r_squared, Some(1.0));
    assert_eq!(result.couples, 6);
}

#[test]
fn test_aif_without_ms1_keeps_rule_confirmed_rows() {
    let library = pc_library();
    let rule = and_rule();
    let features = features();
    let ms2 = ms2_scans(|k| 20000.0 - 2000.0 * k as f64);
    let config = aif_config();

    let pairing = Pairing {
        library: &library,
        rule: &rule,
        features: &features,
        ms2: &ms2,
        ms1: None,
        mode: AcquisitionMode::Aif,
    };
    let PairingOutcome::Evaluated { rows, confirmed } = run_pairing(&pairing, &config) else {
        panic!("expected evaluated outcome");
    };

    assert_eq!(rows.len(), 1);
    assert_eq!(
        confirmed,
        vec![ConfirmedRow {
            row: 0,
            correlations: None,
        }]
    );
}

#[test]
fn test_no_matches_short_circuits() {
    let library = pc_library();
    let rule = and_rule();
    let features = vec![Feature::new(500.0, 5.0, "far")];
    let ms2 = ms2_scans(|_| 5000.0);

    let pairing = Pairing {
        library: &library,
        rule: &rule,
        features: &features,
        ms2: &ms2,
        ms1: None,
        mode: AcquisitionMode::DdMs,
    };
    assert_eq!(run_pairing(&pairing, &aif_config()), PairingOutcome::NoMatches);
}
