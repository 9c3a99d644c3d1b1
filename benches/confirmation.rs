use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lipidflow::config::{AcquisitionMode, MatchConfig};
use lipidflow::confirmation::confirm_candidates;
use lipidflow::features::Feature;
use lipidflow::library::{FragmentColumn, Library, LibraryEntry};
use lipidflow::matching::match_library;
use lipidflow::spectrum::{Peak, Scan, ScanSet};

/// Library of `entries` species with two fragments each
fn create_library(entries: usize) -> Library {
    Library {
        name: "bench".to_string(),
        id_header: "ID".to_string(),
        precursor_header: "Precursor".to_string(),
        fragment_columns: vec![
            FragmentColumn {
                name: "HG".to_string(),
                library_column: 3,
            },
            FragmentColumn {
                name: "NL".to_string(),
                library_column: 4,
            },
        ],
        metadata_columns: vec![],
        entries: (0..entries)
            .map(|i| {
                let precursor = 500.0 + i as f64 * 0.5;
                LibraryEntry {
                    id: format!("L{i}"),
                    precursor_mz: precursor,
                    fragment_mz: vec![Some(184.0733), Some(precursor - 183.066)],
                    metadata: vec![],
                }
            })
            .collect(),
    }
}

/// One feature per library entry, spread over a 20-minute gradient
fn create_features(count: usize) -> Vec<Feature> {
    (0..count)
        .map(|i| Feature::new(500.0 + i as f64 * 0.5 + 0.001, (i % 200) as f64 * 0.1, i.to_string()))
        .collect()
}

/// ddMS scans every 0.01 min with `peaks_per_scan` peaks
fn create_scans(num_scans: usize, peaks_per_scan: usize) -> ScanSet {
    (0..num_scans)
        .map(|i| {
            let precursor = 500.0 + (i % 1000) as f64 * 0.5;
            let mut peaks: Vec<Peak> = (0..peaks_per_scan)
                .map(|j| Peak::new(100.0 + j as f64 * 7.3, 500.0 + j as f64 * 20.0))
                .collect();
            peaks.push(Peak::new(184.0734, 5000.0));
            Scan {
                scan_number: i as u64,
                retention_time: i as f64 * 0.01,
                precursor_mz: Some(precursor),
                peaks,
            }
        })
        .collect()
}

fn bench_confirmation(c: &mut Criterion) {
    let mut group = c.benchmark_group("confirm_candidates");
    let config = MatchConfig::default();
    let scans = create_scans(2000, 100);

    for entries in [100, 500, 1000] {
        let library = create_library(entries);
        let features = create_features(entries);
        let candidates = match_library(&library, &features, &config);

        group.throughput(Throughput::Elements(candidates.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}entries", entries)),
            &candidates,
            |b, candidates| {
                b.iter(|| {
                    let rows = confirm_candidates(
                        &library,
                        candidates.candidates(),
                        &scans,
                        AcquisitionMode::DdMs,
                        &config,
                    );
                    black_box(rows.len())
                })
            },
        );
    }

    group.finish();
}

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_library");
    let config = MatchConfig::default();

    for entries in [1000, 10_000] {
        let library = create_library(entries);
        let features = create_features(entries);

        group.throughput(Throughput::Elements(entries as u64));
        group.bench_function(BenchmarkId::from_parameter(entries), |b| {
            b.iter(|| black_box(match_library(&library, &features, &config).len()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_confirmation, bench_matching);
criterion_main!(benches);
