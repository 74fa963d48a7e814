//! CSV export of the refactoring cache and its round-trip.

use std::collections::HashMap;
use std::fs::File;

use cogsplit::testkit::{flat_method, leaf, slot_span, ScriptedOracle};
use cogsplit::{read_csv, search, ExtractionMetrics, OracleVerdict, SearchConfig, Span};

#[test]
fn cache_dump_round_trips_through_a_file() {
    let model = flat_method(&[leaf(2, 0), leaf(5, 1), leaf(1, 0)]);
    let mut oracle = ScriptedOracle::allowing_all();
    oracle.allow(
        slot_span(2, 2),
        OracleVerdict::feasible(2, 4, 1),
    );
    oracle.allow(
        slot_span(1, 3),
        OracleVerdict::infeasible("local \"sum\" is assigned, and used afterwards"),
    );
    let outcome = search(&model, &oracle, &SearchConfig::default());
    let exported = outcome.cache.rows();
    assert!(!exported.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("refactoring_cache.csv");
    let mut file = File::create(&path).unwrap();
    outcome.cache.write_csv(&mut file).unwrap();

    let reimported = read_csv(File::open(&path).unwrap()).unwrap();

    let as_map = |rows: &[cogsplit::CacheRow]| -> HashMap<Span, ExtractionMetrics> {
        rows.iter()
            .map(|row| (row.span, row.metrics.clone()))
            .collect()
    };
    assert_eq!(as_map(&exported), as_map(&reimported));
}

#[test]
fn unfeasible_reasons_survive_the_round_trip() {
    let model = flat_method(&[leaf(1, 0)]);
    let mut oracle = ScriptedOracle::new();
    oracle.fail_on(slot_span(1, 1));
    let outcome = search(&model, &oracle, &SearchConfig::default());

    let mut dump = Vec::new();
    outcome.cache.write_csv(&mut dump).unwrap();
    let rows = read_csv(dump.as_slice()).unwrap();

    assert_eq!(rows.len(), 1);
    assert!(!rows[0].metrics.feasible);
    assert!(rows[0].metrics.reason.contains("oracle failure"));
}
