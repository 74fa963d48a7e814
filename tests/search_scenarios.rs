//! End-to-end search scenarios over scripted oracles.

use pretty_assertions::assert_eq;

use cogsplit::testkit::{flat_method, leaf, slot_span, ScriptedOracle};
use cogsplit::{
    search, EnumerationStrategy, ExhaustiveSearch, NoopObserver, OracleVerdict, RefactoringCache,
    SearchConfig, SearchObserver, Solution,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn search_extracts_the_high_complexity_statement() {
    init_logging();

    // Three statements with per-slot complexity [0, 5, 0]; the middle one
    // sits at nesting depth 4, so extracting it keeps one unit in the new
    // method. Only the single-statement span over it is legal.
    let model = flat_method(&[leaf(0, 0), leaf(5, 4), leaf(0, 0)]);
    let mut oracle = ScriptedOracle::new();
    oracle.allow(slot_span(2, 2), OracleVerdict::feasible(1, 3, 1));

    let config = SearchConfig {
        max_complexity: 3,
        ..SearchConfig::default()
    };
    let outcome = search(&model, &oracle, &config);

    let solution = outcome.solution;
    assert!(solution.is_feasible());
    assert_eq!(solution.sequence_count(), 1);
    assert_eq!(solution.sequences()[0].span(), slot_span(2, 2));
    assert_eq!(solution.reduced_complexity(), 4);

    // The cached entry reports the same net reduction the oracle scenario
    // promises.
    let row = outcome
        .cache
        .rows()
        .into_iter()
        .find(|row| row.span == slot_span(2, 2))
        .expect("the selected span is cached");
    assert!(row.metrics.feasible);
    assert_eq!(row.metrics.reduction_of_complexity, 4);
    assert_eq!(row.metrics.complexity_of_new_method, 1);
}

#[test]
fn both_strategies_settle_on_the_same_best_solution() {
    init_logging();

    // Two statements; only the single-statement spans are legal. Run to
    // completion, both strategies must pick the same best solution even
    // though they visit candidates in different orders.
    let model = flat_method(&[leaf(2, 1), leaf(2, 1)]);

    let best = |strategy: EnumerationStrategy| -> Solution {
        let mut oracle = ScriptedOracle::new();
        oracle.allow(slot_span(1, 1), OracleVerdict::feasible(0, 1, 1));
        oracle.allow(slot_span(2, 2), OracleVerdict::feasible(0, 1, 1));
        let config = SearchConfig {
            max_complexity: 1,
            strategy,
            ..SearchConfig::default()
        };
        search(&model, &oracle, &config).solution
    };

    let long = best(EnumerationStrategy::LongSequenceFirst);
    let short = best(EnumerationStrategy::ShortSequenceFirst);

    assert_eq!(long.fitness(), short.fitness());
    fn spans(solution: &Solution) -> Vec<cogsplit::Span> {
        solution.sequences().iter().map(|s| s.span()).collect()
    }
    assert_eq!(spans(&long), spans(&short));
    // Extracting both statements is the only way under the threshold.
    assert_eq!(long.sequence_count(), 2);
}

#[test]
fn no_enumerated_span_touches_an_empty_statement() {
    use cogsplit::StatementKind;

    let model = cogsplit::testkit::flat_method_with_kinds(
        &[leaf(1, 0), leaf(0, 0), leaf(1, 0)],
        &[
            StatementKind::Other,
            StatementKind::Empty,
            StatementKind::Other,
        ],
    );
    let oracle = ScriptedOracle::allowing_all();
    let outcome = search(&model, &oracle, &SearchConfig::default());

    let empty = slot_span(2, 2);
    for row in outcome.cache.rows() {
        assert_ne!(row.span.start, empty.start, "no span starts on the empty statement");
        assert_ne!(row.span.end, empty.end, "no span ends on the empty statement");
    }
}

#[test]
fn count_matches_unbounded_enumeration_across_groups() {
    use cogsplit::{ComplexityAnnotation, MethodModel, Span, StatementKind};

    // Three groups: the body (2 slots), the conditional's branch body as a
    // whole, and the branch block's own statements (2 slots).
    let annotated = |accumulated: u32| ComplexityAnnotation {
        accumulated,
        contribution: 0,
        ..Default::default()
    };
    let mut builder = MethodModel::builder(Span::new(0, 100), annotated(2));
    let root = builder.root();
    builder
        .add_node(root, StatementKind::Other, Span::new(0, 10), annotated(0))
        .unwrap();
    let conditional = builder
        .add_node(root, StatementKind::If, Span::new(10, 60), annotated(2))
        .unwrap();
    let body = builder
        .add_node(conditional, StatementKind::Block, Span::new(15, 55), annotated(2))
        .unwrap();
    builder
        .add_node(body, StatementKind::Other, Span::new(20, 30), annotated(1))
        .unwrap();
    builder
        .add_node(body, StatementKind::Other, Span::new(30, 40), annotated(1))
        .unwrap();
    let model = builder.build();

    let oracle = ScriptedOracle::allowing_all();
    let cache = RefactoringCache::new(&model, &oracle);
    let engine = ExhaustiveSearch::new(
        &model,
        &cache,
        EnumerationStrategy::LongSequenceFirst,
        15,
    );

    assert_eq!(engine.groups().len(), 3);
    // 5 selections for each two-slot group, 2 for the singleton group.
    assert_eq!(engine.count(), 50);

    struct Visits(u64);
    impl SearchObserver for Visits {
        fn candidate_evaluated(&mut self, _index: u64, _solution: &Solution) {
            self.0 += 1;
        }
    }
    let mut visits = Visits(0);
    engine.run(u64::MAX, &mut visits);
    assert_eq!(u128::from(visits.0), engine.count());
}

#[test]
fn budget_caps_are_exact_and_quality_is_monotone() {
    init_logging();

    let model = flat_method(&[leaf(3, 1), leaf(4, 1), leaf(2, 1)]);
    let oracle = ScriptedOracle::allowing_all();
    let cache = RefactoringCache::new(&model, &oracle);
    let engine = ExhaustiveSearch::new(
        &model,
        &cache,
        EnumerationStrategy::LongSequenceFirst,
        3,
    );
    let total = engine.count();

    struct Visits(u64);
    impl SearchObserver for Visits {
        fn candidate_evaluated(&mut self, _index: u64, _solution: &Solution) {
            self.0 += 1;
        }
    }

    let mut previous_best = f64::MAX;
    for budget in 1..=(total as u64 + 2) {
        let mut visits = Visits(0);
        let solution = engine.run(budget, &mut visits);
        assert_eq!(
            u128::from(visits.0),
            u128::from(budget).min(total),
            "the budget is an exact cap"
        );

        // A looser budget sees a superset of candidates, so the best
        // fitness can only improve or stay.
        assert!(solution.fitness() <= previous_best);
        previous_best = solution.fitness();
    }
}

#[test]
fn oracle_is_never_consulted_twice_for_a_span() {
    let model = flat_method(&[leaf(1, 0), leaf(1, 0), leaf(1, 0)]);
    let oracle = ScriptedOracle::allowing_all();
    let cache = RefactoringCache::new(&model, &oracle);
    let engine = ExhaustiveSearch::new(
        &model,
        &cache,
        EnumerationStrategy::LongSequenceFirst,
        15,
    );

    engine.run(u64::MAX, &mut NoopObserver);
    let after_run = oracle.total_invocations();
    // 6 contiguous spans exist over 3 slots.
    assert_eq!(after_run, 6);

    // A second full pass (count + run) hits only the cache.
    engine.count();
    engine.run(u64::MAX, &mut NoopObserver);
    assert_eq!(oracle.total_invocations(), after_run);
}
