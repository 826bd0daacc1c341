//! Tests for the plan analyzer

use super::*;
use crate::analysis::result::{ProblematicOperation, Severity};
use crate::explain::parse_explain;
use indoc::indoc;
use pretty_assertions::assert_eq;

fn analyze_json(json: &str) -> AnalysisResult {
    let roots = parse_explain(json).expect("parse failed");
    PlanAnalyzer::new().analyze(&roots)
}

#[test]
fn test_seq_scan_with_analyze_data() {
    let result = analyze_json(indoc! {r#"
        [
            {
                "Plan": {
                    "Node Type": "Seq Scan",
                    "Relation Name": "users",
                    "Total Cost": 150.5,
                    "Plan Rows": 10000,
                    "Actual Total Time": 25.3,
                    "Actual Rows": 10000
                }
            }
        ]
    "#});

    assert_eq!(
        result,
        AnalysisResult {
            total_cost: 150.5,
            total_actual_time: Some(25.3),
            problematic_operations: vec![
                ProblematicOperation::new(
                    "Seq Scan",
                    150.5,
                    Severity::High,
                    "Sequential Scan on table users",
                    "Add an index on the fields used in the WHERE clause",
                )
                .with_actual_time(Some(25.3)),
            ],
            recommendations: vec!["Create an index for table users".to_string()],
            warnings: vec![],
        }
    );
}

#[test]
fn test_sort_without_analyze_data() {
    let result = analyze_json(r#"[{"Plan": {"Node Type": "Sort", "Total Cost": 10.0, "Plans": []}}]"#);

    assert_eq!(
        result,
        AnalysisResult {
            total_cost: 10.0,
            total_actual_time: None,
            problematic_operations: vec![ProblematicOperation::new(
                "Sort",
                10.0,
                Severity::Medium,
                "Sort operation",
                "Use indexes to pre-sort data",
            )],
            recommendations: vec![],
            warnings: vec![],
        }
    );
}

#[test]
fn test_total_cost_covers_whole_forest() {
    let roots = vec![
        PlanNode::new("Limit")
            .with_cost(0.0, 10.0)
            .with_child(
                PlanNode::new("Index Scan")
                    .with_cost(0.0, 4.0)
                    .with_child(PlanNode::new("Result").with_cost(0.0, 0.25)),
            ),
        PlanNode::new("Result").with_cost(0.0, 0.5),
    ];

    let result = PlanAnalyzer::new().analyze(&roots);

    assert_eq!(result.total_cost, 14.75);
    assert!(!result.has_problems());
}

#[test]
fn test_actual_time_sums_only_reporting_nodes() {
    let roots = vec![
        PlanNode::new("Limit")
            .with_actual_time(0.0, 1.5)
            .with_child(PlanNode::new("Index Scan"))
            .with_child(PlanNode::new("Index Scan").with_actual_time(0.1, 2.0)),
    ];

    let result = PlanAnalyzer::new().analyze(&roots);

    assert_eq!(result.total_actual_time, Some(3.5));
}

#[test]
fn test_no_analyze_data_leaves_time_absent() {
    let roots = vec![PlanNode::new("Hash").with_child(PlanNode::new("Seq Scan"))];

    let result = PlanAnalyzer::new().analyze(&roots);

    assert_eq!(result.total_actual_time, None);
}

#[test]
fn test_flags_follow_preorder() {
    // Nested Loop
    //   Sort
    //     Seq Scan (a)
    //   Hash Join
    //     Seq Scan (b)
    let root = PlanNode::new("Nested Loop")
        .with_cost(0.0, 100.0)
        .with_child(
            PlanNode::new("Sort")
                .with_cost(0.0, 50.0)
                .with_child(PlanNode::new("Seq Scan").with_relation("a").with_cost(0.0, 40.0)),
        )
        .with_child(
            PlanNode::new("Hash Join")
                .with_cost(0.0, 30.0)
                .with_child(PlanNode::new("Seq Scan").with_relation("b").with_cost(0.0, 20.0)),
        );

    let result = PlanAnalyzer::new().analyze(&[root]);

    let flagged: Vec<_> = result
        .problematic_operations
        .iter()
        .map(|op| op.description.as_str())
        .collect();
    assert_eq!(
        flagged,
        vec![
            "Join operation Nested Loop",
            "Sort operation",
            "Sequential Scan on table a",
            "Join operation Hash Join",
            "Sequential Scan on table b",
        ]
    );
    assert_eq!(
        result.recommendations,
        vec!["Create an index for table a", "Create an index for table b"]
    );
}

#[test]
fn test_roots_are_visited_in_order() {
    let roots = vec![
        PlanNode::new("Sort").with_cost(0.0, 3.0),
        PlanNode::new("Seq Scan").with_relation("t").with_cost(0.0, 3.0),
    ];

    let result = PlanAnalyzer::new().analyze(&roots);

    let types: Vec<_> = result
        .problematic_operations
        .iter()
        .map(|op| op.node_type.as_str())
        .collect();
    assert_eq!(types, vec!["Sort", "Seq Scan"]);
}

#[test]
fn test_cheap_nodes_are_not_flagged() {
    let roots = vec![
        PlanNode::new("Seq Scan").with_cost(0.0, 1.0),
        PlanNode::new("Sort").with_cost(0.0, 0.5),
        PlanNode::new("Hash Join").with_cost(0.0, 2.0),
    ];

    let result = PlanAnalyzer::new().analyze(&roots);

    assert!(result.problematic_operations.is_empty());
    assert!(result.recommendations.is_empty());
}

#[test]
fn test_unlisted_node_types_are_never_flagged() {
    let roots = vec![
        PlanNode::new("Merge Join").with_cost(0.0, 1e6),
        PlanNode::new("Aggregate").with_cost(0.0, 1e6),
        PlanNode::new("seq scan").with_cost(0.0, 1e6),
    ];

    let result = PlanAnalyzer::new().analyze(&roots);

    assert!(result.problematic_operations.is_empty());
    assert_eq!(result.total_cost, 3e6);
}

#[test]
fn test_row_estimate_warning_any_node_type() {
    for node_type in ["Index Scan", "Seq Scan", "Aggregate"] {
        let node = PlanNode::new(node_type)
            .with_cost(0.0, 0.1)
            .with_rows(5000)
            .with_actual_rows(100);

        let result = PlanAnalyzer::new().analyze(&[node]);

        assert_eq!(
            result.warnings,
            vec!["Poor row estimate: planned 5000 rows, actual 100"]
        );
    }
}

#[test]
fn test_row_estimate_warning_alongside_flag() {
    let node = PlanNode::new("Seq Scan")
        .with_relation("events")
        .with_cost(0.0, 900.0)
        .with_rows(50_000)
        .with_actual_rows(12);

    let result = PlanAnalyzer::new().analyze(&[node]);

    assert_eq!(result.problematic_operations.len(), 1);
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_row_estimate_boundaries() {
    let analyzer = PlanAnalyzer::new();
    let warns = |planned: u64, actual: Option<u64>| {
        let mut node = PlanNode::new("Index Scan").with_rows(planned);
        node.actual_rows = actual;
        !analyzer.analyze(&[node]).warnings.is_empty()
    };

    // planned must exceed 1000
    assert!(!warns(1000, Some(0)));
    assert!(warns(1001, Some(0)));
    // actual must be below planned / 10 (integer division: 1001 / 10 = 100)
    assert!(!warns(1001, Some(100)));
    assert!(warns(1001, Some(99)));
    // no ANALYZE data, no warning
    assert!(!warns(1_000_000, None));
    // underestimates are not reported
    assert!(!warns(2000, Some(1_000_000)));
}

#[test]
fn test_identical_warnings_are_reported_once() {
    let node = || PlanNode::new("Index Scan").with_rows(5000).with_actual_rows(100);
    let root = PlanNode::new("Append").with_child(node()).with_child(node());

    let result = PlanAnalyzer::new().analyze(&[root]);

    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_same_table_recommended_once() {
    let scan = || PlanNode::new("Seq Scan").with_relation("users").with_cost(0.0, 10.0);
    let root = PlanNode::new("Append").with_child(scan()).with_child(scan());

    let result = PlanAnalyzer::new().analyze(&[root]);

    assert_eq!(result.problematic_operations.len(), 2);
    assert_eq!(result.recommendations, vec!["Create an index for table users"]);
}

#[test]
fn test_seq_scan_without_relation_name() {
    let result = PlanAnalyzer::new().analyze(&[PlanNode::new("Seq Scan").with_cost(0.0, 5.0)]);

    assert_eq!(
        result.problematic_operations[0].description,
        "Sequential Scan on table "
    );
    assert_eq!(result.recommendations, vec!["Create an index for table "]);
}

#[test]
fn test_custom_config() {
    let config = AnalyzerConfig::default()
        .with_seq_scan_cost_threshold(1_000.0)
        .with_row_estimate_min_rows(10)
        .with_row_estimate_ratio(2);
    let analyzer = PlanAnalyzer::with_config(config.clone());

    let node = PlanNode::new("Seq Scan")
        .with_relation("small")
        .with_cost(0.0, 150.0)
        .with_rows(100)
        .with_actual_rows(40);

    let result = analyzer.analyze(&[node]);

    assert_eq!(analyzer.config(), &config);
    assert!(result.problematic_operations.is_empty());
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_zero_ratio_does_not_panic() {
    let mut config = AnalyzerConfig::default();
    config.row_estimate_ratio = 0;
    let analyzer = PlanAnalyzer::with_config(config);

    let node = PlanNode::new("Seq Scan").with_rows(5000).with_actual_rows(10);

    assert_eq!(analyzer.analyze(&[node]).warnings.len(), 1);
}

#[test]
fn test_empty_forest() {
    let result = PlanAnalyzer::default().analyze(&[]);

    assert_eq!(result, AnalysisResult::default());
    assert_eq!(PlanAnalyzer::default().rules(), &RuleSet::default());
}
