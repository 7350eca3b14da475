//! Leave-one-group-out validation end to end.

use graph_energy::{leave_one_group_out, DescentConfig, EnergyConfig, GraphEnergyClassifier};
use ndarray::array;

#[test]
fn separated_clusters_validate_without_error() {
    let x = array![[0.0], [0.05], [0.1], [0.15], [5.0], [5.05], [5.1], [5.15]];
    let y = array![-1i8, -1, -1, -1, 1, 1, 1, 1];
    let groups = [0, 1, 2, 3, 0, 1, 2, 3];

    let mut clf = GraphEnergyClassifier::new(EnergyConfig::default()).unwrap();
    let report = leave_one_group_out(
        &mut clf,
        x.view(),
        y.view(),
        &groups,
        &DescentConfig::default(),
        None,
    )
    .unwrap();

    assert_eq!(report.groups.len(), 4);
    assert_eq!(report.evaluated, 8);
    assert_eq!(report.errors, 0);
    assert_eq!(report.error_rate(), Some(0.0));
    for outcome in &report.groups {
        assert_eq!(outcome.size, 2);
        assert_eq!(outcome.truth, vec![-1, 1]);
        assert!(outcome.scores[0] < 0.0 && outcome.scores[1] > 0.0);
        assert_eq!(outcome.training_error, Some(0.0));
    }

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["errors"], 0);
    assert_eq!(json["groups"][0]["group"], "0");
}
