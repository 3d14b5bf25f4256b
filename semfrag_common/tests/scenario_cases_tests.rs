use std::collections::HashSet;

use rstest::rstest;
use semfrag_common::{SCENARIO_CASES, WordDistribution, scenario};

#[test]
fn scenario_names_are_unique() {
    let names: HashSet<_> = SCENARIO_CASES.iter().map(|c| c.name).collect();
    assert_eq!(names.len(), SCENARIO_CASES.len());
}

#[rstest]
#[case("identical_two_edges")]
#[case("fragment_has_extra_edge")]
#[case("repeated_label_picks_attached_node")]
#[case("symmetric_modifiers_match_twice")]
fn scenario_labels_are_all_indexed(#[case] name: &str) {
    let case = scenario(name).expect("scenario exists");
    let index = case.label_index();

    assert!(WordDistribution::of(&case.host, &index).is_ok());
    assert!(WordDistribution::of(&case.fragment, &index).is_ok());
}

#[test]
fn unknown_scenario_is_none() {
    assert!(scenario("no_such_case").is_none());
}
