use std::ops::ControlFlow;

use semfrag_common::{Config, Edge, SCENARIO_CASES, WordDistribution};

use crate::{
    CandidateSelector, Corpus, FragmentMatchService, FragmentOutcome, SearchBudget,
    SubgraphMatcher,
};

#[test]
fn test_scenario_selector_and_matcher() {
    for case in SCENARIO_CASES.iter() {
        let index = case.label_index();
        let requirement = WordDistribution::of(&case.fragment, &index)
            .unwrap_or_else(|e| panic!("bad fragment in {}: {e}", case.name));
        let selector = CandidateSelector::new(&case.host, &requirement, &index).unwrap();
        let matcher = SubgraphMatcher::new(&case.fragment, &index).unwrap();
        let budget = SearchBudget::unlimited();

        let mut found = 0;
        selector
            .for_each_connected(&budget, |_, retained| {
                let edges: Vec<&Edge> =
                    retained.iter().map(|&i| &case.host.edges()[i]).collect();
                if matcher.is_exact_match(&case.host, &edges, &budget)? {
                    found += 1;
                }
                Ok(ControlFlow::Continue(()))
            })
            .unwrap();

        assert_eq!(
            found, case.expected_matches,
            "Test '{}' failed: expected {} matches, found {}",
            case.name, case.expected_matches, found
        );
    }
}

#[test]
fn test_scenario_service() {
    for case in SCENARIO_CASES.iter() {
        let mut builder = Corpus::builder();
        builder.add_sentence(case.name, case.host.clone());
        let corpus = builder.build();

        let service = FragmentMatchService::new(&corpus, Config::default());
        let report = service.query(case.name, &case.fragment).unwrap();
        let FragmentOutcome::Matched(_) = &report.outcome else {
            panic!("Test '{}' did not complete: {:?}", case.name, report.outcome);
        };
        assert_eq!(
            report.outcome.edge_set_count(),
            case.expected_matches,
            "Test '{}' failed",
            case.name
        );
    }
}
