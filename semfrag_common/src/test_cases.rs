//! Common matching scenarios shared by the workspace tests.
//!
//! Each case pairs a host sentence graph with a fragment graph and the number
//! of matched edge-sets the matcher is expected to report.

use crate::graph::Graph;
use crate::label_index::LabelIndex;

/// A single host/fragment scenario.
#[derive(Debug, Clone)]
pub struct ScenarioCase {
    /// The name of the case.
    pub name: &'static str,
    /// The sentence searched in.
    pub host: Graph,
    /// The fragment searched for.
    pub fragment: Graph,
    /// The expected number of matched edge-sets.
    pub expected_matches: usize,
}

impl ScenarioCase {
    /// A label index covering every label of the host and the fragment.
    pub fn label_index(&self) -> LabelIndex {
        let mut index = LabelIndex::new();
        for node in self.host.nodes().iter().chain(self.fragment.nodes()) {
            index.add(node.label());
        }
        index
    }
}

fn graph(nodes: &[&str], edges: &[(&str, u32, u32)]) -> Graph {
    Graph::from_triples(nodes, edges).expect("scenario graphs are well formed")
}

// #####################
// HOSTS
// #####################
lazy_static::lazy_static! {
    static ref JOHN_EATS_APPLE: Graph = graph(
        &["john", "eat", "apple", "red"],
        &[("nsubj", 1, 0), ("dobj", 1, 2)],
    );
    static ref DOG_BIT_CAT: Graph = graph(
        &["the", "dog", "bit", "the", "cat"],
        &[("det", 1, 0), ("ncsubj", 2, 1), ("dobj", 2, 4), ("det", 4, 3)],
    );
    static ref BIG_BIG_DOG: Graph = graph(
        &["big", "big", "dog"],
        &[("amod", 2, 0), ("amod", 2, 1)],
    );
    static ref TRIANGLE: Graph = graph(
        &["a", "b", "c"],
        &[("r", 0, 1), ("r", 1, 2), ("r", 0, 2)],
    );
}

// #####################
// CASES
// #####################
lazy_static::lazy_static! {
    /// Every scenario, in a stable order.
    pub static ref SCENARIO_CASES: Vec<ScenarioCase> = vec![
        ScenarioCase {
            name: "identical_two_edges",
            host: JOHN_EATS_APPLE.clone(),
            fragment: graph(&["eat", "john", "apple"], &[("nsubj", 0, 1), ("dobj", 0, 2)]),
            expected_matches: 1,
        },
        ScenarioCase {
            name: "fragment_has_extra_edge",
            host: JOHN_EATS_APPLE.clone(),
            fragment: graph(
                &["eat", "john", "apple", "red"],
                &[("nsubj", 0, 1), ("dobj", 0, 2), ("amod", 2, 3)],
            ),
            expected_matches: 0,
        },
        ScenarioCase {
            name: "relation_differs",
            host: JOHN_EATS_APPLE.clone(),
            fragment: graph(&["eat", "john", "apple"], &[("nsubj", 0, 1), ("iobj", 0, 2)]),
            expected_matches: 0,
        },
        ScenarioCase {
            name: "single_edge_subfragment",
            host: JOHN_EATS_APPLE.clone(),
            fragment: graph(&["eat", "apple"], &[("dobj", 0, 1)]),
            expected_matches: 1,
        },
        ScenarioCase {
            name: "repeated_label_picks_attached_node",
            host: DOG_BIT_CAT.clone(),
            fragment: graph(&["dog", "the"], &[("det", 0, 1)]),
            expected_matches: 1,
        },
        ScenarioCase {
            name: "whole_sentence_with_repeated_labels",
            host: DOG_BIT_CAT.clone(),
            fragment: graph(
                &["bit", "cat", "the", "dog", "the"],
                &[("dobj", 0, 1), ("det", 1, 2), ("ncsubj", 0, 3), ("det", 3, 4)],
            ),
            expected_matches: 1,
        },
        ScenarioCase {
            name: "symmetric_modifiers_match_twice",
            host: BIG_BIG_DOG.clone(),
            fragment: graph(&["dog", "big"], &[("amod", 0, 1)]),
            expected_matches: 2,
        },
        ScenarioCase {
            name: "reversed_direction",
            host: BIG_BIG_DOG.clone(),
            fragment: graph(&["big", "dog"], &[("amod", 0, 1)]),
            expected_matches: 0,
        },
        ScenarioCase {
            name: "path_inside_triangle_is_not_exact",
            host: TRIANGLE.clone(),
            fragment: graph(&["a", "b", "c"], &[("r", 0, 1), ("r", 1, 2)]),
            expected_matches: 0,
        },
        ScenarioCase {
            name: "edgeless_fragment_never_matches",
            host: JOHN_EATS_APPLE.clone(),
            fragment: graph(&["john"], &[]),
            expected_matches: 0,
        },
    ];
}

/// Looks a scenario up by name.
pub fn scenario(name: &str) -> Option<&'static ScenarioCase> {
    SCENARIO_CASES.iter().find(|c| c.name == name)
}
