//! Fragment enumeration and exact fragment matching over a corpus of
//! dependency graphs.
//!
//! The pieces, bottom up:
//!
//! - [`FragmentEnumerator`] lists the complete fragments of one graph.
//! - [`CandidateSelector`] picks host positions for a fragment's labels and
//!   keeps the connected selections.
//! - [`SubgraphMatcher`] decides exact isomorphism between a fragment and a
//!   retained host edge-set.
//! - [`FragmentMatchService`] prunes a [`Corpus`] and drives the two above.
//! - [`FeatureStats`] counts boundary features over every fragment.

mod budget;
mod candidates;
mod corpus;
mod enumerate;
mod error;
mod features;
mod matcher;
mod resolve;
mod service;
mod state;
#[cfg(test)]
mod tests;
mod util;

pub use budget::{BudgetSnapshot, CancelHandle, SearchBudget};
pub use candidates::{Buckets, CandidateSelector, PositionSelection};
pub use corpus::{Corpus, CorpusBuilder, IngestReport, SentenceId};
pub use enumerate::{EdgeSet, FragmentEnumerator};
pub use error::{GraphSide, SearchError};
pub use features::{Feature, FeatureId, FeatureStats, SkipReason, SkippedGraph, boundary_features};
pub use matcher::{Isomorphism, SubgraphMatcher};
pub use service::{
    BatchReport, FragmentMatchService, FragmentOutcome, Match, QueryReport, SkippedSentence,
};
