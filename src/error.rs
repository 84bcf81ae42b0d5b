//! FILENAME: src/error.rs

use thiserror::Error;

use crate::definition::AggregateKind;

/// Failures surfaced by the grouping engine.
///
/// All of these are configuration-level: the scan itself has no I/O and no
/// failure modes of its own (malformed input degrades to extra open/close
/// churn, never to an error).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupingError {
    #[error("grouping requires at least one group field")]
    NoGroupFields,

    #[error("group field name at position {0} is blank")]
    BlankGroupField(usize),

    #[error("aggregate kind {0:?} is configured more than once")]
    DuplicateAggregateKind(AggregateKind),
}
