//! FILENAME: src/lib.rs
//! Outline Engine - hierarchical control-break grouping.
//!
//! This crate turns a flat, pre-ordered sequence of records plus an ordered
//! list of grouping fields into a sequence of structural segments (`header`,
//! `open`, `close`, `item`) that drive a nested, numbered outline — the
//! classic banded-report / control-break pattern, generalized to tolerate
//! missing intermediate levels, non-adjacent repeats of a group, and
//! hierarchical outline numbering ("1", "1.2", "1.2.3").
//!
//! Layers:
//! - `definition`: Serializable configuration (what the grouping IS)
//! - `record`: Structural record access (WHAT we read from the input)
//! - `group`: The incrementally built group tree (HOW we remember position)
//! - `segment`: Renderable output for a consumer (WHAT we emit)
//! - `engine`: The single-pass scanner (HOW we calculate)

pub mod definition;
pub mod engine;
pub mod error;
pub mod group;
pub mod record;
pub mod segment;

pub use definition::{AggregateField, AggregateKind, GroupingDefinition};
pub use engine::{group_records, GroupScanner};
pub use error::GroupingError;
pub use group::{AggregateAccumulator, Group, GroupId, ROOT_GROUP};
pub use record::{FieldValue, Record};
pub use segment::{GroupingOutcome, Segment, SegmentKind};
