//! FILENAME: src/definition.rs
//! Grouping Definition - The serializable configuration.
//!
//! This module contains the types needed to DESCRIBE a grouping run.
//! These structures are designed to be:
//! - Serializable (for saving/loading report configurations)
//! - Immutable snapshots of caller intent
//!
//! The engine itself never mutates a definition; it is validated once at the
//! start of a run and then only read.

use serde::{Deserialize, Serialize};

use crate::error::GroupingError;

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for item values.
///
/// `Sum` and `Count` are the reference kinds; the remaining kinds share the
/// same single-pass accumulator and cost nothing extra to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateKind {
    Sum,
    Count,
    Average,
    Min,
    Max,
}

impl Default for AggregateKind {
    fn default() -> Self {
        AggregateKind::Sum
    }
}

/// Binds an aggregation function to the record field it reads.
///
/// `Count` still names a field for symmetry, but increments once per item
/// regardless of the field's value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateField {
    /// The aggregation function to apply.
    pub kind: AggregateKind,

    /// The record field the aggregate reads (by name).
    pub field: String,
}

impl AggregateField {
    pub fn new(kind: AggregateKind, field: impl Into<String>) -> Self {
        AggregateField {
            kind,
            field: field.into(),
        }
    }
}

// ============================================================================
// MAIN DEFINITION STRUCT
// ============================================================================

/// The complete, serializable definition of a grouping run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingDefinition {
    /// Fields that define the hierarchy, ordered by priority: the field
    /// checked first is the outer (shallower) level.
    pub group_fields: Vec<String>,

    /// Aggregates to maintain per group. At most one entry per kind.
    #[serde(default)]
    pub aggregate_fields: Vec<AggregateField>,

    /// When set, a present-but-falsy value (`0`, `"0"`, `""`, `false`) still
    /// qualifies its field as a grouping level. Absent fields and `Empty`
    /// values never qualify.
    #[serde(default)]
    pub zero_allowed: bool,
}

impl GroupingDefinition {
    /// Creates a definition with the given group fields and no aggregates.
    pub fn new(group_fields: Vec<String>) -> Self {
        GroupingDefinition {
            group_fields,
            aggregate_fields: Vec::new(),
            zero_allowed: false,
        }
    }

    /// Adds an aggregate to maintain on every group.
    pub fn with_aggregate(mut self, kind: AggregateKind, field: impl Into<String>) -> Self {
        self.aggregate_fields.push(AggregateField::new(kind, field));
        self
    }

    /// Allows falsy values to qualify as grouping levels.
    pub fn with_zero_allowed(mut self) -> Self {
        self.zero_allowed = true;
        self
    }

    /// Fail-fast configuration check, run once per engine invocation.
    pub fn validate(&self) -> Result<(), GroupingError> {
        if self.group_fields.is_empty() {
            return Err(GroupingError::NoGroupFields);
        }
        for (position, name) in self.group_fields.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(GroupingError::BlankGroupField(position));
            }
        }
        for (i, aggregate) in self.aggregate_fields.iter().enumerate() {
            let duplicated = self.aggregate_fields[..i]
                .iter()
                .any(|earlier| earlier.kind == aggregate.kind);
            if duplicated {
                return Err(GroupingError::DuplicateAggregateKind(aggregate.kind));
            }
        }
        Ok(())
    }
}
