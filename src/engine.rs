//! FILENAME: src/engine.rs
//! Grouping Engine - the calculation core that transforms records into segments.
//!
//! This module takes a GroupingDefinition (configuration) and an ordered
//! record sequence (data) and produces the segment stream (renderable output).
//!
//! Algorithm, per record:
//! 1. Classify: walk the group fields in priority order and build a candidate
//!    description (id parts / level / deepest field) for the record
//! 2. Navigate: close groups upward until the current group lies on the
//!    candidate's path, then open filler groups and the target downward
//! 3. Attach: emit the item, bumping the owner's counter and aggregates
//!
//! The scan is a single forward pass. Ancestor walks strictly decrease the
//! level and stop at root, so termination holds even for unsorted input
//! (which only costs extra open/close churn).

use log::{debug, trace};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::definition::GroupingDefinition;
use crate::error::GroupingError;
use crate::group::{join_id, Group, GroupId, IdParts, ROOT_GROUP, ROOT_SENTINEL};
use crate::record::{FieldValue, Record};
use crate::segment::{GroupingOutcome, Segment};

/// Groups the records and returns the outcome, or a configuration error.
///
/// Every record yields exactly one `item` segment; every group that receives
/// a `header`+`open` pair receives exactly one matching `close` (at the next
/// break or at end of input), so the stream nests like a balanced stack.
pub fn group_records<R: Record>(
    records: &[R],
    definition: &GroupingDefinition,
) -> Result<GroupingOutcome, GroupingError> {
    definition.validate()?;
    Ok(GroupScanner::new(definition).scan(records))
}

// ============================================================================
// CANDIDATE
// ============================================================================

/// Where one record wants to live: a description of its target group, not
/// yet wired into the tree. Parent assignment happens during navigation.
struct Candidate {
    /// Sentinel-first id parts, one per qualifying field, in priority order.
    parts: IdParts,

    /// For each part after the sentinel, the index of the group field that
    /// produced it. Level compression means this is not simply 0..level.
    field_positions: SmallVec<[usize; 4]>,

    /// Joined parts, compared against live group ids.
    id: String,

    /// Number of qualifying parts; 0 means the record has no group.
    level: usize,
}

// ============================================================================
// SCANNER
// ============================================================================

/// The stateful scanner behind [`group_records`].
///
/// Holds the group arena, the emitted segments, the "current" position in
/// the implicit tree, and the top-level outline counter. All state is local
/// to one invocation; runs are independent.
pub struct GroupScanner<'a> {
    definition: &'a GroupingDefinition,
    groups: Vec<Group>,
    segments: Vec<Segment>,
    current: GroupId,
    top_level_counter: u32,
}

impl<'a> GroupScanner<'a> {
    /// Creates a scanner for a validated definition.
    pub fn new(definition: &'a GroupingDefinition) -> Self {
        GroupScanner {
            definition,
            groups: vec![Group::root()],
            segments: Vec::new(),
            current: ROOT_GROUP,
            top_level_counter: 0,
        }
    }

    /// Runs the full forward pass and returns the outcome.
    pub fn scan<R: Record>(mut self, records: &[R]) -> GroupingOutcome {
        trace!(
            "grouping {} records across {} fields",
            records.len(),
            self.definition.group_fields.len()
        );
        for (index, record) in records.iter().enumerate() {
            self.step(index, record);
        }
        self.finish()
    }

    /// Processes one record.
    fn step<R: Record>(&mut self, index: usize, record: &R) {
        let candidate = self.classify(record);

        // Still inside the same group: only the item moves.
        if self.groups[self.current].id == candidate.id {
            self.attach_item(index, record);
            return;
        }

        if self.current != ROOT_GROUP
            && candidate.level > 0
            && self.groups[self.current].branch_value() != candidate.parts.get(1).map(String::as_str)
        {
            debug!("record {}: branch switch, closing back to root", index);
        }

        // Climb: close the current group and every ancestor that does not
        // lie on the candidate's path. Lands on the lowest common ancestor,
        // or on root for an off-branch target or a group-less record.
        self.close_until_on_path(&candidate, Some(index));

        // The climb may land exactly on the target (shallower break onto a
        // still-open ancestor): attach there without reopening anything.
        if self.groups[self.current].id == candidate.id {
            self.attach_item(index, record);
            return;
        }

        self.open_descent(&candidate, index);
        self.attach_item(index, record);
    }

    /// Classifies a record into its candidate group description.
    ///
    /// A field qualifies if it is present and truthy, or present and falsy
    /// with `zero_allowed` set (an `Empty` value never qualifies). Fields
    /// that do not qualify are skipped without breaking the walk, so a later
    /// field can still qualify and the id parts compress.
    fn classify<R: Record>(&self, record: &R) -> Candidate {
        let mut parts = IdParts::new();
        parts.push(ROOT_SENTINEL.to_string());
        let mut field_positions = SmallVec::new();

        for (position, name) in self.definition.group_fields.iter().enumerate() {
            let value = match record.get(name) {
                Some(v) => v,
                None => continue,
            };
            let qualifies = value.is_truthy()
                || (self.definition.zero_allowed && !matches!(value, FieldValue::Empty));
            if qualifies {
                parts.push(value.label());
                field_positions.push(position);
            }
        }

        let level = parts.len() - 1;
        let id = join_id(&parts);
        Candidate {
            parts,
            field_positions,
            id,
            level,
        }
    }

    /// True if `id` is an ancestor-or-self prefix of the candidate's path,
    /// compared part by part below the sentinel.
    fn on_candidate_path(&self, id: GroupId, candidate: &Candidate) -> bool {
        let group = &self.groups[id];
        if group.level > candidate.level {
            return false;
        }
        (1..=group.level)
            .all(|level| group.part_at(level) == candidate.parts.get(level).map(String::as_str))
    }

    /// Emits `close` segments from the current group upward until the
    /// current group lies on the candidate's path. `record` is the record
    /// that triggered the break (the *next* one relative to the closing
    /// group's content).
    fn close_until_on_path(&mut self, candidate: &Candidate, record: Option<usize>) {
        while self.current != ROOT_GROUP && !self.on_candidate_path(self.current, candidate) {
            self.segments.push(Segment::close(self.current, record));
            self.current = self.groups[self.current].parent.unwrap_or(ROOT_GROUP);
        }
    }

    /// Opens every level between the current group and the candidate,
    /// inclusive of the candidate itself. Intermediate levels are filler
    /// groups bridging a multi-level jump; each gets the same header+open
    /// treatment as the target.
    fn open_descent(&mut self, candidate: &Candidate, record: usize) {
        let first = self.groups[self.current].level + 1;
        for level in first..=candidate.level {
            self.open_group(candidate, level, record);
        }
    }

    /// Creates and enters one group at `level` of the candidate's path:
    /// bumps the parent's child counter, assigns the outline number, then
    /// emits `header` followed by `open`.
    fn open_group(&mut self, candidate: &Candidate, level: usize, record: usize) {
        let parent = self.current;
        self.groups[parent].item_count += 1;
        let ordinal = self.groups[parent].item_count;

        // Level-1 groups draw from the per-run top-level counter, which
        // advances only for level-1 groups and so may diverge from root's
        // item_count when items attach directly under root.
        let list_index = if level == 1 {
            self.top_level_counter += 1;
            self.top_level_counter.to_string()
        } else {
            format!("{}.{}", self.groups[parent].list_index, ordinal)
        };

        let id_parts: IdParts = candidate.parts[..=level].iter().cloned().collect();
        let id = join_id(&id_parts);
        let field_position = candidate.field_positions[level - 1];
        let group_by_field = self.definition.group_fields[field_position].clone();

        let group_id = self.groups.len();
        self.groups.push(Group {
            id_parts,
            id,
            level,
            group_by_field: Some(group_by_field),
            parent: Some(parent),
            item_count: 0,
            list_index,
            aggregates: FxHashMap::default(),
        });
        self.segments.push(Segment::header(group_id, record, ordinal));
        self.segments.push(Segment::open(group_id));
        self.current = group_id;
    }

    /// Attaches the record to the current group as an `item`.
    fn attach_item<R: Record>(&mut self, index: usize, record: &R) {
        let group = self.current;
        self.groups[group].item_count += 1;
        let ordinal = self.groups[group].item_count;
        self.update_aggregates(group, record);
        self.segments.push(Segment::item(group, index, ordinal));
    }

    /// Updates the owning group's accumulators. Aggregates never roll up to
    /// ancestors.
    fn update_aggregates<R: Record>(&mut self, group: GroupId, record: &R) {
        let definition = self.definition;
        for aggregate in &definition.aggregate_fields {
            let accumulator = self.groups[group]
                .aggregates
                .entry(aggregate.kind)
                .or_default();
            match record.get(&aggregate.field).and_then(FieldValue::as_number) {
                Some(value) => accumulator.add_number(value),
                None => accumulator.add_non_number(),
            }
        }
    }

    /// Closes everything still open after the last record.
    fn finish(mut self) -> GroupingOutcome {
        while self.current != ROOT_GROUP {
            self.segments.push(Segment::close(self.current, None));
            self.current = self.groups[self.current].parent.unwrap_or(ROOT_GROUP);
        }
        trace!(
            "grouping produced {} groups and {} segments",
            self.groups.len() - 1,
            self.segments.len()
        );
        GroupingOutcome {
            groups: self.groups,
            segments: self.segments,
        }
    }
}
