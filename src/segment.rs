//! FILENAME: src/segment.rs
//! Segments - renderable output for a consumer.
//!
//! A segment is one structural event in the emitted stream. The renderer
//! contract is small: `header` labels the container about to open, `open`
//! opens it, `close` closes the most recently opened still-open container,
//! and `item` renders a record inside the innermost open container.

use serde::{Deserialize, Serialize};

use crate::group::{Group, GroupId, ROOT_GROUP};

// ============================================================================
// SEGMENT
// ============================================================================

/// The kind of structural event a segment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Label for a group about to open.
    Header,
    /// Opens the group's container.
    Open,
    /// Closes the group's container.
    Close,
    /// One input record, inside the innermost open container.
    Item,
}

/// One emitted structural event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,

    /// The group this event concerns.
    pub group: GroupId,

    /// Index of the triggering record in the input. Present for `header`
    /// and `item`; for a trailing `close` it is the *next* record, and it
    /// is absent for the closes emitted at end of input.
    pub record: Option<usize>,

    /// For `item`: 1-based position of the record within its group. For
    /// `header`: 1-based position of the group among its parent's children.
    /// Absent for `open`/`close`.
    pub ordinal: Option<u32>,
}

impl Segment {
    pub fn header(group: GroupId, record: usize, ordinal: u32) -> Self {
        Segment {
            kind: SegmentKind::Header,
            group,
            record: Some(record),
            ordinal: Some(ordinal),
        }
    }

    pub fn open(group: GroupId) -> Self {
        Segment {
            kind: SegmentKind::Open,
            group,
            record: None,
            ordinal: None,
        }
    }

    pub fn close(group: GroupId, record: Option<usize>) -> Self {
        Segment {
            kind: SegmentKind::Close,
            group,
            record,
            ordinal: None,
        }
    }

    pub fn item(group: GroupId, record: usize, ordinal: u32) -> Self {
        Segment {
            kind: SegmentKind::Item,
            group,
            record: Some(record),
            ordinal: Some(ordinal),
        }
    }
}

// ============================================================================
// OUTCOME
// ============================================================================

/// The result of one grouping run: the group arena plus the ordered segment
/// stream that references into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingOutcome {
    /// All groups created during the scan, root first. Segment `group`
    /// fields index into this arena.
    pub groups: Vec<Group>,

    /// The emitted events, in render order.
    pub segments: Vec<Segment>,
}

impl GroupingOutcome {
    /// Looks up the group a segment (or anything else) references.
    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id]
    }

    pub fn root(&self) -> &Group {
        &self.groups[ROOT_GROUP]
    }

    /// The displayed outline number for a segment, when it has one:
    /// the group's own number for a `header`, the group number extended
    /// with the item ordinal for an `item` (just the ordinal for items
    /// attached directly under root).
    pub fn outline_number(&self, segment: &Segment) -> Option<String> {
        let group = self.group(segment.group);
        match segment.kind {
            SegmentKind::Header => Some(group.list_index.clone()),
            SegmentKind::Item => {
                let ordinal = segment.ordinal?;
                if group.is_root() {
                    Some(ordinal.to_string())
                } else {
                    Some(format!("{}.{}", group.list_index, ordinal))
                }
            }
            SegmentKind::Open | SegmentKind::Close => None,
        }
    }

    /// Convenience filter over the stream.
    pub fn segments_of(&self, kind: SegmentKind) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(move |s| s.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Group;

    fn outcome_with_one_group() -> GroupingOutcome {
        let mut child = Group::root();
        child.level = 1;
        child.list_index = "2".to_string();
        GroupingOutcome {
            groups: vec![Group::root(), child],
            segments: vec![
                Segment::header(1, 0, 2),
                Segment::open(1),
                Segment::item(1, 0, 1),
                Segment::close(1, None),
            ],
        }
    }

    #[test]
    fn test_outline_numbers() {
        let outcome = outcome_with_one_group();
        assert_eq!(
            outcome.outline_number(&outcome.segments[0]),
            Some("2".to_string())
        );
        assert_eq!(
            outcome.outline_number(&outcome.segments[2]),
            Some("2.1".to_string())
        );
        assert_eq!(outcome.outline_number(&outcome.segments[3]), None);
    }

    #[test]
    fn test_root_item_number_is_bare_ordinal() {
        let outcome = GroupingOutcome {
            groups: vec![Group::root()],
            segments: vec![Segment::item(ROOT_GROUP, 0, 3)],
        };
        assert_eq!(
            outcome.outline_number(&outcome.segments[0]),
            Some("3".to_string())
        );
    }

    #[test]
    fn test_segments_of_filters_by_kind() {
        let outcome = outcome_with_one_group();
        assert_eq!(outcome.segments_of(SegmentKind::Item).count(), 1);
        assert_eq!(outcome.segments_of(SegmentKind::Close).count(), 1);
    }
}
