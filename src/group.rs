//! FILENAME: src/group.rs
//! Group tree - the incrementally built hierarchy the scan moves through.
//!
//! Groups live in a flat arena (`Vec<Group>`) and point at their parent by
//! index. The tree is never built upfront: nodes are appended as the scan
//! encounters them, and a node is never revisited once its subtree closes.
//! An identical combination of values occurring again later in the input
//! creates a brand-new node.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::definition::AggregateKind;

/// Index of a group within the arena of one grouping run.
pub type GroupId = usize;

/// The root group is always the first arena entry.
pub const ROOT_GROUP: GroupId = 0;

/// Fixed first element of every group's id parts.
pub const ROOT_SENTINEL: &str = "root";

/// Joins id parts into the id string used for group equality. The unit
/// separator keeps "a" + "bc" distinct from "ab" + "c".
const ID_SEPARATOR: char = '\u{001F}';

/// Ordered id parts for one group, sentinel first.
pub type IdParts = SmallVec<[String; 4]>;

pub(crate) fn join_id(parts: &[String]) -> String {
    let mut id = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            id.push(ID_SEPARATOR);
        }
        id.push_str(part);
    }
    id
}

// ============================================================================
// AGGREGATE ACCUMULATOR
// ============================================================================

/// Single-pass numeric accumulator attached to a group per aggregate kind.
///
/// `count` counts every attached item; `count_numbers` only those whose
/// source field read as a number, and feeds `Average`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateAccumulator {
    pub sum: f64,
    pub count: u64,
    pub count_numbers: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AggregateAccumulator {
    /// Adds a numeric value to the accumulator.
    pub fn add_number(&mut self, value: f64) {
        self.count += 1;
        self.count_numbers += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Adds a non-numeric value (only increments the item count).
    pub fn add_non_number(&mut self) {
        self.count += 1;
    }

    /// Computes the final aggregate value for a kind.
    pub fn compute(&self, kind: AggregateKind) -> f64 {
        match kind {
            AggregateKind::Sum => self.sum,
            AggregateKind::Count => self.count as f64,
            AggregateKind::Average => {
                if self.count_numbers > 0 {
                    self.sum / (self.count_numbers as f64)
                } else {
                    0.0
                }
            }
            AggregateKind::Min => self.min.unwrap_or(0.0),
            AggregateKind::Max => self.max.unwrap_or(0.0),
        }
    }
}

// ============================================================================
// GROUP NODE
// ============================================================================

/// One node of the grouping hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Ordered value parts identifying this node, `ROOT_SENTINEL` first,
    /// then one value per qualifying grouping field.
    pub id_parts: IdParts,

    /// The parts joined with a separator. Used only for equality checks
    /// between a live group and a candidate description.
    pub id: String,

    /// Count of qualifying values after the sentinel; root is level 0.
    pub level: usize,

    /// The grouping field whose value is the deepest id part. `None` for
    /// root.
    pub group_by_field: Option<String>,

    /// Arena index of the enclosing group; `None` only for root. Wired when
    /// the group is entered, not necessarily at construction.
    pub parent: Option<GroupId>,

    /// Direct children opened under this group plus items attached directly
    /// to it. Drives outline numbering for both.
    pub item_count: u32,

    /// Outline number string ("1", "2.3"). Empty for root.
    pub list_index: String,

    /// Running accumulators for items attached directly to this group. No
    /// roll-up to ancestors.
    pub aggregates: FxHashMap<AggregateKind, AggregateAccumulator>,
}

impl Group {
    /// The root group that anchors every run.
    pub fn root() -> Self {
        let mut id_parts = IdParts::new();
        id_parts.push(ROOT_SENTINEL.to_string());
        let id = join_id(&id_parts);
        Group {
            id_parts,
            id,
            level: 0,
            group_by_field: None,
            parent: None,
            item_count: 0,
            list_index: String::new(),
            aggregates: FxHashMap::default(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.level == 0
    }

    /// The id part at a given level (1-based below the sentinel).
    pub fn part_at(&self, level: usize) -> Option<&str> {
        self.id_parts.get(level).map(String::as_str)
    }

    /// The value one level below root, shared by every group on a branch.
    pub fn branch_value(&self) -> Option<&str> {
        self.part_at(1)
    }

    /// The finished value of an aggregate kind, if it was configured.
    pub fn aggregate(&self, kind: AggregateKind) -> Option<f64> {
        self.aggregates.get(&kind).map(|acc| acc.compute(kind))
    }
}
