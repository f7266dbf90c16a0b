//! Position sink: the addressable set of presentation targets.

use serde::{Deserialize, Serialize};

use crate::mapping::TargetPosition;
use crate::protocols::records::layout::NO_DETECTION_LABEL;

/// Addressable array of position-settable targets.
///
/// Writes are last-write-wins; callers are expected to range-check ids
/// against `len` and `has_target`, but implementations treat an
/// out-of-range id as a no-op anyway.
pub trait PositionSink {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether slot `id` exists and holds a target.
    fn has_target(&self, id: usize) -> bool;

    fn set_position(&mut self, id: usize, position: TargetPosition);

    /// Record the color label reported with the latest position.
    fn set_label(&mut self, _id: usize, _label: &str) {}
}

/// One populated slot of a [`TargetTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSlot {
    pub name: String,
    pub position: Option<TargetPosition>,
    pub label: Option<String>,
    pub updates: u64,
}

impl TargetSlot {
    fn new(name: String) -> Self {
        Self {
            name,
            position: None,
            label: None,
            updates: 0,
        }
    }

    /// A slot is visible once it carries a detection label other than `none`.
    pub fn is_visible(&self) -> bool {
        self.label
            .as_deref()
            .is_some_and(|label| label != NO_DETECTION_LABEL)
    }
}

/// Serializable view of one slot, used in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSummary {
    pub id: usize,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<TargetPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub visible: bool,
    pub updates: u64,
}

/// In-memory sink with optional (possibly empty) named slots.
///
/// # Examples
/// ```
/// use ballsync_core::{PositionSink, TargetPosition, TargetTable};
///
/// let mut table = TargetTable::new([Some("Ball0".to_string()), None]);
/// assert!(table.has_target(0));
/// assert!(!table.has_target(1));
/// table.set_position(0, TargetPosition { x: 1.0, y: 0.0, z: 2.0 });
/// assert_eq!(table.get(0).and_then(|slot| slot.position).map(|p| p.z), Some(2.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TargetTable {
    slots: Vec<Option<TargetSlot>>,
}

impl TargetTable {
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        Self {
            slots: names.into_iter().map(|name| name.map(TargetSlot::new)).collect(),
        }
    }

    /// Table of `count` slots named `Ball0`, `Ball1`, ...
    pub fn with_len(count: usize) -> Self {
        Self::new((0..count).map(|id| Some(format!("Ball{id}"))))
    }

    pub fn get(&self, id: usize) -> Option<&TargetSlot> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    /// Populated slots in id order.
    pub fn summaries(&self) -> Vec<TargetSummary> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| {
                slot.as_ref().map(|slot| TargetSummary {
                    id,
                    name: slot.name.clone(),
                    position: slot.position,
                    label: slot.label.clone(),
                    visible: slot.is_visible(),
                    updates: slot.updates,
                })
            })
            .collect()
    }

    fn slot_mut(&mut self, id: usize) -> Option<&mut TargetSlot> {
        self.slots.get_mut(id).and_then(Option::as_mut)
    }
}

impl PositionSink for TargetTable {
    fn len(&self) -> usize {
        self.slots.len()
    }

    fn has_target(&self, id: usize) -> bool {
        self.get(id).is_some()
    }

    fn set_position(&mut self, id: usize, position: TargetPosition) {
        if let Some(slot) = self.slot_mut(id) {
            slot.position = Some(position);
            slot.updates += 1;
        }
    }

    fn set_label(&mut self, id: usize, label: &str) {
        if let Some(slot) = self.slot_mut(id) {
            slot.label = Some(label.to_string());
        }
    }
}
