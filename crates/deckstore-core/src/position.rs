//! Position planning for a single deck.
//!
//! The backing store checks `UNIQUE(deck_id, position)` after every row
//! write, so any change touching more than one row must pass through values
//! no other row holds. Plans produced here are ordered lists of write phases:
//!
//! - shifts (insert / delete) first move every affected slide to the
//!   negative mirror of its target, then flip all of them positive;
//! - swaps park one slide at [`SENTINEL`], move the other into the vacated
//!   position, then land the parked slide.
//!
//! Executing the writes in order never produces a duplicate position.
//! Nothing in this module performs I/O.

use std::collections::BTreeMap;

use crate::error::PositionError;
use crate::slide::Slide;
use crate::types::SlideId;

/// A position no slide ever holds outside of a swap.
pub const SENTINEL: i64 = 0;

/// The ordering-relevant view of one slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionEntry {
    pub id: SlideId,
    pub position: u32,
    pub parent_id: Option<SlideId>,
}

impl From<&Slide> for PositionEntry {
    fn from(slide: &Slide) -> Self {
        Self {
            id: slide.id,
            position: slide.position,
            parent_id: slide.parent_id,
        }
    }
}

/// A single row write: set the position of `id`.
///
/// Positions are signed because intermediate phases use negative
/// temporaries and the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionWrite {
    pub id: SlideId,
    pub position: i64,
}

/// Ordered write phases. Every write of a phase is issued before any write
/// of the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WritePlan {
    phases: Vec<Vec<PositionWrite>>,
}

impl WritePlan {
    pub fn phases(&self) -> &[Vec<PositionWrite>] {
        &self.phases
    }

    /// All writes, in execution order.
    pub fn writes(&self) -> impl Iterator<Item = &PositionWrite> {
        self.phases.iter().flatten()
    }

    /// Number of row writes.
    pub fn len(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position each touched slide ends up at.
    pub fn final_positions(&self) -> BTreeMap<SlideId, i64> {
        self.writes().map(|w| (w.id, w.position)).collect()
    }

    fn push_phase(&mut self, phase: Vec<PositionWrite>) {
        if !phase.is_empty() {
            self.phases.push(phase);
        }
    }
}

/// Position right after the last child of `reference`.
///
/// Children are entries whose `parent_id` is `reference`. Without children
/// the new slide goes directly after `reference` itself.
pub fn insertion_point_after_last_child_of(
    snapshot: &[PositionEntry],
    reference: SlideId,
) -> Result<u32, PositionError> {
    let parent = snapshot
        .iter()
        .find(|e| e.id == reference)
        .ok_or(PositionError::UnknownSlide(reference))?;

    let last_child = snapshot
        .iter()
        .filter(|e| e.parent_id == Some(reference))
        .map(|e| e.position)
        .max();

    Ok(last_child.unwrap_or(parent.position) + 1)
}

/// Make room at `from`: every entry at or after it moves down by one.
pub fn shift_for_insert(snapshot: &[PositionEntry], from: u32) -> WritePlan {
    let affected: Vec<(SlideId, i64)> = sorted_desc(snapshot)
        .into_iter()
        .filter(|e| e.position >= from)
        .map(|e| (e.id, i64::from(e.position) + 1))
        .collect();

    two_phase(&affected)
}

/// Close the hole left at `deleted`: every entry after it moves up by one.
pub fn close_gap_for_delete(snapshot: &[PositionEntry], deleted: u32) -> WritePlan {
    let mut affected: Vec<(SlideId, i64)> = sorted_desc(snapshot)
        .into_iter()
        .filter(|e| e.position > deleted)
        .map(|e| (e.id, i64::from(e.position) - 1))
        .collect();
    affected.reverse();

    two_phase(&affected)
}

/// Exchange the positions of two slides.
pub fn swap(a: &PositionEntry, b: &PositionEntry) -> WritePlan {
    let mut plan = WritePlan::default();
    plan.push_phase(vec![PositionWrite {
        id: a.id,
        position: SENTINEL,
    }]);
    plan.push_phase(vec![PositionWrite {
        id: b.id,
        position: i64::from(a.position),
    }]);
    plan.push_phase(vec![PositionWrite {
        id: a.id,
        position: i64::from(b.position),
    }]);
    plan
}

/// Verify that `positions` are exactly `1..=n`.
pub fn check_density(positions: impl IntoIterator<Item = i64>) -> Result<(), PositionError> {
    let mut positions: Vec<i64> = positions.into_iter().collect();
    positions.sort_unstable();

    for (expected, actual) in (1i64..).zip(&positions) {
        if *actual != expected {
            return Err(PositionError::NotDense(format!(
                "expected position {} but found {} among {} slides",
                expected,
                actual,
                positions.len()
            )));
        }
    }
    Ok(())
}

fn sorted_desc(snapshot: &[PositionEntry]) -> Vec<PositionEntry> {
    let mut entries = snapshot.to_vec();
    entries.sort_by(|a, b| b.position.cmp(&a.position));
    entries
}

// Targets are distinct and positive, so their negative mirrors are distinct,
// non-zero, and collide with nothing a live slide holds.
fn two_phase(targets: &[(SlideId, i64)]) -> WritePlan {
    let mut plan = WritePlan::default();
    plan.push_phase(
        targets
            .iter()
            .map(|&(id, target)| PositionWrite {
                id,
                position: -target,
            })
            .collect(),
    );
    plan.push_phase(
        targets
            .iter()
            .map(|&(id, target)| PositionWrite {
                id,
                position: target,
            })
            .collect(),
    );
    plan
}
