//! # Corridor sequence
//!
//! A corridor sequence chains corridors into one route addressed by a single global arc length.
//! Each corridor is keyed by the global arc length at which it starts, and owns the global range
//! from its key up to the next key (the last corridor owns everything beyond its key).
//!
//! Resolving a Cartesian point against the sequence starts at the corridor owning a hint arc
//! length. If the projection falls before that corridor the point is handed to the predecessor,
//! and if it falls after it the point is handed to the successor. The walk keeps going in the
//! same direction until the projection lands inside a corridor, the direction would reverse, or
//! the end of the sequence is reached. At the ends of the sequence the out of range projection is
//! returned as-is.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace};
use std::sync::Arc;

use crate::{corridor::Corridor, types::*};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ordered chain of shared corridors.
#[derive(Debug, Clone, Default)]
pub struct CorridorSequence {
    /// Entries sorted by start arc length
    entries: Vec<SequenceEntry>,
}

/// A corridor in a sequence along with the global arc length it starts at.
#[derive(Debug, Clone)]
pub struct SequenceEntry {
    pub start_arc_length: f64,
    pub corridor: Arc<Corridor>,
}

/// The result of looking up a global arc length in a sequence.
#[derive(Debug, Clone, Copy)]
pub struct SequenceLookup<'a> {
    /// Index of the owning entry in the sequence
    pub index: usize,

    pub entry: &'a SequenceEntry,

    /// The arc length relative to the start of the owning corridor
    pub local_arc_length: f64,
}

/// A Cartesian point resolved against a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencePosition {
    /// Index of the corridor the point was attributed to
    pub index: usize,

    pub corridor_id: CorridorId,

    /// Global arc length at which the corridor starts
    pub start_arc_length: f64,

    /// The projection in the corridor's own frame
    pub local: FrenetPositionWithFrame,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    #[error("The corridor sequence is empty")]
    EmptySequence,

    #[error("The start arc length of a corridor must be finite, found {0}")]
    NonFiniteStart(f64),

    #[error("A corridor already starts at arc length {0}")]
    DuplicateStart(f64),
}

/// Direction in which a projection is handed over to a neighbouring corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandOff {
    Predecessor,
    Successor,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CorridorSequence {
    /// Create a new empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a corridor starting at the given global arc length.
    pub fn insert(
        &mut self,
        start_arc_length: f64,
        corridor: Arc<Corridor>,
    ) -> Result<(), SequenceError> {
        if !start_arc_length.is_finite() {
            return Err(SequenceError::NonFiniteStart(start_arc_length));
        }

        let index = self
            .entries
            .partition_point(|e| e.start_arc_length < start_arc_length);

        if let Some(existing) = self.entries.get(index) {
            if existing.start_arc_length == start_arc_length {
                return Err(SequenceError::DuplicateStart(start_arc_length));
            }
        }

        self.entries.insert(
            index,
            SequenceEntry {
                start_arc_length,
                corridor,
            },
        );

        Ok(())
    }

    /// Append a corridor at the end of the sequence, starting where the last corridor ends (or at
    /// zero if the sequence is empty).
    pub fn push(&mut self, corridor: Arc<Corridor>) {
        let start_arc_length = self.end_arc_length();

        // Reference lines always have a positive length so the new key is past the last one
        self.entries.push(SequenceEntry {
            start_arc_length,
            corridor,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SequenceEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[SequenceEntry] {
        &self.entries
    }

    /// Find the entry owning the given global arc length.
    ///
    /// Arc lengths before the first key resolve to the first corridor, and arc lengths past the
    /// end of the sequence resolve to the last, with the local arc length outside the corridor.
    pub fn lookup(&self, arc_length: f64) -> Result<SequenceLookup<'_>, SequenceError> {
        if self.entries.is_empty() {
            return Err(SequenceError::EmptySequence);
        }

        let index = self
            .entries
            .partition_point(|e| e.start_arc_length <= arc_length)
            .saturating_sub(1);
        let entry = &self.entries[index];

        Ok(SequenceLookup {
            index,
            entry,
            local_arc_length: arc_length - entry.start_arc_length,
        })
    }

    pub fn signed_distances_at(&self, arc_length: f64) -> Result<BoundaryDistances, SequenceError> {
        let lookup = self.lookup(arc_length)?;
        Ok(lookup
            .entry
            .corridor
            .signed_distances_at(lookup.local_arc_length))
    }

    pub fn width_at(&self, arc_length: f64) -> Result<f64, SequenceError> {
        let lookup = self.lookup(arc_length)?;
        Ok(lookup.entry.corridor.width_at(lookup.local_arc_length))
    }

    pub fn center_offset_at(&self, arc_length: f64) -> Result<f64, SequenceError> {
        let lookup = self.lookup(arc_length)?;
        Ok(lookup.entry.corridor.center_offset(lookup.local_arc_length))
    }

    pub fn curvature_at(&self, arc_length: f64) -> Result<f64, SequenceError> {
        let lookup = self.lookup(arc_length)?;
        Ok(lookup.entry.corridor.curvature_at(lookup.local_arc_length))
    }

    /// The global arc length at the end of the last corridor.
    pub fn total_length(&self) -> Result<f64, SequenceError> {
        match self.entries.last() {
            Some(_) => Ok(self.end_arc_length()),
            None => Err(SequenceError::EmptySequence),
        }
    }

    /// Resolve a Cartesian point against the sequence, starting from the corridor owning
    /// `start_arc_length`.
    ///
    /// The projection into each visited corridor is a global search over that corridor, so the
    /// result only depends on which corridor the hint falls in. If the walk stops at an end of
    /// the sequence the returned local coordinate may lie outside the corridor.
    pub fn frenet_position_with_frame(
        &self,
        position: &CartesianPoint2D,
        start_arc_length: f64,
    ) -> Result<SequencePosition, SequenceError> {
        let mut index = self.lookup(start_arc_length)?.index;
        let mut result = self.project(index, position);

        let mut direction = None;
        while let Some(step) = self.hand_off_direction(index, &result.position) {
            // Never walk back towards a corridor that has already been visited
            if direction.map_or(false, |d| d != step) {
                break;
            }
            direction = Some(step);

            index = match step {
                HandOff::Predecessor => index - 1,
                HandOff::Successor => index + 1,
            };
            result = self.project(index, position);
        }

        let entry = &self.entries[index];
        let length = entry.corridor.length_reference_line();
        if result.position.l < 0.0 || result.position.l > length {
            debug!(
                "Point ({:.3}, {:.3}) resolved outside corridor {} (l = {:.3}, length {:.3}), \
                 extrapolating",
                position.x,
                position.y,
                entry.corridor.id(),
                result.position.l,
                length
            );
        }

        Ok(SequencePosition {
            index,
            corridor_id: entry.corridor.id(),
            start_arc_length: entry.start_arc_length,
            local: result,
        })
    }

    /// Project a point into the corridor at `index`.
    fn project(&self, index: usize, position: &CartesianPoint2D) -> FrenetPositionWithFrame {
        let corridor = &self.entries[index].corridor;
        let result = corridor.frenet_position_with_frame(position, None);

        trace!(
            "Projected ({:.3}, {:.3}) into corridor {} at l = {:.3}, d = {:.3}",
            position.x,
            position.y,
            corridor.id(),
            result.position.l,
            result.position.d
        );

        result
    }

    /// Which neighbour, if any, a projection into the corridor at `index` should be handed to.
    fn hand_off_direction(&self, index: usize, position: &FrenetPosition) -> Option<HandOff> {
        let length = self.entries[index].corridor.length_reference_line();

        if position.l < 0.0 && index > 0 {
            Some(HandOff::Predecessor)
        } else if position.l > length && index + 1 < self.entries.len() {
            Some(HandOff::Successor)
        } else {
            None
        }
    }

    fn end_arc_length(&self) -> f64 {
        match self.entries.last() {
            Some(last) => last.start_arc_length + last.corridor.length_reference_line(),
            None => 0.0,
        }
    }
}

impl SequencePosition {
    /// The position with its longitudinal coordinate in the sequence's global arc length.
    pub fn global_position(&self) -> FrenetPosition {
        FrenetPosition::new(
            self.start_arc_length + self.local.position.l,
            self.local.position.d,
        )
    }
}

impl<'a> IntoIterator for &'a CorridorSequence {
    type Item = &'a SequenceEntry;
    type IntoIter = std::slice::Iter<'a, SequenceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{cubic_spline::CubicSpline, params::ProjectionParams};
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    /// A straight corridor between two points.
    fn straight(id: CorridorId, from: (f64, f64), to: (f64, f64), half_width: f64) -> Arc<Corridor> {
        let line = CubicSpline::new(
            &[Vector2::new(from.0, from.1), Vector2::new(to.0, to.1)],
            None,
            ProjectionParams::default(),
        )
        .unwrap();
        Arc::new(Corridor::with_constant_distances(id, line, half_width, half_width).unwrap())
    }

    /// Corridor A along x in [0, 10] and corridor B along x in [10, 25].
    fn two_corridors() -> CorridorSequence {
        let mut seq = CorridorSequence::new();
        seq.push(straight(1, (0.0, 0.0), (10.0, 0.0), 1.0));
        seq.push(straight(2, (10.0, 0.0), (25.0, 0.0), 2.0));
        seq
    }

    #[test]
    fn test_empty_sequence() {
        let seq = CorridorSequence::new();

        assert!(seq.is_empty());
        assert!(matches!(seq.lookup(0.0), Err(SequenceError::EmptySequence)));
        assert!(matches!(seq.width_at(0.0), Err(SequenceError::EmptySequence)));
        assert!(matches!(seq.total_length(), Err(SequenceError::EmptySequence)));
        assert!(matches!(
            seq.frenet_position_with_frame(&Vector2::new(0.0, 0.0), 0.0),
            Err(SequenceError::EmptySequence)
        ));
    }

    #[test]
    fn test_total_length() {
        let mut seq = CorridorSequence::new();
        seq.insert(22.0, straight(3, (22.0, 0.0), (27.0, 0.0), 1.0))
            .unwrap();
        seq.insert(0.0, straight(1, (0.0, 0.0), (10.0, 0.0), 1.0))
            .unwrap();
        seq.insert(10.0, straight(2, (10.0, 0.0), (22.0, 0.0), 1.0))
            .unwrap();

        let ids: Vec<CorridorId> = seq.iter().map(|e| e.corridor.id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_relative_eq!(seq.total_length().unwrap(), 27.0, epsilon = 1e-12);
    }

    #[test]
    fn test_insert_errors() {
        let mut seq = two_corridors();

        assert!(matches!(
            seq.insert(10.0, straight(3, (0.0, 0.0), (1.0, 0.0), 1.0)),
            Err(SequenceError::DuplicateStart(_))
        ));
        assert!(matches!(
            seq.insert(std::f64::NAN, straight(3, (0.0, 0.0), (1.0, 0.0), 1.0)),
            Err(SequenceError::NonFiniteStart(_))
        ));
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_lookup() {
        let seq = two_corridors();

        let lookup = seq.lookup(4.0).unwrap();
        assert_eq!(lookup.index, 0);
        assert_relative_eq!(lookup.local_arc_length, 4.0);

        // Keys belong to the corridor starting there
        let lookup = seq.lookup(10.0).unwrap();
        assert_eq!(lookup.index, 1);
        assert_relative_eq!(lookup.local_arc_length, 0.0);

        // Outside the sequence the end corridors are extrapolated
        let lookup = seq.lookup(-2.0).unwrap();
        assert_eq!(lookup.index, 0);
        assert_relative_eq!(lookup.local_arc_length, -2.0);

        let lookup = seq.lookup(30.0).unwrap();
        assert_eq!(lookup.index, 1);
        assert_relative_eq!(lookup.local_arc_length, 20.0);
    }

    #[test]
    fn test_delegated_queries() {
        let seq = two_corridors();

        assert_relative_eq!(seq.width_at(5.0).unwrap(), 2.0);
        assert_relative_eq!(seq.width_at(15.0).unwrap(), 4.0);
        assert_eq!(seq.signed_distances_at(20.0).unwrap(), (2.0, -2.0));
        assert_relative_eq!(seq.center_offset_at(20.0).unwrap(), 0.0);
        assert_relative_eq!(seq.curvature_at(12.0).unwrap(), 0.0, epsilon = 1e-12);

        // Boundaries are clamped past the end of the sequence
        assert_relative_eq!(seq.width_at(40.0).unwrap(), 4.0);
    }

    #[test]
    fn test_hand_off_to_predecessor() {
        let seq = two_corridors();
        let point = Vector2::new(9.5, 1.0);

        // Against B alone the point lies before its start
        let in_b = seq.entries()[1]
            .corridor
            .frenet_position_with_frame(&point, None);
        assert_relative_eq!(in_b.position.l, -0.5, epsilon = 1e-9);

        let res = seq.frenet_position_with_frame(&point, 15.0).unwrap();
        assert_eq!(res.index, 0);
        assert_eq!(res.corridor_id, 1);
        assert_relative_eq!(res.start_arc_length, 0.0);
        assert_relative_eq!(res.local.position.l, 9.5, epsilon = 1e-9);
        assert_relative_eq!(res.local.position.d, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_hand_off_to_successor() {
        let seq = two_corridors();

        let res = seq
            .frenet_position_with_frame(&Vector2::new(12.0, -1.0), 5.0)
            .unwrap();
        assert_eq!(res.corridor_id, 2);
        assert_relative_eq!(res.local.position.l, 2.0, epsilon = 1e-9);
        assert_relative_eq!(res.local.position.d, -1.0, epsilon = 1e-9);

        let global = res.global_position();
        assert_relative_eq!(global.l, 12.0, epsilon = 1e-9);
        assert_relative_eq!(global.d, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_hand_off_walks_several_corridors() {
        let mut seq = CorridorSequence::new();
        seq.push(straight(1, (0.0, 0.0), (10.0, 0.0), 1.0));
        seq.push(straight(2, (10.0, 0.0), (20.0, 0.0), 1.0));
        seq.push(straight(3, (20.0, 0.0), (30.0, 0.0), 1.0));

        let res = seq
            .frenet_position_with_frame(&Vector2::new(3.0, 0.5), 25.0)
            .unwrap();
        assert_eq!(res.corridor_id, 1);
        assert_relative_eq!(res.local.position.l, 3.0, epsilon = 1e-9);

        let res = seq
            .frenet_position_with_frame(&Vector2::new(28.0, 0.5), 1.0)
            .unwrap();
        assert_eq!(res.corridor_id, 3);
        assert_relative_eq!(res.global_position().l, 28.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sequence_ends_extrapolate() {
        let seq = two_corridors();

        let res = seq
            .frenet_position_with_frame(&Vector2::new(-3.0, 0.0), 15.0)
            .unwrap();
        assert_eq!(res.corridor_id, 1);
        assert_relative_eq!(res.local.position.l, -3.0, epsilon = 1e-9);

        let res = seq
            .frenet_position_with_frame(&Vector2::new(30.0, 1.0), 0.0)
            .unwrap();
        assert_eq!(res.corridor_id, 2);
        assert_relative_eq!(res.local.position.l, 20.0, epsilon = 1e-9);
        assert_relative_eq!(res.global_position().l, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_walk_does_not_reverse() {
        // A gap between the corridors, so a point in it is past A but before B
        let mut seq = CorridorSequence::new();
        seq.insert(0.0, straight(1, (0.0, 0.0), (10.0, 0.0), 1.0))
            .unwrap();
        seq.insert(10.0, straight(2, (12.0, 0.0), (20.0, 0.0), 1.0))
            .unwrap();

        let res = seq
            .frenet_position_with_frame(&Vector2::new(11.0, 0.0), 5.0)
            .unwrap();
        assert_eq!(res.corridor_id, 2);
        assert_relative_eq!(res.local.position.l, -1.0, epsilon = 1e-9);

        let res = seq
            .frenet_position_with_frame(&Vector2::new(11.0, 0.0), 15.0)
            .unwrap();
        assert_eq!(res.corridor_id, 1);
        assert_relative_eq!(res.local.position.l, 11.0, epsilon = 1e-9);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let seq = two_corridors();
        let point = Vector2::new(17.3, 0.7);

        let first = seq.frenet_position_with_frame(&point, 12.0).unwrap();
        for hint in [12.0, 15.0, 20.0, 24.9].iter() {
            assert_eq!(seq.frenet_position_with_frame(&point, *hint).unwrap(), first);
        }
    }

    #[test]
    fn test_shared_corridors() {
        let shared = straight(1, (0.0, 0.0), (10.0, 0.0), 1.0);

        let mut route_a = CorridorSequence::new();
        route_a.push(shared.clone());
        route_a.push(straight(2, (10.0, 0.0), (20.0, 0.0), 1.0));

        let mut route_b = CorridorSequence::new();
        route_b.push(shared.clone());
        route_b.push(straight(3, (10.0, 0.0), (10.0, 10.0), 1.0));

        assert!(Arc::ptr_eq(&route_a.entries()[0].corridor, &route_b.entries()[0].corridor));
        assert_eq!(Arc::strong_count(&shared), 3);
        assert_relative_eq!(route_b.total_length().unwrap(), 20.0, epsilon = 1e-12);
    }
}
