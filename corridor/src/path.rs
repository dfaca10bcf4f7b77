//! # Corridor paths
//!
//! A corridor path is one traversal order through the road graph, given as the corridors it
//! passes through. Several alternative paths are collected in [`CorridorPaths`]. Paths only hold
//! shared references, the same corridor can appear in any number of them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt;
use std::iter::FromIterator;
use std::sync::Arc;

use crate::{corridor::Corridor, sequence::CorridorSequence, types::CorridorId};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ordered list of corridors making up one route.
#[derive(Debug, Clone, Default)]
pub struct CorridorPath {
    corridors: Vec<Arc<Corridor>>,
}

/// A set of alternative corridor paths.
#[derive(Debug, Clone, Default)]
pub struct CorridorPaths {
    paths: Vec<CorridorPath>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CorridorPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, corridor: Arc<Corridor>) {
        self.corridors.push(corridor);
    }

    pub fn len(&self) -> usize {
        self.corridors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corridors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Corridor>> {
        self.corridors.iter()
    }

    /// The identifiers of the corridors in traversal order.
    pub fn ids(&self) -> Vec<CorridorId> {
        self.corridors.iter().map(|c| c.id()).collect()
    }

    /// Chain the corridors of this path end to end into a sequence.
    pub fn to_sequence(&self) -> CorridorSequence {
        let mut seq = CorridorSequence::new();
        for corridor in self.corridors.iter() {
            seq.push(corridor.clone());
        }
        seq
    }
}

impl FromIterator<Arc<Corridor>> for CorridorPath {
    fn from_iter<I: IntoIterator<Item = Arc<Corridor>>>(iter: I) -> Self {
        Self {
            corridors: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CorridorPath {
    type Item = &'a Arc<Corridor>;
    type IntoIter = std::slice::Iter<'a, Arc<Corridor>>;

    fn into_iter(self) -> Self::IntoIter {
        self.corridors.iter()
    }
}

impl fmt::Display for CorridorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Corridor-Path:")?;
        for corridor in self.corridors.iter() {
            write!(f, " -> {}", corridor.id())?;
        }
        writeln!(f)
    }
}

impl CorridorPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: CorridorPath) {
        self.paths.push(path);
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CorridorPath> {
        self.paths.iter()
    }
}

impl FromIterator<CorridorPath> for CorridorPaths {
    fn from_iter<I: IntoIterator<Item = CorridorPath>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CorridorPaths {
    type Item = &'a CorridorPath;
    type IntoIter = std::slice::Iter<'a, CorridorPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

impl fmt::Display for CorridorPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Corridor-Paths ---")?;
        for path in self.paths.iter() {
            writeln!(f, "{}", path)?;
        }
        Ok(())
    }
}
