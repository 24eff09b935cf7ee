//! Stats Module - Collection Counters
//!
//! Counters the heap maintains across a run, plus the summary snapshot the
//! driver prints at exit. The interpreter is single-threaded, so these are
//! plain integers.

use serde::Serialize;
use std::fmt;

/// Counters updated by the allocator and the collectors.
#[derive(Debug, Default, Clone)]
pub struct GcStats {
    /// Completed minor collections.
    pub minor_collections: u64,
    /// Completed major collections.
    pub major_collections: u64,
    /// Cells copied between nursery halves.
    pub cells_copied: u64,
    /// Cells promoted into the old generation.
    pub cells_promoted: u64,
    /// Old-generation chunks appended.
    pub heap_growths: u64,
}

/// Snapshot of counters and heap occupancy for run-end reporting.
#[derive(Debug, Clone, Serialize)]
pub struct GcSummary {
    pub minor_collections: u64,
    pub major_collections: u64,
    pub cells_copied: u64,
    pub cells_promoted: u64,
    pub heap_growths: u64,
    /// Cells per nursery half.
    pub young_capacity: usize,
    /// Total old-generation cells.
    pub old_capacity: usize,
    /// Old-generation cells on the freelist.
    pub old_free: usize,
}

impl fmt::Display for GcSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "minor collections: {}", self.minor_collections)?;
        writeln!(f, "major collections: {}", self.major_collections)?;
        writeln!(f, "cells copied:      {}", self.cells_copied)?;
        writeln!(f, "cells promoted:    {}", self.cells_promoted)?;
        writeln!(f, "heap growths:      {}", self.heap_growths)?;
        write!(
            f,
            "old generation:    {} cells ({} free), nursery half: {} cells",
            self.old_capacity, self.old_free, self.young_capacity
        )
    }
}
