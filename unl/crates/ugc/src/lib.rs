//! # UGC - Generational Cell Heap
//!
//! UGC is the memory subsystem of the `unl` interpreter: a generational
//! garbage collector over fixed-layout combinator cells.
//!
//! ## Overview
//!
//! - **Cell arena**: every heap object is a [`Cell`] (tag, byte payload,
//!   age, mark bit, two child links) addressed by a [`CellRef`] index.
//! - **Nursery**: two equal halves with bump-pointer allocation. Minor
//!   collections Cheney-copy the live cells into the other half,
//!   incrementing each survivor's age.
//! - **Old generation**: fixed-size chunks whose free cells form a freelist
//!   threaded through the `l` link. Cells reaching the promotion age move
//!   here and never move again. Major collections are iterative mark–sweep
//!   over the chunks.
//! - **No write barrier**: cells are immutable after construction (the
//!   minor-GC `Copied` retagging and the parser's fill-in of nodes under
//!   construction are the only exceptions), and a cell's children are
//!   always at least as old as the cell, so no old-to-young edge can exist
//!   at a safepoint.
//!
//! ## Quick Start
//!
//! ```rust
//! use ugc::{CellRef, Constants, GcConfig, Heap, Tag};
//!
//! fn main() -> ugc::Result<()> {
//!     let mut heap = Heap::new(GcConfig::default())?;
//!     let consts = Constants::intern(&mut heap)?;
//!
//!     // The mutator allocates transient cells in the nursery...
//!     let mut k1 = heap.alloc_young(Tag::K1, 0, consts.i, CellRef::NIL);
//!
//!     // ...and hands its live registers to the collector at safepoints.
//!     heap.collect_minor(&mut [&mut k1])?;
//!     assert_eq!(heap.tag(k1), Tag::K1);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`cell`]: object model ([`Cell`], [`Tag`], [`CellRef`])
//! - [`config`]: heap tuning parameters and validation
//! - [`error`]: error types
//! - [`gc`]: minor (Cheney copy) and major (mark–sweep) collections
//! - [`heap`]: arenas, allocation, interned constants
//! - [`stats`]: collection counters and the run-end summary

pub mod cell;
pub mod config;
pub mod error;
pub mod gc;
pub mod heap;
pub mod stats;

pub use cell::{Arity, Cell, CellRef, Tag};
pub use config::GcConfig;
pub use error::{Result, UgcError};
pub use heap::{Constants, Heap};
pub use stats::{GcStats, GcSummary};

/// UGC version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
