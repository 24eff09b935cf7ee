//! Configuration Module - Heap Tuning Parameters
//!
//! Manages all configuration parameters for the generational heap.
//! Most parameters have sensible defaults; the CLI only overrides sizes
//! and the hard memory cap.

use crate::error::{Result, UgcError};

/// Default nursery half-size in cells.
pub const DEFAULT_YOUNG_SIZE: usize = 64 * 1024;

/// Default old-generation chunk size in cells.
pub const DEFAULT_HEAP_CHUNK_SIZE: usize = 16 * 1024;

/// Default promotion age. A cell that has already survived this many
/// copies moves to the old generation on its next copy.
pub const DEFAULT_AGE_MAX: u8 = 2;

/// Configuration for the generational heap.
///
/// # Examples
///
/// ```rust
/// use ugc::GcConfig;
///
/// // Use default configuration
/// let config = GcConfig::default();
///
/// // Small heap with a hard cap, e.g. for tests
/// let config = GcConfig {
///     young_size: 1024,
///     max_old_cells: Some(16 * 1024),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct GcConfig {
    /// Cells per nursery half.
    ///
    /// The nursery holds two halves of this size; minor collections copy
    /// live cells from one half into the other.
    pub young_size: usize,

    /// Cells per old-generation chunk.
    ///
    /// The old generation grows by appending chunks of this size.
    pub heap_chunk_size: usize,

    /// Promotion threshold.
    ///
    /// A cell whose age equals this value at copy time is promoted to the
    /// old generation. Ages above it mark old-generation cells.
    pub age_max: u8,

    /// Fraction of old-generation cells that must be free after a major
    /// collection; the heap grows until the ratio holds.
    pub min_free_ratio: f64,

    /// Hard cap on old-generation cells. Exceeding it is a fatal
    /// out-of-memory error. `None` means unlimited.
    pub max_old_cells: Option<usize>,

    /// Run a minor collection at every safepoint.
    ///
    /// Used by the test suite to pin GC transparency; far too slow for
    /// normal operation.
    pub stress: bool,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            young_size: DEFAULT_YOUNG_SIZE,
            heap_chunk_size: DEFAULT_HEAP_CHUNK_SIZE,
            age_max: DEFAULT_AGE_MAX,
            min_free_ratio: 0.2,
            max_old_cells: None,
            stress: false,
        }
    }
}

impl GcConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if self.young_size < 16 {
            return Err(UgcError::Configuration(format!(
                "young_size must be at least 16 cells, got {}",
                self.young_size
            )));
        }
        if self.young_size > (1 << 28) {
            return Err(UgcError::Configuration(format!(
                "young_size must be at most {} cells, got {}",
                1usize << 28,
                self.young_size
            )));
        }
        if self.heap_chunk_size < 16 {
            return Err(UgcError::Configuration(format!(
                "heap_chunk_size must be at least 16 cells, got {}",
                self.heap_chunk_size
            )));
        }
        if self.age_max == 0 || self.age_max == u8::MAX {
            return Err(UgcError::Configuration(format!(
                "age_max must be between 1 and 254, got {}",
                self.age_max
            )));
        }
        if !(self.min_free_ratio > 0.0 && self.min_free_ratio < 1.0) {
            return Err(UgcError::Configuration(format!(
                "min_free_ratio must be in (0, 1), got {}",
                self.min_free_ratio
            )));
        }
        if let Some(cap) = self.max_old_cells {
            if cap < self.heap_chunk_size {
                return Err(UgcError::Configuration(format!(
                    "max_old_cells ({}) is smaller than one heap chunk ({})",
                    cap, self.heap_chunk_size
                )));
            }
        }
        Ok(())
    }
}
