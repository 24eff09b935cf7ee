//! Heap Module - Arenas and Allocation
//!
//! The heap owns two fixed-size nursery halves (bump allocation) and a
//! chunked old generation whose free cells form a freelist threaded through
//! the `l` field. Minor and major collections live in [`crate::gc`].
//!
//! All references are [`CellRef`] indices: the nursery occupies indices
//! `0..2 * young_size`, old chunks are addressed above that base. Old cells
//! never move, so old references survive every collection unchanged.

use crate::cell::{Cell, CellRef, Tag};
use crate::config::GcConfig;
use crate::error::{Result, UgcError};
use crate::stats::{GcStats, GcSummary};

/// The generational heap.
pub struct Heap {
    pub(crate) config: GcConfig,

    /// Both nursery halves, contiguous. The active half is
    /// `active_base..active_base + young_size`.
    pub(crate) young: Vec<Cell>,
    /// Base index of the half currently being allocated into.
    pub(crate) active_base: u32,
    /// Bump pointer inside the active half.
    pub(crate) free: u32,
    /// Cheney scan pointer, meaningful only during a minor collection.
    pub(crate) scan: u32,

    /// Old-generation storage, `heap_chunk_size` cells per chunk.
    pub(crate) chunks: Vec<Vec<Cell>>,
    /// Head of the freelist threaded through `l`.
    pub(crate) free_list: CellRef,
    /// Number of cells on the freelist.
    pub(crate) free_cells: usize,
    /// Total old-generation cells across all chunks.
    pub(crate) old_capacity: usize,

    /// Permanent roots (interned combinators), live for the whole run.
    pub(crate) roots: Vec<CellRef>,
    /// Mutator roots handed over at the current safepoint.
    pub(crate) scratch: Vec<CellRef>,
    /// Reusable work stack for the major-collection mark phase.
    pub(crate) mark_stack: Vec<CellRef>,

    pub(crate) stats: GcStats,
}

impl Heap {
    /// Create a heap for the given configuration.
    pub fn new(config: GcConfig) -> Result<Self> {
        config.validate()?;
        let young = vec![Cell::default(); config.young_size * 2];
        Ok(Self {
            config,
            young,
            active_base: 0,
            free: 0,
            scan: 0,
            chunks: Vec::new(),
            free_list: CellRef::NIL,
            free_cells: 0,
            old_capacity: 0,
            roots: Vec::new(),
            scratch: Vec::new(),
            mark_stack: Vec::new(),
            stats: GcStats::default(),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    /// Collection counters.
    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    /// Snapshot of counters and occupancy for run-end reporting.
    pub fn summary(&self) -> GcSummary {
        GcSummary {
            minor_collections: self.stats.minor_collections,
            major_collections: self.stats.major_collections,
            cells_copied: self.stats.cells_copied,
            cells_promoted: self.stats.cells_promoted,
            heap_growths: self.stats.heap_growths,
            young_capacity: self.config.young_size,
            old_capacity: self.old_capacity,
            old_free: self.free_cells,
        }
    }

    /// Register a permanent root. Registered cells survive every major
    /// collection for the lifetime of the heap.
    pub fn register_root(&mut self, root: CellRef) {
        self.roots.push(root);
    }

    /// Read a cell. `r` must reference a live cell.
    #[inline]
    pub fn get(&self, r: CellRef) -> Cell {
        *self.cell(r)
    }

    /// Tag of a live cell.
    #[inline]
    pub fn tag(&self, r: CellRef) -> Tag {
        self.cell(r).tag
    }

    /// Fill the left child of a node under construction. Only the parser
    /// mutates published cells, and only while the tree is being built.
    pub fn set_left(&mut self, r: CellRef, child: CellRef) {
        self.cell_mut(r).l = child;
    }

    /// Fill the right child of a node under construction.
    pub fn set_right(&mut self, r: CellRef, child: CellRef) {
        self.cell_mut(r).r = child;
    }

    #[inline]
    pub(crate) fn cell(&self, r: CellRef) -> &Cell {
        let i = r.index();
        let nursery = self.young.len();
        if i < nursery {
            &self.young[i]
        } else {
            let off = i - nursery;
            let chunk = self.config.heap_chunk_size;
            &self.chunks[off / chunk][off % chunk]
        }
    }

    #[inline]
    pub(crate) fn cell_mut(&mut self, r: CellRef) -> &mut Cell {
        let i = r.index();
        let nursery = self.young.len();
        if i < nursery {
            &mut self.young[i]
        } else {
            let off = i - nursery;
            let chunk = self.config.heap_chunk_size;
            &mut self.chunks[off / chunk][off % chunk]
        }
    }

    /// Cells still available in the active nursery half. The evaluator
    /// checks this at its safepoints before allocating.
    #[inline]
    pub fn young_available(&self) -> usize {
        (self.active_base as usize + self.config.young_size) - self.free as usize
    }

    /// Bump-allocate a nursery cell. The caller must have checked
    /// availability at the last safepoint.
    pub fn alloc_young(&mut self, tag: Tag, ch: u8, l: CellRef, r: CellRef) -> CellRef {
        debug_assert!(self.young_available() > 0, "nursery overrun");
        let idx = self.free;
        self.free += 1;
        self.young[idx as usize] = Cell {
            tag,
            ch,
            age: 0,
            mark: false,
            l,
            r,
        };
        CellRef(idx)
    }

    /// Allocate an old-generation cell, growing the heap when the freelist
    /// is empty. Used by the parser and for interned constants, before any
    /// mutator roots exist; promotion during a collection goes through
    /// [`crate::gc`] instead so a major collection can run first.
    pub fn alloc_old(&mut self, tag: Tag, ch: u8, l: CellRef, r: CellRef) -> Result<CellRef> {
        let slot = match self.pop_free() {
            Some(slot) => slot,
            None => {
                self.grow()?;
                match self.pop_free() {
                    Some(slot) => slot,
                    None => {
                        return Err(UgcError::OutOfMemory(
                            "old generation exhausted after growth".into(),
                        ))
                    }
                }
            }
        };
        self.write_old(slot, tag, ch, l, r);
        Ok(slot)
    }

    pub(crate) fn write_old(&mut self, slot: CellRef, tag: Tag, ch: u8, l: CellRef, r: CellRef) {
        let age = self.config.age_max + 1;
        *self.cell_mut(slot) = Cell {
            tag,
            ch,
            age,
            mark: false,
            l,
            r,
        };
    }

    pub(crate) fn pop_free(&mut self) -> Option<CellRef> {
        if self.free_list.is_nil() {
            return None;
        }
        let head = self.free_list;
        self.free_list = self.cell(head).l;
        self.free_cells -= 1;
        Some(head)
    }

    /// Append one chunk to the old generation and thread its cells onto the
    /// freelist.
    pub(crate) fn grow(&mut self) -> Result<()> {
        let chunk = self.config.heap_chunk_size;
        if let Some(cap) = self.config.max_old_cells {
            if self.old_capacity + chunk > cap {
                return Err(UgcError::OutOfMemory(format!(
                    "old generation limit of {} cells reached",
                    cap
                )));
            }
        }
        let base = self.young.len() + self.old_capacity;
        if base + chunk >= u32::MAX as usize {
            return Err(UgcError::OutOfMemory(
                "cell address space exhausted".into(),
            ));
        }
        self.chunks.push(vec![Cell::default(); chunk]);
        self.old_capacity += chunk;
        let age = self.config.age_max + 1;
        let mut head = self.free_list;
        for i in 0..chunk {
            let slot = CellRef((base + i) as u32);
            let cell = self.cell_mut(slot);
            cell.age = age;
            cell.l = head;
            head = slot;
        }
        self.free_list = head;
        self.free_cells += chunk;
        self.stats.heap_growths += 1;
        tracing::debug!(
            chunk_cells = chunk,
            old_capacity = self.old_capacity,
            "grew old generation"
        );
        Ok(())
    }
}

/// The nullary combinators shared by every program.
///
/// Interned once in the old generation at startup and registered as
/// permanent roots; the parser and the evaluator hand these out instead of
/// allocating fresh atoms.
#[derive(Debug, Clone, Copy)]
pub struct Constants {
    pub i: CellRef,
    pub k: CellRef,
    pub s: CellRef,
    pub v: CellRef,
    pub d: CellRef,
    pub c: CellRef,
    pub e: CellRef,
    pub at: CellRef,
    pub pipe: CellRef,
}

impl Constants {
    /// Intern the shared combinators into `heap`.
    pub fn intern(heap: &mut Heap) -> Result<Constants> {
        let mut one = |tag: Tag| -> Result<CellRef> {
            let r = heap.alloc_old(tag, 0, CellRef::NIL, CellRef::NIL)?;
            heap.register_root(r);
            Ok(r)
        };
        Ok(Constants {
            i: one(Tag::I)?,
            k: one(Tag::K)?,
            s: one(Tag::S)?,
            v: one(Tag::V)?,
            d: one(Tag::D)?,
            c: one(Tag::C)?,
            e: one(Tag::E)?,
            at: one(Tag::At)?,
            pipe: one(Tag::Pipe)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_heap() -> Heap {
        Heap::new(GcConfig {
            young_size: 64,
            heap_chunk_size: 32,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_young_allocation_bumps() {
        let mut heap = small_heap();
        assert_eq!(heap.young_available(), 64);
        let a = heap.alloc_young(Tag::K, 0, CellRef::NIL, CellRef::NIL);
        let b = heap.alloc_young(Tag::Dot, b'x', CellRef::NIL, CellRef::NIL);
        assert_eq!(heap.young_available(), 62);
        assert_eq!(heap.tag(a), Tag::K);
        assert_eq!(heap.get(b).ch, b'x');
        assert_eq!(heap.get(b).age, 0);
    }

    #[test]
    fn test_old_allocation_grows_on_demand() {
        let mut heap = small_heap();
        assert_eq!(heap.old_capacity, 0);
        let r = heap.alloc_old(Tag::Ap, 0, CellRef::NIL, CellRef::NIL).unwrap();
        assert_eq!(heap.old_capacity, 32);
        assert_eq!(heap.free_cells, 31);
        assert!(heap.get(r).age > heap.config().age_max);
    }

    #[test]
    fn test_old_allocation_respects_cap() {
        let mut heap = Heap::new(GcConfig {
            young_size: 64,
            heap_chunk_size: 32,
            max_old_cells: Some(32),
            ..Default::default()
        })
        .unwrap();
        for _ in 0..32 {
            heap.alloc_old(Tag::I, 0, CellRef::NIL, CellRef::NIL).unwrap();
        }
        let err = heap
            .alloc_old(Tag::I, 0, CellRef::NIL, CellRef::NIL)
            .unwrap_err();
        assert!(matches!(err, UgcError::OutOfMemory(_)));
    }

    #[test]
    fn test_parser_style_child_fill() {
        let mut heap = small_heap();
        let ap = heap.alloc_old(Tag::Ap, 0, CellRef::NIL, CellRef::NIL).unwrap();
        let leaf = heap.alloc_old(Tag::I, 0, CellRef::NIL, CellRef::NIL).unwrap();
        heap.set_left(ap, leaf);
        heap.set_right(ap, leaf);
        assert_eq!(heap.get(ap).l, leaf);
        assert_eq!(heap.get(ap).r, leaf);
    }

    #[test]
    fn test_constants_are_interned_and_rooted() {
        let mut heap = small_heap();
        let consts = Constants::intern(&mut heap).unwrap();
        assert_eq!(heap.tag(consts.i), Tag::I);
        assert_eq!(heap.tag(consts.at), Tag::At);
        assert_eq!(heap.tag(consts.pipe), Tag::Pipe);
        assert_eq!(heap.roots.len(), 9);
        assert!(heap.get(consts.s).age > heap.config().age_max);
    }
}
