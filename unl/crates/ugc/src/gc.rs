//! GC Module - Minor and Major Collections
//!
//! Minor collection is a Cheney copy between the two nursery halves: roots
//! are copied, then to-space is scanned linearly and every child link is
//! rewritten through [`Heap::copy_cell`]. Each copy increments the cell's
//! age; a cell whose age has reached `age_max` is promoted into the old
//! generation instead, leaving a forwarding stub in to-space so the single
//! linear scan also fixes the promoted copy's children.
//!
//! Major collection is an iterative mark–sweep over the old chunks,
//! triggered when a promotion finds the freelist empty. Marking resolves
//! `Copied` forwarding left by an in-progress minor copy, so running a major
//! collection in the middle of a promotion is sound.
//!
//! There is no write barrier: cells are immutable after construction and a
//! cell's children are always at least as old as the cell itself, so a
//! promotion can never create an old-to-young edge.

use crate::cell::{Arity, Cell, CellRef, Tag};
use crate::error::{Result, UgcError};
use crate::heap::Heap;

impl Heap {
    /// Run a minor collection. `roots` is the mutator's live register set;
    /// the collector rewrites each entry to the moved location.
    pub fn collect_minor(&mut self, roots: &mut [&mut CellRef]) -> Result<()> {
        self.scratch.clear();
        for root in roots.iter() {
            self.scratch.push(**root);
        }
        self.run_minor()?;
        for (i, root) in roots.iter_mut().enumerate() {
            **root = self.scratch[i];
        }
        self.scratch.clear();
        Ok(())
    }

    fn run_minor(&mut self) -> Result<()> {
        let to_base = if self.active_base == 0 {
            self.config.young_size as u32
        } else {
            0
        };
        self.active_base = to_base;
        self.free = to_base;
        self.scan = to_base;

        let copied_before = self.stats.cells_copied;
        let promoted_before = self.stats.cells_promoted;

        for i in 0..self.scratch.len() {
            let moved = self.copy_cell(self.scratch[i])?;
            self.scratch[i] = moved;
        }

        while self.scan < self.free {
            let slot = CellRef(self.scan);
            self.scan += 1;
            let cell = *self.cell(slot);
            // A `Copied` slot in to-space is the scan-queue entry for a
            // promoted cell; fix the children of the old copy it points to.
            let target = if cell.tag == Tag::Copied { cell.l } else { slot };
            let tcell = *self.cell(target);
            match tcell.tag.arity() {
                Arity::Nullary => {}
                Arity::Unary => {
                    let l = self.copy_cell(tcell.l)?;
                    self.cell_mut(target).l = l;
                }
                Arity::Binary => {
                    let l = self.copy_cell(tcell.l)?;
                    self.cell_mut(target).l = l;
                    let r = self.copy_cell(tcell.r)?;
                    self.cell_mut(target).r = r;
                }
            }
        }

        self.stats.minor_collections += 1;
        tracing::trace!(
            copied = self.stats.cells_copied - copied_before,
            promoted = self.stats.cells_promoted - promoted_before,
            "minor collection"
        );
        Ok(())
    }

    /// Copy one cell into to-space (or promote it), returning its new
    /// location. Old cells are returned unchanged and forwarding is
    /// followed, so calling this twice on the same reference is harmless.
    fn copy_cell(&mut self, r: CellRef) -> Result<CellRef> {
        if r.is_nil() {
            return Ok(r);
        }
        let c = *self.cell(r);
        if c.age > self.config.age_max {
            return Ok(r);
        }
        if c.tag == Tag::Copied {
            return Ok(c.l);
        }
        if c.age == self.config.age_max {
            let dest = self.promote(c)?;
            let src = self.cell_mut(r);
            src.tag = Tag::Copied;
            src.l = dest;
            let stub = self.free;
            self.free += 1;
            self.young[stub as usize] = Cell {
                tag: Tag::Copied,
                ch: 0,
                age: 0,
                mark: false,
                l: dest,
                r: CellRef::NIL,
            };
            self.stats.cells_promoted += 1;
            Ok(dest)
        } else {
            let idx = self.free;
            self.free += 1;
            let mut copy = c;
            copy.age += 1;
            copy.mark = false;
            self.young[idx as usize] = copy;
            let dest = CellRef(idx);
            let src = self.cell_mut(r);
            src.tag = Tag::Copied;
            src.l = dest;
            self.stats.cells_copied += 1;
            Ok(dest)
        }
    }

    /// Move a cell into the old generation, running a major collection
    /// first when the freelist is empty.
    fn promote(&mut self, c: Cell) -> Result<CellRef> {
        let slot = match self.pop_free() {
            Some(slot) => slot,
            None => {
                self.collect_major()?;
                match self.pop_free() {
                    Some(slot) => slot,
                    None => {
                        return Err(UgcError::OutOfMemory(
                            "old generation exhausted during promotion".into(),
                        ))
                    }
                }
            }
        };
        let age = self.config.age_max + 1;
        *self.cell_mut(slot) = Cell {
            age,
            mark: false,
            ..c
        };
        Ok(slot)
    }

    /// Run a major collection: mark from the permanent roots and the
    /// current mutator root set, sweep the old chunks back onto the
    /// freelist, then grow the heap until the post-sweep free ratio holds.
    pub fn collect_major(&mut self) -> Result<()> {
        self.mark();
        let freed = self.sweep();
        self.stats.major_collections += 1;
        tracing::debug!(
            freed,
            live = self.old_capacity - self.free_cells,
            old_capacity = self.old_capacity,
            "major collection"
        );
        while (self.free_cells as f64) < self.old_capacity as f64 * self.config.min_free_ratio {
            match self.grow() {
                Ok(()) => {}
                Err(err) if self.free_cells > 0 => {
                    tracing::debug!("heap growth capped: {}", err);
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Iterative mark phase. Expression trees can be millions of cells
    /// deep, so the left child is tail-walked and only the right child is
    /// pushed on the explicit work stack.
    fn mark(&mut self) {
        self.mark_stack.clear();
        self.mark_stack.extend_from_slice(&self.roots);
        self.mark_stack.extend_from_slice(&self.scratch);
        while let Some(start) = self.mark_stack.pop() {
            let mut r = start;
            loop {
                if r.is_nil() {
                    break;
                }
                let c = *self.cell(r);
                if c.tag == Tag::Copied {
                    r = c.l;
                    continue;
                }
                if c.mark {
                    break;
                }
                self.cell_mut(r).mark = true;
                match c.tag.arity() {
                    Arity::Nullary => break,
                    Arity::Unary => r = c.l,
                    Arity::Binary => {
                        self.mark_stack.push(c.r);
                        r = c.l;
                    }
                }
            }
        }
    }

    /// Sweep the old chunks, rebuilding the freelist from unmarked cells,
    /// and clear every mark bit, nursery halves included.
    fn sweep(&mut self) -> usize {
        let chunk = self.config.heap_chunk_size;
        let base = self.young.len();
        let mut free_list = CellRef::NIL;
        let mut freed = 0usize;
        for (ci, cells) in self.chunks.iter_mut().enumerate() {
            for (si, cell) in cells.iter_mut().enumerate() {
                if cell.mark {
                    cell.mark = false;
                } else {
                    cell.l = free_list;
                    free_list = CellRef((base + ci * chunk + si) as u32);
                    freed += 1;
                }
            }
        }
        self.free_list = free_list;
        self.free_cells = freed;
        for cell in self.young.iter_mut() {
            cell.mark = false;
        }
        freed
    }
}
