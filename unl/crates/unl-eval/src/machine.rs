//! The combinator machine.
//!
//! Evaluation runs over four registers plus a heap-allocated continuation
//! spine:
//!
//! - `val` - expression under evaluation, or the most recent result;
//! - `op` - operator selected by an apply step;
//! - `task`/`task_val` - the top continuation frame, held out of the heap;
//! - `next_cont` - the rest of the spine, a chain of frame cells.
//!
//! The loop alternates three modes. `Eval` walks the left spine of an
//! application tree, pushing an `EvalRight` frame per node. `Return` hands
//! `val` to the top frame. `Apply` dispatches on the operator tag,
//! performing combinator reduction, the partial-application rewrites and
//! character I/O.
//!
//! Lazy `d` lives in the `EvalRight` handler: if the operator evaluated to
//! `d`, the operand is frozen into a `D1` cell instead of being evaluated.
//! `c` reifies the spine (after spilling the register-held frame) into a
//! `Cont` cell; applying a `Cont` replaces the live spine with the captured
//! one. Spines are immutable, so a continuation may be invoked any number
//! of times.
//!
//! GC safepoints sit at the two places that allocate: before each left-
//! spine descent step (one cell) and on entry to each apply dispatch (two
//! cells). No path allocates more than its safepoint reserved, and every
//! live reference is in the register root set at those points.

use crate::error::{EvalError, Result};
use std::io::{ErrorKind, Read, Write};
use ugc::{CellRef, Constants, Heap, Tag};

/// The register-held top continuation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// Operator done; `task_val` is the unevaluated operand.
    EvalRight,
    /// Operator done; `task_val` is an `Ap` pair of already-evaluated
    /// halves (the second substitution argument of `s`).
    EvalRightS,
    /// Apply the saved operator `task_val` to the incoming value.
    Apply,
    /// Apply the incoming value to the saved operand `task_val`.
    ApplyT,
    /// Evaluation is complete.
    Exit,
}

impl Frame {
    fn tag(self) -> Tag {
        match self {
            Frame::EvalRight => Tag::EvalRight,
            Frame::EvalRightS => Tag::EvalRightS,
            Frame::Apply => Tag::Apply,
            Frame::ApplyT => Tag::ApplyT,
            Frame::Exit => Tag::Exit,
        }
    }

    fn from_tag(tag: Tag) -> Option<Frame> {
        match tag {
            Tag::EvalRight => Some(Frame::EvalRight),
            Tag::EvalRightS => Some(Frame::EvalRightS),
            Tag::Apply => Some(Frame::Apply),
            Tag::ApplyT => Some(Frame::ApplyT),
            Tag::Exit => Some(Frame::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Eval,
    Return,
    Apply,
}

/// The evaluator.
pub struct Machine<'h, R, W> {
    heap: &'h mut Heap,
    consts: Constants,
    input: R,
    output: W,

    val: CellRef,
    op: CellRef,
    task: Frame,
    task_val: CellRef,
    next_cont: CellRef,

    /// Last byte read by `@`; `None` means end of input (and is the
    /// initial state, before anything has been read).
    current: Option<u8>,

    /// Apply dispatches performed, for run-end reporting.
    steps: u64,
}

impl<'h, R: Read, W: Write> Machine<'h, R, W> {
    /// Creates a machine evaluating on `heap` with the given I/O streams.
    pub fn new(heap: &'h mut Heap, consts: Constants, input: R, output: W) -> Self {
        Self {
            heap,
            consts,
            input,
            output,
            val: CellRef::NIL,
            op: CellRef::NIL,
            task: Frame::Exit,
            task_val: CellRef::NIL,
            next_cont: CellRef::NIL,
            current: None,
            steps: 0,
        }
    }

    /// Number of apply dispatches performed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Evaluates `program` to a value, performing its I/O on the way.
    pub fn run(&mut self, program: CellRef) -> Result<CellRef> {
        self.val = program;
        self.op = CellRef::NIL;
        self.task = Frame::Exit;
        self.task_val = CellRef::NIL;
        self.next_cont = CellRef::NIL;

        let mut mode = Mode::Eval;
        loop {
            mode = match mode {
                Mode::Eval => self.step_eval()?,
                Mode::Return => match self.step_return()? {
                    Some(next) => next,
                    None => {
                        self.output.flush()?;
                        tracing::trace!(steps = self.steps, "machine halted");
                        return Ok(self.val);
                    }
                },
                Mode::Apply => self.step_apply()?,
            };
        }
    }

    /// Walk the left spine of `val` down to its leftmost atom, pushing an
    /// `EvalRight` frame per application node.
    fn step_eval(&mut self) -> Result<Mode> {
        loop {
            self.safepoint(1)?;
            let cell = self.heap.get(self.val);
            if cell.tag != Tag::Ap {
                return Ok(Mode::Return);
            }
            self.push_frame(Frame::EvalRight, cell.r);
            self.val = cell.l;
        }
    }

    /// Hand `val` to the top continuation frame.
    fn step_return(&mut self) -> Result<Option<Mode>> {
        match self.task {
            Frame::Exit => Ok(None),
            Frame::EvalRight => {
                let rand = self.task_val;
                if self.heap.tag(self.val) == Tag::D {
                    // `d` in operator position freezes its operand
                    let frozen = self
                        .heap
                        .alloc_young(Tag::D1, 0, rand, CellRef::NIL);
                    self.pop_frame()?;
                    self.val = frozen;
                    Ok(Some(Mode::Return))
                } else {
                    self.task = Frame::Apply;
                    self.task_val = self.val;
                    self.val = rand;
                    Ok(Some(Mode::Eval))
                }
            }
            Frame::EvalRightS => {
                // both halves of the pair are already evaluated
                let pair = self.heap.get(self.task_val);
                self.task = Frame::Apply;
                self.task_val = self.val;
                self.op = pair.l;
                self.val = pair.r;
                Ok(Some(Mode::Apply))
            }
            Frame::Apply => {
                self.op = self.task_val;
                self.pop_frame()?;
                Ok(Some(Mode::Apply))
            }
            Frame::ApplyT => {
                self.op = self.val;
                self.val = self.task_val;
                self.pop_frame()?;
                Ok(Some(Mode::Apply))
            }
        }
    }

    /// Apply the operator in `op` to the operand in `val`.
    fn step_apply(&mut self) -> Result<Mode> {
        self.safepoint(2)?;
        self.steps += 1;
        let op = self.heap.get(self.op);
        match op.tag {
            Tag::I => Ok(Mode::Return),

            Tag::Dot => {
                self.write_byte(op.ch)?;
                Ok(Mode::Return)
            }

            Tag::K => {
                self.val = self
                    .heap
                    .alloc_young(Tag::K1, 0, self.val, CellRef::NIL);
                Ok(Mode::Return)
            }

            Tag::K1 => {
                self.val = op.l;
                Ok(Mode::Return)
            }

            Tag::S => {
                // `s applied to `kf is B f
                let arg = self.heap.get(self.val);
                self.val = if arg.tag == Tag::K1 {
                    self.heap.alloc_young(Tag::B1, 0, arg.l, CellRef::NIL)
                } else {
                    self.heap.alloc_young(Tag::S1, 0, self.val, CellRef::NIL)
                };
                Ok(Mode::Return)
            }

            Tag::S1 => {
                let arg = self.heap.get(self.val);
                if arg.tag == Tag::K1 {
                    // S f (K g) collapses before S2 can form
                    let f = self.heap.get(op.l);
                    self.val = match f.tag {
                        // S I (K g) x = x g
                        Tag::I => self.heap.alloc_young(Tag::T1, 0, arg.l, CellRef::NIL),
                        // S (T x) (K y) z = (z x) y
                        Tag::T1 => self.heap.alloc_young(Tag::V2, 0, f.l, arg.l),
                        // S f (K g) x = (f x) g
                        _ => self.heap.alloc_young(Tag::C2, 0, op.l, arg.l),
                    };
                } else {
                    self.val = self.heap.alloc_young(Tag::S2, 0, op.l, self.val);
                }
                Ok(Mode::Return)
            }

            Tag::B1 => {
                self.val = self.heap.alloc_young(Tag::B2, 0, op.l, self.val);
                Ok(Mode::Return)
            }

            Tag::T1 => {
                // T x y = y x
                let x = op.l;
                self.op = self.val;
                self.val = x;
                Ok(Mode::Apply)
            }

            Tag::S2 => {
                // S f g x = (f x)(g x); evaluate f x now, g x afterwards
                let pair = self.heap.alloc_young(Tag::Ap, 0, op.r, self.val);
                self.push_frame(Frame::EvalRightS, pair);
                self.op = op.l;
                Ok(Mode::Apply)
            }

            Tag::B2 => {
                // B f g x = f (g x); B d g x short-circuits to a delay
                if self.heap.tag(op.l) == Tag::D {
                    let inner = self.heap.alloc_young(Tag::Ap, 0, op.r, self.val);
                    self.val = self
                        .heap
                        .alloc_young(Tag::D1, 0, inner, CellRef::NIL);
                    Ok(Mode::Return)
                } else {
                    self.push_frame(Frame::Apply, op.l);
                    self.op = op.r;
                    Ok(Mode::Apply)
                }
            }

            Tag::C2 => {
                // C f g x = (f x) g
                self.push_frame(Frame::ApplyT, op.r);
                self.op = op.l;
                Ok(Mode::Apply)
            }

            Tag::V2 => {
                // V x y z = (z x) y
                self.push_frame(Frame::ApplyT, op.r);
                let z = self.val;
                self.val = op.l;
                self.op = z;
                Ok(Mode::Apply)
            }

            Tag::V => {
                // the black hole absorbs anything
                self.val = self.op;
                Ok(Mode::Return)
            }

            Tag::D => {
                self.val = self
                    .heap
                    .alloc_young(Tag::D1, 0, self.val, CellRef::NIL);
                Ok(Mode::Return)
            }

            Tag::D1 => {
                // force the delayed expression, then apply it to val
                self.push_frame(Frame::ApplyT, self.val);
                self.val = op.l;
                Ok(Mode::Eval)
            }

            Tag::C => {
                // spill the register frame, then capture the whole spine
                self.push_frame(Frame::Apply, self.val);
                self.val = self
                    .heap
                    .alloc_young(Tag::Cont, 0, self.next_cont, CellRef::NIL);
                Ok(Mode::Return)
            }

            Tag::Cont => {
                self.next_cont = op.l;
                self.pop_frame()?;
                Ok(Mode::Return)
            }

            Tag::E => {
                // terminate with the current value; the rest of the
                // continuation is discarded
                self.task = Frame::Exit;
                self.task_val = CellRef::NIL;
                self.next_cont = CellRef::NIL;
                Ok(Mode::Return)
            }

            Tag::At => {
                self.current = self.read_byte()?;
                self.push_frame(Frame::Apply, self.val);
                self.val = if self.current.is_some() {
                    self.consts.i
                } else {
                    self.consts.v
                };
                Ok(Mode::Return)
            }

            Tag::Ques => {
                // end of input never equals a payload byte
                self.push_frame(Frame::Apply, self.val);
                self.val = if self.current == Some(op.ch) {
                    self.consts.i
                } else {
                    self.consts.v
                };
                Ok(Mode::Return)
            }

            Tag::Pipe => {
                self.push_frame(Frame::Apply, self.val);
                self.val = match self.current {
                    Some(byte) => self.heap.alloc_young(Tag::Dot, byte, CellRef::NIL, CellRef::NIL),
                    None => self.consts.v,
                };
                Ok(Mode::Return)
            }

            other => Err(EvalError::internal(format!(
                "cannot apply cell with tag {other:?}"
            ))),
        }
    }

    /// Spill the register frame onto the heap spine and install a new one.
    fn push_frame(&mut self, frame: Frame, value: CellRef) {
        let spilled =
            self.heap
                .alloc_young(self.task.tag(), 0, self.next_cont, self.task_val);
        self.next_cont = spilled;
        self.task = frame;
        self.task_val = value;
    }

    /// Load the head of the heap spine into the frame registers.
    fn pop_frame(&mut self) -> Result<()> {
        if self.next_cont.is_nil() {
            return Err(EvalError::internal("continuation spine underflow"));
        }
        let cell = self.heap.get(self.next_cont);
        let frame = Frame::from_tag(cell.tag).ok_or_else(|| {
            EvalError::internal(format!(
                "continuation spine holds non-frame cell {:?}",
                cell.tag
            ))
        })?;
        self.task = frame;
        self.task_val = cell.r;
        self.next_cont = cell.l;
        Ok(())
    }

    /// Declare a safepoint needing `cells` nursery cells. Every live heap
    /// reference is in the handed-over register set here.
    ///
    /// A single collection can come up empty when the whole nursery is
    /// live (a deep continuation spine, for instance); consecutive
    /// collections age the survivors until they promote. Promotion leaves
    /// a forwarding stub in to-space for one cycle, so the nursery is
    /// guaranteed drained after `age_max + 2` rounds.
    fn safepoint(&mut self, cells: usize) -> Result<()> {
        if !self.heap.config().stress && self.heap.young_available() >= cells {
            return Ok(());
        }
        let rounds = self.heap.config().age_max as usize + 2;
        for _ in 0..rounds {
            self.heap.collect_minor(&mut [
                &mut self.val,
                &mut self.op,
                &mut self.task_val,
                &mut self.next_cont,
            ])?;
            if self.heap.young_available() >= cells {
                return Ok(());
            }
        }
        Err(EvalError::Heap(ugc::UgcError::OutOfMemory(
            "nursery exhausted by live data".into(),
        )))
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.output.write_all(&[byte])?;
        Ok(())
    }

    /// Read one byte; pending output is flushed first so interactive
    /// programs see their prompts.
    fn read_byte(&mut self) -> Result<Option<u8>> {
        self.output.flush()?;
        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(EvalError::Io(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ugc::GcConfig;

    fn heap_and_consts() -> (Heap, Constants) {
        let mut heap = Heap::new(GcConfig {
            young_size: 256,
            heap_chunk_size: 128,
            ..Default::default()
        })
        .unwrap();
        let consts = Constants::intern(&mut heap).unwrap();
        (heap, consts)
    }

    #[test]
    fn test_atom_evaluates_to_itself() {
        let (mut heap, consts) = heap_and_consts();
        let mut machine = Machine::new(&mut heap, consts, &b""[..], Vec::new());
        let result = machine.run(consts.k).unwrap();
        assert_eq!(result, consts.k);
    }

    #[test]
    fn test_identity_application() {
        let (mut heap, consts) = heap_and_consts();
        let program = heap
            .alloc_old(Tag::Ap, 0, consts.i, consts.v)
            .unwrap();
        let mut machine = Machine::new(&mut heap, consts, &b""[..], Vec::new());
        let result = machine.run(program).unwrap();
        assert_eq!(result, consts.v);
    }

    #[test]
    fn test_dot_writes_and_returns_operand() {
        let (mut heap, consts) = heap_and_consts();
        let dot = heap
            .alloc_old(Tag::Dot, b'H', CellRef::NIL, CellRef::NIL)
            .unwrap();
        let program = heap.alloc_old(Tag::Ap, 0, dot, consts.i).unwrap();
        let mut out = Vec::new();
        let mut machine = Machine::new(&mut heap, consts, &b""[..], &mut out);
        let result = machine.run(program).unwrap();
        assert_eq!(result, consts.i);
        assert_eq!(out, b"H");
    }

    #[test]
    fn test_k_discards_second_argument() {
        // ``k v i -> v
        let (mut heap, consts) = heap_and_consts();
        let k1 = heap.alloc_old(Tag::Ap, 0, consts.k, consts.v).unwrap();
        let program = heap.alloc_old(Tag::Ap, 0, k1, consts.i).unwrap();
        let mut machine = Machine::new(&mut heap, consts, &b""[..], Vec::new());
        let result = machine.run(program).unwrap();
        assert_eq!(result, consts.v);
    }

    #[test]
    fn test_applying_non_operator_is_internal_error() {
        let (mut heap, consts) = heap_and_consts();
        let bogus = heap
            .alloc_old(Tag::Ap, 0, CellRef::NIL, CellRef::NIL)
            .unwrap();
        // an Ap cell can never reach the operator register through eval;
        // feed one directly to expose the internal-error path
        let mut machine = Machine::new(&mut heap, consts, &b""[..], Vec::new());
        machine.val = consts.i;
        machine.op = bogus;
        let err = machine.step_apply().unwrap_err();
        assert!(matches!(err, EvalError::Internal(_)));
    }

    #[test]
    fn test_steps_counter_advances() {
        let (mut heap, consts) = heap_and_consts();
        let program = heap.alloc_old(Tag::Ap, 0, consts.i, consts.i).unwrap();
        let mut machine = Machine::new(&mut heap, consts, &b""[..], Vec::new());
        machine.run(program).unwrap();
        assert_eq!(machine.steps(), 1);
    }
}
