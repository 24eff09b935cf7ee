//! unl-drv - Interpreter Driver
//!
//! The driver is the entry point and orchestrator for one interpreter run:
//!
//! 1. Obtain the program text - a named file, or standard input.
//! 2. Lex and parse it into a heap tree.
//! 3. For programs arriving on standard input, discard the rest of the
//!    program's final line so that `@`, `?` and `|` see only the intended
//!    input stream; everything after that line is program input.
//! 4. Run the machine against standard input/output.
//! 5. Report run-end statistics on standard error when asked to.
//!
//! Exit discipline: any error anywhere in the pipeline is fatal; the
//! binary prints it and exits with a non-zero status.

mod error;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read};
use std::path::PathBuf;

use ugc::{CellRef, Constants, GcConfig, Heap};
use unl_eval::Machine;
use unl_lex::Lexer;
use unl_par::Parser;

pub use error::{DriverError, Result};

/// Configuration for one interpreter run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Program file; `None` reads the program from standard input.
    pub program: Option<PathBuf>,

    /// Diagnostic level: 0 silent, 1 run-end statistics, higher levels
    /// enable collector logging through the tracing filter.
    pub verbosity: u8,

    /// Emit run-end statistics as JSON instead of the text form.
    pub stats_json: bool,

    /// Heap tuning.
    pub gc: GcConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            program: None,
            verbosity: 0,
            stats_json: false,
            gc: GcConfig::default(),
        }
    }
}

/// One interpreter invocation.
pub struct Session {
    config: Config,
}

impl Session {
    /// Create a new session.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the program to completion.
    pub fn run(&self) -> Result<()> {
        let mut heap = Heap::new(self.config.gc.clone())?;
        let consts = Constants::intern(&mut heap)?;

        let steps = match &self.config.program {
            Some(path) => {
                let file = File::open(path).map_err(|e| DriverError::OpenProgram {
                    path: path.clone(),
                    source: e,
                })?;
                let mut lexer = Lexer::new(BufReader::new(file));
                let program = Parser::new(&mut heap, consts).parse(&mut lexer)?;
                evaluate(&mut heap, consts, program, io::stdin().lock())?
            }
            None => {
                let mut lexer = Lexer::new(BufReader::new(io::stdin().lock()));
                let program = Parser::new(&mut heap, consts).parse(&mut lexer)?;
                // bytes after the program on its final line are not input
                lexer.skip_line()?;
                evaluate(&mut heap, consts, program, lexer.into_reader())?
            }
        };

        self.report(&heap, steps)
    }

    fn report(&self, heap: &Heap, steps: u64) -> Result<()> {
        if self.config.stats_json {
            let stats = serde_json::json!({
                "reductions": steps,
                "gc": heap.summary(),
            });
            eprintln!("{}", serde_json::to_string(&stats)?);
        } else if self.config.verbosity > 0 {
            eprintln!("reductions:        {}", steps);
            eprintln!("{}", heap.summary());
        }
        Ok(())
    }
}

fn evaluate<R: Read>(
    heap: &mut Heap,
    consts: Constants,
    program: CellRef,
    input: R,
) -> Result<u64> {
    let stdout = io::stdout().lock();
    let mut machine = Machine::new(heap, consts, input, BufWriter::new(stdout));
    machine.run(program)?;
    Ok(machine.steps())
}
