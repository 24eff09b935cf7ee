//! The `unl` binary - command-line front end of the interpreter.
//!
//! Parses arguments with clap, wires the verbosity flag into the tracing
//! filter (major collections log at debug, minor collections at trace),
//! and hands off to [`unl_drv::Session`].

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ugc::config::{DEFAULT_HEAP_CHUNK_SIZE, DEFAULT_YOUNG_SIZE};
use ugc::GcConfig;
use unl_drv::{Config, Session};

/// An interpreter for the Unlambda programming language.
#[derive(Parser, Debug)]
#[command(name = "unl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "An interpreter for the Unlambda programming language")]
#[command(long_about = None)]
struct Cli {
    /// Program file; the program is read from standard input when omitted
    program: Option<PathBuf>,

    /// Increase diagnostic verbosity (-v run-end statistics, -vv major
    /// collections, -vvv minor collections)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Nursery half-size in cells
    #[arg(long, default_value_t = DEFAULT_YOUNG_SIZE)]
    young_size: usize,

    /// Old-generation chunk size in cells
    #[arg(long, default_value_t = DEFAULT_HEAP_CHUNK_SIZE)]
    heap_chunk_size: usize,

    /// Hard cap on old-generation cells (unlimited when omitted)
    #[arg(long)]
    max_heap_cells: Option<usize>,

    /// Run a minor collection at every safepoint
    #[arg(long, hide = true)]
    gc_stress: bool,

    /// Print run-end statistics as JSON to standard error
    #[arg(long)]
    stats_json: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config {
        program: cli.program,
        verbosity: cli.verbose,
        stats_json: cli.stats_json,
        gc: GcConfig {
            young_size: cli.young_size,
            heap_chunk_size: cli.heap_chunk_size,
            max_old_cells: cli.max_heap_cells,
            stress: cli.gc_stress,
            ..Default::default()
        },
    };

    if let Err(e) = Session::new(config).run() {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

/// Initialize the logging system.
///
/// `UNL_LOG` overrides the verbosity-derived filter when set.
fn init_logging(verbosity: u8) {
    let directives = match verbosity {
        0 | 1 => "warn",
        2 => "ugc=debug",
        _ => "ugc=trace",
    };
    let filter = EnvFilter::try_from_env("UNL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(directives));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}
