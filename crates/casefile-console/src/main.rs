#![forbid(unsafe_code)]

//! Case-file console binary entry point.

use std::process;
use std::sync::Arc;

use casefile_console::catalog::Catalog;
use casefile_console::cli::{self, StoreChoice};
use casefile_console::clock::Clock;
use casefile_console::logging;
use casefile_console::notes::NoteStore;
use casefile_console::session::{ConsoleSession, SessionOptions};
use casefile_console::CaseFileApp;
use casefile_runtime::kv_store::{DisabledStore, FileStore, KeyValueStore, MemoryStore};
use casefile_runtime::{Program, ProgramConfig};

const APP_NAME: &str = "casefile-console";

fn main() {
    // Must run before any other thread exists.
    let clock = Clock::detect_local();
    let opts = cli::Opts::parse();

    if let Some(path) = &opts.log_file
        && let Err(e) = logging::init(path, opts.log_json)
    {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(1);
    }

    let catalog = match &opts.catalog {
        Some(path) => match Catalog::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("Failed to load catalog {}: {e}", path.display());
                process::exit(1);
            }
        },
        None => Catalog::demo(),
    };

    let notes = NoteStore::new(open_store(&opts.store));
    tracing::info!(
        version = cli::VERSION,
        store = notes.backend_name(),
        subjects = catalog.len(),
        "starting"
    );

    let session = ConsoleSession::starting_at(
        catalog,
        notes,
        SessionOptions {
            lock_saves: opts.lock_saves,
        },
        opts.start_index(),
    );
    let model = CaseFileApp::new(session)
        .with_clock(clock)
        .with_exit_after(opts.exit_after());

    let config = ProgramConfig {
        mouse: opts.mouse,
        ..ProgramConfig::default()
    };
    let mut program = match Program::with_config(model, config) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            process::exit(1);
        }
    };
    let result = program.run();
    // Restore the terminal before reporting anything.
    drop(program);
    if let Err(e) = result {
        eprintln!("Runtime error: {e}");
        process::exit(1);
    }
}

fn open_store(choice: &StoreChoice) -> Arc<dyn KeyValueStore> {
    match choice {
        StoreChoice::DefaultFile => Arc::new(FileStore::default_for_app(APP_NAME)),
        StoreChoice::File(path) => Arc::new(FileStore::new(path)),
        StoreChoice::Ephemeral => Arc::new(MemoryStore::new()),
        StoreChoice::Disabled => Arc::new(DisabledStore::new("persistence disabled")),
    }
}
