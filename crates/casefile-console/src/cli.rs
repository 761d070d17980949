#![forbid(unsafe_code)]

//! Command-line argument parsing for the console.
//!
//! Parses args manually and applies `CASEFILE_*` environment overrides
//! first, so flags always win over the environment.

use std::env;
use std::path::PathBuf;
use std::process;

/// Crate version, printed by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Case-File Console: browse fictional subject records and keep notes on them

USAGE:
    casefile-console [OPTIONS]

OPTIONS:
    --catalog=PATH       Load subjects from a JSON file (default: built-in demo)
    --start=N            Start on subject N, 1-indexed (default: 1)
    --store=PATH         Notes file (default: $XDG_STATE_HOME/casefile-console/notes.json)
    --ephemeral          Keep notes in memory only, lost on exit
    --no-persist         Run with storage disabled (every save is ignored)
    --lock-discards      LOCK leaves edit mode without saving
    --no-mouse           Disable mouse event capture
    --log-file=PATH      Write logs to PATH (no logging otherwise)
    --log-json           Write logs as JSON lines
    --exit-after-ms=N    Quit automatically after N milliseconds
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS (viewing):
    Left / Right        Previous / next subject
    Up / Down, PgUp/Dn  Scroll the console
    e                   Enter edit mode
    q / Ctrl+C          Quit

KEYBINDINGS (editing):
    Ctrl+S              Save and lock
    Ctrl+R              Reset to the default record text
    Esc                 Discard edits
    Ctrl+C              Quit

ENVIRONMENT VARIABLES:
    CASEFILE_CATALOG         Override --catalog
    CASEFILE_START           Override --start
    CASEFILE_STORE           Override --store
    CASEFILE_LOG_FILE        Override --log-file
    CASEFILE_EXIT_AFTER_MS   Override --exit-after-ms
    RUST_LOG                 Log filter (default: info)";

/// Where notes are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreChoice {
    /// JSON file under the user's state directory.
    #[default]
    DefaultFile,
    /// JSON file at an explicit path.
    File(PathBuf),
    /// In-memory map for this process only.
    Ephemeral,
    /// Every storage call fails.
    Disabled,
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Subject catalog file, or `None` for the demo catalog.
    pub catalog: Option<PathBuf>,
    /// 1-indexed starting subject.
    pub start: usize,
    /// Notes backend.
    pub store: StoreChoice,
    /// Whether LOCK saves.
    pub lock_saves: bool,
    /// Whether mouse capture is enabled.
    pub mouse: bool,
    /// Log destination, if any.
    pub log_file: Option<PathBuf>,
    /// JSON log lines instead of text.
    pub log_json: bool,
    /// Auto-exit timer in milliseconds (0 = disabled).
    pub exit_after_ms: u64,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            catalog: None,
            start: 1,
            store: StoreChoice::DefaultFile,
            lock_saves: true,
            mouse: true,
            log_file: None,
            log_json: false,
            exit_after_ms: 0,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Run the console.
    Run(Opts),
    /// Print help and exit.
    Help,
    /// Print the version and exit.
    Version,
}

impl Opts {
    /// Parse the process arguments and environment.
    ///
    /// Prints help or version and exits when asked to; prints the error and
    /// exits with status 1 on bad input.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match parse_from(&args, |name| env::var(name).ok()) {
            Ok(ParseOutcome::Run(opts)) => opts,
            Ok(ParseOutcome::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(ParseOutcome::Version) => {
                println!("casefile-console {VERSION}");
                process::exit(0);
            }
            Err(message) => {
                eprintln!("{message}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Auto-exit timer, if enabled.
    #[must_use]
    pub fn exit_after(&self) -> Option<std::time::Duration> {
        (self.exit_after_ms > 0).then(|| std::time::Duration::from_millis(self.exit_after_ms))
    }

    /// 0-indexed starting subject.
    #[must_use]
    pub fn start_index(&self) -> usize {
        self.start.saturating_sub(1)
    }
}

/// Parse `args` (without the program name) with `env` supplying
/// environment variables.
///
/// # Errors
///
/// A message naming the offending argument or value.
pub fn parse_from<F>(args: &[String], env: F) -> Result<ParseOutcome, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut opts = Opts::default();

    // Environment variable defaults first.
    if let Some(val) = env("CASEFILE_CATALOG") {
        opts.catalog = Some(PathBuf::from(val));
    }
    if let Some(val) = env("CASEFILE_START")
        && let Ok(n) = val.parse()
    {
        opts.start = n;
    }
    if let Some(val) = env("CASEFILE_STORE") {
        opts.store = StoreChoice::File(PathBuf::from(val));
    }
    if let Some(val) = env("CASEFILE_LOG_FILE") {
        opts.log_file = Some(PathBuf::from(val));
    }
    if let Some(val) = env("CASEFILE_EXIT_AFTER_MS")
        && let Ok(n) = val.parse()
    {
        opts.exit_after_ms = n;
    }

    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => return Ok(ParseOutcome::Help),
            "--version" | "-V" => return Ok(ParseOutcome::Version),
            "--ephemeral" => opts.store = StoreChoice::Ephemeral,
            "--no-persist" => opts.store = StoreChoice::Disabled,
            "--lock-discards" => opts.lock_saves = false,
            "--no-mouse" => opts.mouse = false,
            "--log-json" => opts.log_json = true,
            other => {
                if let Some(val) = other.strip_prefix("--catalog=") {
                    opts.catalog = Some(PathBuf::from(non_empty("--catalog", val)?));
                } else if let Some(val) = other.strip_prefix("--start=") {
                    opts.start = match val.parse::<usize>() {
                        Ok(n) if n >= 1 => n,
                        _ => return Err(format!("Invalid --start value: {val}")),
                    };
                } else if let Some(val) = other.strip_prefix("--store=") {
                    opts.store = StoreChoice::File(PathBuf::from(non_empty("--store", val)?));
                } else if let Some(val) = other.strip_prefix("--log-file=") {
                    opts.log_file = Some(PathBuf::from(non_empty("--log-file", val)?));
                } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                    opts.exit_after_ms = val
                        .parse()
                        .map_err(|_| format!("Invalid --exit-after-ms value: {val}"))?;
                } else {
                    return Err(format!("Unknown argument: {other}"));
                }
            }
        }
    }

    Ok(ParseOutcome::Run(opts))
}

fn non_empty<'a>(flag: &str, val: &'a str) -> Result<&'a str, String> {
    if val.is_empty() {
        Err(format!("Empty {flag} value"))
    } else {
        Ok(val)
    }
}
