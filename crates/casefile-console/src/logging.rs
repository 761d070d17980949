#![forbid(unsafe_code)]

//! Log subscriber setup.
//!
//! The terminal belongs to the console UI, so logs only ever go to a file.
//! Without `--log-file` no subscriber is installed and `tracing` macros are
//! no-ops.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Errors from [`init`].
#[derive(Debug)]
pub enum LogError {
    /// The log file could not be opened.
    Io(io::Error),
    /// A global subscriber was already installed.
    AlreadySet,
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::Io(e) => write!(f, "cannot open log file: {e}"),
            LogError::AlreadySet => write!(f, "a global log subscriber is already installed"),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogError::Io(e) => Some(e),
            LogError::AlreadySet => None,
        }
    }
}

impl From<io::Error> for LogError {
    fn from(e: io::Error) -> Self {
        LogError::Io(e)
    }
}

/// Formatting layer writing plain text or JSON lines to `make_writer`.
pub fn format_layer<W>(make_writer: W, json: bool) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(make_writer)
        .with_ansi(false)
        .with_target(true);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber, appending to `path`.
///
/// # Errors
///
/// [`LogError::Io`] if the file cannot be opened, [`LogError::AlreadySet`]
/// if another subscriber is already installed.
pub fn init(path: &Path, json: bool) -> Result<(), LogError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::registry()
        .with(format_layer(Mutex::new(file), json))
        .with(env_filter())
        .try_init()
        .map_err(|_| LogError::AlreadySet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture(json: bool, f: impl FnOnce()) -> String {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::registry()
            .with(format_layer(move || writer.clone(), json))
            .with(EnvFilter::new("debug"));
        tracing::subscriber::with_default(subscriber, f);
        buf.contents()
    }

    #[test]
    fn text_lines_carry_fields() {
        let out = capture(false, || {
            tracing::info!(subject_id = "SUBJECT_001", "note saved");
        });
        assert!(out.contains("INFO"), "output: {out}");
        assert!(out.contains("note saved"), "output: {out}");
        assert!(out.contains("subject_id=\"SUBJECT_001\""), "output: {out}");
    }

    #[test]
    fn json_lines_parse() {
        let out = capture(true, || {
            tracing::warn!(backend = "DisabledStore", "note write failed");
        });
        let line = out.lines().next().expect("one log line");
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["fields"]["message"], "note write failed");
        assert_eq!(value["fields"]["backend"], "DisabledStore");
    }

    #[test]
    fn filter_drops_lower_levels() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::registry()
            .with(format_layer(move || writer.clone(), false))
            .with(EnvFilter::new("warn"));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("hidden");
            tracing::warn!("shown");
        });
        let out = buf.contents();
        assert!(!out.contains("hidden"));
        assert!(out.contains("shown"));
    }

    #[test]
    fn init_reports_unopenable_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let err = init(dir.path(), false).unwrap_err();
        assert!(matches!(err, LogError::Io(_)));
    }
}
