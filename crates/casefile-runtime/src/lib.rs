#![forbid(unsafe_code)]

//! Runtime for the case-file console.
//!
//! - [`program`]: the `Model`/`Cmd` update loop bound to a real terminal.
//! - [`simulator`]: the same loop without a terminal, for tests.
//! - [`frame`] and [`presenter`]: cell grids and their ANSI output.
//! - [`kv_store`]: string key-value storage backends.

pub mod frame;
pub mod kv_store;
pub mod presenter;
pub mod program;
pub mod simulator;

pub use kv_store::{DisabledStore, KeyValueStore, MemoryStore, StoreError, StoreResult};
#[cfg(feature = "file-store")]
pub use kv_store::FileStore;
pub use program::{Cmd, Model, Program, ProgramConfig};
