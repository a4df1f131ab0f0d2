//! Persisted state.
//!
//! The only state kept between runs is the "previous conversion completed
//! cleanly" flag, which callers consult on startup.

mod config;
mod error;
mod store;

pub use config::StateConfig;
pub use error::StateError;
pub use store::{FileFlagStore, FlagStore, MemoryFlagStore, FLAG_FILE_NAME};
