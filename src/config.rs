//! Configuration loader and schema types.
//!
//! Settings tune playback defaults, the listen-time play counter, library
//! scanning and logging.

mod load;
mod schema;

pub use load::{default_config_path, default_store_path, resolve_config_path};
pub use schema::*;
