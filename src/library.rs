//! Music library: scanning a folder into `Track`s and serving them as the
//! player's backend.

mod backend;
mod display;
mod model;
mod scan;
mod store;

pub use backend::LibraryBackend;
pub use model::{ArtistStats, Track, TrackId};
pub use scan::scan;
pub use store::PlayStore;
