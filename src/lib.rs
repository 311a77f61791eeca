//! Insert tracks, albums, playlists or a multi-selection after any slot of
//! the play queue, from a context menu.
//!
//! The player is reached only through the traits in [`host`]: the crate reads
//! the live queue, expands the selection, and splices the tracks in through
//! the player's append and insert-before primitives.

pub mod config;
pub mod error;
pub mod extension;
pub mod host;
pub mod logging;
pub mod menu;
pub mod queue;
pub mod ready;
pub mod resolver;

pub use error::Error;
pub use extension::Extension;
pub use resolver::{Selection, SelectionResolver};
