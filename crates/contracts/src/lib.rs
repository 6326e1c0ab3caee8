//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Absolute UTC instants (`chrono::DateTime<Utc>`) as the only clock
//! - Ranges are closed intervals; "overlap" means a strictly positive intersection

mod error;
mod event;
mod log_id;
mod matcher_config;
mod matching;
mod reader;
mod sensor;
mod session;
mod sink;
mod table;
mod time;
mod video;

pub use error::*;
pub use event::*;
pub use log_id::LogId;
pub use matcher_config::*;
pub use matching::*;
pub use reader::{has_extension, LogRecordReader, VideoMetadataReader};
pub use sensor::*;
pub use session::*;
pub use sink::*;
pub use table::*;
pub use time::*;
pub use video::*;
