pub mod batch;
pub mod battle;
mod error;
pub mod json_scan;
pub mod schema;
pub mod stats;
mod wotreplay;

pub use batch::*;
pub use battle::*;
pub use error::*;
pub use stats::*;
pub use strum;
pub use wotreplay::*;
