// This module re-exports important pieces for convenience,
// so we can "use crate::config::*" easily.
pub mod logging;
pub mod registration;
pub mod reviews;
pub mod types;

pub use logging::*;
pub use registration::*;
pub use reviews::*;
pub use types::*;
