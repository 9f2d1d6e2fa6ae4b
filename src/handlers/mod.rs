//! HTTP handlers for camps and their talks.

pub mod camps;
pub mod talks;
pub use camps::*;
pub use talks::*;
