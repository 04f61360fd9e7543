//! Internal utilities.

pub mod logging;
