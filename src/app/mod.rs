//! Application core: wires state, mode control, and the model runtime.

mod builder;
mod core;

pub use self::builder::CoreBuilder;
pub use self::core::AppCore;
