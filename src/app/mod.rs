//! Application runtime composition modules.

pub(crate) mod progress;
pub(crate) mod render;
pub(crate) mod runtime;
pub(crate) mod terminal;
