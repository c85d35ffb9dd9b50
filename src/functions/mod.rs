//! Named-function registry and the builtin transcendentals.

pub(crate) mod builtin;
pub(crate) mod registry;

pub use registry::{FunctionDef, fcall, register_function};
