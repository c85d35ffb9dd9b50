//! Core types for the algebra kernel
//!
//! This module contains the fundamental types:
//! - `Ex` / `Node` / `NodeKind` - the expression DAG and its handle
//! - `Numeric` - exact numeric backend (integer, rational, complex, float)
//! - `Symbol` / `Constant` - the leaf kinds
//! - `KernelError` - error taxonomy
//! - Display formatting and canonical ordering

mod display; // Display implementations for Ex and Numeric
pub(crate) mod constant; // Named constants (pi, Euler, Catalan)
pub(crate) mod error; // Error types
pub(crate) mod expr; // Expression DAG (Ex, Node, NodeKind)
pub(crate) mod numeric; // Exact numeric backend
pub(crate) mod symbol; // Symbols with process-unique serials

// Public re-exports (for external API)
pub use constant::{Constant, ConstantValue};
pub use error::KernelError;
pub use expr::{Ex, InfoFlag, Kind, Node, NodeKind, RelOp};
pub use numeric::Numeric;
pub use symbol::Symbol;
