//! Spinor Parameter Resolution
//!
//! Turns symbolic placeholders (named variables, or algebraic
//! expressions built from them) into concrete numeric values, given an
//! immutable binding table.
//!
//! # Architecture
//!
//! - [`BindingTable`]: insertion-ordered, read-only mapping from
//!   [`ParamKey`] (name string or symbol) to [`ParamValue`] (number,
//!   alias name, or expression)
//! - [`ParamResolver`]: a cheaply cloneable handle over a table,
//!   exposing [`ParamResolver::resolve`] with exact-match
//!   shortcutting, fixed-point substitution through the
//!   `spinor-symbolic` engine, and real/complex result classification
//!
//! Resolution is total: unbound symbols resolve to themselves and
//! partially concretizable expressions resolve to their partially
//! substituted form. The only surfaced failure is a malformed
//! expression rejected by the symbolic engine.

mod resolver;
mod table;

pub use resolver::{ParamInput, ParamResolver, ResolvedValue};
pub use table::{BindingTable, ParamKey, ParamValue};

pub use spinor_symbolic::{Complex64, Number, SymExpr, Symbol, SymbolicError};

/// Error type for resolution
///
/// Resolution itself never fails; this propagates collaborator faults
/// from the symbolic engine unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid expression: {0}")]
    InvalidExpression(#[from] SymbolicError),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
