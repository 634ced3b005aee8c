//! Spinor Symbolic Expression Engine
//!
//! This crate provides the symbolic capability consumed by the
//! parameter resolver: immutable expression trees over named symbols,
//! with substitution, free-variable queries, and numeric evaluation
//! into real or complex values.
//!
//! # Architecture
//!
//! - `Arc`-shared expression trees (`SymExpr` / `SymExprKind`)
//! - A compact numeric leaf (`Number`: real with complex fallback)
//! - Substitution driven by a caller-supplied symbol lookup
//! - Evaluation to `Complex64` once no free symbols remain
//!
//! This crate deliberately performs no algebraic simplification:
//! addition/multiplication trees are represented and evaluated, never
//! rewritten. Callers that need canonical forms build them upstream.

mod expr;
mod number;
mod subst;

pub use expr::{SymExpr, SymExprKind, Symbol};
pub use number::Number;

pub use num_complex::Complex64;

/// Error type for symbolic operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SymbolicError {
    #[error("expression still contains free symbol `{0}`")]
    FreeSymbol(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("function `{func}` expects {expected} argument(s), got {got}")]
    WrongArity {
        func: String,
        expected: usize,
        got: usize,
    },
}

pub type Result<T> = std::result::Result<T, SymbolicError>;
