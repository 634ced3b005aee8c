//! Immutable symbolic expression trees
//!
//! Expressions are `Arc`-shared so clones are cheap; all structural
//! equality and hashing is by value.

use crate::number::Number;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A named symbolic variable
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
}

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Symbol { name: name.into() }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

/// A symbolic expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymExpr {
    pub kind: Arc<SymExprKind>,
}

/// The shape of a symbolic expression node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymExprKind {
    /// Numeric constant
    Num(Number),
    /// Free variable
    Var(Symbol),
    /// n-ary sum
    Add(Vec<SymExpr>),
    /// n-ary product
    Mul(Vec<SymExpr>),
    /// base^exponent
    Pow(SymExpr, SymExpr),
    /// Unary negation
    Neg(SymExpr),
    /// Named function application (sin, cos, exp, ...)
    Func(String, Vec<SymExpr>),
}

impl SymExpr {
    fn wrap(kind: SymExprKind) -> Self {
        SymExpr {
            kind: Arc::new(kind),
        }
    }

    pub fn num(n: impl Into<Number>) -> Self {
        Self::wrap(SymExprKind::Num(n.into()))
    }

    pub fn int(n: i64) -> Self {
        Self::num(n)
    }

    pub fn real(x: f64) -> Self {
        Self::num(x)
    }

    pub fn complex(z: Complex64) -> Self {
        Self::num(z)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::wrap(SymExprKind::Var(Symbol::new(name)))
    }

    pub fn symbol(sym: Symbol) -> Self {
        Self::wrap(SymExprKind::Var(sym))
    }

    /// Build a sum; empty vectors collapse to 0, singletons to the term
    pub fn add(mut terms: Vec<SymExpr>) -> Self {
        match terms.len() {
            0 => Self::int(0),
            1 => terms.pop().unwrap(),
            _ => Self::wrap(SymExprKind::Add(terms)),
        }
    }

    /// Build a product; empty vectors collapse to 1, singletons to the factor
    pub fn mul(mut factors: Vec<SymExpr>) -> Self {
        match factors.len() {
            0 => Self::int(1),
            1 => factors.pop().unwrap(),
            _ => Self::wrap(SymExprKind::Mul(factors)),
        }
    }

    pub fn pow(base: SymExpr, exp: SymExpr) -> Self {
        Self::wrap(SymExprKind::Pow(base, exp))
    }

    pub fn neg(inner: SymExpr) -> Self {
        Self::wrap(SymExprKind::Neg(inner))
    }

    pub fn func(name: impl Into<String>, args: Vec<SymExpr>) -> Self {
        Self::wrap(SymExprKind::Func(name.into(), args))
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self.kind.as_ref() {
            SymExprKind::Num(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self.kind.as_ref() {
            SymExprKind::Var(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_num(&self) -> bool {
        matches!(self.kind.as_ref(), SymExprKind::Num(_))
    }

    pub fn is_var(&self) -> bool {
        matches!(self.kind.as_ref(), SymExprKind::Var(_))
    }

    /// Total node count, for size diagnostics
    pub fn node_count(&self) -> usize {
        match self.kind.as_ref() {
            SymExprKind::Num(_) | SymExprKind::Var(_) => 1,
            SymExprKind::Add(xs) | SymExprKind::Mul(xs) | SymExprKind::Func(_, xs) => {
                1 + xs.iter().map(SymExpr::node_count).sum::<usize>()
            }
            SymExprKind::Pow(a, b) => 1 + a.node_count() + b.node_count(),
            SymExprKind::Neg(a) => 1 + a.node_count(),
        }
    }

    /// The set of free variables in this expression, sorted by name
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_free(&mut out);
        out
    }

    fn collect_free(&self, out: &mut BTreeSet<Symbol>) {
        match self.kind.as_ref() {
            SymExprKind::Num(_) => {}
            SymExprKind::Var(s) => {
                out.insert(s.clone());
            }
            SymExprKind::Add(xs) | SymExprKind::Mul(xs) | SymExprKind::Func(_, xs) => {
                for x in xs {
                    x.collect_free(out);
                }
            }
            SymExprKind::Pow(a, b) => {
                a.collect_free(out);
                b.collect_free(out);
            }
            SymExprKind::Neg(a) => a.collect_free(out),
        }
    }

    /// True when any free variable remains anywhere in the tree
    pub fn has_free_symbols(&self) -> bool {
        match self.kind.as_ref() {
            SymExprKind::Num(_) => false,
            SymExprKind::Var(_) => true,
            SymExprKind::Add(xs) | SymExprKind::Mul(xs) | SymExprKind::Func(_, xs) => {
                xs.iter().any(SymExpr::has_free_symbols)
            }
            SymExprKind::Pow(a, b) => a.has_free_symbols() || b.has_free_symbols(),
            SymExprKind::Neg(a) => a.has_free_symbols(),
        }
    }
}

impl From<Symbol> for SymExpr {
    fn from(sym: Symbol) -> Self {
        SymExpr::symbol(sym)
    }
}

impl From<Number> for SymExpr {
    fn from(n: Number) -> Self {
        SymExpr::num(n)
    }
}

impl fmt::Display for SymExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.as_ref() {
            SymExprKind::Num(n) => write!(f, "{n}"),
            SymExprKind::Var(s) => write!(f, "{s}"),
            SymExprKind::Add(xs) => {
                write!(f, "(")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{x}")?;
                }
                write!(f, ")")
            }
            SymExprKind::Mul(xs) => {
                write!(f, "(")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    write!(f, "{x}")?;
                }
                write!(f, ")")
            }
            SymExprKind::Pow(a, b) => write!(f, "{a}^{b}"),
            SymExprKind::Neg(a) => write!(f, "-{a}"),
            SymExprKind::Func(name, args) => {
                write!(f, "{name}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_collapse_trivial_cases() {
        assert_eq!(SymExpr::add(vec![]), SymExpr::int(0));
        assert_eq!(SymExpr::mul(vec![]), SymExpr::int(1));

        let x = SymExpr::var("x");
        assert_eq!(SymExpr::add(vec![x.clone()]), x);
        assert_eq!(SymExpr::mul(vec![x.clone()]), x);
    }

    #[test]
    fn free_symbols_are_collected_once() {
        let expr = SymExpr::add(vec![
            SymExpr::var("x"),
            SymExpr::mul(vec![SymExpr::var("x"), SymExpr::var("y")]),
        ]);
        let free = expr.free_symbols();
        assert_eq!(free.len(), 2);
        assert!(free.contains(&Symbol::new("x")));
        assert!(expr.has_free_symbols());
        assert!(!SymExpr::int(3).has_free_symbols());
    }

    #[test]
    fn structural_equality_and_hash() {
        use std::collections::HashSet;
        let a = SymExpr::add(vec![SymExpr::var("x"), SymExpr::int(1)]);
        let b = SymExpr::add(vec![SymExpr::var("x"), SymExpr::int(1)]);
        let c = SymExpr::add(vec![SymExpr::int(1), SymExpr::var("x")]);
        assert_eq!(a, b);
        // No canonical ordering: operand order is significant.
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn node_predicates_and_counts() {
        let x = SymExpr::var("x");
        assert!(x.is_var());
        assert!(!x.is_num());
        assert_eq!(x.as_number(), None);
        assert_eq!(x.as_symbol(), Some(&Symbol::new("x")));

        let two = SymExpr::int(2);
        assert!(two.is_num());
        assert_eq!(two.as_number(), Some(&Number::Real(2.0)));

        // Pow(x, 3) is three nodes: the pow, the var, the constant.
        let expr = SymExpr::pow(x, SymExpr::int(3));
        assert_eq!(expr.node_count(), 3);
        assert_eq!(SymExpr::var("y").node_count(), 1);
    }

    #[test]
    fn serde_round_trip() {
        let expr = SymExpr::func(
            "sin",
            vec![SymExpr::pow(SymExpr::var("x"), SymExpr::int(2))],
        );
        let json = serde_json::to_string(&expr).unwrap();
        let back: SymExpr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn display_is_readable() {
        let expr = SymExpr::mul(vec![
            SymExpr::int(2),
            SymExpr::pow(SymExpr::var("x"), SymExpr::int(3)),
        ]);
        assert_eq!(expr.to_string(), "(2.0*x^3.0)");
    }
}
