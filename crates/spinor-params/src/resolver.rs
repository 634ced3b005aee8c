//! The parameter resolver
//!
//! Resolution follows a fixed pipeline: numeric passthrough, string
//! normalization to a symbol, exact-match table lookup, then
//! fixed-point substitution through the symbolic engine with
//! real/complex classification of fully concrete results.

use crate::table::{BindingTable, ParamKey, ParamValue};
use crate::{ResolveError, Result};
use once_cell::sync::OnceCell;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use spinor_symbolic::{Complex64, Number, SymExpr, Symbol};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Anything the resolver accepts as input
#[derive(Debug, Clone, PartialEq)]
pub enum ParamInput {
    Number(Number),
    Name(String),
    Symbol(Symbol),
    Expr(SymExpr),
}

impl From<f64> for ParamInput {
    fn from(x: f64) -> Self {
        ParamInput::Number(Number::Real(x))
    }
}

impl From<Complex64> for ParamInput {
    fn from(z: Complex64) -> Self {
        ParamInput::Number(Number::Complex(z))
    }
}

impl From<Number> for ParamInput {
    fn from(n: Number) -> Self {
        ParamInput::Number(n)
    }
}

impl From<&str> for ParamInput {
    fn from(name: &str) -> Self {
        ParamInput::Name(name.to_string())
    }
}

impl From<String> for ParamInput {
    fn from(name: String) -> Self {
        ParamInput::Name(name)
    }
}

impl From<Symbol> for ParamInput {
    fn from(sym: Symbol) -> Self {
        ParamInput::Symbol(sym)
    }
}

impl From<SymExpr> for ParamInput {
    fn from(expr: SymExpr) -> Self {
        ParamInput::Expr(expr)
    }
}

/// The outcome of a resolution: a concrete number, or whatever
/// symbolic form remained after substitution
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Number(Number),
    Symbolic(SymExpr),
}

impl ResolvedValue {
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            ResolvedValue::Number(n) => Some(n),
            ResolvedValue::Symbolic(_) => None,
        }
    }

    /// The real value, when fully resolved with zero imaginary part
    pub fn as_real(&self) -> Option<f64> {
        match self {
            ResolvedValue::Number(n) if n.is_real() => Some(n.re()),
            _ => None,
        }
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self, ResolvedValue::Symbolic(_))
    }
}

impl From<f64> for ResolvedValue {
    fn from(x: f64) -> Self {
        ResolvedValue::Number(Number::Real(x))
    }
}

impl From<Complex64> for ResolvedValue {
    fn from(z: Complex64) -> Self {
        ResolvedValue::Number(Number::Complex(z))
    }
}

impl From<SymExpr> for ResolvedValue {
    fn from(expr: SymExpr) -> Self {
        ResolvedValue::Symbolic(expr)
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Number(n) => write!(f, "{n}"),
            ResolvedValue::Symbolic(expr) => write!(f, "{expr}"),
        }
    }
}

struct Inner {
    table: BindingTable,
    // Computed at most once; racing recomputations are idempotent, so
    // no lock beyond the cell's own publish step is needed.
    hash: OnceCell<u64>,
}

/// Resolves symbols and expressions to assigned values
///
/// A cheaply cloneable, immutable handle: clones share the underlying
/// table and its memoized hash, so re-wrapping an existing resolver
/// never copies the table (see [`ParamResolver::same_instance`]).
///
/// Engine substitution is the expensive path. Callers resolving the
/// same formula against many tables should pre-flatten it so that
/// resolution stays on the exact-match shortcut.
#[derive(Clone)]
pub struct ParamResolver {
    inner: Arc<Inner>,
}

impl ParamResolver {
    /// A resolver over a frozen binding table
    pub fn new(table: BindingTable) -> Self {
        ParamResolver {
            inner: Arc::new(Inner {
                table,
                hash: OnceCell::new(),
            }),
        }
    }

    /// A resolver with no bindings; resolves every symbol to itself
    pub fn empty() -> Self {
        Self::new(BindingTable::default())
    }

    pub fn table(&self) -> &BindingTable {
        &self.inner.table
    }

    /// True when both handles share one underlying table allocation.
    /// Wrapping an existing resolver via `From<&ParamResolver>` or
    /// `clone` preserves this.
    pub fn same_instance(&self, other: &ParamResolver) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn len(&self) -> usize {
        self.inner.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.table.is_empty()
    }

    /// Bound entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&ParamKey, &ParamValue)> {
        self.inner.table.iter()
    }

    /// Bound keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &ParamKey> {
        self.inner.table.keys()
    }

    /// The value bound to a key, without resolving it further
    pub fn get(&self, key: &ParamKey) -> Option<&ParamValue> {
        self.inner.table.get(key)
    }

    /// Resolve a number, name, symbol, or expression to its assigned
    /// value.
    ///
    /// Numbers pass through untouched. Strings are shorthand for
    /// symbols. A symbol bound directly to a number returns it without
    /// invoking the engine. Everything else is substituted against the
    /// whole table until substitution stops making progress; fully
    /// concrete results are classified as real or complex, and
    /// anything still carrying free symbols is returned as-is.
    pub fn resolve(&self, value: impl Into<ParamInput>) -> Result<ResolvedValue> {
        match value.into() {
            ParamInput::Number(n) => Ok(ResolvedValue::Number(n)),
            ParamInput::Name(name) => self.resolve_symbol(Symbol::new(name)),
            ParamInput::Symbol(sym) => self.resolve_symbol(sym),
            ParamInput::Expr(expr) => self.resolve_expr(expr),
        }
    }

    /// Equivalent to [`ParamResolver::resolve`]; the indexed-lookup
    /// spelling for callers that read better as `r.value_of("x")`.
    pub fn value_of(&self, value: impl Into<ParamInput>) -> Result<ResolvedValue> {
        self.resolve(value)
    }

    fn resolve_symbol(&self, sym: Symbol) -> Result<ResolvedValue> {
        match self.inner.table.get_name(&sym.name) {
            // Direct numeric binding: skip the engine entirely.
            Some(ParamValue::Number(n)) => Ok(ResolvedValue::Number(n.clone())),
            // The bound value becomes the new input and falls through
            // to substitution.
            Some(ParamValue::Alias(name)) => self.resolve_expr(SymExpr::var(name.clone())),
            Some(ParamValue::Expr(expr)) => self.resolve_expr(expr.clone()),
            // Unbound symbols resolve to themselves.
            None => Ok(ResolvedValue::Symbolic(SymExpr::symbol(sym))),
        }
    }

    fn resolve_expr(&self, expr: SymExpr) -> Result<ResolvedValue> {
        let lookup = |sym: &Symbol| self.lookup_expr(sym);
        let mut current = expr;
        loop {
            let next = current.substitute(&lookup);
            if next.has_free_symbols() {
                if next != current {
                    // Progress: the substituted value may itself
                    // reference further keys.
                    log::trace!("substitution pass: {current} -> {next}");
                    current = next;
                    continue;
                }
                // Fixed point with free symbols left: a cycle or a
                // permanently unbound symbol. Terminate, never count
                // iterations.
                log::debug!("substitution fixed point with free symbols: {next}");
                return Ok(ResolvedValue::Symbolic(next));
            }
            let value = next.eval().map_err(ResolveError::InvalidExpression)?;
            return Ok(ResolvedValue::Number(Number::classify(value)));
        }
    }

    fn lookup_expr(&self, sym: &Symbol) -> Option<SymExpr> {
        self.inner.table.get_name(&sym.name).map(|value| match value {
            ParamValue::Number(n) => SymExpr::num(n.clone()),
            ParamValue::Alias(name) => SymExpr::var(name.clone()),
            ParamValue::Expr(expr) => expr.clone(),
        })
    }
}

impl Default for ParamResolver {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<BindingTable> for ParamResolver {
    fn from(table: BindingTable) -> Self {
        Self::new(table)
    }
}

impl From<Vec<(ParamKey, ParamValue)>> for ParamResolver {
    fn from(pairs: Vec<(ParamKey, ParamValue)>) -> Self {
        Self::new(BindingTable::new(pairs))
    }
}

// Re-wrapping an existing resolver shares its allocation instead of
// copying the table.
impl From<&ParamResolver> for ParamResolver {
    fn from(resolver: &ParamResolver) -> Self {
        resolver.clone()
    }
}

impl FromIterator<(ParamKey, ParamValue)> for ParamResolver {
    fn from_iter<I: IntoIterator<Item = (ParamKey, ParamValue)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ParamResolver {
    type Item = (&'a ParamKey, &'a ParamValue);
    type IntoIter = <&'a BindingTable as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.table.into_iter()
    }
}

impl PartialEq for ParamResolver {
    fn eq(&self, other: &Self) -> bool {
        self.inner.table == other.inner.table
    }
}

impl Eq for ParamResolver {}

impl Hash for ParamResolver {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let h = self
            .inner
            .hash
            .get_or_init(|| self.inner.table.content_hash());
        state.write_u64(*h);
    }
}

impl fmt::Debug for ParamResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ParamResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParamResolver({{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        write!(f, "}})")
    }
}

/// Wire form: a tagged record with the table as an ordered pair
/// sequence
#[derive(Serialize, Deserialize)]
struct EncodedResolver {
    #[serde(rename = "type")]
    type_tag: String,
    param_dict: Vec<(ParamKey, ParamValue)>,
}

const TYPE_TAG: &str = "ParamResolver";

impl Serialize for ParamResolver {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        EncodedResolver {
            type_tag: TYPE_TAG.to_string(),
            param_dict: self.inner.table.entries().to_vec(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParamResolver {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = EncodedResolver::deserialize(deserializer)?;
        if encoded.type_tag != TYPE_TAG {
            return Err(de::Error::custom(format!(
                "expected type tag `{TYPE_TAG}`, got `{}`",
                encoded.type_tag
            )));
        }
        Ok(ParamResolver::new(BindingTable::new(encoded.param_dict)))
    }
}
