//! Parameter keys, values, and the immutable binding table

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use spinor_symbolic::{Number, SymExpr, Symbol};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A binding-table key: a bare name or a symbolic variable
///
/// A name key and a symbol key with the same canonical name denote the
/// same binding; the constructed form is preserved only for display
/// and encoding. No coercion between two *different* names happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParamKey {
    Name(String),
    Symbol(Symbol),
}

impl ParamKey {
    /// Canonical name string of this key
    pub fn name(&self) -> &str {
        match self {
            ParamKey::Name(name) => name,
            ParamKey::Symbol(sym) => &sym.name,
        }
    }
}

impl PartialEq for ParamKey {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for ParamKey {}

impl Hash for ParamKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl From<&str> for ParamKey {
    fn from(name: &str) -> Self {
        ParamKey::Name(name.to_string())
    }
}

impl From<String> for ParamKey {
    fn from(name: String) -> Self {
        ParamKey::Name(name)
    }
}

impl From<Symbol> for ParamKey {
    fn from(sym: Symbol) -> Self {
        ParamKey::Symbol(sym)
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Name(name) => write!(f, "{name:?}"),
            ParamKey::Symbol(sym) => write!(f, "{sym}"),
        }
    }
}

/// A value assigned to a parameter key
///
/// Equality is exact value equality, not resolved equality: binding
/// `"x"` to the number `2.0` and to the unsimplified expression `2.0`
/// yields *unequal* values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamValue {
    /// A concrete real or complex number
    Number(Number),
    /// Another parameter name, to be resolved further
    Alias(String),
    /// A symbolic expression, possibly referencing other keys
    Expr(SymExpr),
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Number(Number::Real(x))
    }
}

impl From<Number> for ParamValue {
    fn from(n: Number) -> Self {
        ParamValue::Number(n)
    }
}

impl From<spinor_symbolic::Complex64> for ParamValue {
    fn from(z: spinor_symbolic::Complex64) -> Self {
        ParamValue::Number(Number::Complex(z))
    }
}

impl From<&str> for ParamValue {
    fn from(alias: &str) -> Self {
        ParamValue::Alias(alias.to_string())
    }
}

impl From<SymExpr> for ParamValue {
    fn from(expr: SymExpr) -> Self {
        ParamValue::Expr(expr)
    }
}

impl From<Symbol> for ParamValue {
    fn from(sym: Symbol) -> Self {
        ParamValue::Expr(SymExpr::symbol(sym))
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::Alias(name) => write!(f, "{name:?}"),
            ParamValue::Expr(expr) => write!(f, "{expr}"),
        }
    }
}

/// An immutable mapping from parameter keys to assigned values
///
/// Insertion order is irrelevant to equality and hashing but is
/// preserved for deterministic display and encoding. Once constructed
/// the entries never change.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    entries: Vec<(ParamKey, ParamValue)>,
    index: HashMap<String, usize>,
}

impl BindingTable {
    /// Build a table from key/value pairs. A repeated key keeps its
    /// first position and original key form but takes the last value,
    /// matching mapping-literal semantics.
    pub fn new(pairs: Vec<(ParamKey, ParamValue)>) -> Self {
        let mut entries: Vec<(ParamKey, ParamValue)> = Vec::with_capacity(pairs.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            match index.get(key.name()) {
                Some(&slot) => {
                    entries[slot].1 = value;
                }
                None => {
                    index.insert(key.name().to_string(), entries.len());
                    entries.push((key, value));
                }
            }
        }
        BindingTable { entries, index }
    }

    /// Look up a key, trying the literal key and its canonical name
    /// interchangeably (they coincide under name-based key equality).
    pub fn get(&self, key: &ParamKey) -> Option<&ParamValue> {
        self.get_name(key.name())
    }

    /// Look up by canonical name string
    pub fn get_name(&self, name: &str) -> Option<&ParamValue> {
        self.index.get(name).map(|&slot| &self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&ParamKey, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &ParamKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn entries(&self) -> &[(ParamKey, ParamValue)] {
        &self.entries
    }

    /// Order-independent content hash over the frozen entry set
    pub fn content_hash(&self) -> u64 {
        // Commutative combination so insertion order cannot leak in.
        let mut acc: u64 = 0;
        for (key, value) in &self.entries {
            let mut h = DefaultHasher::new();
            key.hash(&mut h);
            value.hash(&mut h);
            acc = acc.wrapping_add(h.finish());
        }
        acc
    }
}

impl PartialEq for BindingTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl Eq for BindingTable {}

impl Hash for BindingTable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.content_hash());
    }
}

impl FromIterator<(ParamKey, ParamValue)> for BindingTable {
    fn from_iter<I: IntoIterator<Item = (ParamKey, ParamValue)>>(iter: I) -> Self {
        BindingTable::new(iter.into_iter().collect())
    }
}

fn entry_refs((key, value): &(ParamKey, ParamValue)) -> (&ParamKey, &ParamValue) {
    (key, value)
}

impl<'a> IntoIterator for &'a BindingTable {
    type Item = (&'a ParamKey, &'a ParamValue);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (ParamKey, ParamValue)>,
        fn(&'a (ParamKey, ParamValue)) -> (&'a ParamKey, &'a ParamValue),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().map(entry_refs)
    }
}

// Encoded as an ordered sequence of pairs, not a native map: symbol
// keys are structured and many encodings only allow primitive map keys.
impl Serialize for BindingTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BindingTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let pairs: Vec<(ParamKey, ParamValue)> = Deserialize::deserialize(deserializer)?;
        Ok(BindingTable::new(pairs))
    }
}
