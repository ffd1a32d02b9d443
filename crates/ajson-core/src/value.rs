//! Tagged value tree and handle types
//!
//! Values live in a state's arenas and reference each other through
//! handles, never addresses. A `Value` is a single small `Copy` record:
//! strings and arrays carry one bucket handle whose length prefix lives
//! in the arena, objects carry their length inline next to the handle
//! of their `(name, value)` run.

use crate::memory::BucketRef;
use crate::state::JsonState;

/// Handle to a value node inside a state's node pool.
///
/// Only meaningful together with the state that produced it; resolving
/// it against another state, or after a reset, yields `Null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub(crate) u32);

/// Handle to a string record: a length prefix followed by UTF-8 payload
/// bytes in the string bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrRef(pub(crate) BucketRef);

/// Handle to an array backing run: a length slot followed by element
/// handles in the backing bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElemsRef(pub(crate) BucketRef);

/// Object payload: inline length plus the handle of a contiguous run of
/// `(name, value)` handle pairs. `entries` is `None` for `{}`.
#[derive(Debug, Clone, Copy)]
pub struct ObjectRef {
    pub(crate) len: u32,
    pub(crate) entries: Option<ElemsRef>,
}

/// One parsed JSON value.
#[derive(Debug, Clone, Copy)]
pub enum Value {
    /// The `null` literal
    Null,
    /// `true` or `false`
    Bool(bool),
    /// IEEE double precision number
    Number(f64),
    /// String payload stored in the string bucket
    String(StrRef),
    /// Array backing run, `None` for `[]`
    Array(Option<ElemsRef>),
    /// Object entries
    Object(ObjectRef),
}

/// Value classification for dispatch without payload access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl Value {
    /// Classify this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

/// A value handle coupled with the state that owns it.
///
/// This is the consumer-facing cursor over a parsed tree: cheap to
/// copy, valid as long as the state is neither reset nor released.
#[derive(Clone, Copy)]
pub struct ValueRef<'a> {
    pub(crate) state: &'a JsonState,
    pub(crate) id: ValueId,
}

impl<'a> ValueRef<'a> {
    /// The underlying handle
    pub fn id(&self) -> ValueId {
        self.id
    }

    /// The underlying value record
    pub fn value(&self) -> Value {
        self.state.value_at(self.id)
    }

    /// Classify this value
    pub fn kind(&self) -> ValueKind {
        self.value().kind()
    }

    /// True for the `null` literal
    pub fn is_null(&self) -> bool {
        matches!(self.value(), Value::Null)
    }

    /// Boolean payload, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self.value() {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Numeric payload, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self.value() {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// String payload, if this is a string
    pub fn as_str(&self) -> Option<&'a str> {
        match self.value() {
            Value::String(r) => Some(self.state.str_value(r)),
            _ => None,
        }
    }

    /// Element count for arrays, field count for objects, byte length
    /// for strings, 0 otherwise. O(1) for every kind.
    pub fn len(&self) -> usize {
        self.state.length(self.id)
    }

    /// True when `len` is 0
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Array element by index
    pub fn at(&self, index: usize) -> Option<ValueRef<'a>> {
        self.state
            .element(self.id, index)
            .map(|id| self.state.value(id))
    }

    /// Object field by key, linear scan in insertion order
    pub fn field(&self, key: &str) -> Option<ValueRef<'a>> {
        self.state
            .find_field(self.id, key)
            .map(|id| self.state.value(id))
    }

    /// Iterate array elements
    pub fn elements(&self) -> Elements<'a> {
        Elements {
            value: *self,
            index: 0,
            len: match self.value() {
                Value::Array(_) => self.len(),
                _ => 0,
            },
        }
    }

    /// Iterate object `(name, value)` pairs in insertion order
    pub fn entries(&self) -> Entries<'a> {
        Entries {
            value: *self,
            index: 0,
            len: match self.value() {
                Value::Object(o) => o.len as usize,
                _ => 0,
            },
        }
    }

    /// Deep structural equality.
    ///
    /// Arrays compare index-wise, objects compare pairwise in insertion
    /// order, numbers by IEEE equality. Works across states.
    pub fn equals(&self, other: ValueRef<'_>) -> bool {
        match (self.value(), other.value()) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => {
                self.state.str_bytes(a) == other.state.str_bytes(b)
            }
            (Value::Array(_), Value::Array(_)) => {
                self.len() == other.len()
                    && self
                        .elements()
                        .zip(other.elements())
                        .all(|(a, b)| a.equals(b))
            }
            (Value::Object(_), Value::Object(_)) => {
                self.len() == other.len()
                    && self.entries().zip(other.entries()).all(
                        |((name_a, value_a), (name_b, value_b))| {
                            name_a.equals(name_b) && value_a.equals(value_b)
                        },
                    )
            }
            _ => false,
        }
    }
}

/// Iterator over array elements.
pub struct Elements<'a> {
    value: ValueRef<'a>,
    index: usize,
    len: usize,
}

impl<'a> Iterator for Elements<'a> {
    type Item = ValueRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.len {
            return None;
        }
        let item = self.value.at(self.index);
        self.index += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

/// Iterator over object `(name, value)` pairs.
pub struct Entries<'a> {
    value: ValueRef<'a>,
    index: usize,
    len: usize,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (ValueRef<'a>, ValueRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.len {
            return None;
        }
        let state = self.value.state;
        let pair = state
            .entry(self.value.id, self.index)
            .map(|(name, value)| (state.value(name), state.value(value)));
        self.index += 1;
        pair
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}
