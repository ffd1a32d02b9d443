//! Parse state: arenas, error slot and the reuse protocol
//!
//! A [`JsonState`] owns every byte of a parsed document: the node pool,
//! the string bucket and the backing bucket. Value handles stay valid
//! exactly until the state is reset or released. Reusing a state across
//! parses rewinds the chains in O(blocks) instead of reallocating.

use crate::config::ParserConfig;
use crate::error::{ErrorKind, ParseError, Result};
use crate::memory::{Bucket, MemoryBudget, NodePool};
use crate::value::{ElemsRef, StrRef, Value, ValueId, ValueRef};
use std::sync::Arc;

/// Owner of one parsed document's memory and error slot.
pub struct JsonState {
    pub(crate) nodes: NodePool,
    pub(crate) strings: Bucket<u8>,
    pub(crate) backing: Bucket<u32>,
    budget: Arc<MemoryBudget>,
    config: ParserConfig,
    error: Option<ParseError>,
}

impl JsonState {
    /// Create a fresh state; nothing is allocated until the first parse
    pub fn with_config(config: ParserConfig) -> Self {
        let budget = Arc::new(MemoryBudget::new(
            config.max_total_memory,
            config.tracker.clone(),
        ));
        tracing::debug!(config = ?config, "created parse state");
        Self {
            nodes: NodePool::new(config.node_block_capacity, budget.clone()),
            strings: Bucket::new(config.string_block_capacity, budget.clone()),
            backing: Bucket::new(config.backing_block_capacity, budget.clone()),
            budget,
            config,
            error: None,
        }
    }

    /// Rewind every chain to empty and clear the error slot, keeping
    /// all carved blocks. O(number of blocks).
    pub fn reset(&mut self) {
        self.nodes.reset();
        self.strings.reset();
        self.backing.reset();
        self.error = None;
        tracing::debug!(bytes = self.budget.used(), "reset parse state");
    }

    /// Release the state, freeing every chain and the error slot
    pub fn release(self) {
        drop(self);
    }

    /// The configuration this state was built with
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Swap in a new configuration with identical allocation parameters.
    /// Only non-allocation knobs such as the recursion limit may differ.
    pub(crate) fn adopt_config(&mut self, config: ParserConfig) {
        self.config = config;
    }

    /// Error kind of the last parse, `ErrorKind::None` after a success
    pub fn error_kind(&self) -> ErrorKind {
        self.error.as_ref().map_or(ErrorKind::None, |e| e.kind)
    }

    /// Formatted error message of the last failed parse
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message())
    }

    /// `(line, column)` where the last failed parse was raised
    pub fn error_location(&self) -> Option<(u32, u32)> {
        self.error.as_ref().map(|e| (e.line, e.column))
    }

    /// Bytes currently carved for this state's chains
    pub fn allocated_bytes(&self) -> usize {
        self.budget.used()
    }

    /// High-water mark of carved bytes over the state's lifetime
    pub fn peak_allocated_bytes(&self) -> usize {
        self.budget.peak()
    }

    /// Number of node blocks carved so far, stable across reuse
    pub fn node_block_count(&self) -> usize {
        self.nodes.block_count()
    }

    /// Couple a handle with this state
    pub fn value(&self, id: ValueId) -> ValueRef<'_> {
        ValueRef { state: self, id }
    }

    /// Resolve a handle to its value record. Handles from another state
    /// or from before a reset resolve to `Null`.
    pub fn value_at(&self, id: ValueId) -> Value {
        self.nodes.get(id).unwrap_or(Value::Null)
    }

    /// Element count for arrays, field count for objects, byte length
    /// for strings (via the out-of-band prefix), 0 otherwise
    pub fn length(&self, id: ValueId) -> usize {
        match self.value_at(id) {
            Value::String(r) => self.strings.record_len(r.0),
            Value::Array(Some(run)) => self.run_len(run),
            Value::Array(None) => 0,
            Value::Object(o) => o.len as usize,
            _ => 0,
        }
    }

    /// Array element handle by index
    pub fn element(&self, id: ValueId, index: usize) -> Option<ValueId> {
        match self.value_at(id) {
            Value::Array(Some(run)) => {
                let len = self.run_len(run);
                if index >= len {
                    return None;
                }
                let slots = self.backing.slice(run.0, 1 + len);
                Some(ValueId(slots[1 + index]))
            }
            _ => None,
        }
    }

    /// Object `(name, value)` handle pair by index
    pub fn entry(&self, id: ValueId, index: usize) -> Option<(ValueId, ValueId)> {
        match self.value_at(id) {
            Value::Object(o) => {
                let len = o.len as usize;
                if index >= len {
                    return None;
                }
                let run = o.entries?;
                let slots = self.backing.slice(run.0, 2 * len);
                Some((ValueId(slots[2 * index]), ValueId(slots[2 * index + 1])))
            }
            _ => None,
        }
    }

    /// Find an object field by exact key match, scanning entries in
    /// insertion order; the first match wins
    pub fn find_field(&self, id: ValueId, key: &str) -> Option<ValueId> {
        let Value::Object(o) = self.value_at(id) else {
            return None;
        };
        for index in 0..o.len as usize {
            let (name, value) = self.entry(id, index)?;
            if let Value::String(r) = self.value_at(name) {
                if self.str_bytes(r) == key.as_bytes() {
                    return Some(value);
                }
            }
        }
        None
    }

    /// Deep structural equality between two handles of this state
    pub fn equals(&self, a: ValueId, b: ValueId) -> bool {
        self.value(a).equals(self.value(b))
    }

    /// Borrow a string payload
    pub fn str_value(&self, r: StrRef) -> &str {
        // Records only ever hold bytes validated during parsing.
        std::str::from_utf8(self.strings.record_bytes(r.0)).unwrap_or("")
    }

    pub(crate) fn str_bytes(&self, r: StrRef) -> &[u8] {
        self.strings.record_bytes(r.0)
    }

    pub(crate) fn run_len(&self, run: ElemsRef) -> usize {
        self.backing.slice(run.0, 1)[0] as usize
    }

    pub(crate) fn alloc_value(&mut self, value: Value) -> Result<ValueId> {
        self.nodes.acquire(value)
    }

    pub(crate) fn alloc_string(&mut self, payload: &[u8]) -> Result<StrRef> {
        self.strings.alloc_record(payload).map(StrRef)
    }

    pub(crate) fn set_error(&mut self, error: ParseError) {
        tracing::debug!(kind = %error.kind, error = %error, "parse failed");
        self.error = Some(error);
    }
}

impl Drop for JsonState {
    fn drop(&mut self) {
        tracing::debug!(bytes = self.budget.used(), "releasing parse state");
    }
}

/// Explicit registry for states the caller does not want to own
/// individually.
///
/// Replaces an ambient process-wide list: the registry is an ordinary
/// value the caller creates, threads through parses and tears down with
/// [`StateRegistry::release_all`].
#[derive(Default)]
pub struct StateRegistry {
    states: Vec<JsonState>,
}

impl StateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a state
    pub fn adopt(&mut self, state: JsonState) {
        self.states.push(state);
    }

    /// Parse with a fresh default-configured state kept in the
    /// registry; query it afterwards through [`StateRegistry::last_state`]
    pub fn parse(&mut self, input: &str) -> Option<ValueId> {
        let (root, state) = crate::parser::parse(input);
        self.states.push(state);
        root
    }

    /// The most recently adopted state
    pub fn last_state(&self) -> Option<&JsonState> {
        self.states.last()
    }

    /// All owned states in adoption order
    pub fn states(&self) -> &[JsonState] {
        &self.states
    }

    /// Number of owned states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when no state is owned
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Release every owned state
    pub fn release_all(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_has_no_error() {
        let state = JsonState::with_config(ParserConfig::default());
        assert_eq!(state.error_kind(), ErrorKind::None);
        assert!(state.error_message().is_none());
        assert_eq!(state.allocated_bytes(), 0);
    }

    #[test]
    fn test_reset_clears_error_slot() {
        let mut state = JsonState::with_config(ParserConfig::default());
        state.set_error(ParseError::unmatch("expected '}'").at(1, 2));
        assert_eq!(state.error_kind(), ErrorKind::Unmatch);
        assert_eq!(state.error_location(), Some((1, 2)));

        state.reset();
        assert_eq!(state.error_kind(), ErrorKind::None);
        assert!(state.error_location().is_none());
    }

    #[test]
    fn test_foreign_handle_resolves_to_null() {
        let mut state = JsonState::with_config(ParserConfig::default());
        let id = state.alloc_value(Value::Bool(true)).unwrap();
        let other = JsonState::with_config(ParserConfig::default());
        assert!(matches!(other.value_at(id), Value::Null));
        assert_eq!(other.length(id), 0);
    }

    #[test]
    fn test_length_of_scalars_is_zero() {
        let mut state = JsonState::with_config(ParserConfig::default());
        let n = state.alloc_value(Value::Number(5.0)).unwrap();
        let b = state.alloc_value(Value::Bool(false)).unwrap();
        assert_eq!(state.length(n), 0);
        assert_eq!(state.length(b), 0);
    }

    #[test]
    fn test_string_length_reads_prefix() {
        let mut state = JsonState::with_config(ParserConfig::default());
        let r = state.alloc_string("caf\u{e9}".as_bytes()).unwrap();
        let id = state.alloc_value(Value::String(r)).unwrap();
        // Byte length, not character count
        assert_eq!(state.length(id), 5);
        assert_eq!(state.str_value(r), "caf\u{e9}");
    }

    #[test]
    fn test_registry_adopt_and_release_all() {
        let mut registry = StateRegistry::new();
        registry.adopt(JsonState::with_config(ParserConfig::default()));
        registry.adopt(JsonState::with_config(ParserConfig::default()));
        assert_eq!(registry.len(), 2);

        registry.release_all();
        assert!(registry.is_empty());
        assert!(registry.last_state().is_none());
    }
}
