//! Parser entry points
//!
//! [`parse`] and [`parse_with`] drive the recursive-descent grammar in
//! [`grammar`] over the byte scanner in [`scanner`]. Both always hand
//! back a [`JsonState`]: on success it owns the parsed tree, on failure
//! it carries the recorded error so the caller can inspect kind,
//! message and position.

pub mod grammar;
pub mod scanner;

pub use scanner::Scanner;

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::state::JsonState;
use crate::value::ValueId;
use grammar::Parser;

/// Parse a document with a fresh default-configured state.
///
/// The root of a document must be an object; any other leading token
/// fails with [`crate::error::ErrorKind::Format`] before the grammar
/// runs.
pub fn parse(input: &str) -> (Option<ValueId>, JsonState) {
    parse_with(input, ParserConfig::default(), None)
}

/// Parse a document, optionally reusing the allocations of a prior
/// state.
///
/// When `prior` is given and its configuration describes the same
/// allocation layout as `config`, the prior state is reset and its
/// node blocks and buckets are refilled in place, so steady-state
/// reparsing allocates nothing new. A prior state with a different
/// layout is dropped and a fresh one is built.
pub fn parse_with(
    input: &str,
    config: ParserConfig,
    prior: Option<JsonState>,
) -> (Option<ValueId>, JsonState) {
    let mut state = match prior {
        Some(mut state) if state.config().same_allocation(&config) => {
            state.reset();
            state.adopt_config(config);
            state
        }
        _ => JsonState::with_config(config),
    };

    let mut scanner = Scanner::new(input.as_bytes());
    match scanner.skip_whitespace() {
        Some(b'{') => {}
        _ => {
            let error = ParseError::format("document root must be an object")
                .at(scanner.line(), scanner.column());
            state.set_error(error);
            return (None, state);
        }
    }

    let result = {
        let mut parser = Parser::new(scanner, &mut state);
        parser.parse_document()
    };
    match result {
        Ok(root) => (Some(root), state),
        Err(error) => {
            state.set_error(error);
            (None, state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_root_must_be_object() {
        for input in ["[1, 2]", "1", "\"x\"", "true", ""] {
            let (root, state) = parse(input);
            assert!(root.is_none(), "accepted root of {input:?}");
            assert_eq!(state.error_kind(), ErrorKind::Format);
        }
    }

    #[test]
    fn test_empty_object_parses() {
        let (root, state) = parse("  {}  ");
        let id = root.unwrap();
        assert_eq!(state.error_kind(), ErrorKind::None);
        assert_eq!(state.length(id), 0);
    }

    #[test]
    fn test_trailing_content_is_ignored() {
        let (root, state) = parse("{\"a\": 1} garbage");
        assert!(root.is_some());
        assert_eq!(state.error_kind(), ErrorKind::None);
    }

    #[test]
    fn test_failed_parse_records_position() {
        let (root, state) = parse("{\"a\"\n  1}");
        assert!(root.is_none());
        assert_eq!(state.error_kind(), ErrorKind::Unmatch);
        assert_eq!(state.error_location(), Some((2, 3)));
    }

    #[test]
    fn test_reuse_with_same_config_keeps_state() {
        let config = ParserConfig::default();
        let (root, state) = parse_with("{\"a\": 1}", config.clone(), None);
        assert!(root.is_some());
        let blocks_before = state.node_block_count();

        let (root, state) = parse_with("{\"b\": 2}", config, Some(state));
        assert!(root.is_some());
        assert_eq!(state.node_block_count(), blocks_before);
    }

    #[test]
    fn test_reuse_with_different_config_builds_fresh_state() {
        let (root, state) = parse_with("{\"a\": 1}", ParserConfig::default(), None);
        assert!(root.is_some());

        let (root, state) = parse_with("{\"b\": 2}", ParserConfig::low_memory(), Some(state));
        assert!(root.is_some());
        assert!(state.config().same_allocation(&ParserConfig::low_memory()));
    }
}
