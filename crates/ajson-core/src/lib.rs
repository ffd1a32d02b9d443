//! # ajson
//!
//! Arena-allocated JSON parsing engine. A parse builds its whole tree
//! inside a [`JsonState`]: values live in a slab pool addressed by
//! [`ValueId`] handles, string payloads and container backing runs live
//! in growable bucket chains. Releasing or resetting the state reclaims
//! everything at once, and a reset state reuses its existing blocks so
//! steady-state reparsing performs no new allocations.
//!
//! The document root must be an object. Numbers follow a restricted
//! grammar with no exponent notation and no leading `+` or redundant
//! leading zero.
//!
//! ```
//! use ajson_rs::parse;
//!
//! let (root, state) = parse(r#"{"name": "arena", "sizes": [1, 2.5]}"#);
//! let root = state.value(root.unwrap());
//!
//! assert_eq!(root.field("name").unwrap().as_str(), Some("arena"));
//! assert_eq!(root.field("sizes").unwrap().len(), 2);
//! state.release();
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod memory;
pub mod parser;
pub mod print;
pub mod state;
pub mod value;

pub use config::{AllocTracker, ParserConfig};
pub use error::{ErrorKind, ParseError, Result};
pub use parser::{parse, parse_with};
pub use print::{compact, pretty};
pub use state::{JsonState, StateRegistry};
pub use value::{Value, ValueId, ValueKind, ValueRef};

/// Common imports for working with the engine
pub mod prelude {
    pub use crate::config::{AllocTracker, ParserConfig};
    pub use crate::error::{ErrorKind, ParseError, Result};
    pub use crate::parser::{parse, parse_with};
    pub use crate::print::{compact, pretty};
    pub use crate::state::{JsonState, StateRegistry};
    pub use crate::value::{Value, ValueId, ValueKind, ValueRef};
}
