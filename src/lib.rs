//! A JSON decoder assembled from small parser combinators.
//!
//! Every parser returns a [`ParseResult`]: `Ok(Outcome::Matched(..))` with
//! the unconsumed remainder, `Ok(Outcome::NotMatched)` when its construct
//! does not begin at the input, or `Err(..)` when the construct began but is
//! malformed. Only the first two let an alternation try the next candidate.
//!
//! ```
//! use jsoncomb::{parse_json, JsonValue};
//!
//! let value = parse_json(r#"{"a": [1, 2, [3]]}"#).unwrap();
//! assert_eq!(value.get("a").and_then(JsonValue::as_list).map(|l| l.len()), Some(3));
//! assert!(parse_json("[1,2,]").is_err());
//! ```

pub mod error;
pub mod json;
pub mod lexer;
pub mod parser;
pub mod value;

pub use error::{BracketKind, Error};
pub use json::{DuplicateKeys, Options};
pub use parser::{Outcome, ParseResult, Parser, RcParser};
pub use value::{JsonValue, Number};

/// Decodes a JSON object or list with the default [`Options`].
pub fn parse_json(input: &str) -> Result<JsonValue, Error> {
    parse_json_with(input, Options::default())
}

pub fn parse_json_with(input: &str, options: Options) -> Result<JsonValue, Error> {
    json::parse_root(input, options)
}
