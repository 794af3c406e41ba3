use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Error;
use crate::lexer::prelude::*;
use crate::lexer::skip_whitespace;
use crate::parser::prelude::*;
use crate::value::{JsonValue, Number};

/// What an object does when a key shows up a second time.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DuplicateKeys {
    Reject,
    LastWins,
}

impl Default for DuplicateKeys {
    fn default() -> Self {
        DuplicateKeys::Reject
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Options {
    pub duplicate_keys: DuplicateKeys,
}

impl Options {
    pub fn duplicate_keys(mut self, policy: DuplicateKeys) -> Self {
        self.duplicate_keys = policy;
        self
    }
}

pub struct SignedNumber;

impl<'a> Parser<'a> for SignedNumber {
    type Output = Number;

    fn parse(&self, input: &'a str) -> ParseResult<'a, Number> {
        match minus().parse(input)? {
            Outcome::Matched(_, rest) => {
                let (number, rest) = padded(negated_number())
                    .parse(rest)?
                    .or_fatal(|| Error::InvalidNumber("-".to_string()))?;
                Ok(Outcome::Matched(number, rest))
            }
            Outcome::NotMatched => positive_number().parse(input),
        }
    }

    fn expected(&self) -> String {
        "a number".to_string()
    }
}

pub fn number<'a>() -> RcParser<'a, Number> {
    Rc::new(SignedNumber)
}

/// Any value: string, number, list, or object, tried in that order.
pub fn value<'a>(options: Options) -> RcParser<'a, JsonValue> {
    alt(&[
        padded(map(quoted(), |s: &str| JsonValue::String(s.to_string()))),
        padded(map(number(), JsonValue::Number)),
        padded(lazy(move || map(list(options), JsonValue::List))),
        padded(lazy(move || map(object(options), JsonValue::Object))),
    ])
}

/// Consumes the separator after a container element.
///
/// Returns the input positioned at the next element, or an empty string once
/// the container is exhausted.
pub fn separator(input: &str) -> Result<&str, Error> {
    let input = skip_whitespace(input);
    if input.is_empty() {
        return Ok(input);
    }

    let rest = match padded(comma()).parse(input)? {
        Outcome::Matched(_, rest) => skip_whitespace(rest),
        Outcome::NotMatched => {
            return Err(Error::MalformedSeparator(input.chars().next().unwrap_or(' ')));
        }
    };
    if rest.is_empty() {
        return Err(Error::TrailingComma);
    }
    Ok(rest)
}

pub struct List {
    options: Options,
}

impl<'a> Parser<'a> for List {
    type Output = Vec<JsonValue>;

    fn parse(&self, input: &'a str) -> ParseResult<'a, Vec<JsonValue>> {
        let (inner, remainder) = match padded(square()).parse(input)? {
            Outcome::Matched(inner, remainder) => (inner, remainder),
            Outcome::NotMatched => return Ok(Outcome::NotMatched),
        };

        let element = value(self.options);
        let mut items = vec![];
        let mut rest = skip_whitespace(inner);
        while !rest.is_empty() {
            let (item, after) = element.parse_required(rest)?;
            items.push(item);
            rest = separator(after)?;
        }

        log::trace!("list of {} items", items.len());
        Ok(Outcome::Matched(items, remainder))
    }

    fn expected(&self) -> String {
        "a list".to_string()
    }
}

pub fn list<'a>(options: Options) -> RcParser<'a, Vec<JsonValue>> {
    Rc::new(List { options })
}

pub struct KeyValuePair<'a> {
    value: RcParser<'a, JsonValue>,
}

impl<'a> Parser<'a> for KeyValuePair<'a> {
    type Output = (String, JsonValue);

    fn parse(&self, input: &'a str) -> ParseResult<'a, (String, JsonValue)> {
        // Keys can only be strings.
        let (key, rest) = padded(quoted()).parse_required(input)?;
        let (_, rest) = padded(colon()).parse_required(rest)?;
        let (value, rest) = self.value.parse_required(rest)?;
        Ok(Outcome::Matched((key.to_string(), value), rest))
    }

    fn expected(&self) -> String {
        "a key-value pair".to_string()
    }
}

/// A `"key": value` entry, decoding the value with `value`.
pub fn key_value_pair<'a>(value: RcParser<'a, JsonValue>) -> RcParser<'a, (String, JsonValue)> {
    Rc::new(KeyValuePair { value })
}

pub struct Object {
    options: Options,
}

impl<'a> Parser<'a> for Object {
    type Output = HashMap<String, JsonValue>;

    fn parse(&self, input: &'a str) -> ParseResult<'a, HashMap<String, JsonValue>> {
        let (inner, remainder) = match padded(curly()).parse(input)? {
            Outcome::Matched(inner, remainder) => (inner, remainder),
            Outcome::NotMatched => return Ok(Outcome::NotMatched),
        };

        let entry = padded(key_value_pair(value(self.options)));
        let mut entries = HashMap::new();
        let mut rest = skip_whitespace(inner);
        while !rest.is_empty() {
            let ((key, value), after) = entry.parse_required(rest)?;
            if entries.contains_key(&key) && self.options.duplicate_keys == DuplicateKeys::Reject {
                return Err(Error::DuplicateKey(key));
            }
            entries.insert(key, value);
            rest = separator(after)?;
        }

        log::trace!("object with {} entries", entries.len());
        Ok(Outcome::Matched(entries, remainder))
    }

    fn expected(&self) -> String {
        "an object".to_string()
    }
}

pub fn object<'a>(options: Options) -> RcParser<'a, HashMap<String, JsonValue>> {
    Rc::new(Object { options })
}

/// Decodes a root object or list, failing with [`Error::InvalidJson`].
pub fn parse_root(input: &str, options: Options) -> Result<JsonValue, Error> {
    let mut failure = None;

    match object(options).parse(input) {
        Ok(Outcome::Matched(entries, rest)) => {
            return finish(JsonValue::Object(entries), rest);
        }
        Ok(Outcome::NotMatched) => {}
        Err(err) => {
            log::debug!("root is not an object ({}), trying a list", err);
            failure = Some(err);
        }
    }

    match list(options).parse(input) {
        Ok(Outcome::Matched(items, rest)) => finish(JsonValue::List(items), rest),
        Ok(Outcome::NotMatched) => {
            let err = failure.unwrap_or_else(|| Error::Expected("'{' or '['".to_string()));
            log::debug!("rejecting input: {}", err);
            Err(Error::InvalidJson(Box::new(err)))
        }
        Err(err) => {
            log::debug!("rejecting input: {}", err);
            Err(Error::InvalidJson(Box::new(err)))
        }
    }
}

fn finish(value: JsonValue, rest: &str) -> Result<JsonValue, Error> {
    let rest = skip_whitespace(rest);
    if rest.is_empty() {
        Ok(value)
    } else {
        let err = Error::TrailingCharacters(rest.to_string());
        Err(Error::InvalidJson(Box::new(err)))
    }
}
