//! Leaf token parsers. Each recognizes one lexical construct at the very start
//! of its input and never looks past leading whitespace.

use std::convert::TryFrom;
use std::rc::Rc;

use crate::error::{BracketKind, Error};
use crate::parser::{Outcome, ParseResult, Parser, RcParser};
use crate::value::Number;

pub struct Is(char);

impl<'a> Parser<'a> for Is {
    type Output = char;

    fn parse(&self, input: &'a str) -> ParseResult<'a, char> {
        match input.chars().next() {
            Some(c) if c == self.0 => Ok(Outcome::Matched(c, &input[c.len_utf8()..])),
            _ => Ok(Outcome::NotMatched),
        }
    }

    fn expected(&self) -> String {
        format!("'{}'", self.0)
    }
}

pub fn is<'a>(c: char) -> RcParser<'a, char> {
    Rc::new(Is(c))
}

pub fn minus<'a>() -> RcParser<'a, char> {
    is('-')
}

pub fn colon<'a>() -> RcParser<'a, char> {
    is(':')
}

pub fn comma<'a>() -> RcParser<'a, char> {
    is(',')
}

pub struct Whitespace;

impl<'a> Parser<'a> for Whitespace {
    type Output = ();

    fn parse(&self, input: &'a str) -> ParseResult<'a, ()> {
        match input.chars().next() {
            Some(c) if c.is_whitespace() => {
                Ok(Outcome::Matched((), input.trim_start_matches(char::is_whitespace)))
            }
            _ => Ok(Outcome::NotMatched),
        }
    }

    fn expected(&self) -> String {
        "whitespace".to_string()
    }
}

pub fn whitespace<'a>() -> RcParser<'a, ()> {
    Rc::new(Whitespace)
}

/// Strips leading whitespace, returning the input unchanged when there is none.
pub(crate) fn skip_whitespace(input: &str) -> &str {
    input.trim_start_matches(char::is_whitespace)
}

/// Byte offset of the quote that closes a string whose opening quote has
/// already been consumed. A quote directly after a backslash is escaped.
fn closing_quote(body: &str) -> Option<usize> {
    let mut prev = None;
    for (i, c) in body.char_indices() {
        if c == '"' && prev != Some('\\') {
            return Some(i);
        }
        prev = Some(c);
    }
    None
}

pub struct Quoted;

impl<'a> Parser<'a> for Quoted {
    type Output = &'a str;

    fn parse(&self, input: &'a str) -> ParseResult<'a, &'a str> {
        let body = match input.strip_prefix('"') {
            Some(body) => body,
            None => return Ok(Outcome::NotMatched),
        };
        let end = closing_quote(body).ok_or(Error::UnclosedQuote)?;
        Ok(Outcome::Matched(&body[..end], &body[end + 1..]))
    }

    fn expected(&self) -> String {
        "a quoted string".to_string()
    }
}

/// A double-quoted string, yielding the raw text between the quotes.
pub fn quoted<'a>() -> RcParser<'a, &'a str> {
    Rc::new(Quoted)
}

pub struct Bracketed(BracketKind);

impl<'a> Parser<'a> for Bracketed {
    type Output = &'a str;

    fn parse(&self, input: &'a str) -> ParseResult<'a, &'a str> {
        let (open, close) = (self.0.open(), self.0.close());
        if !input.starts_with(open) {
            return Ok(Outcome::NotMatched);
        }

        let mut depth = 0usize;
        let mut pos = 0;
        while let Some(c) = input[pos..].chars().next() {
            if c == '"' {
                // Quoted text is opaque: brackets inside it are not counted.
                let end = closing_quote(&input[pos + 1..]).ok_or(Error::UnclosedQuote)?;
                pos += end + 2;
                continue;
            }
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(Outcome::Matched(&input[1..pos], &input[pos + 1..]));
                }
            }
            pos += c.len_utf8();
        }
        Err(Error::UnclosedBracket(self.0))
    }

    fn expected(&self) -> String {
        format!("'{}'", self.0.open())
    }
}

/// A balanced `{...}` pair, yielding the unparsed text between the braces.
pub fn curly<'a>() -> RcParser<'a, &'a str> {
    Rc::new(Bracketed(BracketKind::Curly))
}

/// A balanced `[...]` pair, yielding the unparsed text between the brackets.
pub fn square<'a>() -> RcParser<'a, &'a str> {
    Rc::new(Bracketed(BracketKind::Square))
}

pub struct Digits {
    negative: bool,
}

impl Digits {
    fn integer(&self, text: &str) -> Option<Number> {
        let n = text.parse::<i128>().ok()?;
        let n = if self.negative { -n } else { n };
        i64::try_from(n).ok().map(Number::Int)
    }

    fn float(&self, text: &str) -> Result<Number, Error> {
        let n: f64 = text
            .parse()
            .map_err(|_| Error::InvalidNumber(text.to_string()))?;
        Ok(Number::Float(if self.negative { -n } else { n }))
    }
}

impl<'a> Parser<'a> for Digits {
    type Output = Number;

    fn parse(&self, input: &'a str) -> ParseResult<'a, Number> {
        if !input.starts_with(|c: char| c.is_ascii_digit()) {
            return Ok(Outcome::NotMatched);
        }

        let mut is_float = false;
        let mut len = 0;
        for c in input.chars() {
            if c == '.' {
                if is_float {
                    return Err(Error::InvalidNumber(input[..=len].to_string()));
                }
                is_float = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            len += 1;
        }

        let (text, rest) = input.split_at(len);
        if text.ends_with('.') {
            return Err(Error::InvalidNumber(text.to_string()));
        }
        // Integers outside i64 degrade to floats rather than failing.
        let number = match self.integer(text) {
            Some(number) if !is_float => number,
            _ => self.float(text)?,
        };
        Ok(Outcome::Matched(number, rest))
    }

    fn expected(&self) -> String {
        "a digit".to_string()
    }
}

/// Digits with at most one decimal point; no sign, no exponent.
pub fn positive_number<'a>() -> RcParser<'a, Number> {
    Rc::new(Digits { negative: false })
}

/// The digits that follow a `-`, decoded with the sign applied so that
/// `i64::MIN` stays an integer.
pub fn negated_number<'a>() -> RcParser<'a, Number> {
    Rc::new(Digits { negative: true })
}

pub mod prelude {
    pub use super::{
        colon,
        comma,
        curly,
        is,
        minus,
        negated_number,
        positive_number,
        quoted,
        square,
        whitespace,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn quoted_strings() {
        assert_eq!(quoted().parse("\"abc\""), Ok(Outcome::Matched("abc", "")));
        assert_eq!(quoted().parse(r#""\"abc""#), Ok(Outcome::Matched(r#"\"abc"#, "")));
        assert_eq!(quoted().parse("\"\""), Ok(Outcome::Matched("", "")));
        assert_eq!(
            quoted().parse(r#""abc", "bcd""#),
            Ok(Outcome::Matched("abc", r#", "bcd""#))
        );
        assert_eq!(quoted().parse("\"héllo\" x"), Ok(Outcome::Matched("héllo", " x")));
    }

    #[test]
    fn quoted_fails_when_unclosed() {
        assert_eq!(quoted().parse("\"ab"), Err(Error::UnclosedQuote));
        assert_eq!(quoted().parse("\""), Err(Error::UnclosedQuote));
        assert_eq!(quoted().parse(r#""ab\""#), Err(Error::UnclosedQuote));
    }

    #[test]
    fn quoted_not_found() {
        assert_eq!(quoted().parse("a"), Ok(Outcome::NotMatched));
        assert_eq!(quoted().parse(""), Ok(Outcome::NotMatched));
    }

    #[test]
    fn curly_brackets() {
        assert_eq!(curly().parse("{}"), Ok(Outcome::Matched("", "")));
        assert_eq!(
            curly().parse(r#"{"abc": 123}, {"def" : 354}"#),
            Ok(Outcome::Matched(r#""abc": 123"#, r#", {"def" : 354}"#))
        );
        assert_eq!(curly().parse("{{}{}}x"), Ok(Outcome::Matched("{}{}", "x")));
        assert_eq!(curly().parse("{"), Err(Error::UnclosedBracket(BracketKind::Curly)));
        assert_eq!(curly().parse("a"), Ok(Outcome::NotMatched));
    }

    #[test]
    fn square_brackets() {
        assert_eq!(square().parse("[]"), Ok(Outcome::Matched("", "")));
        assert_eq!(
            square().parse(r#"["abc"], ["def"]"#),
            Ok(Outcome::Matched(r#""abc""#, r#", ["def"]"#))
        );
        assert_eq!(square().parse("["), Err(Error::UnclosedBracket(BracketKind::Square)));
        assert_eq!(square().parse("[[][]"), Err(Error::UnclosedBracket(BracketKind::Square)));
        assert_eq!(square().parse("{}"), Ok(Outcome::NotMatched));
    }

    #[test]
    fn brackets_ignore_other_kind_and_quoted_text() {
        assert_eq!(square().parse("[{]}]"), Ok(Outcome::Matched("{", "}]")));
        assert_eq!(
            curly().parse(r#"{"abc":"d}[[{}{{{}}"}"#),
            Ok(Outcome::Matched(r#""abc":"d}[[{}{{{}}""#, ""))
        );
        assert_eq!(
            square().parse(r#"["[[["]"#),
            Ok(Outcome::Matched(r#""[[[""#, ""))
        );
        assert_eq!(
            square().parse(r#"["\"]"]"#),
            Ok(Outcome::Matched(r#""\"]""#, ""))
        );
        assert_eq!(square().parse(r#"["]"#), Err(Error::UnclosedQuote));
        assert_eq!(square().parse(r#"["abc]"#), Err(Error::UnclosedQuote));
        assert_eq!(curly().parse(r#"{"a": "b}"#), Err(Error::UnclosedQuote));
    }

    #[test]
    fn whitespace_runs() {
        assert_eq!(whitespace().parse("  "), Ok(Outcome::Matched((), "")));
        assert_eq!(whitespace().parse("        abc  "), Ok(Outcome::Matched((), "abc  ")));
        assert_eq!(whitespace().parse("\n\t\r abc"), Ok(Outcome::Matched((), "abc")));
        assert_eq!(whitespace().parse("a"), Ok(Outcome::NotMatched));
    }

    #[test]
    fn positive_numbers() {
        assert_eq!(positive_number().parse("1"), Ok(Outcome::Matched(Number::Int(1), "")));
        assert_eq!(positive_number().parse("0"), Ok(Outcome::Matched(Number::Int(0), "")));
        assert_eq!(
            positive_number().parse("56.05"),
            Ok(Outcome::Matched(Number::Float(56.05), ""))
        );
        assert_eq!(
            positive_number().parse("123.45,56"),
            Ok(Outcome::Matched(Number::Float(123.45), ",56"))
        );
        assert_eq!(
            positive_number().parse("123, 89"),
            Ok(Outcome::Matched(Number::Int(123), ", 89"))
        );
    }

    #[test]
    fn malformed_numbers_are_fatal() {
        assert_eq!(positive_number().parse("13."), Err(Error::InvalidNumber("13.".into())));
        assert_eq!(positive_number().parse("0."), Err(Error::InvalidNumber("0.".into())));
        assert_eq!(positive_number().parse("0..1"), Err(Error::InvalidNumber("0..".into())));
    }

    #[test]
    fn integers_keep_their_range() {
        assert_eq!(
            positive_number().parse("9223372036854775807"),
            Ok(Outcome::Matched(Number::Int(i64::MAX), ""))
        );
        assert_eq!(
            negated_number().parse("9223372036854775808]"),
            Ok(Outcome::Matched(Number::Int(i64::MIN), "]"))
        );
        assert_eq!(
            negated_number().parse("123.05"),
            Ok(Outcome::Matched(Number::Float(-123.05), ""))
        );
    }

    #[test]
    fn oversized_integers_become_floats() {
        let (number, rest) = positive_number()
            .parse_required("99999999999999999999,")
            .unwrap();
        assert_eq!(rest, ",");
        assert!(number.is_float());
        assert_eq!(number.as_f64(), 1e20);
        assert_eq!(
            positive_number().parse("18446744073709551615"),
            Ok(Outcome::Matched(Number::Float(18446744073709551615.0), ""))
        );
        assert_eq!(
            negated_number().parse("9223372036854775809"),
            Ok(Outcome::Matched(Number::Float(-9223372036854775809.0), ""))
        );
    }

    #[test]
    fn numbers_not_found() {
        assert_eq!(positive_number().parse("a"), Ok(Outcome::NotMatched));
        assert_eq!(positive_number().parse("{}"), Ok(Outcome::NotMatched));
        assert_eq!(positive_number().parse("\"123\""), Ok(Outcome::NotMatched));
        assert_eq!(positive_number().parse("-1"), Ok(Outcome::NotMatched));
    }

    #[test]
    fn single_characters() {
        assert_eq!(minus().parse("-20"), Ok(Outcome::Matched('-', "20")));
        assert_eq!(colon().parse(":"), Ok(Outcome::Matched(':', "")));
        assert_eq!(comma().parse(",56"), Ok(Outcome::Matched(',', "56")));
        assert_eq!(comma().parse("{}"), Ok(Outcome::NotMatched));
        assert_eq!(colon().parse("\"123\""), Ok(Outcome::NotMatched));
    }
}
