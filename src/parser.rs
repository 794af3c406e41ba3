use std::cell::OnceCell;
use std::rc::Rc;

use crate::error::Error;
use crate::lexer::Whitespace;

/// The recoverable half of a parse: either the construct was found, or it does not begin here.
///
/// Fatal failures travel separately as the `Err` side of [`ParseResult`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<'a, T> {
    /// The decoded value and the unconsumed suffix of the input.
    Matched(T, &'a str),
    NotMatched,
}

impl<'a, T> Outcome<'a, T> {
    pub fn is_matched(&self) -> bool {
        matches!(self, Outcome::Matched(..))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<'a, U> {
        match self {
            Outcome::Matched(value, rest) => Outcome::Matched(f(value), rest),
            Outcome::NotMatched => Outcome::NotMatched,
        }
    }

    /// Commits to the construct, turning a non-match into a fatal failure.
    pub fn or_fatal(self, err: impl FnOnce() -> Error) -> Result<(T, &'a str), Error> {
        match self {
            Outcome::Matched(value, rest) => Ok((value, rest)),
            Outcome::NotMatched => Err(err()),
        }
    }
}

pub type ParseResult<'a, T> = Result<Outcome<'a, T>, Error>;

pub trait Parser<'a> {
    type Output;

    fn parse(&self, input: &'a str) -> ParseResult<'a, Self::Output>;

    fn expected(&self) -> String;

    fn parse_required(&self, input: &'a str) -> Result<(Self::Output, &'a str), Error> {
        self.parse(input)?
            .or_fatal(|| Error::Expected(self.expected()))
    }
}

pub type RcParser<'a, O> = Rc<dyn Parser<'a, Output = O> + 'a>;

pub struct Padded<'a, O>(RcParser<'a, O>);

impl<'a, O> Parser<'a> for Padded<'a, O> {
    type Output = O;

    fn parse(&self, input: &'a str) -> ParseResult<'a, O> {
        match Whitespace.parse(input)? {
            // Only whitespace left: there is no token to hand to the inner parser.
            Outcome::Matched((), "") => Ok(Outcome::NotMatched),
            Outcome::Matched((), rest) => self.0.parse(rest),
            Outcome::NotMatched => self.0.parse(input),
        }
    }

    fn expected(&self) -> String {
        self.0.expected()
    }
}

/// Skips optional leading whitespace before running `parser`.
pub fn padded<'a, O: 'a>(parser: RcParser<'a, O>) -> RcParser<'a, O> {
    Rc::new(Padded(parser))
}

pub(crate) fn join_with_last<S: ToString>(items: impl AsRef<[S]>, sep: &str, last_sep: &str) -> String {
    let items = items.as_ref();

    let mut buf = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push_str(if i + 1 == items.len() { last_sep } else { sep });
        }
        buf.push_str(&item.to_string());
    }
    buf
}

pub struct Alt<'a, O>(Vec<RcParser<'a, O>>);

impl<'a, O> Parser<'a> for Alt<'a, O> {
    type Output = O;

    fn parse(&self, input: &'a str) -> ParseResult<'a, O> {
        for parser in &self.0 {
            let outcome = parser.parse(input)?;
            if outcome.is_matched() {
                log::trace!("alt committed to {}", parser.expected());
                return Ok(outcome);
            }
        }
        Ok(Outcome::NotMatched)
    }

    fn expected(&self) -> String {
        join_with_last(
            self.0.iter().map(|p| p.expected()).collect::<Vec<_>>(),
            ", ",
            ", or ",
        )
    }
}

/// Tries each parser in order and returns the first match.
pub fn alt<'a, O: 'a>(parsers: impl AsRef<[RcParser<'a, O>]>) -> RcParser<'a, O> {
    Rc::new(Alt(parsers.as_ref().into()))
}

pub struct Lazy<'a, O, F> {
    f: F,
    parser: OnceCell<RcParser<'a, O>>,
}

impl<'a, O, F> Lazy<'a, O, F>
where
    F: Fn() -> RcParser<'a, O>,
{
    fn parser(&self) -> &RcParser<'a, O> {
        self.parser.get_or_init(&self.f)
    }
}

impl<'a, O, F> Parser<'a> for Lazy<'a, O, F>
where
    F: Fn() -> RcParser<'a, O>,
{
    type Output = O;

    fn parse(&self, input: &'a str) -> ParseResult<'a, O> {
        self.parser().parse(input)
    }

    fn expected(&self) -> String {
        self.parser().expected()
    }
}

/// Defers building a parser until it first runs, so recursive grammars can
/// refer to themselves. The built parser is kept for later calls.
pub fn lazy<'a, O, F>(f: F) -> RcParser<'a, O>
where
    O: 'a,
    F: 'a + Fn() -> RcParser<'a, O>,
{
    Rc::new(Lazy { f, parser: OnceCell::new() })
}

pub struct Map<'a, A, F> {
    parser: RcParser<'a, A>,
    f: F,
}

impl<'a, A, B, F> Parser<'a> for Map<'a, A, F>
where
    F: Fn(A) -> B,
{
    type Output = B;

    fn parse(&self, input: &'a str) -> ParseResult<'a, B> {
        Ok(self.parser.parse(input)?.map(&self.f))
    }

    fn expected(&self) -> String {
        self.parser.expected()
    }
}

pub fn map<'a, A, B, F>(parser: RcParser<'a, A>, f: F) -> RcParser<'a, B>
where
    A: 'a,
    B: 'a,
    F: 'a + Fn(A) -> B,
{
    Rc::new(Map { parser, f })
}

pub mod prelude {
    pub use super::{alt, lazy, map, padded, Outcome, ParseResult, Parser, RcParser};
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::lexer::{colon, comma, is, quoted};
    use test_log::test;

    #[test]
    fn padded_skips_leading_whitespace() {
        assert_eq!(padded(colon()).parse("  :1"), Ok(Outcome::Matched(':', "1")));
        assert_eq!(padded(colon()).parse(":1"), Ok(Outcome::Matched(':', "1")));
        assert_eq!(padded(colon()).parse(" \n\t"), Ok(Outcome::NotMatched));
        assert_eq!(padded(colon()).parse(" ,"), Ok(Outcome::NotMatched));
    }

    #[test]
    fn padded_propagates_fatal_failures() {
        assert_eq!(padded(quoted()).parse("  \"abc"), Err(Error::UnclosedQuote));
    }

    #[test]
    fn alt_commits_to_first_match() {
        let p = alt(&[is('a'), is('b'), is('b')]);
        assert_eq!(p.parse("bc"), Ok(Outcome::Matched('b', "c")));
        assert_eq!(p.parse("c"), Ok(Outcome::NotMatched));
        assert_eq!(p.expected(), "'a', 'b', or 'b'");
    }

    #[test]
    fn alt_stops_on_fatal_failure() {
        let p = alt(&[map(quoted(), |_| ','), comma()]);
        assert_eq!(p.parse("\"open"), Err(Error::UnclosedQuote));
    }

    #[test]
    fn parse_required_turns_non_match_into_failure() {
        assert_eq!(
            comma().parse_required("x"),
            Err(Error::Expected("','".to_string()))
        );
        assert_eq!(comma().parse_required(",x"), Ok((',', "x")));
    }

    #[test]
    fn lazy_builds_once_on_demand() {
        let built = Rc::new(Cell::new(0));
        let counter = built.clone();
        let p = lazy(move || {
            counter.set(counter.get() + 1);
            is('x')
        });
        assert_eq!(built.get(), 0);
        assert_eq!(p.parse("xy"), Ok(Outcome::Matched('x', "y")));
        assert_eq!(p.parse("yx"), Ok(Outcome::NotMatched));
        assert_eq!(p.expected(), "'x'");
        assert_eq!(built.get(), 1);
    }

    #[test]
    fn outcome_or_fatal() {
        let matched: Outcome<'_, u8> = Outcome::Matched(1, "rest");
        assert_eq!(matched.or_fatal(|| Error::TrailingComma), Ok((1, "rest")));
        let missing: Outcome<'_, u8> = Outcome::NotMatched;
        assert_eq!(missing.or_fatal(|| Error::TrailingComma), Err(Error::TrailingComma));
    }
}
