use winnow::combinator::{alt, repeat, terminated};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::{any, none_of, take_while};

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., char::is_whitespace)
        .void()
        .parse_next(input)
}

// -- Tokens -----------------------------------------------------------------

/// `'...'` where a backslash escapes the next character. The token keeps its
/// quotes and backslashes; only the boundaries are decided here.
fn quoted<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    ('\'', quoted_body, '\'').take().parse_next(input)
}

fn quoted_body(input: &mut &str) -> ModalResult<()> {
    repeat(
        0..,
        alt((('\\', any).void(), none_of(['\'', '\\']).void())),
    )
    .parse_next(input)
}

fn bare<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| !c.is_whitespace()).parse_next(input)
}

/// An unterminated quote falls back to a bare token.
fn token<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    alt((quoted, bare)).parse_next(input)
}

// -- Top-level --------------------------------------------------------------

pub fn tokens<'i>(input: &mut &'i str) -> ModalResult<Vec<&'i str>> {
    ws.parse_next(input)?;
    repeat(0.., terminated(token, ws)).parse_next(input)
}
