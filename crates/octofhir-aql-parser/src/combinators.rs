//! Token-level parsers shared by the clause parsers
//!
//! Every parser here skips leading whitespace. Parsers that fail without
//! consuming restore the input so callers can try another branch.

use octofhir_aql_ast::{IdentifiedPath, Literal};
use rust_decimal::Decimal;
use std::str::{CharIndices, FromStr};
use winnow::ascii::digit1;
use winnow::combinator::{alt, opt};
use winnow::error::{AddContext, ContextError, StrContext};
use winnow::prelude::*;
use winnow::stream::Stream;
use winnow::token::{literal, one_of, take_while};

pub(crate) type Input<'a> = &'a str;
pub(crate) type PResult<T> = Result<T, ContextError>;

/// Words that can never be used as an alias or a path root
const RESERVED: &[&str] = &[
    "AND",
    "AS",
    "ASC",
    "ASCENDING",
    "BY",
    "CONTAINS",
    "DESC",
    "DESCENDING",
    "DISTINCT",
    "EXISTS",
    "FALSE",
    "FROM",
    "LIKE",
    "LIMIT",
    "MATCHES",
    "NOT",
    "NULL",
    "OFFSET",
    "OR",
    "ORDER",
    "SELECT",
    "TOP",
    "TRUE",
    "WHERE",
];

pub(crate) fn is_reserved(word: &str) -> bool {
    RESERVED.iter().any(|reserved| reserved.eq_ignore_ascii_case(word))
}

/// A recoverable failure with no label attached
pub(crate) fn backtrack() -> ContextError {
    ContextError::new()
}

/// A failure labelled with what was being parsed at the current position
pub(crate) fn fail_with(input: &Input<'_>, label: &'static str) -> ContextError {
    let start = input.checkpoint();
    ContextError::new().add_context(input, &start, StrContext::Label(label))
}

/// Skip whitespace
pub(crate) fn ws(input: &mut Input<'_>) -> PResult<()> {
    take_while(0.., |c: char| c.is_whitespace())
        .void()
        .parse_next(input)
}

/// Parse a bare identifier (`[A-Za-z_][A-Za-z0-9_]*`)
pub(crate) fn identifier<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    ws(input)?;
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

/// Parse an identifier that is not a reserved word
pub(crate) fn name<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    let checkpoint = *input;
    match identifier(input) {
        Ok(word) if !is_reserved(word) => Ok(word),
        _ => {
            *input = checkpoint;
            Err(backtrack())
        }
    }
}

/// Case-insensitive keyword matching a whole word
pub(crate) fn keyword<'a>(kw: &'static str) -> impl Parser<Input<'a>, &'a str, ContextError> {
    move |input: &mut Input<'a>| -> PResult<&'a str> {
        let checkpoint = *input;
        match identifier(input) {
            Ok(word) if word.eq_ignore_ascii_case(kw) => Ok(word),
            _ => {
                *input = checkpoint;
                Err(backtrack())
            }
        }
    }
}

/// Punctuation token
pub(crate) fn lit<'a>(token: &'static str) -> impl Parser<Input<'a>, &'a str, ContextError> {
    move |input: &mut Input<'a>| -> PResult<&'a str> {
        let checkpoint = *input;
        ws(input)?;
        match literal(token).parse_next(input) {
            Ok(matched) => Ok(matched),
            Err(e) => {
                *input = checkpoint;
                Err(e)
            }
        }
    }
}

/// Single- or double-quoted string with backslash escapes.
///
/// Recognised escapes are `\b \t \n \f \r \" \' \\ \/` and `\uXXXX`
/// (with surrogate pairs); anything else fails.
pub(crate) fn string_literal(input: &mut Input<'_>) -> PResult<String> {
    ws(input)?;
    let source = *input;
    let mut chars = source.char_indices();
    let quote = match chars.next() {
        Some((_, c @ ('\'' | '"'))) => c,
        _ => return Err(backtrack()),
    };

    let mut value = String::new();
    while let Some((i, c)) = chars.next() {
        if c == quote {
            *input = &source[i + c.len_utf8()..];
            return Ok(value);
        }
        if c != '\\' {
            value.push(c);
            continue;
        }
        let decoded = match chars.next().map(|(_, e)| e) {
            Some('b') => '\u{8}',
            Some('t') => '\t',
            Some('n') => '\n',
            Some('f') => '\u{c}',
            Some('r') => '\r',
            Some(e @ ('"' | '\'' | '\\' | '/')) => e,
            Some('u') => match unicode_escape(&mut chars) {
                Some(decoded) => decoded,
                None => return Err(fail_with(input, "string")),
            },
            _ => return Err(fail_with(input, "string")),
        };
        value.push(decoded);
    }

    Err(fail_with(input, "string"))
}

/// Decode the hex digits after `\u`, joining a following low surrogate
fn unicode_escape(chars: &mut CharIndices<'_>) -> Option<char> {
    let high = hex4(chars)?;
    if !(0xD800..0xDC00).contains(&high) {
        return char::from_u32(high);
    }
    if chars.next()?.1 != '\\' || chars.next()?.1 != 'u' {
        return None;
    }
    let low = hex4(chars)?;
    if !(0xDC00..0xE000).contains(&low) {
        return None;
    }
    char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
}

fn hex4(chars: &mut CharIndices<'_>) -> Option<u32> {
    (0..4).try_fold(0u32, |acc, _| {
        let digit = chars.next()?.1.to_digit(16)?;
        Some(acc * 16 + digit)
    })
}

fn number_text<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    (opt('-'), digit1, opt(('.', digit1))).take().parse_next(input)
}

/// Integer or decimal literal
pub(crate) fn number_literal(input: &mut Input<'_>) -> PResult<Literal> {
    ws(input)?;
    let checkpoint = *input;
    let Ok(text) = number_text(input) else {
        *input = checkpoint;
        return Err(fail_with(input, "number"));
    };

    let value = if text.contains('.') {
        Decimal::from_str(text).ok().map(Literal::Decimal)
    } else {
        text.parse::<i64>().ok().map(Literal::Integer)
    };
    value.ok_or_else(|| {
        *input = checkpoint;
        fail_with(input, "number")
    })
}

/// Non-negative integer used by TOP, LIMIT and OFFSET
pub(crate) fn unsigned(input: &mut Input<'_>) -> PResult<u64> {
    ws(input)?;
    let checkpoint = *input;
    let parsed: PResult<u64> = digit1.parse_to().parse_next(input);
    parsed.map_err(|_| {
        *input = checkpoint;
        fail_with(input, "number")
    })
}

/// `true`, `false` or `null`
pub(crate) fn keyword_literal(input: &mut Input<'_>) -> PResult<Literal> {
    alt((
        keyword("TRUE").value(Literal::Boolean(true)),
        keyword("FALSE").value(Literal::Boolean(false)),
        keyword("NULL").value(Literal::Null),
    ))
    .parse_next(input)
}

/// Parameter placeholder `$name`, returning the name
pub(crate) fn parameter(input: &mut Input<'_>) -> PResult<String> {
    lit("$").parse_next(input)?;
    let parsed: PResult<&str> =
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input);
    parsed
        .map(str::to_string)
        .map_err(|_| fail_with(input, "parameter"))
}

/// Raw content of a bracketed predicate, keeping nested brackets and quoted strings intact
pub(crate) fn bracketed<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    let source = *input;
    if !source.starts_with('[') {
        return Err(backtrack());
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in source.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    *input = &source[i + 1..];
                    return Ok(&source[1..i]);
                }
            }
            _ => {}
        }
    }

    Err(fail_with(input, "closing delimiter"))
}

fn segment_name<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
    })
    .parse_next(input)
}

fn path_segment(input: &mut Input<'_>) -> PResult<()> {
    segment_name(input)?;
    if input.starts_with('[') {
        bracketed(input)?;
    }
    Ok(())
}

/// Path rooted at an alias: `alias[predicate]/segment[predicate]/segment`
pub(crate) fn identified_path(input: &mut Input<'_>) -> PResult<IdentifiedPath> {
    let root = name(input)?;
    let mut path = IdentifiedPath::alias(root);

    if input.starts_with('[') {
        path.predicate = Some(bracketed(input)?.trim().to_string());
    }

    let source: &str = *input;
    if let Some(rest) = source.strip_prefix('/') {
        let mut cursor = rest;
        loop {
            if path_segment(&mut cursor).is_err() {
                *input = cursor;
                return Err(fail_with(input, "path"));
            }
            match cursor.strip_prefix('/') {
                Some(next) => cursor = next,
                None => break,
            }
        }
        let consumed = rest.len() - cursor.len();
        path.path = Some(rest[..consumed].to_string());
        *input = cursor;
    }

    Ok(path)
}
