//! Splits template text into literal text and actions.
//!
//! An action is everything between [`OPEN`] and [`CLOSE`]. A `-` followed
//! by a space right after the opening delimiter (or a space and `-` right
//! before the closing one) trims the whitespace of the adjacent text.

use winnow::{
    Parser as _,
    ascii::{digit1, multispace0, multispace1},
    combinator::{alt, cut_err, delimited, opt, peek, preceded, repeat, terminated},
    error::{ContextError, ModalResult, StrContext, StrContextValue},
    stream::{LocatingSlice, Location},
    token::{none_of, one_of, rest, take_until, take_while},
};

pub(super) const OPEN: &str = "<:";
pub(super) const CLOSE: &str = ":>";

type Input<'a> = LocatingSlice<&'a str>;
type PResult<O> = ModalResult<O, ContextError>;

/// A lexical item of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Item {
    /// `.`, `.Name` or `.A.B`.
    Dot(Vec<String>),
    /// `$`, `$x` or `$x.Name`; the root variable has an empty name.
    Variable(String, Vec<String>),
    Ident(String),
    Str(String),
    Int(i64),
    Bool(bool),
    Nil,
    Declare,
    Assign,
    Pipe,
    Open,
    Close,
    Comma,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Segment {
    Text(String),
    Action { items: Vec<Item>, line: usize },
}

/// A lexing failure: the line it happened on and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct LexError {
    pub line: usize,
    pub reason: String,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn field(input: &mut Input<'_>) -> PResult<String> {
    preceded('.', take_while(1.., is_word_char))
        .map(|name: &str| name.to_string())
        .parse_next(input)
}

fn dot(input: &mut Input<'_>) -> PResult<Item> {
    alt((
        repeat(1.., field).map(Item::Dot),
        '.'.value(Item::Dot(Vec::new())),
    ))
    .parse_next(input)
}

fn variable(input: &mut Input<'_>) -> PResult<Item> {
    preceded('$', (take_while(0.., is_word_char), repeat(0.., field)))
        .map(|(name, fields): (&str, Vec<String>)| Item::Variable(name.to_string(), fields))
        .parse_next(input)
}

fn escaped(input: &mut Input<'_>) -> PResult<char> {
    preceded('\\', one_of(['n', 't', 'r', '\\', '"', '\'']))
        .map(|c| match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            other => other,
        })
        .parse_next(input)
}

fn quoted(input: &mut Input<'_>) -> PResult<String> {
    let content = repeat(0.., alt((escaped, none_of(['"', '\\', '\n'])))).fold(
        String::new,
        |mut acc, c| {
            acc.push(c);
            acc
        },
    );
    preceded(
        '"',
        cut_err(terminated(content, '"'))
            .context(StrContext::Expected(StrContextValue::CharLiteral('"'))),
    )
    .parse_next(input)
}

fn raw(input: &mut Input<'_>) -> PResult<String> {
    delimited('`', take_until(0.., "`"), '`')
        .map(|text: &str| text.to_string())
        .parse_next(input)
}

fn number(input: &mut Input<'_>) -> PResult<Item> {
    (opt('-'), digit1)
        .take()
        .try_map(|text: &str| text.parse::<i64>())
        .map(Item::Int)
        .parse_next(input)
}

fn word(input: &mut Input<'_>) -> PResult<Item> {
    take_while(1.., is_word_char)
        .map(|word: &str| match word {
            "true" => Item::Bool(true),
            "false" => Item::Bool(false),
            "nil" => Item::Nil,
            _ => Item::Ident(word.to_string()),
        })
        .parse_next(input)
}

fn punct(input: &mut Input<'_>) -> PResult<Item> {
    alt((
        ":=".value(Item::Declare),
        '='.value(Item::Assign),
        '|'.value(Item::Pipe),
        '('.value(Item::Open),
        ')'.value(Item::Close),
        ','.value(Item::Comma),
    ))
    .parse_next(input)
}

fn item(input: &mut Input<'_>) -> PResult<Item> {
    alt((
        quoted.map(Item::Str),
        raw.map(Item::Str),
        number,
        variable,
        dot,
        punct,
        word,
    ))
    .parse_next(input)
}

fn comment(input: &mut Input<'_>) -> PResult<()> {
    delimited("/*", take_until(0.., "*/"), "*/")
        .void()
        .parse_next(input)
}

/// An action: its items and whether it trims the text before and after.
fn action(input: &mut Input<'_>) -> PResult<(Vec<Item>, bool, bool)> {
    OPEN.parse_next(input)?;
    let trim_left = opt(terminated('-', multispace1)).parse_next(input)?.is_some();
    opt(preceded(multispace0, comment)).parse_next(input)?;
    let items: Vec<Item> = repeat(0.., preceded(multispace0, item)).parse_next(input)?;
    multispace0.parse_next(input)?;
    let trim_right = opt(terminated('-', peek(CLOSE))).parse_next(input)?.is_some();
    cut_err(CLOSE)
        .context(StrContext::Expected(StrContextValue::StringLiteral(CLOSE)))
        .parse_next(input)?;
    Ok((items, trim_left, trim_right))
}

fn text<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    alt((take_until(1.., OPEN), rest)).parse_next(input)
}

/// Line of the byte at `offset`, starting at 1.
pub(super) fn line_at(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())].matches('\n').count() + 1
}

/// Split `source` into text and action segments.
pub(super) fn lex(source: &str) -> Result<Vec<Segment>, LexError> {
    let mut input = LocatingSlice::new(source);
    let mut segments = Vec::new();
    let mut trim_next = false;

    while !input.is_empty() {
        let start = input.current_token_start();
        if input.starts_with(OPEN) {
            let Ok((items, trim_left, trim_right)) = action.parse_next(&mut input) else {
                let offset = input.current_token_start();
                let reason = match source[offset..].chars().next() {
                    Some(c) if !source[offset..].starts_with(CLOSE) => {
                        format!("unexpected {c:?} in action")
                    }
                    _ => "unclosed action".to_string(),
                };
                return Err(LexError {
                    line: line_at(source, offset),
                    reason,
                });
            };
            if trim_left {
                if let Some(Segment::Text(text)) = segments.last_mut() {
                    let len = text.trim_end().len();
                    text.truncate(len);
                }
            }
            segments.push(Segment::Action {
                items,
                line: line_at(source, start),
            });
            trim_next = trim_right;
        } else {
            let Ok(chunk) = text.parse_next(&mut input) else {
                break;
            };
            let chunk = if trim_next { chunk.trim_start() } else { chunk };
            trim_next = false;
            if !chunk.is_empty() {
                segments.push(Segment::Text(chunk.to_string()));
            }
        }
    }
    Ok(segments)
}
