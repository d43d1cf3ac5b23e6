//! Run-length encoded pattern decoding.
//!
//! The body grammar is a sequence of `<count><tag>` tokens where `count` is an
//! optional positive decimal (absent means 1) and `tag` is `b` (dead run),
//! `o` (alive run) or `$` (end of row, repeated `count` times). `!` ends the
//! pattern and everything after it is ignored. ASCII whitespace (space, tab,
//! CR, LF) between tokens is skipped.
//!
//! [`parse_document`] additionally understands the usual file framing: `#`
//! comment lines and an `x = .., y = .., rule = ..` header line.

use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{is_not, tag};
use nom::character::complete::{
    alpha1, char, digit1, line_ending, multispace0, multispace1, not_line_ending, one_of, space0,
};
use nom::combinator::{cut, eof, map, map_res, opt, peek, success, value};
use nom::error::{ErrorKind, FromExternalError, ParseError};
use nom::multi::{many0, separated_list1};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use thiserror::Error;

use super::patterns::{Pattern, Run};
use super::{Cell, LifeLikeRule, RuleParseError};

/// Pattern text that does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed pattern at byte {offset}: {reason}")]
    MalformedPattern { offset: usize, reason: MalformedReason },
}

impl DecodeError {
    fn at(offset: usize, reason: MalformedReason) -> Self {
        DecodeError::MalformedPattern { offset, reason }
    }

    /// Byte offset of the offending input
    pub fn offset(&self) -> usize {
        match self {
            DecodeError::MalformedPattern { offset, .. } => *offset,
        }
    }

    pub fn reason(&self) -> &MalformedReason {
        match self {
            DecodeError::MalformedPattern { reason, .. } => reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("unknown tag {0:?}")]
    UnknownTag(char),
    #[error("count is not followed by a tag")]
    MissingTag,
    #[error("run count must be positive")]
    ZeroCount,
    #[error("run count overflows")]
    CountOverflow,
    #[error("expected a digit")]
    ExpectedDigit,
    #[error("header entry is not `key = value`")]
    MalformedHeader,
    #[error("unknown header key {0:?}")]
    UnknownHeaderKey(String),
    #[error("invalid rule: {0}")]
    InvalidRule(RuleParseError),
}

/// Parser error: the unparsed input where it failed, plus why.
///
/// Every input slice is a suffix of the text being parsed, so the byte offset
/// is `text.len() - input.len()`.
#[derive(Debug)]
struct PatternError<'a> {
    input: &'a str,
    reason: MalformedReason,
}

impl<'a> PatternError<'a> {
    fn new(input: &'a str, reason: MalformedReason) -> Self {
        Self { input, reason }
    }
}

impl<'a> ParseError<&'a str> for PatternError<'a> {
    // A bare nom failure inside the body is always at a tag position
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        Self::new(input, missing_or_unknown(input))
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<'a> FromExternalError<&'a str, MalformedReason> for PatternError<'a> {
    fn from_external_error(input: &'a str, _kind: ErrorKind, reason: MalformedReason) -> Self {
        Self::new(input, reason)
    }
}

impl<'a> FromExternalError<&'a str, RuleParseError> for PatternError<'a> {
    fn from_external_error(input: &'a str, _kind: ErrorKind, err: RuleParseError) -> Self {
        Self::new(input, MalformedReason::InvalidRule(err))
    }
}

type PResult<'a, O> = IResult<&'a str, O, PatternError<'a>>;

fn failure(input: &str, reason: MalformedReason) -> nom::Err<PatternError<'_>> {
    nom::Err::Failure(PatternError::new(input, reason))
}

/// Run `parser`; any error becomes a failure with `reason` where it was tried
fn with_reason<'a, O>(
    reason: MalformedReason,
    mut parser: impl FnMut(&'a str) -> PResult<'a, O>,
) -> impl FnMut(&'a str) -> PResult<'a, O> {
    move |input| parser(input).map_err(|_| failure(input, reason.clone()))
}

/// What went wrong at a position where a tag was expected
fn missing_or_unknown(input: &str) -> MalformedReason {
    match input.chars().next() {
        None | Some('!' | ' ' | '\t' | '\r' | '\n') => MalformedReason::MissingTag,
        Some(ch) => MalformedReason::UnknownTag(ch),
    }
}

fn malformed(err: nom::Err<PatternError<'_>>, offset_of: impl Fn(&str) -> usize) -> DecodeError {
    match err {
        nom::Err::Error(err) | nom::Err::Failure(err) => {
            DecodeError::at(offset_of(err.input), err.reason)
        }
        nom::Err::Incomplete(_) => DecodeError::at(offset_of(""), MalformedReason::MissingTag),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Dead(usize),
    Alive(usize),
    RowEnd(usize),
    End,
}

fn positive_count(digits: &str) -> Result<usize, MalformedReason> {
    match digits.parse::<usize>() {
        Ok(0) => Err(MalformedReason::ZeroCount),
        Ok(count) => Ok(count),
        Err(_) => Err(MalformedReason::CountOverflow),
    }
}

/// Optional decimal count, 1 when absent
fn run_count(input: &str) -> PResult<'_, usize> {
    alt((
        preceded(peek(digit1), cut(map_res(digit1, positive_count))),
        success(1),
    ))(input)
}

/// `<count><tag>`; no whitespace is allowed between the two
fn run(input: &str) -> PResult<'_, Token> {
    let (rest, count) = run_count(input)?;
    cut(alt((
        value(Token::Dead(count), char('b')),
        value(Token::Alive(count), char('o')),
        value(Token::RowEnd(count), char('$')),
    )))(rest)
}

fn token(input: &str) -> PResult<'_, Token> {
    alt((value(Token::End, char('!')), value(Token::End, eof), run))(input)
}

/// Decode an RLE pattern body into a [`Pattern`].
///
/// An empty body (`""`, `"!"`, whitespace) is a valid pattern with no stamps.
pub fn decode(text: &str) -> Result<Pattern, DecodeError> {
    decode_at(text, 0)
}

/// Cursor state while decoding
#[derive(Default)]
struct Cursor {
    row: usize,
    col: usize,
    pattern: Pattern,
}

impl Cursor {
    fn run(&mut self, len: usize, state: Cell) -> Option<()> {
        let end = self.col.checked_add(len)?;
        self.pattern.push_run(Run {
            row: self.row,
            col: self.col,
            len,
            state,
        });
        self.col = end;
        Some(())
    }

    fn end_rows(&mut self, count: usize) -> Option<()> {
        self.row = self.row.checked_add(count)?;
        self.col = 0;
        Some(())
    }
}

/// Decode `text`, reporting error offsets shifted by `base`
fn decode_at(text: &str, base: usize) -> Result<Pattern, DecodeError> {
    let offset_of = |rest: &str| base + text.len() - rest.len();
    let mut cursor = Cursor::default();
    let mut input = text;

    loop {
        let (start, _) =
            multispace0::<_, PatternError<'_>>(input).map_err(|err| malformed(err, offset_of))?;
        let (rest, parsed) = token(start).map_err(|err| malformed(err, offset_of))?;

        let advanced = match parsed {
            Token::Dead(len) => cursor.run(len, Cell::Dead),
            Token::Alive(len) => cursor.run(len, Cell::Alive),
            Token::RowEnd(count) => cursor.end_rows(count),
            Token::End => break,
        };
        advanced
            .ok_or_else(|| DecodeError::at(offset_of(start), MalformedReason::CountOverflow))?;
        input = rest;
    }

    Ok(cursor.pattern)
}

/// An RLE file: optional metadata around a pattern body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RleDocument {
    /// From a `#N` line
    pub name: Option<String>,
    /// From a `#O` line
    pub author: Option<String>,
    /// `#C` / `#c` lines, in order
    pub comments: Vec<String>,
    /// Declared `x`
    pub width: Option<usize>,
    /// Declared `y`
    pub height: Option<usize>,
    pub rule: Option<LifeLikeRule>,
    pub pattern: Pattern,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HeaderEntry {
    Width(usize),
    Height(usize),
    Rule(LifeLikeRule),
}

/// `#` line, returning what follows the `#`
fn comment_line(input: &str) -> PResult<'_, &str> {
    delimited(pair(space0, char('#')), not_line_ending, opt(line_ending))(input)
}

fn blank_line(input: &str) -> PResult<'_, ()> {
    value((), pair(space0, line_ending))(input)
}

fn decimal(digits: &str) -> Result<usize, MalformedReason> {
    digits.parse().map_err(|_| MalformedReason::CountOverflow)
}

fn dimension(input: &str) -> PResult<'_, usize> {
    terminated(
        cut(map_res(with_reason(MalformedReason::ExpectedDigit, digit1), decimal)),
        with_reason(
            MalformedReason::ExpectedDigit,
            peek(alt((tag(","), multispace1, eof))),
        ),
    )(input)
}

fn rule_value(input: &str) -> PResult<'_, LifeLikeRule> {
    let empty = MalformedReason::InvalidRule(RuleParseError::Empty);
    cut(map_res(with_reason(empty, is_not(", \t\r\n")), |value: &str| {
        value.parse::<LifeLikeRule>()
    }))(input)
}

fn header_entry(input: &str) -> PResult<'_, HeaderEntry> {
    let (input, _) = space0(input)?;
    let (rest, key) = with_reason(MalformedReason::MalformedHeader, alpha1)(input)?;
    let (rest, _) = with_reason(
        MalformedReason::MalformedHeader,
        tuple((space0, char('='), space0)),
    )(rest)?;

    match key {
        "x" | "X" => map(dimension, HeaderEntry::Width)(rest),
        "y" | "Y" => map(dimension, HeaderEntry::Height)(rest),
        "rule" => map(rule_value, HeaderEntry::Rule)(rest),
        other => Err(failure(input, MalformedReason::UnknownHeaderKey(other.to_owned()))),
    }
}

/// `x = .., y = .., rule = ..` up to and including the line ending
fn header(input: &str) -> PResult<'_, Vec<HeaderEntry>> {
    preceded(
        pair(space0, peek(one_of("xX"))),
        cut(terminated(
            separated_list1(char(','), header_entry),
            preceded(
                space0,
                with_reason(MalformedReason::MalformedHeader, alt((line_ending, eof))),
            ),
        )),
    )(input)
}

/// Parse a full RLE document: `#` lines, an optional header, then the body.
/// Error offsets are relative to the start of `text`.
pub fn parse_document(text: &str) -> Result<RleDocument, DecodeError> {
    let offset_of = |rest: &str| text.len() - rest.len();
    let mut doc = RleDocument::default();

    let (rest, comments) = many0(alt((map(comment_line, Some), value(None, blank_line))))(text)
        .map_err(|err| malformed(err, offset_of))?;
    for comment in comments.into_iter().flatten() {
        read_comment(&mut doc, comment);
    }

    let (body, entries) = opt(header)(rest).map_err(|err| malformed(err, offset_of))?;
    for entry in entries.into_iter().flatten() {
        match entry {
            HeaderEntry::Width(width) => doc.width = Some(width),
            HeaderEntry::Height(height) => doc.height = Some(height),
            HeaderEntry::Rule(rule) => doc.rule = Some(rule),
        }
    }

    doc.pattern = decode_at(body, offset_of(body))?;
    Ok(doc)
}

fn read_comment(doc: &mut RleDocument, comment: &str) {
    let mut chars = comment.chars();
    let kind = chars.next();
    let value = chars.as_str().trim().to_owned();
    match kind {
        Some('N') => doc.name = Some(value),
        Some('O') => doc.author = Some(value),
        Some('C' | 'c') => doc.comments.push(value),
        _ => {}
    }
}
