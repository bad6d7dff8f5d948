//! Indentation-driven parser from termpose text to [`Term`] trees.
//!
//! The parser works line by line. Each non-blank line is one *item*: its
//! first token is the item itself and any further tokens become the item's
//! first children. Lines indented deeper than an item append more children.
//! A token that ends in a bare `"` opens a block quote that swallows every
//! following line indented deeper than the opening line.

use thiserror::Error;

use crate::span::Span;
use crate::term::Term;

/// What went wrong during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// The input holds no items at all.
    #[error("empty input: expected at least one term")]
    EmptyInput,
    /// `parse_single` found more than one top-level item.
    #[error("expected a single root term, found {count}")]
    MultipleRoots {
        /// How many top-level items there were.
        count: usize,
    },
    /// The first item of the document is indented.
    #[error("unexpected indentation: there is no line above to nest under")]
    UnexpectedIndent,
    /// Two indentation strings where neither extends the other.
    #[error("inconsistent indentation: tabs and spaces are mixed differently than on the line above")]
    MixedIndentation,
    /// A dedent that lands between two open levels.
    #[error("dedent does not match any enclosing indentation level")]
    UnopenedDedent,
    /// An inline `"` string runs off the end of the line.
    #[error("unterminated quoted string")]
    UnterminatedQuote,
    /// A block quote opener with no indented content after it.
    #[error("block quote has no indented content")]
    UnterminatedBlockQuote,
    /// A backslash followed by a character with no escape meaning.
    #[error("invalid escape sequence `\\{ch}`")]
    InvalidEscape {
        /// The character after the backslash.
        ch: char,
    },
    /// A backslash at the very end of a line.
    #[error("escape sequence runs off the end of the line")]
    DanglingEscape,
    /// `tag:` with nothing after the separator.
    #[error("expected a value after `:`")]
    MissingTagValue,
    /// A structural character where it cannot appear.
    #[error("unexpected character `{ch}`")]
    UnexpectedCharacter {
        /// The offending character.
        ch: char,
    },
}

/// A parse failure with the location it was detected at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{span}: {kind}")]
pub struct ParseError {
    /// The kind of failure.
    pub kind: ParseErrorKind,
    /// Where it happened.
    pub span: Span,
}

impl ParseError {
    /// Create a new error.
    #[must_use]
    pub const fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// 1-based line of the error.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.span.start_line + 1
    }

    /// 1-based column of the error.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.span.start_col + 1
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a whole document.
///
/// The result is the root: a form with an empty head whose children are the
/// top-level items, in order.
pub fn parse(source: &str) -> ParseResult<Term> {
    Parser::parse(source)
}

/// Parse a document holding exactly one top-level item and return that item.
pub fn parse_single(source: &str) -> ParseResult<Term> {
    let root = Parser::parse(source)?;
    match root.children() {
        [only] => Ok(only.clone()),
        [_, second, ..] => Err(ParseError::new(
            ParseErrorKind::MultipleRoots {
                count: root.children().len(),
            },
            second.span(),
        )),
        [] => Err(ParseError::new(ParseErrorKind::EmptyInput, Span::dummy())),
    }
}

/// One physical line of the source.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    /// 0-indexed line number.
    number: u32,
    /// Byte offset of the line start.
    offset: u32,
    /// The whole line without its line break.
    text: &'a str,
    /// Leading whitespace.
    indent: &'a str,
    /// Everything after the indentation, without the line break.
    body: &'a str,
}

impl Line<'_> {
    fn is_blank(&self) -> bool {
        self.body.trim_end_matches([' ', '\t']).is_empty()
    }

    fn span_at(&self, col_in_body: usize, len: usize) -> Span {
        let start = (self.indent.len() + col_in_body) as u32;
        Span::on_line(self.number, self.offset, start, start + len as u32)
    }

    fn indent_span(&self) -> Span {
        Span::on_line(self.number, self.offset, 0, self.indent.len() as u32)
    }
}

fn split_lines(source: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0usize;
    for (number, raw) in source.split('\n').enumerate() {
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        let body = text.trim_start_matches([' ', '\t']);
        lines.push(Line {
            number: number as u32,
            offset: offset as u32,
            text,
            indent: &text[..text.len() - body.len()],
            body,
        });
        offset += raw.len() + 1;
    }
    lines
}

/// One `:`-separated piece of a token.
#[derive(Debug)]
struct Segment {
    text: String,
    span: Span,
}

/// A whitespace-delimited token: a chain of segments, optionally ending in a
/// block quote opener.
#[derive(Debug)]
struct Token {
    segments: Vec<Segment>,
    block: Option<Span>,
}

impl Token {
    /// Fold the chain `a:b:c` into `a[b[c]]`, with the block content (if any)
    /// as the innermost value.
    fn into_term(self, block_content: Option<Term>) -> Term {
        let mut segments = self.segments.into_iter().rev();
        let mut inner = match block_content {
            Some(content) => content,
            None => match segments.next() {
                Some(last) => Term::atom(last.text).with_span(last.span),
                None => Term::atom(""),
            },
        };
        for seg in segments {
            inner = Term::form(seg.text, vec![inner]).with_span(seg.span);
        }
        inner
    }
}

/// An item still accepting children, with the indentation of its line.
struct Open {
    indent: String,
    term: Term,
}

/// Line-oriented termpose parser.
pub struct Parser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source text.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: split_lines(source),
            pos: 0,
        }
    }

    /// Parse source text into its root term.
    pub fn parse(source: &str) -> ParseResult<Term> {
        let root = Parser::new(source).parse_document()?;
        tracing::debug!(items = root.children().len(), bytes = source.len(), "parsed termpose document");
        Ok(root)
    }

    fn parse_document(mut self) -> ParseResult<Term> {
        let mut root = Term::form("", Vec::new());
        let mut stack: Vec<Open> = Vec::new();

        while let Some(line) = self.next_line() {
            if line.is_blank() {
                continue;
            }
            self.place(&mut root, &mut stack, &line)?;
            let term = self.parse_item(&line)?;
            stack.push(Open {
                indent: line.indent.to_string(),
                term,
            });
        }

        close_until(&mut root, &mut stack, 0);

        if root.children().is_empty() {
            return Err(ParseError::new(
                ParseErrorKind::EmptyInput,
                Span::on_line(0, 0, 0, 0),
            ));
        }
        Ok(root)
    }

    fn next_line(&mut self) -> Option<Line<'a>> {
        let line = self.lines.get(self.pos).copied();
        if line.is_some() {
            self.pos += 1;
        }
        line
    }

    /// Close finished items so that the top of the stack is the parent of a
    /// new item indented by `line.indent`.
    fn place(&self, root: &mut Term, stack: &mut Vec<Open>, line: &Line<'_>) -> ParseResult<()> {
        let indent = line.indent;
        let Some(top) = stack.last() else {
            if indent.is_empty() {
                return Ok(());
            }
            return Err(ParseError::new(ParseErrorKind::UnexpectedIndent, line.indent_span()));
        };

        if indent.len() > top.indent.len() && indent.starts_with(top.indent.as_str()) {
            // deeper: child of the previous item
            return Ok(());
        }

        // Same depth or shallower: find the open item at exactly this depth.
        let mut keep = stack.len();
        while keep > 0 {
            let open = &stack[keep - 1].indent;
            if open.len() <= indent.len() {
                break;
            }
            if !open.starts_with(indent) {
                return Err(ParseError::new(ParseErrorKind::MixedIndentation, line.indent_span()));
            }
            keep -= 1;
        }

        if keep == 0 {
            // top-level items are never indented, so this only happens for
            // an indent shallower than every open level
            return Err(ParseError::new(ParseErrorKind::UnopenedDedent, line.indent_span()));
        }

        let candidate = stack[keep - 1].indent.as_str();
        if candidate == indent {
            close_until(root, stack, keep - 1);
            Ok(())
        } else if indent.starts_with(candidate) {
            Err(ParseError::new(ParseErrorKind::UnopenedDedent, line.indent_span()))
        } else {
            Err(ParseError::new(ParseErrorKind::MixedIndentation, line.indent_span()))
        }
    }

    /// Parse the tokens of one line into an item, consuming a block quote if
    /// the line opens one.
    fn parse_item(&mut self, line: &Line<'_>) -> ParseResult<Term> {
        let mut tokens = lex_line(line)?.into_iter();
        let Some(first) = tokens.next() else {
            return Err(ParseError::new(
                ParseErrorKind::EmptyInput,
                line.span_at(0, 0),
            ));
        };

        let rest: Vec<Token> = tokens.collect();
        let opens_block = rest.last().map_or(first.block, |t| t.block);
        let mut block = match opens_block {
            Some(opener) => Some(self.read_block(line, opener)?),
            None => None,
        };

        if rest.is_empty() {
            return Ok(first.into_term(block));
        }

        let mut item = first.into_term(None);
        let count = rest.len();
        for (i, token) in rest.into_iter().enumerate() {
            let content = if i + 1 == count { block.take() } else { None };
            item.push_child(token.into_term(content));
        }
        Ok(item)
    }

    /// Consume the lines of a block quote opened on `opening`.
    fn read_block(&mut self, opening: &Line<'_>, opener: Span) -> ParseResult<Term> {
        let mut content: Vec<Line<'a>> = Vec::new();
        let mut end = self.pos;
        let mut scan = self.pos;

        while let Some(line) = self.lines.get(scan) {
            if line.is_blank() {
                scan += 1;
                continue;
            }
            let deeper = line.indent.len() > opening.indent.len()
                && line.indent.starts_with(opening.indent);
            if !deeper {
                break;
            }
            scan += 1;
            end = scan;
        }

        content.extend_from_slice(&self.lines[self.pos..end]);
        self.pos = end;

        let Some(first) = content.iter().find(|l| !l.is_blank()) else {
            return Err(ParseError::new(ParseErrorKind::UnterminatedBlockQuote, opener));
        };
        let first_span = first.span_at(0, first.body.len());

        let common = content
            .iter()
            .filter(|l| !l.is_blank())
            .map(|l| l.indent)
            .reduce(common_prefix)
            .unwrap_or_default();

        let text = content
            .iter()
            .map(|l| {
                if l.is_blank() {
                    ""
                } else {
                    &l.text[common.len()..]
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        let last = content.last().map_or(first_span, |l| l.span_at(0, l.body.len()));
        Ok(Term::atom(text).with_span(first_span.merge(&last)))
    }
}

fn common_prefix<'s>(a: &'s str, b: &'s str) -> &'s str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}

/// Pop every open item above `keep`, attaching each to its parent.
fn close_until(root: &mut Term, stack: &mut Vec<Open>, keep: usize) {
    while stack.len() > keep {
        let Some(done) = stack.pop() else { break };
        match stack.last_mut() {
            Some(parent) => parent.term.push_child(done.term),
            None => root.push_child(done.term),
        }
    }
}

/// Character cursor over the body of one line.
struct Lexer<'l, 'a> {
    line: &'l Line<'a>,
    chars: Vec<(usize, char)>,
    pos: usize,
}

fn lex_line(line: &Line<'_>) -> ParseResult<Vec<Token>> {
    let mut lexer = Lexer {
        line,
        chars: line.body.char_indices().collect(),
        pos: 0,
    };
    let mut tokens = Vec::new();
    loop {
        lexer.skip_whitespace();
        if lexer.peek().is_none() {
            break;
        }
        let token = lexer.token()?;
        let opened_block = token.block.is_some();
        tokens.push(token);
        if opened_block {
            break;
        }
    }
    Ok(tokens)
}

fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

impl Lexer<'_, '_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map_or(self.line.body.len(), |&(i, _)| i)
    }

    fn span_from(&self, start: usize) -> Span {
        self.line.span_at(start, self.offset() - start)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_space) {
            self.pos += 1;
        }
    }

    /// Only whitespace remains after the character at the cursor.
    fn rest_is_blank_after_current(&self) -> bool {
        self.chars[self.pos + 1..].iter().all(|&(_, c)| is_space(c))
    }

    fn error(&self, kind: ParseErrorKind, start: usize, len: usize) -> ParseError {
        ParseError::new(kind, self.line.span_at(start, len))
    }

    fn token(&mut self) -> ParseResult<Token> {
        let mut segments = Vec::new();
        loop {
            let start = self.offset();
            match self.peek() {
                Some('"') if self.rest_is_blank_after_current() => {
                    let span = self.line.span_at(start, 1);
                    self.pos = self.chars.len();
                    return Ok(Token {
                        segments,
                        block: Some(span),
                    });
                }
                Some('"') => segments.push(self.quoted()?),
                Some(':') => {
                    return Err(self.error(ParseErrorKind::UnexpectedCharacter { ch: ':' }, start, 1));
                }
                _ => segments.push(self.bare()?),
            }

            let after = self.offset();
            match self.peek() {
                None => break,
                Some(c) if is_space(c) => break,
                Some(':') => {
                    self.pos += 1;
                    if self.peek().is_none_or(is_space) {
                        return Err(self.error(ParseErrorKind::MissingTagValue, after, 1));
                    }
                }
                Some('"') if self.rest_is_blank_after_current() => {
                    let span = self.line.span_at(after, 1);
                    self.pos = self.chars.len();
                    return Ok(Token {
                        segments,
                        block: Some(span),
                    });
                }
                Some(ch) => {
                    return Err(self.error(ParseErrorKind::UnexpectedCharacter { ch }, after, ch.len_utf8()));
                }
            }
        }
        Ok(Token {
            segments,
            block: None,
        })
    }

    fn bare(&mut self) -> ParseResult<Segment> {
        let start = self.offset();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | ':' | '"' => break,
                '\\' => text.push(self.escape()?),
                _ => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }
        Ok(Segment {
            text,
            span: self.span_from(start),
        })
    }

    fn quoted(&mut self) -> ParseResult<Segment> {
        let start = self.offset();
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(self.error(ParseErrorKind::UnterminatedQuote, start, 1));
                }
                Some('"') => {
                    self.pos += 1;
                    break;
                }
                Some('\\') => text.push(self.escape()?),
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }
        Ok(Segment {
            text,
            span: self.span_from(start),
        })
    }

    /// Decode the escape sequence at the cursor (which sits on a backslash).
    fn escape(&mut self) -> ParseResult<char> {
        let start = self.offset();
        self.pos += 1;
        let Some(c) = self.peek() else {
            return Err(self.error(ParseErrorKind::DanglingEscape, start, 1));
        };
        let decoded = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '\\' | '"' | ':' | ' ' => c,
            _ => {
                return Err(self.error(ParseErrorKind::InvalidEscape { ch: c }, start, 1 + c.len_utf8()));
            }
        };
        self.pos += 1;
        Ok(decoded)
    }
}
