//! Template parsing.
//!
//! Recognises the subset of Go `text/template` syntax used by customazed
//! configuration files:
//!
//! - `{{name "arg" ...}}` function calls with string-literal arguments
//! - `{{name}}` zero-argument calls
//! - `{{"literal"}}` and `` {{`raw`}} `` string output
//! - `{{/* comment */}}`
//! - `{{- ` / ` -}}` whitespace trim markers
//!
//! Parsing is total: the whole input is checked before anything executes.

use crate::error::{TemplateError, TemplateResult};

const LEFT_DELIM: &str = "{{";
const RIGHT_DELIM: &str = "}}";

/// A parsed template node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Text copied verbatim to the output.
    Text(String),
    /// A string literal action.
    Literal(String),
    /// A function call action.
    Call(Call),
}

/// A function call placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub name: String,
    pub args: Vec<String>,
    /// Line of the opening delimiter (1-based).
    pub line: usize,
}

impl Call {
    /// Cache key argument part of this call.
    pub fn argument_key(&self) -> String {
        self.args.join(" ")
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
}

/// Parse a template into nodes.
pub fn parse(input: &str) -> TemplateResult<Vec<Node>> {
    let mut nodes = Vec::new();
    let mut rest = input;
    let mut offset = 0;
    let mut trim_next_text = false;

    while !rest.is_empty() {
        let Some(start) = rest.find(LEFT_DELIM) else {
            push_text(&mut nodes, rest, trim_next_text, false);
            break;
        };

        let line = line_at(input, offset + start);
        let mut body_start = start + LEFT_DELIM.len();
        let trim_left = has_left_trim(&rest[body_start..]);
        if trim_left {
            body_start += 1;
        }
        push_text(&mut nodes, &rest[..start], trim_next_text, trim_left);

        let body = &rest[body_start..];
        // A comment opens right after `{{`, or after the single space of `{{- `.
        let marker = if trim_left { &body[1..] } else { body };
        let (node, consumed, trim_right) = if marker.starts_with("/*") {
            let (node, consumed, trim_right) = parse_comment(marker, line)?;
            (node, body.len() - marker.len() + consumed, trim_right)
        } else {
            parse_action(body, line)?
        };
        if let Some(node) = node {
            nodes.push(node);
        }

        rest = &rest[body_start + consumed..];
        offset += body_start + consumed;
        trim_next_text = trim_right;
    }

    Ok(nodes)
}

fn push_text(nodes: &mut Vec<Node>, text: &str, trim_start: bool, trim_end: bool) {
    let mut text = text;
    if trim_start {
        text = text.trim_start_matches(is_space);
    }
    if trim_end {
        text = text.trim_end_matches(is_space);
    }
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}

fn line_at(input: &str, offset: usize) -> usize {
    input[..offset].matches('\n').count() + 1
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn has_left_trim(body: &str) -> bool {
    let mut chars = body.chars();
    chars.next() == Some('-') && chars.next().is_some_and(is_space)
}

/// Parse a `/* ... */` comment. Returns bytes consumed from `body`
/// including the closing delimiter.
fn parse_comment(body: &str, line: usize) -> TemplateResult<(Option<Node>, usize, bool)> {
    let Some(end) = body.find("*/") else {
        return Err(TemplateError::syntax(line, "unclosed comment"));
    };
    let after = &body[end + 2..];
    if let Some(rest) = after.strip_prefix(RIGHT_DELIM) {
        return Ok((None, body.len() - rest.len(), false));
    }
    let stripped = after.trim_start_matches(is_space);
    if stripped.len() < after.len() {
        if let Some(rest) = stripped.strip_prefix('-').and_then(|s| s.strip_prefix(RIGHT_DELIM)) {
            return Ok((None, body.len() - rest.len(), true));
        }
    }
    Err(TemplateError::syntax(line, "comment ends before closing delimiter"))
}

/// Tokenize and interpret one action body. Returns the node, bytes consumed
/// from `body` including the closing delimiter, and whether the action
/// carried a right trim marker.
fn parse_action(body: &str, line: usize) -> TemplateResult<(Option<Node>, usize, bool)> {
    let mut tokens = Vec::new();
    let mut chars = body.char_indices().peekable();
    let mut after_space = true;

    loop {
        let Some(&(i, c)) = chars.peek() else {
            return Err(TemplateError::syntax(line, "unclosed action"));
        };

        if body[i..].starts_with(RIGHT_DELIM) {
            let node = build_node(tokens, line)?;
            return Ok((node, i + RIGHT_DELIM.len(), false));
        }

        if c == '-' && after_space && body[i + 1..].starts_with(RIGHT_DELIM) {
            let node = build_node(tokens, line)?;
            return Ok((node, i + 1 + RIGHT_DELIM.len(), true));
        }

        if is_space(c) {
            chars.next();
            after_space = true;
            continue;
        }

        if !after_space {
            return Err(TemplateError::syntax(
                line,
                format!("missing space before {:?} in command", c),
            ));
        }

        match c {
            '"' => {
                let (value, len) = unquote(&body[i..], line)?;
                tokens.push(Token::Str(value));
                advance_to(&mut chars, i + len);
            }
            '`' => {
                let raw = &body[i + 1..];
                let Some(end) = raw.find('`') else {
                    return Err(TemplateError::syntax(line, "unterminated raw quoted string"));
                };
                tokens.push(Token::Str(raw[..end].to_string()));
                advance_to(&mut chars, i + end + 2);
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let len = body[i..]
                    .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
                    .unwrap_or(body.len() - i);
                tokens.push(Token::Ident(body[i..i + len].to_string()));
                advance_to(&mut chars, i + len);
            }
            other => {
                return Err(TemplateError::syntax(
                    line,
                    format!("unexpected {:?} in command", other),
                ));
            }
        }
        after_space = false;
    }
}

fn advance_to(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>, target: usize) {
    while chars.peek().is_some_and(|&(i, _)| i < target) {
        chars.next();
    }
}

fn build_node(tokens: Vec<Token>, line: usize) -> TemplateResult<Option<Node>> {
    let mut tokens = tokens.into_iter();
    match tokens.next() {
        None => Err(TemplateError::syntax(line, "missing value for command")),
        Some(Token::Str(value)) => match tokens.next() {
            None => Ok(Some(Node::Literal(value))),
            Some(_) => Err(TemplateError::syntax(
                line,
                format!("can't give argument to non-function {:?}", value),
            )),
        },
        Some(Token::Ident(name)) => {
            let mut args = Vec::new();
            for token in tokens {
                match token {
                    Token::Str(value) => args.push(value),
                    Token::Ident(ident) => {
                        return Err(TemplateError::syntax(
                            line,
                            format!("unexpected {} in operand; only string literals are supported", ident),
                        ));
                    }
                }
            }
            Ok(Some(Node::Call(Call { name, args, line })))
        }
    }
}

/// Decode a double-quoted string literal at the start of `s`. Returns the
/// value and the number of bytes consumed including both quotes.
///
/// `\x` and octal escapes produce single bytes, so a literal may spell out
/// a multi-byte character; the decoded bytes must form valid UTF-8.
fn unquote(s: &str, line: usize) -> TemplateResult<(String, usize)> {
    let mut out = Vec::new();
    let mut chars = s.char_indices().skip(1);

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                let value = String::from_utf8(out).map_err(|_| {
                    TemplateError::syntax(line, "quoted string is not valid UTF-8")
                })?;
                return Ok((value, i + 1));
            }
            '\n' => break,
            '\\' => {
                let Some((_, esc)) = chars.next() else { break };
                let simple = match esc {
                    '\\' => Some(b'\\'),
                    '"' => Some(b'"'),
                    'n' => Some(b'\n'),
                    't' => Some(b'\t'),
                    'r' => Some(b'\r'),
                    'a' => Some(0x07),
                    'b' => Some(0x08),
                    'f' => Some(0x0c),
                    'v' => Some(0x0b),
                    _ => None,
                };
                if let Some(byte) = simple {
                    out.push(byte);
                    continue;
                }
                match esc {
                    'x' => {
                        let digits = take_digits(&mut chars, 2, 16);
                        let byte = digits
                            .as_deref()
                            .and_then(|d| u8::from_str_radix(d, 16).ok())
                            .ok_or_else(|| invalid_escape(line, esc, digits.as_deref()))?;
                        out.push(byte);
                    }
                    '0'..='7' => {
                        let rest = take_digits(&mut chars, 2, 8);
                        let byte = rest
                            .as_deref()
                            .and_then(|r| u8::from_str_radix(&format!("{}{}", esc, r), 8).ok())
                            .ok_or_else(|| invalid_escape(line, esc, rest.as_deref()))?;
                        out.push(byte);
                    }
                    'u' | 'U' => {
                        let width = if esc == 'u' { 4 } else { 8 };
                        let digits = take_digits(&mut chars, width, 16);
                        let ch = digits
                            .as_deref()
                            .and_then(|d| u32::from_str_radix(d, 16).ok())
                            .and_then(char::from_u32)
                            .ok_or_else(|| invalid_escape(line, esc, digits.as_deref()))?;
                        let mut buf = [0; 4];
                        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    }
                    other => {
                        return Err(TemplateError::syntax(
                            line,
                            format!("unknown escape sequence \\{}", other),
                        ));
                    }
                }
            }
            other => {
                let mut buf = [0; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    Err(TemplateError::syntax(line, "unterminated quoted string"))
}

/// Take exactly `width` digits of `radix`, or `None` if fewer follow.
fn take_digits(
    chars: &mut impl Iterator<Item = (usize, char)>,
    width: usize,
    radix: u32,
) -> Option<String> {
    let digits: String = chars
        .take(width)
        .map(|(_, d)| d)
        .take_while(|d| d.is_digit(radix))
        .collect();
    (digits.len() == width).then_some(digits)
}

fn invalid_escape(line: usize, esc: char, digits: Option<&str>) -> TemplateError {
    TemplateError::syntax(
        line,
        format!("invalid escape \\{}{}", esc, digits.unwrap_or("")),
    )
}
