//! Query expressions for pulling values out of response bodies.
//!
//! The built-in evaluator understands the path subset of jq:
//!
//! ```text
//! .                 the whole document
//! .user.id          object fields
//! ."odd key"        quoted field
//! .["odd key"]      bracketed field
//! .items[0]         array index (negative counts from the end)
//! .items[1:3]       array slice
//! ```
//!
//! Results are the compact JSON text of the selected value, so strings come
//! back quoted.

use serde_json::Value;
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// Errors raised by a query evaluator.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("invalid query '{expression}': {reason}")]
    Syntax { expression: String, reason: String },

    #[error("response body is not valid JSON: {0}")]
    InvalidBody(String),
}

/// Evaluates a query expression against a response body.
///
/// `Ok(None)` means the expression was valid but selected nothing.
pub trait QueryEvaluator: Send + Sync {
    fn evaluate(&self, expression: &str, body: &[u8]) -> Result<Option<String>, QueryError>;
}

/// jq path evaluator over JSON bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct JqPath;

impl QueryEvaluator for JqPath {
    fn evaluate(&self, expression: &str, body: &[u8]) -> Result<Option<String>, QueryError> {
        let segments = parse_path(expression)?;
        let document: Value =
            serde_json::from_slice(body).map_err(|e| QueryError::InvalidBody(e.to_string()))?;

        Ok(select(document, &segments).map(|v| v.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Key(String),
    Index(i64),
    Slice(Option<i64>, Option<i64>),
}

fn syntax(expression: &str, reason: impl Into<String>) -> QueryError {
    QueryError::Syntax {
        expression: expression.to_string(),
        reason: reason.into(),
    }
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn parse_path(expression: &str) -> Result<Vec<Segment>, QueryError> {
    let expr = expression.trim();
    let mut chars = expr.chars().peekable();
    if chars.next() != Some('.') {
        return Err(syntax(expr, "expression must start with '.'"));
    }

    let mut segments = Vec::new();
    let mut after_dot = true;
    loop {
        match chars.peek().copied() {
            None => {
                if after_dot && !segments.is_empty() {
                    return Err(syntax(expr, "trailing '.'"));
                }
                break;
            }
            Some('[') => {
                chars.next();
                segments.push(parse_bracket(&mut chars, expr)?);
                after_dot = false;
            }
            Some('"') if after_dot => {
                chars.next();
                segments.push(Segment::Key(parse_quoted(&mut chars, expr)?));
                after_dot = false;
            }
            Some('.') if !after_dot => {
                chars.next();
                after_dot = true;
            }
            Some(c) if after_dot && is_ident(c) => {
                let mut key = String::new();
                while let Some(&c) = chars.peek() {
                    if !is_ident(c) {
                        break;
                    }
                    key.push(c);
                    chars.next();
                }
                segments.push(Segment::Key(key));
                after_dot = false;
            }
            Some(c) => return Err(syntax(expr, format!("unexpected character '{}'", c))),
        }
    }

    Ok(segments)
}

/// Read a quoted key; the opening quote is already consumed.
fn parse_quoted(chars: &mut Peekable<Chars<'_>>, expr: &str) -> Result<String, QueryError> {
    let mut literal = String::from('"');
    let mut escaped = false;
    for c in chars.by_ref() {
        literal.push(c);
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return serde_json::from_str(&literal).map_err(|e| syntax(expr, e.to_string()));
        }
    }
    Err(syntax(expr, "unterminated string"))
}

/// Read a bracket segment; the opening bracket is already consumed.
fn parse_bracket(chars: &mut Peekable<Chars<'_>>, expr: &str) -> Result<Segment, QueryError> {
    let mut content = String::new();
    let mut in_string = false;
    let mut escaped = false;
    loop {
        let c = chars.next().ok_or_else(|| syntax(expr, "missing ']'"))?;
        if in_string {
            content.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == ']' {
            break;
        } else {
            if c == '"' {
                in_string = true;
            }
            content.push(c);
        }
    }

    let content = content.trim();
    if content.is_empty() {
        return Err(syntax(expr, "iteration '[]' is not supported"));
    }
    if content.starts_with('"') {
        let key: String = serde_json::from_str(content).map_err(|e| syntax(expr, e.to_string()))?;
        return Ok(Segment::Key(key));
    }

    let parse_index = |s: &str| -> Result<Option<i64>, QueryError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(None);
        }
        s.parse::<i64>()
            .map(Some)
            .map_err(|_| syntax(expr, format!("invalid index '{}'", s)))
    };

    match content.split_once(':') {
        Some((start, end)) => Ok(Segment::Slice(parse_index(start)?, parse_index(end)?)),
        None => parse_index(content)?
            .map(Segment::Index)
            .ok_or_else(|| syntax(expr, "empty index")),
    }
}

/// Resolve a possibly negative index against a length.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let resolved = if index < 0 { len + index } else { index };
    (0..len).contains(&resolved).then_some(resolved as usize)
}

fn clamp_bound(index: i64, len: usize) -> usize {
    let len = len as i64;
    let resolved = if index < 0 { len + index } else { index };
    resolved.clamp(0, len) as usize
}

fn select(document: Value, segments: &[Segment]) -> Option<Value> {
    let mut current = document;
    for segment in segments {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(mut map)) => map.remove(key)?,
            (Segment::Index(i), Value::Array(mut items)) => {
                let idx = resolve_index(*i, items.len())?;
                items.swap_remove(idx)
            }
            (Segment::Slice(start, end), Value::Array(items)) => {
                let len = items.len();
                let start = start.map_or(0, |s| clamp_bound(s, len));
                let end = end.map_or(len, |e| clamp_bound(e, len));
                Value::Array(items.into_iter().take(end).skip(start).collect())
            }
            _ => return None,
        };
    }
    Some(current)
}
