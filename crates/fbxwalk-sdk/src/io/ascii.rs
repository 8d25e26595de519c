use super::record::{Document, Record, Value};
use crate::error::ImportError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Key(String),
    Ident(String),
    Str(String),
    Number(String),
    Comma,
    Star,
    Open,
    Close,
}

pub fn parse(text: &str) -> Result<Document, ImportError> {
    puffin::profile_function!();

    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };

    let mut records = Vec::new();
    while parser.peek().is_some() {
        records.push(parser.record()?);
    }

    let version = header_version(&records).or_else(|| comment_version(text)).unwrap_or(0);
    log::debug!("Parsed ascii document version {} with {} top level records", version, records.len());
    Ok(Document { version, records })
}

fn header_version(records: &[Record]) -> Option<u32> {
    records
        .iter()
        .find(|record| record.name == "FBXHeaderExtension")?
        .child("FBXVersion")?
        .i64_value(0)
        .and_then(|version| u32::try_from(version).ok())
}

/// Reads `; FBX 7.4.0 project file` style banners.
fn comment_version(text: &str) -> Option<u32> {
    let banner = text
        .lines()
        .take_while(|line| line.trim_start().starts_with(';'))
        .find_map(|line| line.split_once("FBX ").map(|(_, rest)| rest))?;
    let mut parts = banner
        .split_whitespace()
        .next()?
        .split('.')
        .map(|part| part.parse::<u32>().ok());
    let major = parts.next()??;
    let minor = parts.next().flatten().unwrap_or(0);
    let patch = parts.next().flatten().unwrap_or(0);
    major
        .checked_mul(1000)?
        .checked_add(minor.checked_mul(100)?)?
        .checked_add(patch.checked_mul(10)?)
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, ImportError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut line = 1;

    while let Some(&(start, c)) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            ';' => {
                while chars.peek().is_some_and(|&(_, c)| c != '\n') {
                    chars.next();
                }
            }
            ',' => {
                tokens.push((Token::Comma, line));
                chars.next();
            }
            '*' => {
                tokens.push((Token::Star, line));
                chars.next();
            }
            '{' => {
                tokens.push((Token::Open, line));
                chars.next();
            }
            '}' => {
                tokens.push((Token::Close, line));
                chars.next();
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, '\n')) | None => {
                            return Err(ImportError::Syntax {
                                line,
                                reason: "unterminated string".to_owned(),
                            })
                        }
                        Some((_, c)) => value.push(c),
                    }
                }
                tokens.push((Token::Str(value.replace("&quot;", "\"")), line));
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((Token::Number(text[start..end].to_owned()), line));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_alphanumeric() || matches!(c, '_' | '|' | '-' | '.') {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let word = text[start..end].to_owned();

                while chars.peek().is_some_and(|&(_, c)| c == ' ' || c == '\t') {
                    chars.next();
                }
                if chars.peek().is_some_and(|&(_, c)| c == ':') {
                    chars.next();
                    tokens.push((Token::Key(word), line));
                } else {
                    tokens.push((Token::Ident(word), line));
                }
            }
            other => {
                return Err(ImportError::Syntax {
                    line,
                    reason: format!("unexpected character {:?}", other),
                })
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or(self.tokens.last())
            .map_or(1, |(_, line)| *line)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        self.pos += 1;
        token
    }

    fn error(&self, reason: impl Into<String>) -> ImportError {
        ImportError::Syntax {
            line: self.line(),
            reason: reason.into(),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ImportError> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            other => Err(self.error(format!("expected {:?}, found {:?}", expected, other))),
        }
    }

    fn record(&mut self) -> Result<Record, ImportError> {
        let name = match self.next() {
            Some(Token::Key(name)) => name,
            other => return Err(self.error(format!("expected a record key, found {:?}", other))),
        };
        let mut record = Record::new(&name, Vec::new());

        if matches!(
            self.peek(),
            Some(Token::Number(_) | Token::Str(_) | Token::Ident(_) | Token::Star)
        ) {
            record.values.push(self.value()?);
            while self.peek() == Some(&Token::Comma) {
                self.next();
                // Trailing commas are allowed before a block opens.
                if matches!(self.peek(), Some(Token::Open | Token::Close | Token::Key(_)) | None) {
                    break;
                }
                record.values.push(self.value()?);
            }
        }

        if self.peek() == Some(&Token::Open) {
            self.next();
            loop {
                match self.peek() {
                    Some(Token::Close) => {
                        self.next();
                        break;
                    }
                    Some(_) => record.children.push(self.record()?),
                    None => return Err(self.error(format!("unclosed block {}", name))),
                }
            }
        }

        Ok(record)
    }

    fn value(&mut self) -> Result<Value, ImportError> {
        match self.next() {
            Some(Token::Number(text)) => self.number(&text),
            Some(Token::Str(text)) | Some(Token::Ident(text)) => Ok(Value::String(text)),
            Some(Token::Star) => self.array(),
            other => Err(self.error(format!("expected a value, found {:?}", other))),
        }
    }

    fn number(&self, text: &str) -> Result<Value, ImportError> {
        if !text.contains(['.', 'e', 'E']) {
            if let Ok(value) = text.parse::<i64>() {
                return Ok(Value::I64(value));
            }
        }
        text.parse::<f64>()
            .map(Value::F64)
            .map_err(|_| self.error(format!("invalid number {:?}", text)))
    }

    /// `*N { a: v0,v1,... }`
    fn array(&mut self) -> Result<Value, ImportError> {
        let count = match self.next() {
            Some(Token::Number(text)) => text
                .parse::<usize>()
                .map_err(|_| self.error(format!("invalid array length {:?}", text)))?,
            other => return Err(self.error(format!("expected array length, found {:?}", other))),
        };
        self.expect(Token::Open)?;

        // No more values than tokens are left.
        let remaining = self.tokens.len().saturating_sub(self.pos);
        let mut values = Vec::with_capacity(count.min(remaining));
        if self.peek() != Some(&Token::Close) {
            self.expect(Token::Key("a".to_owned()))?;
            while let Some(Token::Number(_)) = self.peek() {
                let Some(Token::Number(text)) = self.next() else {
                    break;
                };
                values.push(self.number(&text)?);
                if self.peek() == Some(&Token::Comma) {
                    self.next();
                }
            }
        }
        self.expect(Token::Close)?;

        if values.len() != count {
            return Err(self.error(format!("array declares {} values, found {}", count, values.len())));
        }

        if values.iter().all(|value| matches!(value, Value::I64(_))) {
            Ok(Value::I64Array(values.iter().filter_map(Value::as_i64).collect()))
        } else {
            Ok(Value::F64Array(values.iter().filter_map(Value::as_f64).collect()))
        }
    }
}
