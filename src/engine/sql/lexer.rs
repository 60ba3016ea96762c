//! Token stream for query text, built on `sqlparser`'s tokenizer.
//!
//! The statement scanner only needs a small vocabulary, so the tokenizer's
//! output is narrowed: comments and whitespace are dropped, every literal
//! collapses to [`Token::Literal`], every bind parameter to [`Token::Param`],
//! and quoted identifiers keep their text without the quotes.

use sqlparser::dialect::{Dialect as SqlDialect, GenericDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::tokenizer::{Token as SqlToken, Tokenizer};

use super::Dialect;
use crate::engine::ClassificationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// Unquoted identifier or keyword, original case.
    Word(String),
    /// Identifier written in the dialect's quote characters, quotes removed.
    Quoted(String),
    /// String, number or dollar-quoted literal.
    Literal,
    /// Bind parameter (`$1`, `?`, `:name`, `@name`).
    Param,
    LParen,
    RParen,
    Comma,
    Dot,
    Semicolon,
    /// Any operator or punctuation the scanner has no use for.
    Symbol(String),
}

impl Token {
    pub(crate) fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    pub(crate) fn word(&self) -> Option<&str> {
        match self {
            Token::Word(w) => Some(w),
            _ => None,
        }
    }
}

fn sql_dialect(dialect: Dialect) -> Box<dyn SqlDialect> {
    match dialect {
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::PostgreSql => Box::new(PostgreSqlDialect {}),
        Dialect::Standard => Box::new(GenericDialect {}),
    }
}

pub(crate) fn tokenize(text: &str, dialect: Dialect) -> Result<Vec<Token>, ClassificationError> {
    let sql_dialect = sql_dialect(dialect);
    let raw = Tokenizer::new(sql_dialect.as_ref(), text)
        .tokenize()
        .map_err(|e| ClassificationError::Unreadable { message: e.to_string() })?;

    let mut raw = raw
        .into_iter()
        .filter(|t| !matches!(t, SqlToken::Whitespace(_) | SqlToken::EOF))
        .peekable();
    let mut tokens = Vec::new();

    while let Some(token) = raw.next() {
        // `:name` and `@name` arrive as a sigil followed by a word in some dialects
        let word_follows = matches!(raw.peek(), Some(SqlToken::Word(w)) if w.quote_style.is_none());

        let narrowed = match token {
            SqlToken::Word(word) if word.quote_style.is_none() && word.value.starts_with('@') => Token::Param,
            SqlToken::Word(word) => match word.quote_style {
                None => Token::Word(word.value),
                Some(_) => Token::Quoted(word.value),
            },
            SqlToken::Colon | SqlToken::AtSign if word_follows => {
                raw.next();
                Token::Param
            }
            SqlToken::Placeholder(_) | SqlToken::Question => Token::Param,
            SqlToken::Number(..)
            | SqlToken::SingleQuotedString(_)
            | SqlToken::DoubleQuotedString(_)
            | SqlToken::DollarQuotedString(_)
            | SqlToken::EscapedStringLiteral(_)
            | SqlToken::NationalStringLiteral(_)
            | SqlToken::HexStringLiteral(_)
            | SqlToken::UnicodeStringLiteral(_)
            | SqlToken::SingleQuotedByteStringLiteral(_) => Token::Literal,
            SqlToken::LParen => Token::LParen,
            SqlToken::RParen => Token::RParen,
            SqlToken::Comma => Token::Comma,
            SqlToken::Period => Token::Dot,
            SqlToken::SemiColon => Token::Semicolon,
            other => Token::Symbol(other.to_string()),
        };
        tokens.push(narrowed);
    }

    Ok(tokens)
}
