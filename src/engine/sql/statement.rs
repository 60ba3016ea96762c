//! Statement shape: governing keyword, auxiliary subquery names, and the
//! tables a statement targets or reads from.

use std::collections::{BTreeMap, BTreeSet};

use super::lexer::Token;
use crate::engine::ClassificationError;
use crate::types::Operation;

/// Keywords that can never be a table name or alias in a source position.
const RESERVED: &[&str] = &[
    "AND", "AS", "CASE", "CROSS", "DEFAULT", "DELETE", "DO", "ELSE", "END", "EXCEPT", "FETCH",
    "FOR", "FORCE", "FROM", "FULL", "GROUP", "HAVING", "IGNORE", "INNER", "INSERT", "INTERSECT",
    "INTO", "JOIN", "LATERAL", "LEFT", "LIMIT", "LOCK", "NATURAL", "NOT", "OFFSET", "ON", "ONLY",
    "OR", "ORDER", "OUTER", "PARTITION", "RETURNING", "RIGHT", "SELECT", "SET", "STRAIGHT_JOIN",
    "TABLESAMPLE", "THEN", "UNION", "UPDATE", "USE", "USING", "VALUES", "WHEN", "WHERE", "WINDOW",
    "WITH",
];

fn is_reserved(word: &str) -> bool {
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(word))
}

/// A table mentioned in a source position, with its alias if one was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Governing {
    pub operation: Operation,
    pub index: usize,
    pub cte_names: BTreeSet<String>,
}

/// Tables split by role: targets carry the statement's own operation,
/// sources are everything read through FROM / JOIN / USING, and nested
/// carries the targets of data-modifying subqueries with their own operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Extraction {
    pub targets: BTreeSet<String>,
    pub sources: BTreeSet<String>,
    pub nested: BTreeMap<String, BTreeSet<Operation>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefKind {
    /// `INSERT INTO t (cols)`: parentheses after the name are a column list.
    InsertTarget,
    /// Parentheses after the name make it a table-valued function.
    Source,
}

pub(crate) struct StatementScanner<'t> {
    tokens: &'t [Token],
    case_sensitive: bool,
}

impl<'t> StatementScanner<'t> {
    pub fn new(tokens: &'t [Token], case_sensitive: bool) -> Self {
        Self {
            tokens,
            case_sensitive,
        }
    }

    /// Find the keyword that decides the statement's operation.
    pub fn governing(&self) -> Result<Governing, ClassificationError> {
        let mut i = 0;
        while matches!(self.tokens.get(i), Some(Token::LParen)) {
            i += 1;
        }

        let mut cte_names = BTreeSet::new();
        match self.tokens.get(i) {
            None => return Err(ClassificationError::EmptyQuery),
            Some(token) if token.is_keyword("WITH") => {
                i = match self.skip_auxiliary(i + 1, &mut cte_names) {
                    Some(next) => next,
                    None => self.first_statement_keyword(i + 1).unwrap_or(self.tokens.len()),
                };
            }
            Some(_) => {}
        }

        match self.tokens.get(i) {
            Some(Token::Word(word)) => match Operation::from_keyword(word) {
                Some(operation) => Ok(Governing {
                    operation,
                    index: i,
                    cte_names,
                }),
                None => Err(ClassificationError::UnknownOperation {
                    keyword: word.to_uppercase(),
                }),
            },
            Some(other) => Err(ClassificationError::UnknownOperation {
                keyword: describe(other),
            }),
            None => Err(ClassificationError::DanglingWith),
        }
    }

    /// Split the statement's tables into targets, sources and nested targets.
    pub fn extract(&self, governing: &Governing) -> Result<Extraction, ClassificationError> {
        let operation = governing.operation;
        let refs = self.source_refs();

        let mut extraction = Extraction {
            targets: self.targets_of(operation, governing.index + 1, &refs),
            nested: self.nested_targets(governing, &refs),
            ..Extraction::default()
        };
        // an INSERT's SELECT body only feeds the target
        if operation != Operation::Insert {
            extraction.sources = refs.into_iter().map(|r| r.name).collect();
        }

        let ctes = &governing.cte_names;
        extraction.targets.retain(|t| !ctes.contains(t));
        extraction.sources.retain(|t| !ctes.contains(t));
        extraction.nested.retain(|t, _| !ctes.contains(t));
        let targets = &extraction.targets;
        extraction.sources.retain(|t| !targets.contains(t));

        if operation != Operation::Select && extraction.targets.is_empty() {
            return Err(ClassificationError::MissingTargetTable { operation });
        }
        Ok(extraction)
    }

    /// Tables written by the statement whose keyword sits just before `start`.
    fn targets_of(&self, operation: Operation, start: usize, refs: &[TableRef]) -> BTreeSet<String> {
        match operation {
            Operation::Select => BTreeSet::new(),
            Operation::Insert => {
                let i = self.skip_words(start, &["IGNORE", "LOW_PRIORITY", "DELAYED", "HIGH_PRIORITY"]);
                let i = self.skip_words(i, &["INTO"]);
                self.table_ref(i, RefKind::InsertTarget)
                    .map(|(target, _)| BTreeSet::from([target.name]))
                    .unwrap_or_default()
            }
            Operation::Update => {
                let i = self.skip_words(start, &["ONLY", "LOW_PRIORITY", "IGNORE"]);
                self.table_list(i).0.into_iter().map(|r| r.name).collect()
            }
            Operation::Delete => {
                let i = self.skip_words(start, &["LOW_PRIORITY", "QUICK", "IGNORE"]);
                self.delete_targets(i, refs)
            }
        }
    }

    /// Targets of `(INSERT ...)`, `(UPDATE ...)` and `(DELETE ...)` bodies,
    /// as found in data-modifying auxiliary subqueries.
    fn nested_targets(&self, governing: &Governing, refs: &[TableRef]) -> BTreeMap<String, BTreeSet<Operation>> {
        let mut nested: BTreeMap<String, BTreeSet<Operation>> = BTreeMap::new();
        for (i, token) in self.tokens.iter().enumerate() {
            let keyword = i + 1;
            if *token != Token::LParen || keyword == governing.index {
                continue;
            }
            let operation = match self.tokens.get(keyword).and_then(Token::word).and_then(Operation::from_keyword) {
                Some(Operation::Select) | None => continue,
                Some(operation) => operation,
            };
            for table in self.targets_of(operation, keyword + 1, refs) {
                nested.entry(table).or_default().insert(operation);
            }
        }
        nested
    }

    // `DELETE FROM t ...` or the multi-table `DELETE a, b FROM t1 a JOIN t2 b ...`.
    fn delete_targets(&self, i: usize, refs: &[TableRef]) -> BTreeSet<String> {
        let mut targets = BTreeSet::new();
        if self.keyword_at(i, "FROM") {
            if let Some((target, _)) = self.table_ref(i + 1, RefKind::Source) {
                targets.insert(target.name);
            }
            return targets;
        }

        let by_alias: BTreeMap<&str, &str> = refs
            .iter()
            .filter_map(|r| r.alias.as_deref().map(|a| (a, r.name.as_str())))
            .collect();
        let (named, _) = self.table_list(i);
        for item in named {
            let name = item.name.strip_suffix(".*").unwrap_or(&item.name);
            let resolved = by_alias.get(name).copied().unwrap_or(name);
            targets.insert(resolved.to_string());
        }
        targets
    }

    /// Every table after FROM, JOIN and USING at any depth, in statement order.
    fn source_refs(&self) -> Vec<TableRef> {
        let mut refs = Vec::new();
        let mut query_parens: Vec<bool> = Vec::new();

        for (i, token) in self.tokens.iter().enumerate() {
            match token {
                Token::LParen => query_parens.push(self.opens_query(i)),
                Token::RParen => {
                    query_parens.pop();
                }
                Token::Word(word) if word.eq_ignore_ascii_case("FROM") => {
                    if query_parens.last() == Some(&false) {
                        continue;
                    }
                    // `IS DISTINCT FROM` compares; `DELETE FROM t` names a target
                    if i > 0 && (self.tokens[i - 1].is_keyword("DISTINCT") || self.tokens[i - 1].is_keyword("DELETE")) {
                        continue;
                    }
                    refs.extend(self.table_list(i + 1).0);
                }
                Token::Word(word)
                    if word.eq_ignore_ascii_case("JOIN") || word.eq_ignore_ascii_case("STRAIGHT_JOIN") =>
                {
                    if let Some((table, _)) = self.table_ref(i + 1, RefKind::Source) {
                        refs.push(table);
                    }
                }
                Token::Word(word) if word.eq_ignore_ascii_case("USING") => {
                    // `JOIN t USING (col)` names columns, not tables
                    if !matches!(self.tokens.get(i + 1), Some(Token::LParen)) {
                        refs.extend(self.table_list(i + 1).0);
                    }
                }
                _ => {}
            }
        }
        refs
    }

    /// Comma-separated source list; subquery and function sources are
    /// stepped over without producing a name.
    fn table_list(&self, start: usize) -> (Vec<TableRef>, usize) {
        let mut refs = Vec::new();
        let mut i = start;
        loop {
            match self.table_ref(i, RefKind::Source) {
                Some((table, next)) => {
                    refs.push(table);
                    i = next;
                }
                None => match self.skip_source(i) {
                    Some(next) => i = next,
                    None => break,
                },
            }
            if matches!(self.tokens.get(i), Some(Token::Comma)) {
                i += 1;
            } else {
                break;
            }
        }
        (refs, i)
    }

    fn table_ref(&self, start: usize, kind: RefKind) -> Option<(TableRef, usize)> {
        let mut i = self.skip_words(start, &["ONLY", "LATERAL"]);
        let mut parts = vec![self.ident_at(i)?];
        i += 1;
        while matches!(self.tokens.get(i), Some(Token::Dot)) {
            match self.tokens.get(i + 1) {
                Some(Token::Symbol(symbol)) if symbol == "*" => {
                    parts.push("*".to_string());
                    i += 2;
                    break;
                }
                _ => match self.ident_at(i + 1) {
                    Some(part) => {
                        parts.push(part);
                        i += 2;
                    }
                    None => break,
                },
            }
        }
        let name = parts.join(".");

        if kind == RefKind::InsertTarget {
            return Some((TableRef { name, alias: None }, i));
        }
        if matches!(self.tokens.get(i), Some(Token::LParen)) {
            return None;
        }

        let mut alias = None;
        if self.keyword_at(i, "AS") {
            if let Some(a) = self.ident_at(i + 1) {
                alias = Some(a);
                i += 2;
            }
        } else if let Some(a) = self.ident_at(i) {
            alias = Some(a);
            i += 1;
        }
        Some((TableRef { name, alias }, i))
    }

    fn skip_source(&self, start: usize) -> Option<usize> {
        let mut i = self.skip_words(start, &["ONLY", "LATERAL"]);
        match self.tokens.get(i) {
            Some(Token::LParen) => i = self.skip_parens(i)?,
            _ => {
                self.ident_at(i)?;
                i += 1;
                while matches!(self.tokens.get(i), Some(Token::Dot)) && self.ident_at(i + 1).is_some() {
                    i += 2;
                }
                if !matches!(self.tokens.get(i), Some(Token::LParen)) {
                    return None;
                }
                i = self.skip_parens(i)?;
            }
        }

        if self.keyword_at(i, "AS") && self.ident_at(i + 1).is_some() {
            i += 2;
        } else if self.ident_at(i).is_some() {
            i += 1;
        }
        if matches!(self.tokens.get(i), Some(Token::LParen)) {
            i = self.skip_parens(i)?;
        }
        Some(i)
    }

    /// `name [(cols)] AS [NOT] [MATERIALIZED] (body)`, comma separated.
    /// Returns the index just past the last body, or None when the prefix
    /// does not have that shape.
    fn skip_auxiliary(&self, start: usize, names: &mut BTreeSet<String>) -> Option<usize> {
        let mut i = self.skip_words(start, &["RECURSIVE"]);
        loop {
            names.insert(self.ident_at(i)?);
            i += 1;
            if matches!(self.tokens.get(i), Some(Token::LParen)) {
                i = self.skip_parens(i)?;
            }
            if !self.keyword_at(i, "AS") {
                return None;
            }
            i = self.skip_words(i + 1, &["NOT"]);
            i = self.skip_words(i, &["MATERIALIZED"]);
            if !matches!(self.tokens.get(i), Some(Token::LParen)) {
                return None;
            }
            i = self.skip_parens(i)?;
            if matches!(self.tokens.get(i), Some(Token::Comma)) {
                i += 1;
                continue;
            }
            return Some(i);
        }
    }

    fn first_statement_keyword(&self, start: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (offset, token) in self.tokens[start.min(self.tokens.len())..].iter().enumerate() {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => depth = depth.saturating_sub(1),
                Token::Word(word) if depth == 0 && Operation::from_keyword(word).is_some() => {
                    return Some(start + offset);
                }
                _ => {}
            }
        }
        None
    }

    fn opens_query(&self, paren: usize) -> bool {
        match self.tokens.get(paren + 1) {
            Some(Token::LParen) => true,
            Some(token) => ["SELECT", "WITH", "VALUES", "INSERT", "UPDATE", "DELETE"]
                .iter()
                .any(|k| token.is_keyword(k)),
            None => false,
        }
    }

    fn skip_parens(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (offset, token) in self.tokens[open..].iter().enumerate() {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(open + offset + 1);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn skip_words(&self, mut i: usize, words: &[&str]) -> usize {
        while words.iter().any(|w| self.keyword_at(i, w)) {
            i += 1;
        }
        i
    }

    fn keyword_at(&self, i: usize, keyword: &str) -> bool {
        self.tokens.get(i).is_some_and(|t| t.is_keyword(keyword))
    }

    /// Identifier at `i`, unquoted and case-folded per policy.
    fn ident_at(&self, i: usize) -> Option<String> {
        let raw = match self.tokens.get(i)? {
            Token::Word(word) if !is_reserved(word) => word,
            Token::Quoted(name) if !name.is_empty() => name,
            _ => return None,
        };
        Some(if self.case_sensitive {
            raw.clone()
        } else {
            raw.to_lowercase()
        })
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Word(word) => word.to_uppercase(),
        Token::Quoted(name) => name.clone(),
        Token::Literal => "<literal>".to_string(),
        Token::Param => "<parameter>".to_string(),
        Token::LParen => "(".to_string(),
        Token::RParen => ")".to_string(),
        Token::Comma => ",".to_string(),
        Token::Dot => ".".to_string(),
        Token::Semicolon => ";".to_string(),
        Token::Symbol(symbol) => symbol.clone(),
    }
}
