//! Grammar model and text reader.
//!
//! Grammars are written one rule per line:
//!
//! ```text
//! # balanced brackets
//! S -> '(' S ')' S
//!    | '[' S ']' S
//!    |
//! ```
//!
//! Terminals are quoted with `'` or `"`, non-terminals are bare identifiers,
//! an empty alternative stands for the empty string, a line starting with
//! `|` continues the previous rule and `#` starts a comment. The left-hand
//! side of the first rule is the start symbol.

use std::collections::HashMap;
use std::fmt;

use deepchall_core::Symbol;

use crate::error::{BackendError, BackendResult};

/// Index of a non-terminal inside its grammar.
pub type NonTerminalId = usize;

/// One right-hand-side item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarSymbol {
    /// A terminal, already encoded through the terminal table.
    Terminal(Symbol),
    /// A non-terminal.
    NonTerminal(NonTerminalId),
}

/// A single alternative `lhs -> rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: NonTerminalId,
    pub rhs: Vec<GrammarSymbol>,
}

/// A context-free grammar with its terminal table.
///
/// The terminal table maps every terminal to a [`Symbol`] and back; it is
/// built once and never changes afterwards.
#[derive(Debug, Clone)]
pub struct Grammar {
    nonterminals: Vec<String>,
    terminals: Vec<String>,
    terminal_ids: HashMap<String, Symbol>,
    productions: Vec<Production>,
    by_lhs: Vec<Vec<usize>>,
    start: NonTerminalId,
    nullable: Vec<bool>,
    min_yield: Vec<usize>,
}

impl Grammar {
    /// Read a grammar, numbering terminals in order of first appearance.
    pub fn parse(text: &str) -> BackendResult<Self> {
        let raw = read_rules(text)?;
        let mut terminals: Vec<String> = Vec::new();
        for rule in &raw {
            for item in &rule.rhs {
                if let RawItem::Terminal(t) = item {
                    if !terminals.contains(t) {
                        terminals.push(t.clone());
                    }
                }
            }
        }
        Self::build(raw, terminals)
    }

    /// Read a grammar whose terminals must all belong to `alphabet`.
    ///
    /// Terminals are numbered in `alphabet` order, so declared but unused
    /// terminals still get a symbol.
    pub fn parse_with_alphabet<S: AsRef<str>>(text: &str, alphabet: &[S]) -> BackendResult<Self> {
        let raw = read_rules(text)?;
        let declared: Vec<String> = alphabet.iter().map(|s| s.as_ref().to_string()).collect();

        let mut missing: Vec<String> = Vec::new();
        for rule in &raw {
            for item in &rule.rhs {
                if let RawItem::Terminal(t) = item {
                    if !declared.contains(t) && !missing.contains(t) {
                        missing.push(t.clone());
                    }
                }
            }
        }
        if !missing.is_empty() {
            return Err(BackendError::GrammarCoverage { missing });
        }

        let mut terminals: Vec<String> = Vec::with_capacity(declared.len());
        for t in declared {
            if !terminals.contains(&t) {
                terminals.push(t);
            }
        }
        Self::build(raw, terminals)
    }

    fn build(raw: Vec<RawRule>, terminals: Vec<String>) -> BackendResult<Self> {
        if raw.is_empty() {
            return Err(BackendError::EmptyGrammar);
        }

        let terminal_ids: HashMap<String, Symbol> = terminals
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as Symbol))
            .collect();

        let mut nonterminals: Vec<String> = Vec::new();
        let mut nt_ids: HashMap<String, NonTerminalId> = HashMap::new();
        let mut intern = |name: &str| -> NonTerminalId {
            *nt_ids.entry(name.to_string()).or_insert_with(|| {
                nonterminals.push(name.to_string());
                nonterminals.len() - 1
            })
        };

        let mut productions = Vec::with_capacity(raw.len());
        for rule in raw {
            let lhs = intern(&rule.lhs);
            let mut rhs = Vec::with_capacity(rule.rhs.len());
            for item in &rule.rhs {
                rhs.push(match item {
                    RawItem::Terminal(t) => GrammarSymbol::Terminal(terminal_ids[t]),
                    RawItem::NonTerminal(n) => GrammarSymbol::NonTerminal(intern(n)),
                });
            }
            productions.push(Production { lhs, rhs });
        }

        let mut by_lhs = vec![Vec::new(); nonterminals.len()];
        for (i, p) in productions.iter().enumerate() {
            by_lhs[p.lhs].push(i);
        }

        let mut grammar = Self {
            nonterminals,
            terminals,
            terminal_ids,
            productions,
            by_lhs,
            start: 0,
            nullable: Vec::new(),
            min_yield: Vec::new(),
        };
        grammar.min_yield = grammar.compute_min_yield();
        grammar.nullable = grammar.min_yield.iter().map(|&m| m == 0).collect();
        Ok(grammar)
    }

    /// Shortest terminal string derivable from each non-terminal.
    ///
    /// `usize::MAX` marks unproductive non-terminals.
    fn compute_min_yield(&self) -> Vec<usize> {
        let mut min = vec![usize::MAX; self.nonterminals.len()];
        loop {
            let mut changed = false;
            for p in &self.productions {
                let len = self.rhs_min_yield(&p.rhs, &min);
                if len < min[p.lhs] {
                    min[p.lhs] = len;
                    changed = true;
                }
            }
            if !changed {
                return min;
            }
        }
    }

    fn rhs_min_yield(&self, rhs: &[GrammarSymbol], min: &[usize]) -> usize {
        rhs.iter().fold(0usize, |acc, item| {
            let len = match item {
                GrammarSymbol::Terminal(_) => 1,
                GrammarSymbol::NonTerminal(n) => min[*n],
            };
            acc.saturating_add(len)
        })
    }

    /// The start non-terminal.
    pub fn start(&self) -> NonTerminalId {
        self.start
    }

    /// All productions in declaration order.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Indices of the productions of `lhs`, in declaration order.
    pub fn productions_of(&self, lhs: NonTerminalId) -> &[usize] {
        &self.by_lhs[lhs]
    }

    /// Name of a non-terminal.
    pub fn nonterminal_name(&self, id: NonTerminalId) -> &str {
        &self.nonterminals[id]
    }

    /// Number of terminals in the table.
    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    /// Terminal encoded as `symbol`.
    pub fn terminal(&self, symbol: Symbol) -> Option<&str> {
        self.terminals.get(symbol as usize).map(String::as_str)
    }

    /// Symbol encoding `terminal`.
    pub fn symbol(&self, terminal: &str) -> Option<Symbol> {
        self.terminal_ids.get(terminal).copied()
    }

    /// True when `id` derives the empty string.
    pub fn is_nullable(&self, id: NonTerminalId) -> bool {
        self.nullable[id]
    }

    /// True when `id` derives at least one terminal string.
    pub fn is_productive(&self, id: NonTerminalId) -> bool {
        self.min_yield[id] != usize::MAX
    }

    /// Shortest derivable length of `item`, `usize::MAX` when unproductive.
    pub fn min_yield(&self, item: GrammarSymbol) -> usize {
        match item {
            GrammarSymbol::Terminal(_) => 1,
            GrammarSymbol::NonTerminal(n) => self.min_yield[n],
        }
    }

    /// Shortest derivable length of a production's right-hand side.
    pub fn production_min_yield(&self, production: usize) -> usize {
        self.rhs_min_yield(&self.productions[production].rhs, &self.min_yield)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.productions {
            write!(f, "{} ->", self.nonterminals[p.lhs])?;
            for item in &p.rhs {
                match item {
                    GrammarSymbol::Terminal(t) => {
                        write!(f, " '{}'", escape_terminal(&self.terminals[*t as usize]))?
                    }
                    GrammarSymbol::NonTerminal(n) => write!(f, " {}", self.nonterminals[*n])?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Quote-safe form of a terminal, undone by the tokenizer.
fn escape_terminal(terminal: &str) -> String {
    let mut escaped = String::with_capacity(terminal.len());
    for c in terminal.chars() {
        if c == '\\' || c == '\'' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ─── Text reader ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum RawItem {
    Terminal(String),
    NonTerminal(String),
}

#[derive(Debug)]
struct RawRule {
    lhs: String,
    rhs: Vec<RawItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Arrow,
    Bar,
    Ident(String),
    Quoted(String),
}

fn syntax(line: usize, message: impl Into<String>) -> BackendError {
    BackendError::GrammarSyntax {
        line,
        message: message.into(),
    }
}

fn tokenize(line: &str, lineno: usize) -> BackendResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '#' => break,
            '|' => tokens.push(Token::Bar),
            '-' => match chars.next() {
                Some((_, '>')) => tokens.push(Token::Arrow),
                _ => return Err(syntax(lineno, "expected '->'")),
            },
            '\'' | '"' => {
                let quote = c;
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\\')) => match chars.next() {
                            Some((_, escaped)) => value.push(escaped),
                            None => return Err(syntax(lineno, "unterminated escape")),
                        },
                        Some((_, ch)) if ch == quote => break,
                        Some((_, ch)) => value.push(ch),
                        None => return Err(syntax(lineno, "unterminated terminal")),
                    }
                }
                if value.is_empty() {
                    return Err(syntax(lineno, "empty terminal; use an empty alternative"));
                }
                tokens.push(Token::Quoted(value));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut ident = String::from(c);
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(syntax(lineno, format!("unexpected character {other:?}"))),
        }
    }

    Ok(tokens)
}

fn read_rules(text: &str) -> BackendResult<Vec<RawRule>> {
    let mut rules: Vec<RawRule> = Vec::new();
    let mut current_lhs: Option<String> = None;

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        let tokens = tokenize(line, lineno)?;
        if tokens.is_empty() {
            continue;
        }

        let (lhs, body) = match tokens.as_slice() {
            [Token::Ident(name), Token::Arrow, rest @ ..] => (name.clone(), rest),
            [Token::Bar, ..] => match &current_lhs {
                Some(name) => (name.clone(), &tokens[..]),
                None => return Err(syntax(lineno, "continuation line without a rule")),
            },
            _ => return Err(syntax(lineno, "expected 'Name -> ...'")),
        };

        let continuation = matches!(tokens.first(), Some(Token::Bar));
        let mut alternatives: Vec<Vec<RawItem>> = Vec::new();
        let mut current: Vec<RawItem> = Vec::new();
        for (i, token) in body.iter().enumerate() {
            match token {
                // the slot before a leading bar belongs to the previous line
                Token::Bar if continuation && i == 0 => {}
                Token::Bar => alternatives.push(std::mem::take(&mut current)),
                Token::Ident(n) => current.push(RawItem::NonTerminal(n.clone())),
                Token::Quoted(t) => current.push(RawItem::Terminal(t.clone())),
                Token::Arrow => return Err(syntax(lineno, "unexpected '->'")),
            }
        }
        alternatives.push(current);

        for rhs in alternatives {
            rules.push(RawRule {
                lhs: lhs.clone(),
                rhs,
            });
        }
        current_lhs = Some(lhs);
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_grammar() {
        let g = Grammar::parse("S -> '0' S '1' | ").unwrap();
        assert_eq!(g.productions().len(), 2);
        assert_eq!(g.terminal_count(), 2);
        assert_eq!(g.symbol("0"), Some(0));
        assert_eq!(g.symbol("1"), Some(1));
        assert_eq!(g.terminal(1), Some("1"));
        assert_eq!(g.terminal(2), None);
        assert!(g.productions()[1].rhs.is_empty());
        assert!(g.is_nullable(g.start()));
    }

    #[test]
    fn test_parse_multiline_with_comments() {
        let text = r#"
            # expressions
            E -> T | E "+" T
            T -> 'x'
               | '(' E ')'   # grouping
        "#;
        let g = Grammar::parse(text).unwrap();
        assert_eq!(g.productions().len(), 4);
        assert_eq!(g.nonterminal_name(g.start()), "E");
        assert_eq!(g.productions_of(1).len(), 2);
        assert_eq!(g.symbol("+"), Some(0));
        assert_eq!(g.symbol("x"), Some(1));
        assert!(!g.is_nullable(g.start()));
        assert_eq!(g.min_yield(GrammarSymbol::NonTerminal(g.start())), 1);
    }

    #[test]
    fn test_escaped_quote_terminal() {
        let g = Grammar::parse(r"S -> 'it\'s' | S S").unwrap();
        assert_eq!(g.terminal(0), Some("it's"));
    }

    #[test]
    fn test_coverage_error_names_missing_terminals() {
        let err = Grammar::parse_with_alphabet("S -> 'a' S 'b' | 'c'", &["a"]).unwrap_err();
        match err {
            BackendError::GrammarCoverage { missing } => {
                assert_eq!(missing, vec!["b".to_string(), "c".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_declared_alphabet_order() {
        let g = Grammar::parse_with_alphabet("S -> 'b' 'a'", &["a", "b", "c"]).unwrap();
        assert_eq!(g.symbol("a"), Some(0));
        assert_eq!(g.symbol("b"), Some(1));
        assert_eq!(g.terminal_count(), 3);
    }

    #[test]
    fn test_unproductive_nonterminal() {
        let g = Grammar::parse("S -> A | 'a'\nA -> A 'b'").unwrap();
        assert!(g.is_productive(0));
        assert!(!g.is_productive(1));
        assert_eq!(g.production_min_yield(0), usize::MAX);
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(
            Grammar::parse("S => 'a'"),
            Err(BackendError::GrammarSyntax { line: 1, .. })
        ));
        assert!(matches!(
            Grammar::parse("S -> 'a\n"),
            Err(BackendError::GrammarSyntax { line: 1, .. })
        ));
        assert!(matches!(
            Grammar::parse("\n| 'a'"),
            Err(BackendError::GrammarSyntax { line: 2, .. })
        ));
        assert!(matches!(
            Grammar::parse("# nothing\n"),
            Err(BackendError::EmptyGrammar)
        ));
    }

    #[test]
    fn test_display_round_trips_structure() {
        let g = Grammar::parse("S -> '0' S '1' |").unwrap();
        let printed = g.to_string();
        let again = Grammar::parse(&printed).unwrap();
        assert_eq!(again.productions(), g.productions());

        let quoted = Grammar::parse(r#"S -> "it's" 'a\\b' S |"#).unwrap();
        let printed = quoted.to_string();
        let again = Grammar::parse(&printed).unwrap();
        assert_eq!(again.productions(), quoted.productions());
        assert_eq!(again.terminal(0), Some("it's"));
        assert_eq!(again.terminal(1), Some("a\\b"));
    }
}
