//! Hand-written lexer for the Go subset the extractor cares about.
//!
//! Newlines are tokens (they terminate const/type specs), line comments are
//! tokens (they carry the annotation payload), everything we do not model
//! degrades to `Other` so the declaration parser can skip it by balanced
//! delimiters. Block comments and string/rune literal *contents* are thrown
//! away; only their extent matters.

use crate::error::SyntaxError;

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Ident(String),
    /// Raw numeric literal text; the parser decides whether it is a usable
    /// integer (see [`parse_int`]).
    Number(String),
    Str,
    Comment(String),
    Newline,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Assign,
    Comma,
    Dot,
    Semi,
    Plus,
    Minus,
    Star,
    Slash,
    Other(char),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub tok: Tok,
    pub line: u32,
}

pub fn lex(src: &str) -> Result<Vec<Token>, SyntaxError> {
    let cs: Vec<char> = src.chars().collect();
    let mut toks = Vec::new();
    let mut i = 0usize;
    let mut line = 1u32;

    let push = |toks: &mut Vec<Token>, tok: Tok, line: u32| toks.push(Token { tok, line });

    while i < cs.len() {
        let c = cs[i];
        match c {
            ' ' | '\t' | '\r' => i += 1,
            '\n' => {
                push(&mut toks, Tok::Newline, line);
                line += 1;
                i += 1;
            }
            '/' if cs.get(i + 1) == Some(&'/') => {
                let start = i + 2;
                let mut end = start;
                while end < cs.len() && cs[end] != '\n' {
                    end += 1;
                }
                let text: String = cs[start..end].iter().collect();
                push(&mut toks, Tok::Comment(text), line);
                i = end;
            }
            '/' if cs.get(i + 1) == Some(&'*') => {
                let open_line = line;
                let mut j = i + 2;
                loop {
                    if j + 1 >= cs.len() {
                        return Err(SyntaxError::new(open_line, "unterminated block comment"));
                    }
                    if cs[j] == '\n' {
                        line += 1;
                    }
                    if cs[j] == '*' && cs[j + 1] == '/' {
                        break;
                    }
                    j += 1;
                }
                i = j + 2;
            }
            '"' => {
                let open_line = line;
                let mut j = i + 1;
                loop {
                    match cs.get(j) {
                        None | Some('\n') => {
                            return Err(SyntaxError::new(open_line, "unterminated string literal"));
                        }
                        Some('\\') => j += 2,
                        Some('"') => break,
                        Some(_) => j += 1,
                    }
                }
                push(&mut toks, Tok::Str, line);
                i = j + 1;
            }
            '`' => {
                let open_line = line;
                let mut j = i + 1;
                loop {
                    match cs.get(j) {
                        None => {
                            return Err(SyntaxError::new(open_line, "unterminated raw string literal"));
                        }
                        Some('\n') => {
                            line += 1;
                            j += 1;
                        }
                        Some('`') => break,
                        Some(_) => j += 1,
                    }
                }
                push(&mut toks, Tok::Str, line);
                i = j + 1;
            }
            '\'' => {
                let open_line = line;
                let mut j = i + 1;
                loop {
                    match cs.get(j) {
                        None | Some('\n') => {
                            return Err(SyntaxError::new(open_line, "unterminated rune literal"));
                        }
                        Some('\\') => j += 2,
                        Some('\'') => break,
                        Some(_) => j += 1,
                    }
                }
                push(&mut toks, Tok::Str, line);
                i = j + 1;
            }
            '(' => { push(&mut toks, Tok::LParen, line); i += 1; }
            ')' => { push(&mut toks, Tok::RParen, line); i += 1; }
            '{' => { push(&mut toks, Tok::LBrace, line); i += 1; }
            '}' => { push(&mut toks, Tok::RBrace, line); i += 1; }
            '[' => { push(&mut toks, Tok::LBracket, line); i += 1; }
            ']' => { push(&mut toks, Tok::RBracket, line); i += 1; }
            '=' => { push(&mut toks, Tok::Assign, line); i += 1; }
            ',' => { push(&mut toks, Tok::Comma, line); i += 1; }
            '.' => { push(&mut toks, Tok::Dot, line); i += 1; }
            ';' => { push(&mut toks, Tok::Semi, line); i += 1; }
            '+' => { push(&mut toks, Tok::Plus, line); i += 1; }
            '-' => { push(&mut toks, Tok::Minus, line); i += 1; }
            '*' => { push(&mut toks, Tok::Star, line); i += 1; }
            '/' => { push(&mut toks, Tok::Slash, line); i += 1; }
            c if c.is_alphabetic() || c == '_' => {
                let mut j = i + 1;
                while j < cs.len() && (cs[j].is_alphanumeric() || cs[j] == '_') {
                    j += 1;
                }
                let ident: String = cs[i..j].iter().collect();
                push(&mut toks, Tok::Ident(ident), line);
                i = j;
            }
            c if c.is_ascii_digit() => {
                let mut j = i + 1;
                while j < cs.len()
                    && (cs[j].is_ascii_alphanumeric() || cs[j] == '_' || cs[j] == '.')
                {
                    j += 1;
                }
                let raw: String = cs[i..j].iter().collect();
                push(&mut toks, Tok::Number(raw), line);
                i = j;
            }
            other => {
                push(&mut toks, Tok::Other(other), line);
                i += 1;
            }
        }
    }

    Ok(toks)
}

/// Parse a Go integer literal: decimal, hex, octal, binary, `_` separators.
/// Returns `None` for floats and anything else out of range.
pub fn parse_int(raw: &str) -> Option<i64> {
    let clean: String = raw.chars().filter(|&c| c != '_').collect();
    let lower = clean.to_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = lower.strip_prefix("0b") {
        return i64::from_str_radix(bin, 2).ok();
    }
    if let Some(oct) = lower.strip_prefix("0o") {
        return i64::from_str_radix(oct, 8).ok();
    }
    clean.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Tok> {
        lex(src).unwrap().into_iter().map(|t| t.tok).collect()
    }

    #[test]
    fn idents_comments_and_punctuation() {
        let toks = kinds("failed status = iota // \"Failed\"\n");
        assert_eq!(
            toks,
            vec![
                Tok::Ident("failed".into()),
                Tok::Ident("status".into()),
                Tok::Assign,
                Tok::Ident("iota".into()),
                Tok::Comment(" \"Failed\"".into()),
                Tok::Newline,
            ]
        );
    }

    #[test]
    fn block_comments_are_dropped_and_lines_counted() {
        let toks = lex("a /* x\ny */ b\n").unwrap();
        assert_eq!(toks[0].line, 1);
        assert_eq!(toks[1].tok, Tok::Ident("b".into()));
        assert_eq!(toks[1].line, 2);
    }

    #[test]
    fn unterminated_string_is_a_syntax_error() {
        let err = lex("x := \"abc\n").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn raw_strings_span_lines() {
        let toks = lex("`a\nb` c\n").unwrap();
        assert_eq!(toks[0].tok, Tok::Str);
        assert_eq!(toks[1].tok, Tok::Ident("c".into()));
        assert_eq!(toks[1].line, 2);
    }

    #[test]
    fn int_literal_forms() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("0b101"), Some(5));
        assert_eq!(parse_int("1.5"), None);
    }
}
