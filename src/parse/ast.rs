//! Recursive-descent parser for top-level Go declarations.
//!
//! Only `package`, `type`, and `const` are modeled. `import` is recognized
//! and skipped; every other top-level construct (func, var, ...) is skipped
//! by balanced-delimiter scanning so an arbitrary Go file never derails the
//! extractor. Trailing line comments are attached to the spec they follow;
//! comments on their own line are dropped.

use crate::error::SyntaxError;
use crate::parse::lex::{parse_int, Tok, Token};

#[derive(Debug, Clone)]
pub struct File {
    pub package: String,
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Type(TypeDecl),
    Const(ConstBlock),
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub underlying: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConstBlock {
    pub specs: Vec<ConstSpec>,
}

/// One line of a const block: `names... [type] [= init] [// comment]`.
#[derive(Debug, Clone)]
pub struct ConstSpec {
    pub names: Vec<String>,
    pub type_name: Option<String>,
    pub init: Option<Expr>,
    pub comment: Option<String>,
}

/// Initializer shapes the extractor distinguishes. Everything else is
/// `Other`, which disqualifies the whole block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Iota,
    Int(i64),
    IotaBinary { op: BinOp, operand: i64 },
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

pub fn parse_file(tokens: &[Token]) -> Result<File, SyntaxError> {
    let mut s = Stream { toks: tokens, pos: 0 };

    s.skip_trivia();
    if !s.eat_keyword("package") {
        return Err(SyntaxError::new(s.line(), "missing package clause"));
    }
    let package = s
        .eat_ident()
        .ok_or_else(|| SyntaxError::new(s.line(), "missing package name"))?;

    let mut decls = Vec::new();
    loop {
        s.skip_trivia();
        let Some(tok) = s.peek() else { break };
        match &tok.tok {
            Tok::Ident(kw) if kw == "import" => {
                s.next();
                s.skip_import();
            }
            Tok::Ident(kw) if kw == "type" => {
                s.next();
                for decl in s.parse_type_decls()? {
                    decls.push(Decl::Type(decl));
                }
            }
            Tok::Ident(kw) if kw == "const" => {
                s.next();
                decls.push(Decl::Const(s.parse_const_block()?));
            }
            _ => s.skip_balanced(),
        }
    }

    Ok(File { package, decls })
}

struct Stream<'a> {
    toks: &'a [Token],
    pos: usize,
}

impl<'a> Stream<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.toks.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let t = self.toks.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn line(&self) -> u32 {
        self.peek()
            .map(|t| t.line)
            .or_else(|| self.toks.last().map(|t| t.line))
            .unwrap_or(1)
    }

    /// Skip newlines, semicolons, and comments that sit between declarations
    /// or on their own line.
    fn skip_trivia(&mut self) {
        while let Some(t) = self.peek() {
            match t.tok {
                Tok::Newline | Tok::Semi | Tok::Comment(_) => {
                    self.next();
                }
                _ => break,
            }
        }
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        match self.peek() {
            Some(Token { tok: Tok::Ident(id), .. }) if id == kw => {
                self.next();
                true
            }
            _ => false,
        }
    }

    fn eat_ident(&mut self) -> Option<String> {
        match self.peek() {
            Some(Token { tok: Tok::Ident(id), .. }) => {
                let id = id.clone();
                self.next();
                Some(id)
            }
            _ => None,
        }
    }

    fn eat_comment(&mut self) -> Option<String> {
        match self.peek() {
            Some(Token { tok: Tok::Comment(text), .. }) => {
                let text = text.clone();
                self.next();
                Some(text)
            }
            _ => None,
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(
            self.peek().map(|t| &t.tok),
            None | Some(Tok::Newline) | Some(Tok::Semi) | Some(Tok::RParen)
        )
    }

    /// `import "x"` or `import ( ... )`.
    fn skip_import(&mut self) {
        if matches!(self.peek().map(|t| &t.tok), Some(Tok::LParen)) {
            self.next();
            let mut depth = 1usize;
            while depth > 0 {
                match self.next().map(|t| &t.tok) {
                    Some(Tok::LParen) => depth += 1,
                    Some(Tok::RParen) => depth -= 1,
                    None => return,
                    _ => {}
                }
            }
        } else {
            while !self.at_line_end() {
                self.next();
            }
        }
    }

    /// Consume an unrecognized top-level construct: track paren/brace/bracket
    /// depth and stop at the first newline outside all of them.
    fn skip_balanced(&mut self) {
        let mut depth = 0usize;
        while let Some(t) = self.next() {
            match t.tok {
                Tok::LParen | Tok::LBrace | Tok::LBracket => depth += 1,
                Tok::RParen | Tok::RBrace | Tok::RBracket => depth = depth.saturating_sub(1),
                Tok::Newline if depth == 0 => return,
                _ => {}
            }
        }
    }

    fn parse_type_decls(&mut self) -> Result<Vec<TypeDecl>, SyntaxError> {
        if matches!(self.peek().map(|t| &t.tok), Some(Tok::LParen)) {
            let open_line = self.line();
            self.next();
            let mut out = Vec::new();
            loop {
                self.skip_line_starts();
                match self.peek().map(|t| &t.tok) {
                    Some(Tok::RParen) => {
                        self.next();
                        return Ok(out);
                    }
                    None => {
                        return Err(SyntaxError::new(open_line, "unterminated type block"));
                    }
                    _ => {
                        if let Some(decl) = self.parse_type_spec() {
                            out.push(decl);
                        }
                    }
                }
            }
        }
        Ok(self.parse_type_spec().into_iter().collect())
    }

    /// Newlines/semicolons plus full-line comments at the start of a spec.
    fn skip_line_starts(&mut self) {
        loop {
            match self.peek().map(|t| &t.tok) {
                Some(Tok::Newline) | Some(Tok::Semi) => {
                    self.next();
                }
                Some(Tok::Comment(_)) => {
                    // Own-line doc comment: the next token is a newline.
                    self.next();
                }
                _ => return,
            }
        }
    }

    /// `name underlying // comment`. Returns `None` for lines that are not
    /// a plain type spec; the line is consumed either way.
    fn parse_type_spec(&mut self) -> Option<TypeDecl> {
        let name = match self.eat_ident() {
            Some(n) => n,
            None => {
                self.skip_balanced();
                return None;
            }
        };

        // Underlying type: collect tokens up to the line end or the trailing
        // comment. struct/interface bodies are skipped wholesale.
        let mut underlying = String::new();
        let mut depth = 0usize;
        loop {
            match self.peek().map(|t| &t.tok) {
                None | Some(Tok::Newline) | Some(Tok::Semi) | Some(Tok::RParen) if depth == 0 => break,
                Some(Tok::Comment(_)) if depth == 0 => break,
                Some(Tok::LBrace) | Some(Tok::LParen) | Some(Tok::LBracket) => {
                    depth += 1;
                    self.next();
                }
                Some(Tok::RBrace) | Some(Tok::RBracket) => {
                    depth = depth.saturating_sub(1);
                    self.next();
                }
                Some(Tok::RParen) => {
                    depth = depth.saturating_sub(1);
                    self.next();
                }
                Some(Tok::Ident(id)) if depth == 0 => {
                    if !underlying.is_empty() {
                        underlying.push(' ');
                    }
                    underlying.push_str(id);
                    self.next();
                }
                Some(Tok::Dot) if depth == 0 => {
                    underlying.push('.');
                    self.next();
                }
                Some(_) => {
                    self.next();
                }
                None => break,
            }
        }

        let comment = self.eat_comment();
        while !self.at_line_end() {
            self.next();
        }
        Some(TypeDecl { name, underlying, comment })
    }

    fn parse_const_block(&mut self) -> Result<ConstBlock, SyntaxError> {
        if matches!(self.peek().map(|t| &t.tok), Some(Tok::LParen)) {
            let open_line = self.line();
            self.next();
            let mut specs = Vec::new();
            loop {
                self.skip_line_starts();
                match self.peek().map(|t| &t.tok) {
                    Some(Tok::RParen) => {
                        self.next();
                        return Ok(ConstBlock { specs });
                    }
                    None => {
                        return Err(SyntaxError::new(open_line, "unterminated const block"));
                    }
                    _ => {
                        if let Some(spec) = self.parse_const_spec() {
                            specs.push(spec);
                        }
                    }
                }
            }
        }
        let specs = self.parse_const_spec().into_iter().collect();
        Ok(ConstBlock { specs })
    }

    /// One const line. Lines that do not start with an identifier are
    /// consumed and dropped.
    fn parse_const_spec(&mut self) -> Option<ConstSpec> {
        let first = match self.eat_ident() {
            Some(n) => n,
            None => {
                self.skip_balanced();
                return None;
            }
        };
        let mut names = vec![first];
        while matches!(self.peek().map(|t| &t.tok), Some(Tok::Comma)) {
            self.next();
            match self.eat_ident() {
                Some(n) => names.push(n),
                None => break,
            }
        }

        let type_name = self.eat_ident();

        let init = if matches!(self.peek().map(|t| &t.tok), Some(Tok::Assign)) {
            self.next();
            Some(self.parse_init_expr())
        } else {
            None
        };

        // Tolerate junk between the initializer and the trailing comment.
        while !self.at_line_end()
            && !matches!(self.peek().map(|t| &t.tok), Some(Tok::Comment(_)))
        {
            self.next();
        }
        let comment = self.eat_comment();
        while !self.at_line_end() {
            self.next();
        }

        Some(ConstSpec { names, type_name, init, comment })
    }

    fn parse_init_expr(&mut self) -> Expr {
        match self.peek().map(|t| &t.tok) {
            Some(Tok::Ident(id)) if id == "iota" => {
                self.next();
                let op = match self.peek().map(|t| &t.tok) {
                    Some(Tok::Plus) => Some(BinOp::Add),
                    Some(Tok::Minus) => Some(BinOp::Sub),
                    Some(Tok::Star) => Some(BinOp::Mul),
                    Some(Tok::Slash) => Some(BinOp::Div),
                    _ => None,
                };
                let Some(op) = op else {
                    return if self.at_expr_end() { Expr::Iota } else { Expr::Other };
                };
                self.next();
                match self.peek().map(|t| &t.tok) {
                    Some(Tok::Number(raw)) => {
                        let parsed = parse_int(raw);
                        self.next();
                        match parsed {
                            Some(operand) if self.at_expr_end() => {
                                Expr::IotaBinary { op, operand }
                            }
                            _ => Expr::Other,
                        }
                    }
                    _ => Expr::Other,
                }
            }
            Some(Tok::Number(raw)) => {
                let parsed = parse_int(raw);
                self.next();
                match parsed {
                    Some(v) if self.at_expr_end() => Expr::Int(v),
                    _ => Expr::Other,
                }
            }
            _ => Expr::Other,
        }
    }

    /// True when the initializer expression has nothing left on the line.
    fn at_expr_end(&self) -> bool {
        self.at_line_end()
            || matches!(self.peek().map(|t| &t.tok), Some(Tok::Comment(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::lex::lex;

    fn parse(src: &str) -> File {
        parse_file(&lex(src).unwrap()).unwrap()
    }

    #[test]
    fn package_and_simple_const_block() {
        let file = parse(
            "package validator\n\n\
             type status int\n\n\
             const (\n\
             \tfailed status = iota // \"Failed\"\n\
             \tpassed\n\
             )\n",
        );
        assert_eq!(file.package, "validator");
        assert_eq!(file.decls.len(), 2);
        let Decl::Const(block) = &file.decls[1] else {
            panic!("expected const block");
        };
        assert_eq!(block.specs.len(), 2);
        assert_eq!(block.specs[0].names, vec!["failed"]);
        assert_eq!(block.specs[0].type_name.as_deref(), Some("status"));
        assert_eq!(block.specs[0].init, Some(Expr::Iota));
        assert_eq!(block.specs[0].comment.as_deref(), Some(" \"Failed\""));
        assert_eq!(block.specs[1].names, vec!["passed"]);
        assert_eq!(block.specs[1].init, None);
    }

    #[test]
    fn iota_arithmetic_initializers() {
        let file = parse(
            "package p\nconst (\n a t = iota + 1\n b\n)\nconst (\n c u = iota * 2\n)\n",
        );
        let Decl::Const(first) = &file.decls[0] else { panic!() };
        assert_eq!(
            first.specs[0].init,
            Some(Expr::IotaBinary { op: BinOp::Add, operand: 1 })
        );
        let Decl::Const(second) = &file.decls[1] else { panic!() };
        assert_eq!(
            second.specs[0].init,
            Some(Expr::IotaBinary { op: BinOp::Mul, operand: 2 })
        );
    }

    #[test]
    fn non_iota_initializer_is_other_or_int() {
        let file = parse("package p\nconst (\n a t = 5\n b u = len_of\n)\n");
        let Decl::Const(block) = &file.decls[0] else { panic!() };
        assert_eq!(block.specs[0].init, Some(Expr::Int(5)));
        assert_eq!(block.specs[1].init, Some(Expr::Other));
    }

    #[test]
    fn grouped_type_decls_with_comments() {
        let file = parse(
            "package p\ntype (\n\
             \tplanet int // Gravity[float64]\n\
             \tstatus int\n\
             )\n",
        );
        let mut names = Vec::new();
        for d in &file.decls {
            if let Decl::Type(t) = d {
                names.push((t.name.clone(), t.comment.clone()));
            }
        }
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].0, "planet");
        assert_eq!(names[0].1.as_deref(), Some(" Gravity[float64]"));
        assert_eq!(names[1].1, None);
    }

    #[test]
    fn funcs_and_vars_are_skipped() {
        let file = parse(
            "package p\n\
             import (\n\t\"fmt\"\n)\n\
             func main() {\n\tfmt.Println(\"hi\")\n}\n\
             var x = 3\n\
             type status int\n",
        );
        assert_eq!(file.decls.len(), 1);
        assert!(matches!(&file.decls[0], Decl::Type(t) if t.name == "status"));
    }

    #[test]
    fn missing_package_clause_errors() {
        let err = parse_file(&lex("type t int\n").unwrap()).unwrap_err();
        assert!(err.message.contains("package"));
    }

    #[test]
    fn unterminated_const_block_errors() {
        let err = parse_file(&lex("package p\nconst (\n a t = iota\n").unwrap()).unwrap_err();
        assert!(err.message.contains("const"));
    }

    #[test]
    fn skip_slot_and_multi_name_specs() {
        let file = parse("package p\nconst (\n a t = iota\n _\n b, c\n)\n");
        let Decl::Const(block) = &file.decls[0] else { panic!() };
        assert_eq!(block.specs[1].names, vec!["_"]);
        assert_eq!(block.specs[2].names, vec!["b", "c"]);
    }
}
