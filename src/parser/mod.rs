pub mod ast;

use crate::diagnostics::CompileError;
use crate::lexer::token::Token;
use crate::span::{Span, Spanned};
use ast::*;

pub struct Parser<'a> {
    tokens: &'a [Spanned<Token>],
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned<Token>], source: &'a str) -> Self {
        Self { tokens, source, pos: 0 }
    }

    fn peek(&self) -> Option<&Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Spanned<Token>> {
        if self.pos < self.tokens.len() {
            let tok = &self.tokens[self.pos];
            self.pos += 1;
            Some(tok)
        } else {
            None
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<&Spanned<Token>, CompileError> {
        match self.tokens.get(self.pos) {
            Some(tok) if std::mem::discriminant(&tok.node) == std::mem::discriminant(expected) => {
                self.pos += 1;
                Ok(&self.tokens[self.pos - 1])
            }
            Some(tok) => Err(CompileError::syntax(
                format!("expected {expected}, found {}", tok.node),
                tok.span,
            )),
            None => Err(CompileError::syntax(
                format!("expected {expected}, found end of file"),
                self.eof_span(),
            )),
        }
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>, CompileError> {
        match self.tokens.get(self.pos) {
            Some(tok) if matches!(tok.node, Token::Ident) => {
                let name = self.source[tok.span.start..tok.span.end].to_string();
                self.pos += 1;
                Ok(Spanned::new(name, tok.span))
            }
            Some(tok) => Err(CompileError::syntax(
                format!("expected identifier, found {}", tok.node),
                tok.span,
            )),
            None => Err(CompileError::syntax(
                "expected identifier, found end of file",
                self.eof_span(),
            )),
        }
    }

    fn eof_span(&self) -> Span {
        if let Some(last) = self.tokens.last() {
            Span::new(last.span.end, last.span.end)
        } else {
            Span::dummy()
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, CompileError> {
        let mut stmts = Vec::new();
        while self.peek().is_some() {
            stmts.push(self.parse_decl()?);
        }
        Ok(Program { stmts })
    }

    /// Statement or declaration. `let` is only legal here (top level or
    /// directly inside a block), not as a bare branch of `if`.
    fn parse_decl(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        match self.peek() {
            Some(tok) if matches!(tok.node, Token::Let) => self.parse_let_stmt(),
            _ => self.parse_stmt(),
        }
    }

    fn parse_stmt(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let tok = self.peek().ok_or_else(|| {
            CompileError::syntax("unexpected end of file", self.eof_span())
        })?;

        match &tok.node {
            Token::Let => Err(CompileError::syntax(
                "let declaration must appear inside a block",
                tok.span,
            )),
            Token::Print => self.parse_print_stmt(),
            Token::If => self.parse_if_stmt(),
            Token::LBrace => self.parse_block_stmt(),
            _ => {
                let expr = self.parse_expr(0)?;
                let start = expr.span.start;
                let semi = self.expect(&Token::Semi)?;
                let end = semi.span.end;
                Ok(Spanned::new(Stmt::Expr(expr), Span::new(start, end)))
            }
        }
    }

    fn parse_let_stmt(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let let_tok = self.expect(&Token::Let)?;
        let start = let_tok.span.start;
        let name = self.expect_ident()?;
        self.expect(&Token::Colon)?;
        let ty = self.expect_ident()?;
        self.expect(&Token::Eq)?;
        let value = self.parse_expr(0)?;
        let semi = self.expect(&Token::Semi)?;
        let end = semi.span.end;

        Ok(Spanned::new(Stmt::Let { name, ty, value }, Span::new(start, end)))
    }

    fn parse_print_stmt(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let print_tok = self.expect(&Token::Print)?;
        let start = print_tok.span.start;
        let expr = self.parse_expr(0)?;
        let semi = self.expect(&Token::Semi)?;
        let end = semi.span.end;

        Ok(Spanned::new(Stmt::Print(expr), Span::new(start, end)))
    }

    fn parse_block_stmt(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let open = self.expect(&Token::LBrace)?;
        let start = open.span.start;
        let mut stmts = Vec::new();

        while self.peek().is_some() && !matches!(self.peek().unwrap().node, Token::RBrace) {
            stmts.push(self.parse_decl()?);
        }

        let close = self.expect(&Token::RBrace)?;
        let end = close.span.end;

        Ok(Spanned::new(Stmt::Block(stmts), Span::new(start, end)))
    }

    fn parse_if_stmt(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let if_tok = self.expect(&Token::If)?;
        let start = if_tok.span.start;
        let condition = self.parse_expr(0)?;
        let then_branch = self.parse_stmt()?;

        let else_branch = if self.peek().is_some() && matches!(self.peek().unwrap().node, Token::Else) {
            self.advance(); // consume 'else'
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        let end = else_branch.as_ref().map_or(then_branch.span.end, |b| b.span.end);

        Ok(Spanned::new(
            Stmt::If { condition, then_branch: Box::new(then_branch), else_branch },
            Span::new(start, end),
        ))
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Spanned<Expr>, CompileError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some(tok) = self.peek() else { break };

            let op = match &tok.node {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::EqEq => BinOp::Eq,
                Token::BangEq => BinOp::Neq,
                Token::Lt => BinOp::Lt,
                Token::Gt => BinOp::Gt,
                Token::LtEq => BinOp::LtEq,
                Token::GtEq => BinOp::GtEq,
                _ => break,
            };

            let (lbp, rbp) = infix_binding_power(op);
            if lbp < min_bp {
                break;
            }

            self.advance(); // consume operator

            let rhs = self.parse_expr(rbp)?;
            let span = Span::new(lhs.span.start, rhs.span.end);
            lhs = Spanned::new(
                Expr::BinOp {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let tok = self.peek().ok_or_else(|| {
            CompileError::syntax("unexpected end of file in expression", self.eof_span())
        })?;

        match &tok.node {
            Token::IntLit(_) => {
                let tok = self.advance().unwrap();
                let Token::IntLit(n) = &tok.node else { unreachable!() };
                Ok(Spanned::new(Expr::IntLit(*n), tok.span))
            }
            Token::Ident => {
                let ident = self.expect_ident()?;
                Ok(Spanned::new(Expr::Ident(ident.node), ident.span))
            }
            Token::LParen => {
                self.advance(); // consume '('
                let expr = self.parse_expr(0)?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            _ => Err(CompileError::syntax(
                format!("expected expression, found {}", tok.node),
                tok.span,
            )),
        }
    }
}

fn infix_binding_power(op: BinOp) -> (u8, u8) {
    match op {
        BinOp::Eq | BinOp::Neq => (1, 2),
        BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => (3, 4),
        BinOp::Add | BinOp::Sub => (5, 6),
        BinOp::Mul | BinOp::Div => (7, 8),
    }
}
