// ----------------------------
// File: src/front/parser/stmt.rs
// ----------------------------
//! Statement parsing. Semicolons are optional terminators: each statement
//! consumes one if present but never requires it.

use super::*;

impl Parser {
    pub(super) fn parse_statement(&mut self) -> PResult<Stmt> {
        if self.is_type_token() {
            return self.parse_var_decl();
        }
        match self.ts.peek().kind {
            K::If => self.parse_if_stmt(),
            K::While => self.parse_while_stmt(),
            K::For => self.parse_for_stmt(),
            K::LBrace => self.parse_block(),
            K::Return => self.parse_return_stmt(),
            _ => {
                let expr = self.parse_expression()?;
                if self.ts.matches(K::Assign) {
                    // lvalue-ness of the target is the analyzer's business
                    let value = self.parse_expression()?;
                    self.ts.matches(K::Semicolon);
                    return Ok(Stmt::Assign { target: expr, value });
                }
                self.ts.matches(K::Semicolon);
                Ok(Stmt::Expr(expr))
            }
        }
    }

    pub(super) fn parse_block(&mut self) -> PResult<Stmt> {
        self.ts.expect(K::LBrace, "expected '{'")?;
        let mut statements = Vec::new();
        while !self.ts.check(K::RBrace) && !self.ts.check(K::End) {
            statements.push(self.parse_statement()?);
        }
        self.ts.expect(K::RBrace, "expected '}'")?;
        Ok(Stmt::Block(statements))
    }

    fn parse_if_stmt(&mut self) -> PResult<Stmt> {
        self.ts.expect(K::If, "expected 'if'")?;
        self.ts.expect(K::LParen, "expected '('")?;
        let condition = self.parse_expression()?;
        self.ts.expect(K::RParen, "expected ')'")?;

        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.ts.matches(K::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    fn parse_while_stmt(&mut self) -> PResult<Stmt> {
        self.ts.expect(K::While, "expected 'while'")?;
        self.ts.expect(K::LParen, "expected '('")?;
        let condition = self.parse_expression()?;
        self.ts.expect(K::RParen, "expected ')'")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While { condition, body })
    }

    /// The C-style header is destructured: the loop always steps by `+1`,
    /// the increment clause is discarded, and the end bound is the right
    /// operand of a `<`/`<=` condition (defaulting to literal 10).
    fn parse_for_stmt(&mut self) -> PResult<Stmt> {
        self.ts.expect(K::For, "expected 'for'")?;
        self.ts.expect(K::LParen, "expected '('")?;

        self.parse_type()?;
        let var = self.ts.expect(K::Ident, "expected loop variable")?;
        self.ts.expect(K::Assign, "expected '='")?;
        let start = self.parse_expression()?;
        self.ts.expect(K::Semicolon, "expected ';'")?;

        let condition = self.parse_expression()?;
        self.ts.expect(K::Semicolon, "expected ';'")?;

        // skip the increment clause
        while !self.ts.check(K::RParen) && !self.ts.check(K::End) {
            self.ts.bump();
        }
        self.ts.expect(K::RParen, "expected ')'")?;

        let body = Box::new(self.parse_statement()?);

        let line = var.line;
        let end = match condition.kind {
            ExprKind::Binary { op: BinOp::Lt | BinOp::Le, right, .. } => *right,
            _ => Expr::literal("10", DataType::Int, line),
        };

        Ok(Stmt::For { var: var.lexeme, start, end, body })
    }

    fn parse_return_stmt(&mut self) -> PResult<Stmt> {
        let ret = self.ts.expect(K::Return, "expected 'return'")?;
        let value = if self.ts.check(K::Semicolon) || self.ts.check(K::RBrace) || self.ts.check(K::End) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.ts.matches(K::Semicolon);
        Ok(Stmt::Return { value, line: ret.line })
    }
}
