// ----------------------------
// File: src/front/parser/expr.rs
// ----------------------------
//! Expression parsing: one method per precedence level, lowest first.
//! Binary levels are left-associative; the ternary is right-associative.

use super::*;

impl Parser {
    pub(super) fn parse_expression(&mut self) -> PResult<Expr> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> PResult<Expr> {
        let condition = self.parse_logical_or()?;

        if self.ts.matches(K::Question) {
            let then_expr = self.parse_expression()?;
            self.ts.expect(K::Colon, "expected ':' in ternary expression")?;
            let else_expr = self.parse_expression()?;
            let line = condition.line;
            return Ok(Expr::new(
                ExprKind::Ternary {
                    condition: Box::new(condition),
                    then_expr: Box::new(then_expr),
                    else_expr: Box::new(else_expr),
                },
                line,
            ));
        }

        Ok(condition)
    }

    fn parse_logical_or(&mut self) -> PResult<Expr> {
        let mut left = self.parse_logical_and()?;
        while self.ts.matches(K::Or) {
            let right = self.parse_logical_and()?;
            left = binary(left, BinOp::Or, right);
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> PResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.ts.matches(K::And) {
            let right = self.parse_equality()?;
            left = binary(left, BinOp::And, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.ts.peek().kind {
                K::Eq => BinOp::Eq,
                K::Ne => BinOp::Ne,
                _ => break,
            };
            self.ts.bump();
            let right = self.parse_relational()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> PResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.ts.peek().kind {
                K::Lt => BinOp::Lt,
                K::Gt => BinOp::Gt,
                K::Le => BinOp::Le,
                K::Ge => BinOp::Ge,
                _ => break,
            };
            self.ts.bump();
            let right = self.parse_additive()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.ts.peek().kind {
                K::Plus => BinOp::Add,
                K::Minus => BinOp::Sub,
                _ => break,
            };
            self.ts.bump();
            let right = self.parse_multiplicative()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.ts.peek().kind {
                K::Star => BinOp::Mul,
                K::Slash => BinOp::Div,
                K::Percent => BinOp::Mod,
                _ => break,
            };
            self.ts.bump();
            let right = self.parse_unary()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let op = match self.ts.peek().kind {
            K::Minus => Some(UnOp::Neg),
            K::Not => Some(UnOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let tok = self.ts.bump();
            let operand = self.parse_unary()?;
            return Ok(Expr::new(ExprKind::Unary { op, operand: Box::new(operand) }, tok.line));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.ts.matches(K::LBracket) {
                let mut indices = vec![self.parse_expression()?];
                self.ts.expect(K::RBracket, "expected ']'")?;
                while self.ts.matches(K::LBracket) {
                    indices.push(self.parse_expression()?);
                    self.ts.expect(K::RBracket, "expected ']'")?;
                }
                let line = expr.line;
                expr = Expr::new(ExprKind::ArrayAccess { array: Box::new(expr), indices }, line);
            } else if self.ts.matches(K::LParen) {
                // only named callees form calls; anything else degenerates
                // to the primary result (no indirect calls)
                if let ExprKind::Identifier { name } = &expr.kind {
                    let name = name.clone();
                    let mut args = Vec::new();
                    if !self.ts.check(K::RParen) {
                        loop {
                            args.push(self.parse_expression()?);
                            if !self.ts.matches(K::Comma) {
                                break;
                            }
                        }
                    }
                    self.ts.expect(K::RParen, "expected ')'")?;
                    let line = expr.line;
                    expr = Expr::new(ExprKind::Call { name, args }, line);
                }
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let tok = self.ts.peek().clone();
        match tok.kind {
            K::Num => {
                self.ts.bump();
                Ok(Expr::literal(tok.lexeme, DataType::Int, tok.line))
            }
            K::FloatLit => {
                self.ts.bump();
                Ok(Expr::literal(tok.lexeme, DataType::Float, tok.line))
            }
            K::StrLit => {
                self.ts.bump();
                Ok(Expr::literal(tok.lexeme, DataType::Str, tok.line))
            }
            K::Ident => {
                self.ts.bump();
                Ok(Expr::new(ExprKind::Identifier { name: tok.lexeme }, tok.line))
            }
            K::LParen => {
                self.ts.bump();
                let expr = self.parse_expression()?;
                self.ts.expect(K::RParen, "expected ')'")?;
                Ok(expr)
            }
            _ => self.error("expected expression"),
        }
    }
}

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let line = left.line;
    Expr::new(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, line)
}
