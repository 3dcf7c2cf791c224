// ----------------------------
// File: src/front/parser/decl.rs
// ----------------------------
//! Types, typedefs, function declarations and variable declarations.

use super::*;

impl Parser {
    /// `unsigned (int|long)? | int | long | float | void | <alias>`
    pub(super) fn parse_type(&mut self) -> PResult<DataType> {
        if self.ts.matches(K::Unsigned) {
            // `unsigned`, `unsigned int` and `unsigned long` all map to UINT
            if self.ts.matches(K::Int) || self.ts.matches(K::Long) {
                return Ok(DataType::Uint);
            }
            return Ok(DataType::Uint);
        }
        if self.ts.matches(K::Int) {
            return Ok(DataType::Int);
        }
        if self.ts.matches(K::Long) {
            return Ok(DataType::Long);
        }
        if self.ts.matches(K::Float) {
            return Ok(DataType::Float);
        }
        if self.ts.matches(K::Void) {
            return Ok(DataType::Void);
        }

        if self.ts.check(K::Ident) {
            if let Some(&ty) = self.type_aliases.get(&self.ts.peek().lexeme) {
                self.ts.bump();
                return Ok(ty);
            }
        }

        self.error("expected type")
    }

    /// `typedef <base-type> <name> ;` at top level.
    pub(super) fn parse_typedef(&mut self) -> PResult<()> {
        self.ts.expect(K::Typedef, "expected 'typedef'")?;
        let base = self.parse_type()?;
        let alias = self.ts.expect(K::Ident, "expected type alias name")?;
        self.ts.expect(K::Semicolon, "expected ';' after typedef")?;
        self.type_aliases.insert(alias.lexeme, base);
        Ok(())
    }

    pub(super) fn parse_function_decl(&mut self) -> PResult<FunctionDecl> {
        let return_type = self.parse_type()?;
        let name_tok = self.ts.expect(K::Ident, "expected function name")?;

        self.ts.expect(K::LParen, "expected '('")?;
        let mut params = Vec::new();
        if !self.ts.check(K::RParen) {
            loop {
                let ty = self.parse_type()?;
                let name = self.ts.expect(K::Ident, "expected parameter name")?;
                let array_dims = self.parse_array_dims()?;
                params.push(Param { name: name.lexeme, ty, array_dims });
                if !self.ts.matches(K::Comma) {
                    break;
                }
            }
        }
        self.ts.expect(K::RParen, "expected ')'")?;

        let body = self.parse_block()?;

        Ok(FunctionDecl {
            name: name_tok.lexeme,
            params,
            return_type,
            body,
            line: name_tok.line,
        })
    }

    /// `type ID { '[' NUM? ']' } [ '=' expr ] ';'?`
    pub(super) fn parse_var_decl(&mut self) -> PResult<Stmt> {
        let ty = self.parse_type()?;
        let name = self.ts.expect(K::Ident, "expected variable name")?;
        let array_dims = self.parse_array_dims()?;

        let initializer = if self.ts.matches(K::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.ts.matches(K::Semicolon);

        Ok(Stmt::VarDecl {
            is_mutable: true,
            name: name.lexeme,
            ty,
            initializer,
            array_dims,
            line: name.line,
        })
    }

    /// Bracketed dimensions; a missing size is recorded as `-1` (valid only
    /// for parameters, whose actual extent the caller owns).
    fn parse_array_dims(&mut self) -> PResult<Vec<i64>> {
        let mut dims = Vec::new();
        while self.ts.matches(K::LBracket) {
            if self.ts.check(K::Num) {
                let tok = self.ts.bump();
                dims.push(tok.lexeme.parse::<i64>().unwrap_or(-1));
            } else {
                dims.push(-1);
            }
            self.ts.expect(K::RBracket, "expected ']'")?;
        }
        Ok(dims)
    }
}
