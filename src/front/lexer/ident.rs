// ----------------------------
// File: src/front/lexer/ident.rs
// ----------------------------
use super::*;

impl<'a> Scanner<'a> {
    pub(super) fn read_ident_or_kw(&mut self, line: u32, column: u32) -> Token {
        let start = self.pos;
        while self.cur().map_or(false, Self::is_ident_continue) {
            self.bump();
        }
        let text = &self.src[start..self.pos];
        let kind = K::from_keyword(text).unwrap_or(K::Ident);
        Token::new(kind, text, line, column)
    }
}
