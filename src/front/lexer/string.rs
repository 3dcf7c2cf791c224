// ----------------------------
// File: src/front/lexer/string.rs
// ----------------------------
use super::*;

impl<'a> Scanner<'a> {
    /// Read a double-quoted literal. `\n \t \\ \"` are translated; any other
    /// escape yields the escaped character itself. An unterminated string is
    /// accepted at end of input.
    pub(super) fn read_string(&mut self, line: u32, column: u32) -> Token {
        self.bump(); // opening quote
        let mut text = String::new();

        loop {
            match self.cur() {
                Some(b'"') | None => break,
                Some(b'\\') => {
                    self.bump();
                    let c = match self.cur() {
                        Some(b'n') => '\n',
                        Some(b't') => '\t',
                        Some(b'\\') => '\\',
                        Some(b'"') => '"',
                        Some(other) => other as char,
                        None => break,
                    };
                    text.push(c);
                    self.bump();
                }
                Some(other) => {
                    text.push(other as char);
                    self.bump();
                }
            }
        }

        if self.cur() == Some(b'"') {
            self.bump();
        }

        Token::new(K::StrLit, text, line, column)
    }
}
