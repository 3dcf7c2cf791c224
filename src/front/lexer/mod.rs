// ----------------------------
// File: src/front/lexer/mod.rs
// ----------------------------
//! Character-level scanner with one-byte lookahead.
//!
//! Before each token it strips whitespace, `//` and `/* */` comments, and
//! preprocessor lines (leading `#`, discarded to end of line). The scanner
//! never fails: an unrecognized character becomes an `Err` token and the
//! parser turns it into a diagnostic.

use super::token::{Token, TokenKind as K};

mod ident;   // read_ident_or_kw
mod number;  // read_number
mod string;  // read_string
mod punct;   // read_punct

pub struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, bytes: src.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    // --- low-level cursor helpers (shared with the submodules) ---
    fn cur(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.bytes.get(self.pos).copied();
        if let Some(c) = b {
            self.pos += 1;
            if c == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        b
    }

    fn is_ident_start(b: u8) -> bool {
        b.is_ascii_alphabetic() || b == b'_'
    }

    fn is_ident_continue(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'_'
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.cur(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.bump();
        }
    }

    /// Discard a `#` directive up to the end of the line.
    fn skip_preprocessor(&mut self) {
        while !matches!(self.cur(), Some(b'\n') | None) {
            self.bump();
        }
    }

    fn skip_comment(&mut self) {
        if self.cur() == Some(b'/') && self.peek(1) == Some(b'/') {
            while !matches!(self.cur(), Some(b'\n') | None) {
                self.bump();
            }
        } else if self.cur() == Some(b'/') && self.peek(1) == Some(b'*') {
            self.bump();
            self.bump();
            // no nesting; an unterminated comment runs to end of input
            while let Some(c) = self.cur() {
                if c == b'*' && self.peek(1) == Some(b'/') {
                    self.bump();
                    self.bump();
                    break;
                }
                self.bump();
            }
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        while self.cur() == Some(b'#') {
            self.skip_preprocessor();
            self.skip_whitespace();
        }

        while self.cur() == Some(b'/') && matches!(self.peek(1), Some(b'/' | b'*')) {
            self.skip_comment();
            self.skip_whitespace();
        }

        let (line, column) = (self.line, self.column);

        let b = match self.cur() {
            Some(b) => b,
            None => return Token::new(K::End, "", line, column),
        };

        if b.is_ascii_digit() {
            return self.read_number(line, column);
        }
        if Self::is_ident_start(b) {
            return self.read_ident_or_kw(line, column);
        }
        if b == b'"' {
            return self.read_string(line, column);
        }
        self.read_punct(line, column)
    }

    /// Lex the whole input into a vector terminated by exactly one `End`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let done = tok.kind == K::End;
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }
}
