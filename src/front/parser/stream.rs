// ----------------------------
// File: src/front/parser/stream.rs
// ----------------------------
//! TokenStream: cursor over the scanner's output with one-token lookahead.

use crate::error::ParseError;
use crate::front::token::{Token, TokenKind as K};

pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    /// The vector must end with an `End` token; the scanner guarantees it.
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(tokens.last().map(|t| t.kind), Some(K::End)));
        Self { tokens, pos: 0 }
    }

    pub fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| self.last())
    }

    pub fn peek_at(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).unwrap_or_else(|| self.last())
    }

    fn last(&self) -> &Token {
        self.tokens.last().expect("token stream is never empty")
    }

    /// Consume and return the current token; sticks at the final `End`.
    pub fn bump(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    pub fn check(&self, kind: K) -> bool {
        self.peek().kind == kind
    }

    pub fn matches(&mut self, kind: K) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: K, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.bump())
        } else {
            let t = self.peek();
            Err(ParseError::new(t.line, message, t.lexeme.clone()))
        }
    }
}
