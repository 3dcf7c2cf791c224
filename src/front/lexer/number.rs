// ----------------------------
// File: src/front/lexer/number.rs
// ----------------------------
use super::*;
use crate::front::token::NumValue;

impl<'a> Scanner<'a> {
    pub(super) fn read_number(&mut self, line: u32, column: u32) -> Token {
        let start = self.pos;
        let mut is_float = false;

        while self.cur().map_or(false, |b| b.is_ascii_digit()) {
            self.bump();
        }

        // fractional part only when a digit follows the dot
        if self.cur() == Some(b'.') && self.peek(1).map_or(false, |b| b.is_ascii_digit()) {
            is_float = true;
            self.bump();
            while self.cur().map_or(false, |b| b.is_ascii_digit()) {
                self.bump();
            }
        }

        let digits = self.src[start..self.pos].to_string();

        // suffixes, consumed in u/l/f order like the number is declared
        let mut is_unsigned = false;
        if matches!(self.cur(), Some(b'u' | b'U')) {
            is_unsigned = true;
            self.bump();
        }
        if matches!(self.cur(), Some(b'l' | b'L')) {
            self.bump();
        }
        if matches!(self.cur(), Some(b'f' | b'F')) {
            is_float = true;
            self.bump();
        }

        if is_float {
            let value = digits.parse::<f64>().unwrap_or(0.0);
            Token::new(K::FloatLit, digits, line, column).with_value(NumValue::Float(value))
        } else if is_unsigned {
            let value = digits.parse::<u64>().unwrap_or(0);
            Token::new(K::Num, digits, line, column).with_value(NumValue::Uint(value))
        } else {
            let value = digits.parse::<i64>().unwrap_or(0);
            Token::new(K::Num, digits, line, column).with_value(NumValue::Int(value))
        }
    }
}
