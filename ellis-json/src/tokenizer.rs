//! Byte-at-a-time tokenizer (§4.3.1): a explicit state machine that can be
//! fed one byte at a time across arbitrarily many `consume_buffer` calls
//! and still produce the same tokens as if it had seen the whole input at
//! once.

use ellis_core::Error;

use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    Str,
    Esc,
    EscU(u8, u32),
    NegSign,
    Zero,
    IntDigits,
    Frac,
    FracMore,
    Exp,
    ExpSign,
    ExpMore,
    Slash,
    Comment,
    Bareword,
}

/// One step of feeding a byte to the tokenizer.
pub enum Step {
    /// The byte was consumed; no token completed yet.
    Pending,
    /// The byte was consumed and completed a token.
    Emit(Token),
    /// A token completed *without* consuming the byte; the caller must
    /// feed this same byte again once the emitted token has been handled.
    EmitReplay(Token),
}

pub struct Tokenizer {
    state: State,
    text: String,
    is_real: bool,
}

impl Tokenizer {
    pub fn new() -> Self {
        Tokenizer {
            state: State::Init,
            text: String::new(),
            is_real: false,
        }
    }

    pub fn reset(&mut self) {
        self.state = State::Init;
        self.text.clear();
        self.is_real = false;
    }

    /// True if the tokenizer is between tokens (no pending accumulation).
    pub fn at_boundary(&self) -> bool {
        matches!(self.state, State::Init)
    }

    /// Signals end of input. Returns the final pending token, if the
    /// current state is one where end-of-stream is an acceptable
    /// completion (numeric and bareword accumulators); errors otherwise.
    pub fn finish(&mut self) -> ellis_core::Result<Option<Token>> {
        let tok = match self.state {
            State::Init | State::Comment => None,
            State::Zero | State::IntDigits => Some(self.finish_number()?),
            State::FracMore | State::ExpMore => Some(self.finish_number()?),
            State::Bareword => Some(self.finish_bareword()?),
            _ => return Err(Error::parse_fail("unexpected end of input mid-token")),
        };
        self.reset();
        Ok(tok)
    }

    pub fn feed(&mut self, byte: u8) -> ellis_core::Result<Step> {
        match self.state {
            State::Init => self.feed_init(byte),
            State::Str => self.feed_str(byte),
            State::Esc => self.feed_esc(byte),
            State::EscU(remaining, acc) => self.feed_esc_u(byte, remaining, acc),
            State::NegSign => self.feed_neg_sign(byte),
            State::Zero => self.feed_zero(byte),
            State::IntDigits => self.feed_int_digits(byte),
            State::Frac => self.feed_frac(byte),
            State::FracMore => self.feed_frac_more(byte),
            State::Exp => self.feed_exp(byte),
            State::ExpSign => self.feed_exp_sign(byte),
            State::ExpMore => self.feed_exp_more(byte),
            State::Slash => self.feed_slash(byte),
            State::Comment => self.feed_comment(byte),
            State::Bareword => self.feed_bareword(byte),
        }
    }

    fn feed_init(&mut self, b: u8) -> ellis_core::Result<Step> {
        match b {
            b'{' => Ok(Step::Emit(Token::LeftCurly)),
            b'}' => Ok(Step::Emit(Token::RightCurly)),
            b'[' => Ok(Step::Emit(Token::LeftSquare)),
            b']' => Ok(Step::Emit(Token::RightSquare)),
            b':' => Ok(Step::Emit(Token::Colon)),
            b',' => Ok(Step::Emit(Token::Comma)),
            b' ' | b'\t' | b'\n' | b'\r' => Ok(Step::Pending),
            b'"' => {
                self.state = State::Str;
                Ok(Step::Pending)
            }
            b'/' => {
                self.state = State::Slash;
                Ok(Step::Pending)
            }
            b'-' => {
                self.text.clear();
                self.text.push('-');
                self.state = State::NegSign;
                Ok(Step::Pending)
            }
            b'0' => {
                self.text.clear();
                self.text.push('0');
                self.state = State::Zero;
                Ok(Step::Pending)
            }
            b'1'..=b'9' => {
                self.text.clear();
                self.text.push(b as char);
                self.state = State::IntDigits;
                Ok(Step::Pending)
            }
            b'a'..=b'z' | b'A'..=b'Z' => {
                self.text.clear();
                self.text.push(b as char);
                self.state = State::Bareword;
                Ok(Step::Pending)
            }
            _ => Err(Error::parse_fail(format!(
                "unexpected byte 0x{b:02x} at start of token"
            ))),
        }
    }

    fn feed_str(&mut self, b: u8) -> ellis_core::Result<Step> {
        match b {
            b'"' => {
                let s = std::mem::take(&mut self.text);
                self.state = State::Init;
                Ok(Step::Emit(Token::Str(s)))
            }
            b'\\' => {
                self.state = State::Esc;
                Ok(Step::Pending)
            }
            _ => {
                self.text.push(b as char);
                Ok(Step::Pending)
            }
        }
    }

    fn feed_esc(&mut self, b: u8) -> ellis_core::Result<Step> {
        let ch = match b {
            b'"' => Some('"'),
            b'\\' => Some('\\'),
            b'/' => Some('/'),
            b'b' => Some('\u{8}'),
            b'f' => Some('\u{c}'),
            b'n' => Some('\n'),
            b'r' => Some('\r'),
            b't' => Some('\t'),
            b'u' => None,
            _ => return Err(Error::parse_fail(format!("invalid escape \\{}", b as char))),
        };
        match ch {
            Some(c) => {
                self.text.push(c);
                self.state = State::Str;
                Ok(Step::Pending)
            }
            None => {
                self.state = State::EscU(4, 0);
                Ok(Step::Pending)
            }
        }
    }

    fn feed_esc_u(&mut self, b: u8, remaining: u8, acc: u32) -> ellis_core::Result<Step> {
        let digit = (b as char)
            .to_digit(16)
            .ok_or_else(|| Error::parse_fail("invalid \\u escape digit"))?;
        let acc = acc * 16 + digit;
        if remaining > 1 {
            self.state = State::EscU(remaining - 1, acc);
            return Ok(Step::Pending);
        }
        // A lone surrogate code point has no valid UTF-8 encoding on its
        // own; the wire value is dropped rather than rejected.
        if !(0xD800..=0xDFFF).contains(&acc) {
            if let Some(c) = char::from_u32(acc) {
                self.text.push(c);
            }
        }
        self.state = State::Str;
        Ok(Step::Pending)
    }

    fn feed_neg_sign(&mut self, b: u8) -> ellis_core::Result<Step> {
        match b {
            b'0' => {
                self.text.push('0');
                self.state = State::Zero;
                Ok(Step::Pending)
            }
            b'1'..=b'9' => {
                self.text.push(b as char);
                self.state = State::IntDigits;
                Ok(Step::Pending)
            }
            _ => Err(Error::parse_fail("expected digit after '-'")),
        }
    }

    fn feed_zero(&mut self, b: u8) -> ellis_core::Result<Step> {
        match b {
            b'0'..=b'9' => Err(Error::parse_fail("leading zero in number")),
            b'.' => {
                self.text.push('.');
                self.is_real = true;
                self.state = State::Frac;
                Ok(Step::Pending)
            }
            b'e' | b'E' => {
                self.text.push(b as char);
                self.is_real = true;
                self.state = State::Exp;
                Ok(Step::Pending)
            }
            _ => Ok(Step::EmitReplay(self.finish_number()?)),
        }
    }

    fn feed_int_digits(&mut self, b: u8) -> ellis_core::Result<Step> {
        match b {
            b'0'..=b'9' => {
                self.text.push(b as char);
                Ok(Step::Pending)
            }
            b'.' => {
                self.text.push('.');
                self.is_real = true;
                self.state = State::Frac;
                Ok(Step::Pending)
            }
            b'e' | b'E' => {
                self.text.push(b as char);
                self.is_real = true;
                self.state = State::Exp;
                Ok(Step::Pending)
            }
            _ => Ok(Step::EmitReplay(self.finish_number()?)),
        }
    }

    fn feed_frac(&mut self, b: u8) -> ellis_core::Result<Step> {
        match b {
            b'0'..=b'9' => {
                self.text.push(b as char);
                self.state = State::FracMore;
                Ok(Step::Pending)
            }
            _ => Err(Error::parse_fail("expected digit after decimal point")),
        }
    }

    fn feed_frac_more(&mut self, b: u8) -> ellis_core::Result<Step> {
        match b {
            b'0'..=b'9' => {
                self.text.push(b as char);
                Ok(Step::Pending)
            }
            b'e' | b'E' => {
                self.text.push(b as char);
                self.state = State::Exp;
                Ok(Step::Pending)
            }
            _ => Ok(Step::EmitReplay(self.finish_number()?)),
        }
    }

    fn feed_exp(&mut self, b: u8) -> ellis_core::Result<Step> {
        match b {
            b'+' | b'-' => {
                self.text.push(b as char);
                self.state = State::ExpSign;
                Ok(Step::Pending)
            }
            b'0'..=b'9' => {
                self.text.push(b as char);
                self.state = State::ExpMore;
                Ok(Step::Pending)
            }
            _ => Err(Error::parse_fail("expected sign or digit after exponent marker")),
        }
    }

    fn feed_exp_sign(&mut self, b: u8) -> ellis_core::Result<Step> {
        match b {
            b'0'..=b'9' => {
                self.text.push(b as char);
                self.state = State::ExpMore;
                Ok(Step::Pending)
            }
            _ => Err(Error::parse_fail("expected digit after exponent sign")),
        }
    }

    fn feed_exp_more(&mut self, b: u8) -> ellis_core::Result<Step> {
        match b {
            b'0'..=b'9' => {
                self.text.push(b as char);
                Ok(Step::Pending)
            }
            _ => Ok(Step::EmitReplay(self.finish_number()?)),
        }
    }

    fn feed_slash(&mut self, b: u8) -> ellis_core::Result<Step> {
        if b == b'/' {
            self.state = State::Comment;
            Ok(Step::Pending)
        } else {
            Err(Error::parse_fail("lone '/' is not a valid token"))
        }
    }

    fn feed_comment(&mut self, b: u8) -> ellis_core::Result<Step> {
        if b == b'\n' {
            self.state = State::Init;
        }
        Ok(Step::Pending)
    }

    fn feed_bareword(&mut self, b: u8) -> ellis_core::Result<Step> {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => {
                self.text.push(b as char);
                Ok(Step::Pending)
            }
            _ => Ok(Step::EmitReplay(self.finish_bareword()?)),
        }
    }

    fn finish_number(&mut self) -> ellis_core::Result<Token> {
        let text = std::mem::take(&mut self.text);
        let is_real = self.is_real;
        self.is_real = false;
        self.state = State::Init;
        if is_real {
            text.parse::<f64>()
                .map(Token::Real)
                .map_err(|e| Error::parse_fail(format!("invalid number literal '{text}': {e}")))
        } else {
            text.parse::<i64>()
                .map(Token::Integer)
                .map_err(|e| Error::parse_fail(format!("invalid integer literal '{text}': {e}")))
        }
    }

    fn finish_bareword(&mut self) -> ellis_core::Result<Token> {
        let text = std::mem::take(&mut self.text);
        self.state = State::Init;
        match text.as_str() {
            "true" => Ok(Token::True),
            "false" => Ok(Token::False),
            "null" => Ok(Token::Nil),
            other => Err(Error::parse_fail(format!("unrecognized bareword '{other}'"))),
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer::new()
    }
}
