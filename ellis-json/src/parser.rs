//! Table-driven LL(1) parser (§4.3.2): drives a stack of grammar symbols
//! against incoming tokens, applying each rule's semantic action as it is
//! chosen rather than deferring it to some later tree-walk.

use ellis_codec::Disposition;
use ellis_core::{Error, Value};

use crate::grammar::{self, Action, NonTerm, Symbol, TermRole};
use crate::token::Token;

enum Frame {
    Array(Vec<Value>),
    Map {
        entries: ellis_core::Map,
        pending_key: Option<String>,
    },
}

pub struct Parser {
    stack: Vec<Symbol>,
    frames: Vec<Frame>,
    result: Option<Value>,
    done: bool,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            stack: vec![Symbol::NonTerm(NonTerm::Val)],
            frames: Vec::new(),
            result: None,
            done: false,
        }
    }

    pub fn reset(&mut self) {
        self.stack.clear();
        self.stack.push(Symbol::NonTerm(NonTerm::Val));
        self.frames.clear();
        self.result = None;
        self.done = false;
    }

    pub fn feed(&mut self, token: Token) -> Disposition<Value> {
        if self.done {
            return Disposition::Error(Error::parse_fail("parser already produced a value"));
        }
        loop {
            let top = match self.stack.last().copied() {
                Some(s) => s,
                None => {
                    return Disposition::Error(Error::parse_fail(
                        "token received after value already complete",
                    ))
                }
            };
            match top {
                Symbol::Term(kind, role) => {
                    if kind != token.kind() {
                        return Disposition::Error(Error::parse_fail(format!(
                            "unexpected token {token:?}, expected {kind:?}"
                        )));
                    }
                    self.stack.pop();
                    if let Err(e) = self.apply_terminal(role, &token) {
                        return Disposition::Error(e);
                    }
                    if self.stack.is_empty() {
                        self.done = true;
                        return Disposition::Success(self.result.take().expect("result set"));
                    }
                    return Disposition::Continue;
                }
                Symbol::NonTerm(nt) => {
                    let rule_idx = match grammar::table().get(&(nt, token.kind())) {
                        Some(idx) => *idx,
                        None => {
                            return Disposition::Error(Error::parse_fail(format!(
                                "unexpected token {token:?} while parsing {nt:?}"
                            )))
                        }
                    };
                    self.stack.pop();
                    let prod = &grammar::PRODUCTIONS[rule_idx];
                    for sym in prod.rhs.iter().rev() {
                        self.stack.push(*sym);
                    }
                    if let Err(e) = self.apply_action(prod.action) {
                        return Disposition::Error(e);
                    }
                    // Nonterminal expansion does not consume a token; loop
                    // with the same token against the freshly pushed RHS.
                }
            }
        }
    }

    fn apply_terminal(&mut self, role: TermRole, token: &Token) -> ellis_core::Result<()> {
        match role {
            TermRole::Plain => Ok(()),
            TermRole::ValLeaf => {
                let v = match token {
                    Token::Str(s) => Value::from(s.as_str()),
                    Token::Integer(i) => Value::from(*i),
                    Token::Real(r) => Value::from(*r),
                    Token::True => Value::from(true),
                    Token::False => Value::from(false),
                    Token::Nil => Value::Nil,
                    other => {
                        return Err(Error::parse_fail(format!(
                            "token {other:?} has no leaf value"
                        )))
                    }
                };
                self.attach_value(v)
            }
            TermRole::MapKey => match token {
                Token::Str(s) => self.attach_key(s.clone()),
                other => Err(Error::parse_fail(format!("token {other:?} is not a map key"))),
            },
        }
    }

    fn apply_action(&mut self, action: Action) -> ellis_core::Result<()> {
        match action {
            Action::None => Ok(()),
            Action::ArrStart => {
                self.frames.push(Frame::Array(Vec::new()));
                Ok(())
            }
            Action::ArrEnd => {
                let items = match self.frames.pop() {
                    Some(Frame::Array(items)) => items,
                    _ => return Err(Error::parse_fail("array end without matching array frame")),
                };
                self.attach_value(Value::array_from(items))
            }
            Action::MapStart => {
                self.frames.push(Frame::Map {
                    entries: ellis_core::Map::new(),
                    pending_key: None,
                });
                Ok(())
            }
            Action::MapEnd => {
                let entries = match self.frames.pop() {
                    Some(Frame::Map { entries, pending_key: None }) => entries,
                    Some(Frame::Map { pending_key: Some(_), .. }) => {
                        return Err(Error::parse_fail("map ended with a key awaiting a value"))
                    }
                    _ => return Err(Error::parse_fail("map end without matching map frame")),
                };
                self.attach_value(Value::map_from(entries))
            }
        }
    }

    fn attach_value(&mut self, v: Value) -> ellis_core::Result<()> {
        match self.frames.last_mut() {
            None => {
                self.result = Some(v);
                Ok(())
            }
            Some(Frame::Array(items)) => {
                items.push(v);
                Ok(())
            }
            Some(Frame::Map { entries, pending_key }) => {
                let key = pending_key
                    .take()
                    .ok_or_else(|| Error::parse_fail("map value without a pending key"))?;
                entries.insert(key, v);
                Ok(())
            }
        }
    }

    fn attach_key(&mut self, key: String) -> ellis_core::Result<()> {
        match self.frames.last_mut() {
            Some(Frame::Map { pending_key, .. }) => {
                *pending_key = Some(key);
                Ok(())
            }
            _ => Err(Error::parse_fail("map key seen outside of a map")),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(tokens: Vec<Token>) -> Value {
        let mut p = Parser::new();
        let mut last = None;
        for t in tokens {
            match p.feed(t) {
                Disposition::Continue => {}
                Disposition::Success(v) => {
                    last = Some(v);
                }
                Disposition::Error(e) => panic!("parse error: {e}"),
            }
        }
        last.expect("value produced")
    }

    #[test]
    fn empty_array() {
        let v = feed_all(vec![Token::LeftSquare, Token::RightSquare]);
        assert_eq!(v, Value::array_from(Vec::new()));
    }

    #[test]
    fn array_of_scalars() {
        let v = feed_all(vec![
            Token::LeftSquare,
            Token::Integer(1),
            Token::Comma,
            Token::Real(2.5),
            Token::Comma,
            Token::True,
            Token::RightSquare,
        ]);
        assert_eq!(
            v,
            Value::array_from(vec![Value::from(1i64), Value::from(2.5), Value::from(true)])
        );
    }

    #[test]
    fn nested_map() {
        let v = feed_all(vec![
            Token::LeftCurly,
            Token::Str("a".into()),
            Token::Colon,
            Token::Integer(1),
            Token::Comma,
            Token::Str("b".into()),
            Token::Colon,
            Token::LeftSquare,
            Token::RightSquare,
            Token::RightCurly,
        ]);
        let mut expected = ellis_core::Map::new();
        expected.insert("a".to_string(), Value::from(1i64));
        expected.insert("b".to_string(), Value::array_from(Vec::new()));
        assert_eq!(v, Value::map_from(expected));
    }

    #[test]
    fn scalar_root() {
        assert_eq!(feed_all(vec![Token::Nil]), Value::Nil);
    }

    #[test]
    fn trailing_token_after_completion_is_an_error() {
        let mut p = Parser::new();
        assert!(p.feed(Token::Integer(1)).is_success());
        assert!(p.feed(Token::Integer(2)).is_error());
    }
}
