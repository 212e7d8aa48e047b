//! The `{key}`/`[index]` path sublanguage (§3.2) and the three traversal
//! operations built on it: [`Value::at`], [`Value::at_mutable`], and
//! [`Value::install`].

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::value::Value;

/// One step of a parsed path: either a map key or an array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Key(String),
    Index(usize),
}

/// Parses a path string into its selectors. Whitespace between selectors
/// is ignored; anything else outside a `{...}`/`[...]` selector is a
/// `PATH_FAIL`.
pub fn parse_path(path: &str) -> Result<Vec<Selector>> {
    let chars: Vec<char> = path.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }
        match chars[i] {
            '{' => {
                i += 1;
                let start = i;
                while i < chars.len() && chars[i] != '}' {
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(Error::path_fail("unterminated {key} selector"));
                }
                out.push(Selector::Key(chars[start..i].iter().collect()));
                i += 1;
            }
            '[' => {
                i += 1;
                let start = i;
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(Error::path_fail("unterminated [index] selector"));
                }
                let digits: String = chars[start..i].iter().collect();
                let index: usize = digits
                    .parse()
                    .map_err(|_| Error::path_fail(format!("invalid array index {digits:?}")))?;
                out.push(Selector::Index(index));
                i += 1;
            }
            other => {
                return Err(Error::path_fail(format!(
                    "unexpected character {other:?} outside a selector"
                )));
            }
        }
    }
    Ok(out)
}

impl Value {
    /// Read-only traversal. Fails with `PATH_FAIL` if any selector does not
    /// match: wrong variant at that step, missing key, or index out of
    /// range.
    pub fn at(&self, path: &str) -> Result<&Value> {
        let selectors = parse_path(path)?;
        let mut cur = self;
        for sel in &selectors {
            cur = match (sel, cur) {
                (Selector::Key(k), Value::Map(m)) => m
                    .get(k)
                    .ok_or_else(|| Error::path_fail(format!("no such key {k:?}")))?,
                (Selector::Key(k), other) => {
                    return Err(Error::path_fail(format!(
                        "expected map for key {k:?}, found {}",
                        other.kind()
                    )))
                }
                (Selector::Index(idx), Value::Array(a)) => a
                    .get(*idx)
                    .ok_or_else(|| Error::path_fail(format!("index {idx} out of range")))?,
                (Selector::Index(idx), other) => {
                    return Err(Error::path_fail(format!(
                        "expected array for index {idx}, found {}",
                        other.kind()
                    )))
                }
            };
        }
        Ok(cur)
    }

    /// Same semantics as [`Value::at`], but returns a mutable handle,
    /// triggering COW at every composite level actually traversed.
    pub fn at_mutable(&mut self, path: &str) -> Result<&mut Value> {
        let selectors = parse_path(path)?;
        let mut cur = self;
        for sel in &selectors {
            cur = match sel {
                Selector::Key(k) => match cur {
                    Value::Map(m) => Rc::make_mut(m)
                        .get_mut(k)
                        .ok_or_else(|| Error::path_fail(format!("no such key {k:?}")))?,
                    other => {
                        return Err(Error::path_fail(format!(
                            "expected map for key {k:?}, found {}",
                            other.kind()
                        )))
                    }
                },
                Selector::Index(idx) => match cur {
                    Value::Array(a) => Rc::make_mut(a)
                        .get_mut(*idx)
                        .ok_or_else(|| Error::path_fail(format!("index {idx} out of range")))?,
                    other => {
                        return Err(Error::path_fail(format!(
                            "expected array for index {idx}, found {}",
                            other.kind()
                        )))
                    }
                },
            };
        }
        Ok(cur)
    }

    /// Traversal that creates missing intermediates: a `Nil` encountered
    /// where a Map or Array is required is replaced with a new empty one of
    /// the required kind, and arrays are extended with `Nil`s up to the
    /// required index. The final selector's target is overwritten with
    /// `value`.
    pub fn install(&mut self, path: &str, value: Value) -> Result<()> {
        let selectors = parse_path(path)?;
        install_rec(self, &selectors, value)
    }
}

fn install_rec(cur: &mut Value, selectors: &[Selector], value: Value) -> Result<()> {
    let Some((sel, rest)) = selectors.split_first() else {
        *cur = value;
        return Ok(());
    };
    match sel {
        Selector::Key(key) => {
            if cur.is_nil() {
                *cur = Value::map();
            }
            if !matches!(cur, Value::Map(_)) {
                return Err(Error::path_fail(format!(
                    "expected map for key {key:?}, found {}",
                    cur.kind()
                )));
            }
            let map = cur.as_map_mut()?;
            let entry = map.entry(key.clone()).or_insert(Value::Nil);
            install_rec(entry, rest, value)
        }
        Selector::Index(idx) => {
            if cur.is_nil() {
                *cur = Value::array();
            }
            if !matches!(cur, Value::Array(_)) {
                return Err(Error::path_fail(format!(
                    "expected array for index {idx}, found {}",
                    cur.kind()
                )));
            }
            let arr = cur.as_array_mut()?;
            if *idx >= arr.len() {
                arr.resize(*idx + 1, Value::Nil);
            }
            install_rec(&mut arr[*idx], rest, value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn at_traverses_nested_selectors() {
        let mut root = Value::map();
        root.map_insert("log", {
            let mut handlers = Value::map();
            handlers
                .map_insert("handlers", Value::array_from(vec![{
                    let mut h = Value::map();
                    h.map_insert("sync", Value::Bool(true)).unwrap();
                    h
                }]))
                .unwrap();
            handlers
        })
        .unwrap();

        assert_eq!(
            root.at("{log}{handlers}[0]{sync}").unwrap(),
            &Value::Bool(true)
        );
    }

    #[test]
    fn missing_key_is_path_fail() {
        let root = Value::map();
        let err = root.at("{missing}").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::PathFail);
    }

    #[test]
    fn wrong_variant_at_step_is_path_fail() {
        let root = Value::Int64(5);
        let err = root.at("{key}").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::PathFail);
    }

    #[test]
    fn install_extends_array_with_nils_e6() {
        let mut root = Value::map();
        root.map_insert(
            "map",
            {
                let mut inner = Value::map();
                inner
                    .map_insert(
                        "nested",
                        Value::array_from(vec![
                            Value::Int64(1),
                            Value::Nil,
                            Value::u8str("x"),
                        ]),
                    )
                    .unwrap();
                inner
            },
        )
        .unwrap();

        root.install("{map}{nested}[5]", Value::Bool(true)).unwrap();

        let nested = root.at("{map}{nested}").unwrap();
        assert_eq!(nested.array_len().unwrap(), 6);
        assert_eq!(nested.array_get(5).unwrap(), &Value::Bool(true));
        assert_eq!(nested.array_get(3).unwrap(), &Value::Nil);
    }

    #[test]
    fn install_replaces_nil_intermediate_with_map() {
        let mut root = Value::Nil;
        root.install("{a}{b}", Value::Int64(7)).unwrap();
        assert_eq!(root.at("{a}{b}").unwrap(), &Value::Int64(7));
    }

    #[test]
    fn install_on_wrong_variant_fails() {
        let mut root = Value::Int64(1);
        let err = root.install("{a}", Value::Int64(2)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::PathFail);
    }

    proptest! {
        #[test]
        fn install_then_at_observes_the_installed_value(
            key in "[a-zA-Z]{1,8}",
            idx in 0usize..6,
            n in any::<i64>(),
        ) {
            let mut root = Value::map();
            let path = format!("{{{key}}}[{idx}]");
            root.install(&path, Value::Int64(n)).unwrap();
            prop_assert_eq!(root.at(&path).unwrap(), &Value::Int64(n));
        }
    }
}
