//! Map container operations (§4.1.2), including the policy-driven "add
//! family" (`insert`/`replace`/`set`/`merge`).

use super::{Map, Value};
use crate::error::Result;

/// Conflict policy for [`Value::map_add`] and [`Value::map_merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddPolicy {
    /// Fail (or invoke `on_fail`) if the key already exists.
    InsertOnly,
    /// Fail (or invoke `on_fail`) if the key does not already exist.
    ReplaceOnly,
    /// Always succeed: insert if absent, overwrite if present.
    InsertOrReplace,
}

impl Value {
    pub fn map_len(&self) -> Result<usize> {
        Ok(self.as_map()?.len())
    }

    pub fn map_is_empty(&self) -> Result<bool> {
        Ok(self.as_map()?.is_empty())
    }

    pub fn map_has_key(&self, key: &str) -> Result<bool> {
        Ok(self.as_map()?.contains_key(key))
    }

    pub fn map_keys(&self) -> Result<impl Iterator<Item = &str>> {
        Ok(self.as_map()?.keys().map(String::as_str))
    }

    pub fn map_get(&self, key: &str) -> Result<Option<&Value>> {
        Ok(self.as_map()?.get(key))
    }

    pub fn map_iter(&self) -> Result<indexmap::map::Iter<'_, String, Value>> {
        Ok(self.as_map()?.iter())
    }

    pub fn map_iter_mut(&mut self) -> Result<indexmap::map::IterMut<'_, String, Value>> {
        Ok(self.as_map_mut()?.iter_mut())
    }

    pub fn map_clear(&mut self) -> Result<()> {
        self.as_map_mut()?.clear();
        Ok(())
    }

    pub fn map_erase(&mut self, key: &str) -> Result<Option<Value>> {
        Ok(self.as_map_mut()?.shift_remove(key))
    }

    pub fn map_filter(&self, mut predicate: impl FnMut(&str, &Value) -> bool) -> Result<Value> {
        let kept: Map = self
            .as_map()?
            .iter()
            .filter(|(k, v)| predicate(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Value::map_from(kept))
    }

    /// Read-only indexing by key. When `key` is absent, a `Nil` is inserted
    /// (triggering COW) and a reference to it is returned. This is a design
    /// decision carried forward from the original implementation: encoders
    /// and callers rely on it, so it is preserved rather than "fixed".
    pub fn map_index_or_insert(&mut self, key: &str) -> Result<&mut Value> {
        let map = self.as_map_mut()?;
        if !map.contains_key(key) {
            map.insert(key.to_string(), Value::Nil);
        }
        Ok(map.get_mut(key).expect("just inserted"))
    }

    /// The general add operation: apply `policy` to decide whether `value`
    /// may be inserted/replace the existing entry at `key`. On a policy
    /// violation, `on_fail` (if given) is invoked with the key and the
    /// rejected value; if no callback is given, the operation is silently
    /// skipped (never an error).
    pub fn map_add(
        &mut self,
        key: impl Into<String>,
        value: Value,
        policy: AddPolicy,
        mut on_fail: Option<&mut dyn FnMut(&str, Value)>,
    ) -> Result<()> {
        let key = key.into();
        let map = self.as_map_mut()?;
        let exists = map.contains_key(&key);
        let allowed = match policy {
            AddPolicy::InsertOnly => !exists,
            AddPolicy::ReplaceOnly => exists,
            AddPolicy::InsertOrReplace => true,
        };
        if allowed {
            map.insert(key, value);
        } else if let Some(cb) = on_fail.as_deref_mut() {
            cb(&key, value);
        }
        Ok(())
    }

    pub fn map_insert(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        self.map_add(key, value, AddPolicy::InsertOnly, None)
    }

    pub fn map_replace(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        self.map_add(key, value, AddPolicy::ReplaceOnly, None)
    }

    pub fn map_set(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        self.map_add(key, value, AddPolicy::InsertOrReplace, None)
    }

    /// Applies [`Value::map_add`] to every entry of `other` (which must
    /// itself be a Map).
    pub fn map_merge(
        &mut self,
        other: &Value,
        policy: AddPolicy,
        mut on_fail: Option<&mut dyn FnMut(&str, Value)>,
    ) -> Result<()> {
        let entries: Vec<(String, Value)> = other
            .as_map()?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (k, v) in entries {
            self.map_add(k, v, policy, on_fail.as_deref_mut())?;
        }
        Ok(())
    }
}
