//! Array container operations (§4.1.1).

use super::Value;
use crate::error::{Error, Result};

impl Value {
    pub fn array_len(&self) -> Result<usize> {
        Ok(self.as_array()?.len())
    }

    pub fn array_is_empty(&self) -> Result<bool> {
        Ok(self.as_array()?.is_empty())
    }

    pub fn array_get(&self, index: usize) -> Result<&Value> {
        self.as_array()?
            .get(index)
            .ok_or_else(|| Error::invalid_args(format!("array index {index} out of range")))
    }

    pub fn array_append(&mut self, value: Value) -> Result<()> {
        self.as_array_mut()?.push(value);
        Ok(())
    }

    /// Appends every element of `other` (which must itself be an Array) to
    /// `self`.
    pub fn array_extend(&mut self, other: &Value) -> Result<()> {
        let extra = other.as_array()?.to_vec();
        self.as_array_mut()?.extend(extra);
        Ok(())
    }

    pub fn array_insert(&mut self, pos: usize, value: Value) -> Result<()> {
        let arr = self.as_array_mut()?;
        if pos > arr.len() {
            return Err(Error::invalid_args(format!(
                "array insert position {pos} out of range"
            )));
        }
        arr.insert(pos, value);
        Ok(())
    }

    pub fn array_erase(&mut self, pos: usize) -> Result<Value> {
        let arr = self.as_array_mut()?;
        if pos >= arr.len() {
            return Err(Error::invalid_args(format!(
                "array erase position {pos} out of range"
            )));
        }
        Ok(arr.remove(pos))
    }

    pub fn array_reserve(&mut self, additional: usize) -> Result<()> {
        self.as_array_mut()?.reserve(additional);
        Ok(())
    }

    pub fn array_clear(&mut self) -> Result<()> {
        self.as_array_mut()?.clear();
        Ok(())
    }

    pub fn array_iter(&self) -> Result<std::slice::Iter<'_, Value>> {
        Ok(self.as_array()?.iter())
    }

    pub fn array_iter_mut(&mut self) -> Result<std::slice::IterMut<'_, Value>> {
        Ok(self.as_array_mut()?.iter_mut())
    }

    /// A new Array holding clones of every element satisfying `predicate`.
    /// Cloned elements are cheap `Rc` handles: they share payloads with the
    /// original array until one of the two copies is mutated (testable
    /// property 5 / invariant 4).
    pub fn array_filter(&self, mut predicate: impl FnMut(&Value) -> bool) -> Result<Value> {
        let kept: Vec<Value> = self
            .as_array()?
            .iter()
            .filter(|v| predicate(v))
            .cloned()
            .collect();
        Ok(Value::array_from(kept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_keeps_only_matching_elements_and_shares_payloads() {
        let arr = Value::array_from(vec![
            Value::Int64(1),
            Value::u8str("x"),
            Value::Int64(3),
        ]);
        let evens = arr
            .array_filter(|v| matches!(v, Value::Int64(n) if n % 2 != 0))
            .unwrap();
        assert_eq!(evens.array_len().unwrap(), 2);
        assert!(evens.array_len().unwrap() <= arr.array_len().unwrap());
        for v in evens.array_iter().unwrap() {
            assert!(matches!(v, Value::Int64(_)));
        }
    }

    #[test]
    fn erase_out_of_range_is_invalid_args() {
        let mut arr = Value::array();
        let err = arr.array_erase(0).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgs);
    }

    #[test]
    fn extend_appends_all_elements() {
        let mut a = Value::array_from(vec![Value::Int64(1)]);
        let b = Value::array_from(vec![Value::Int64(2), Value::Int64(3)]);
        a.array_extend(&b).unwrap();
        assert_eq!(a.array_len().unwrap(), 3);
    }
}
