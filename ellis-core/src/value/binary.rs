//! Binary container operations (§4.1.3): an ordered byte sequence distinct
//! from [`super::Value::U8Str`] in that its bytes are not required to be
//! valid UTF-8.

use super::Value;
use crate::error::{Error, Result};

impl Value {
    pub fn binary_len(&self) -> Result<usize> {
        Ok(self.as_binary()?.len())
    }

    pub fn binary_is_empty(&self) -> Result<bool> {
        Ok(self.as_binary()?.is_empty())
    }

    pub fn binary_get(&self, index: usize) -> Result<u8> {
        self.as_binary()?
            .get(index)
            .copied()
            .ok_or_else(|| Error::invalid_args(format!("binary index {index} out of range")))
    }

    pub fn binary_append(&mut self, bytes: &[u8]) -> Result<()> {
        self.as_binary_mut()?.extend_from_slice(bytes);
        Ok(())
    }

    /// Truncates to `len`, or zero-pads up to `len` if currently shorter.
    pub fn binary_resize(&mut self, len: usize) -> Result<()> {
        self.as_binary_mut()?.resize(len, 0u8);
        Ok(())
    }

    pub fn binary_data(&self) -> Result<&[u8]> {
        self.as_binary()
    }

    pub fn binary_clear(&mut self) -> Result<()> {
        self.as_binary_mut()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_zero_pads() {
        let mut b = Value::binary_from(&[1, 2]);
        b.binary_resize(4).unwrap();
        assert_eq!(b.binary_data().unwrap(), &[1, 2, 0, 0]);
    }

    #[test]
    fn resize_truncates() {
        let mut b = Value::binary_from(&[1, 2, 3, 4]);
        b.binary_resize(2).unwrap();
        assert_eq!(b.binary_data().unwrap(), &[1, 2]);
    }

    #[test]
    fn empty_binary_round_trips_through_equality() {
        assert_eq!(Value::binary(), Value::binary_from(&[]));
    }
}
