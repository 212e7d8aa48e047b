//! U8Str container operations (§4.1.3): a UTF-8 byte sequence. The core
//! does not validate UTF-8 on construction; callers are expected to supply
//! valid UTF-8, exactly as the specification requires.

use super::Value;
use crate::error::Result;

impl Value {
    pub fn u8str_len(&self) -> Result<usize> {
        Ok(self.as_str()?.len())
    }

    pub fn u8str_is_empty(&self) -> Result<bool> {
        Ok(self.as_str()?.is_empty())
    }

    pub fn u8str_append(&mut self, s: &str) -> Result<()> {
        self.as_str_mut()?.push_str(s);
        Ok(())
    }

    pub fn u8str_assign(&mut self, s: impl Into<String>) -> Result<()> {
        *self.as_str_mut()? = s.into();
        Ok(())
    }

    /// Truncates to `len` bytes, or null-pads up to `len` bytes if
    /// currently shorter. `len` must land on a UTF-8 character boundary.
    pub fn u8str_resize(&mut self, len: usize) -> Result<()> {
        let s = self.as_str_mut()?;
        if len <= s.len() {
            if !s.is_char_boundary(len) {
                return Err(crate::error::Error::invalid_args(
                    "resize length does not land on a UTF-8 character boundary",
                ));
            }
            s.truncate(len);
        } else {
            s.push_str(&"\0".repeat(len - s.len()));
        }
        Ok(())
    }

    pub fn u8str_data(&self) -> Result<&str> {
        self.as_str()
    }

    pub fn u8str_clear(&mut self) -> Result<()> {
        self.as_str_mut()?.clear();
        Ok(())
    }
}
