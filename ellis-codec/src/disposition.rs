//! The three-state outcome (§3.3) returned by every codec step.

use ellis_core::Error;

/// The sole communication currency between a codec and the stream driving
/// it.
///
/// `CONTINUE` carries nothing, `SUCCESS` carries the produced artifact
/// (a [`ellis_core::Value`] for decoders, `bool` for encoders), and
/// `ERROR` carries a structured [`Error`].
#[derive(Debug)]
pub enum Disposition<T> {
    Continue,
    Success(T),
    Error(Error),
}

impl<T> Disposition<T> {
    pub fn is_continue(&self) -> bool {
        matches!(self, Disposition::Continue)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Disposition::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Disposition::Error(_))
    }

    /// Converts to a `Result`, treating `Continue` as `Ok(None)`,
    /// `Success` as `Ok(Some(value))`, and `Error` as `Err`.
    pub fn into_result(self) -> Result<Option<T>, Error> {
        match self {
            Disposition::Continue => Ok(None),
            Disposition::Success(v) => Ok(Some(v)),
            Disposition::Error(e) => Err(e),
        }
    }
}

impl<T> From<Result<T, Error>> for Disposition<T> {
    fn from(r: Result<T, Error>) -> Self {
        match r {
            Ok(v) => Disposition::Success(v),
            Err(e) => Disposition::Error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_result_maps_each_state() {
        assert_eq!(Disposition::<bool>::Continue.into_result().unwrap(), None);
        assert_eq!(
            Disposition::Success(true).into_result().unwrap(),
            Some(true)
        );
        assert!(Disposition::<bool>::Error(Error::io("eof")).into_result().is_err());
    }
}
