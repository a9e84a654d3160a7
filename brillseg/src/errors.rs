//! Definition of errors.

use std::error::Error;
use std::fmt;

pub type Result<T, E = BrillError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum BrillError {
    InvalidModel(InvalidModelError),
    InvalidArgument(InvalidArgumentError),
    InvalidTag(InvalidTagError),
    DecodeError(bincode::error::DecodeError),
    EncodeError(bincode::error::EncodeError),
    IOError(std::io::Error),
}

impl BrillError {
    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(InvalidModelError { msg: msg.into() })
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_tag<S>(tag: S, position: usize) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidTag(InvalidTagError {
            tag: tag.into(),
            position,
        })
    }
}

impl fmt::Display for BrillError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidModel(e) => fmt::Display::fmt(e, f),
            Self::InvalidArgument(e) => fmt::Display::fmt(e, f),
            Self::InvalidTag(e) => fmt::Display::fmt(e, f),
            Self::DecodeError(e) => fmt::Display::fmt(e, f),
            Self::EncodeError(e) => fmt::Display::fmt(e, f),
            Self::IOError(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl Error for BrillError {}

/// Error used when the model is invalid.
#[derive(Debug)]
pub struct InvalidModelError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidModelError: {}", self.msg)
    }
}

impl Error for InvalidModelError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// Error used when a tag is outside the vocabulary of a tag scheme.
#[derive(Debug)]
pub struct InvalidTagError {
    /// The offending tag.
    pub(crate) tag: String,

    /// Character position of the tag.
    pub(crate) position: usize,
}

impl fmt::Display for InvalidTagError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "InvalidTagError: unknown tag `{}` at position {}",
            self.tag, self.position
        )
    }
}

impl Error for InvalidTagError {}

impl From<bincode::error::DecodeError> for BrillError {
    fn from(error: bincode::error::DecodeError) -> Self {
        Self::DecodeError(error)
    }
}

impl From<bincode::error::EncodeError> for BrillError {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::EncodeError(error)
    }
}

impl From<std::io::Error> for BrillError {
    fn from(error: std::io::Error) -> Self {
        Self::IOError(error)
    }
}
