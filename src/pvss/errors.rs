// -*- mode: rust; -*-
//
// This file is part of randhound.
// See LICENSE for licensing information.

//! Errors of the PVSS protocol.

use core::fmt;
use core::fmt::Display;

use crate::errors::CryptoError;

/// A result for the PVSS protocol.
pub type PVSSResult<T> = Result<T, PVSSError>;

/// Errors that can occur while splitting, revealing or recovering a secret.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PVSSError {
    /// A group or proof level failure, e.g. a malformed commitment.
    Crypto(CryptoError),
    /// The threshold must be at least one.
    InvalidThreshold(usize),
    /// Raised when the threshold exceeds the number of trustees.
    ExcessiveThreshold {
        /// The configured threshold.
        threshold: usize,
        /// The number of trustees supplied.
        participants: usize,
    },
    /// Fewer shares than the threshold were supplied to recovery.
    InsufficientShares {
        /// The threshold.
        needed: usize,
        /// The number of shares supplied.
        received: usize,
    },
    /// The same share index was supplied twice.
    DuplicateIndex(usize),
    /// A share index whose abscissa `index + 1` does not fit.
    InvalidIndex(usize),
}

impl From<CryptoError> for PVSSError {
    fn from(e: CryptoError) -> PVSSError {
        PVSSError::Crypto(e)
    }
}

impl Display for PVSSError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PVSSError::Crypto(e) => write!(f, "{}", e),
            PVSSError::InvalidThreshold(t) => write!(f, "Threshold must be at least 1, got {}", t),
            PVSSError::ExcessiveThreshold { threshold, participants } => write!(
                f,
                "Threshold {} cannot be greater than the number of participants {}",
                threshold, participants
            ),
            PVSSError::InsufficientShares { needed, received } =>
                write!(f, "Recovery needs {} shares, got {}", needed, received),
            PVSSError::DuplicateIndex(i) => write!(f, "Share index {} is duplicated", i),
            PVSSError::InvalidIndex(i) => write!(f, "Share index {} is out of range", i),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PVSSError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PVSSError::Crypto(e) => Some(e),
            _ => None,
        }
    }
}
