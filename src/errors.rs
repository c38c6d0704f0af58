// -*- mode: rust; -*-
//
// This file is part of randhound.
// See LICENSE for licensing information.

//! Errors which may occur when decoding group elements, deriving points,
//! or checking DLEQ proofs.

use alloc::vec::Vec;
use core::fmt;
use core::fmt::Display;

/// `Result` specialized to this crate's group and proof layer.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors which may occur while processing points, scalars and proofs.
///
/// This error may arise due to:
///
/// * Being given bytes with a length different to what was expected.
///
/// * Bytes of the right length which do not decode to a point of the
///   group, e.g. an off-curve or out-of-subgroup point, or a coordinate
///   outside the field.
///
/// * A scalar encoding which is not fully reduced modulo the group order.
///
/// * Batched inputs whose vectors disagree in length.
///
/// * Failure of one or more DLEQ proofs to satisfy the verification
///   equation.  The failing positions are reported, not just a boolean.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum CryptoError {
    /// An error in the length or layout of bytes handed to a decoder.
    MalformedEncoding {
        /// Identifies the type being decoded
        name: &'static str,
        /// Length expected by the decoder in bytes
        length: usize,
    },
    /// Bytes of the correct length that do not name a valid group element.
    InvalidPoint,
    /// A scalar that is not canonically encoded, or is unusable, e.g. a
    /// zero private key.
    InvalidScalar,
    /// Batched input vectors of unequal length.
    LengthMismatch {
        /// Length of the first input vector
        expected: usize,
        /// Length of the offending input vector
        actual: usize,
    },
    /// No point could be derived from the supplied stream and data within
    /// the permitted number of attempts.
    PointDerivationFailed {
        /// Number of candidates tried before giving up
        attempts: usize,
    },
    /// Some proofs in a batch did not verify.
    ProofVerificationFailed {
        /// Positions of the failing proofs within the batch
        indices: Vec<usize>,
    },
}

impl Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CryptoError::MalformedEncoding { name, length } =>
                write!(f, "{} must be {} bytes in length", name, length),
            CryptoError::InvalidPoint =>
                write!(f, "Bytes do not encode a valid group element"),
            CryptoError::InvalidScalar =>
                write!(f, "Scalar is not canonical or not usable"),
            CryptoError::LengthMismatch { expected, actual } =>
                write!(f, "Batch inputs differ in length: expected {}, got {}", expected, actual),
            CryptoError::PointDerivationFailed { attempts } =>
                write!(f, "No valid point found after {} attempts", attempts),
            CryptoError::ProofVerificationFailed { indices } =>
                write!(f, "Proof verification failed at indices {:?}", indices),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CryptoError {}

/// Fail with `LengthMismatch` unless every length equals the first.
pub(crate) fn check_lengths(lengths: &[usize]) -> CryptoResult<()> {
    let expected = match lengths.first() {
        Some(l) => *l,
        None => return Ok(()),
    };
    match lengths.iter().find(|l| **l != expected) {
        Some(actual) => Err(CryptoError::LengthMismatch { expected, actual: *actual }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_agree() {
        assert_eq!(check_lengths(&[]), Ok(()));
        assert_eq!(check_lengths(&[3, 3, 3]), Ok(()));
        assert_eq!(
            check_lengths(&[3, 3, 2]),
            Err(CryptoError::LengthMismatch { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn display_names_the_failing_indices() {
        let e = CryptoError::ProofVerificationFailed { indices: vec![1, 4] };
        assert_eq!(format!("{}", e), "Proof verification failed at indices [1, 4]");
    }
}
