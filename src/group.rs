// -*- mode: rust; -*-
//
// This file is part of randhound.
// See LICENSE for licensing information.

//! Group capabilities shared by every suite.
//!
//! Protocol code (`dleq`, `pvss`, `keys`) is written once against these
//! traits and monomorphized for the concrete suite, so no runtime type
//! switching happens on points or scalars.  The only suite shipped is
//! the twisted Edwards one in `crate::edwards`.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::{Add, Mul, Neg, Sub};

use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::errors::CryptoResult;

/// Multiplication of a group element by a borrowed scalar.
pub trait ScalarMul<Rhs>: for<'a> Mul<&'a Rhs, Output = Self> + Sized {}

impl<T, Rhs> ScalarMul<Rhs> for T where T: for<'a> Mul<&'a Rhs, Output = T> {}

/// An element of the scalar field of a suite, i.e. an integer modulo the
/// group order.
///
/// Arithmetic consumes the left operand and borrows the right one, so
/// generic code reads `a.clone() * &b - &c`.
pub trait GroupScalar:
    Clone
    + Debug
    + Eq
    + Send
    + Sync
    + Zeroize
    + Neg<Output = Self>
    + for<'a> Add<&'a Self, Output = Self>
    + for<'a> Sub<&'a Self, Output = Self>
    + for<'a> Mul<&'a Self, Output = Self>
{
    /// Multiplicative inverse, or `None` for zero.
    fn invert(&self) -> Option<Self>;

    /// Whether this is the additive identity.
    fn is_zero(&self) -> bool;

    /// Canonical little-endian encoding, `Suite::scalar_len` bytes long.
    fn to_bytes(&self) -> Vec<u8>;

    /// Canonical encoding wrapped for transport.
    fn encode(&self) -> EncodedScalar {
        EncodedScalar(self.to_bytes())
    }
}

/// An element of the group of a suite.
pub trait GroupPoint:
    Clone
    + Debug
    + Eq
    + Send
    + Sync
    + Neg<Output = Self>
    + for<'a> Add<&'a Self, Output = Self>
    + for<'a> Sub<&'a Self, Output = Self>
    + ScalarMul<<Self as GroupPoint>::Scalar>
{
    /// Scalars acting on this group.
    type Scalar: GroupScalar;

    /// Whether this is the neutral element.
    fn is_identity(&self) -> bool;

    /// Canonical fixed length encoding, `Suite::point_len` bytes long.
    fn to_bytes(&self) -> Vec<u8>;

    /// Canonical encoding wrapped for transport.
    fn compress(&self) -> CompressedPoint {
        CompressedPoint(self.to_bytes())
    }

    /// Data embedded by `Suite::pick_point`.
    fn data(&self) -> CryptoResult<Vec<u8>>;
}

/// A concrete group together with its scalar field and the constants
/// shared by all elements.
///
/// Everything created by one suite may be combined freely.  Combining
/// elements of two suites with different parameters panics.
pub trait Suite: Clone + Debug + Send + Sync {
    /// Scalar field element type.
    type Scalar: GroupScalar;
    /// Group element type.
    type Point: GroupPoint<Scalar = Self::Scalar>;

    /// Name of the suite, also used for domain separation.
    fn name(&self) -> &'static str;

    /// Length in bytes of an encoded point.
    fn point_len(&self) -> usize;

    /// Length in bytes of an encoded scalar.
    fn scalar_len(&self) -> usize;

    /// Embed a small integer into the scalar field.
    fn scalar_from_u64(&self, v: u64) -> Self::Scalar;

    /// Decode a canonical scalar encoding.
    fn scalar_from_bytes(&self, bytes: &[u8]) -> CryptoResult<Self::Scalar>;

    /// Reduce arbitrary bytes, read little-endian, modulo the group order.
    /// Feed at least twice `scalar_len` bytes for a near uniform result.
    fn scalar_from_uniform_bytes(&self, bytes: &[u8]) -> Self::Scalar;

    /// Sample a scalar from a cryptographically secure stream.
    fn random_scalar<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Self::Scalar {
        let mut buf = vec![0u8; 2 * self.scalar_len()];
        rng.fill_bytes(&mut buf);
        let s = self.scalar_from_uniform_bytes(&buf);
        buf.zeroize();
        s
    }

    /// The neutral element.
    fn identity(&self) -> Self::Point;

    /// The standard generator.
    fn base(&self) -> Self::Point;

    /// Decode a canonical point encoding, checking group membership.
    fn point_from_bytes(&self, bytes: &[u8]) -> CryptoResult<Self::Point>;

    /// Derive a point from the stream, embedding as much of `data` as fits.
    ///
    /// Returns the point and the part of `data` that did not fit.
    fn pick_point<'d, R: RngCore + CryptoRng>(
        &self,
        data: Option<&'d [u8]>,
        rng: &mut R,
    ) -> CryptoResult<(Self::Point, &'d [u8])>;

    /// Deterministic pseudo-random stream seeded from arbitrary bytes.
    ///
    /// Never reuse a seed for two unrelated purposes.
    fn cipher(&self, seed: &[u8]) -> ChaCha20Rng {
        crate::context::cipher_stream(self.name(), seed)
    }
}

/// A point encoding as it travels between parties.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde_crate::Serialize, serde_crate::Deserialize))]
#[cfg_attr(feature = "serde", serde(crate = "serde_crate"))]
pub struct CompressedPoint(#[cfg_attr(feature = "serde", serde(with = "serde_bytes"))] pub Vec<u8>);

impl CompressedPoint {
    /// View the encoding as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decode into a point of `suite`.
    pub fn decompress<S: Suite>(&self, suite: &S) -> CryptoResult<S::Point> {
        suite.point_from_bytes(&self.0)
    }
}

/// A scalar encoding as it travels between parties.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde_crate::Serialize, serde_crate::Deserialize))]
#[cfg_attr(feature = "serde", serde(crate = "serde_crate"))]
pub struct EncodedScalar(#[cfg_attr(feature = "serde", serde(with = "serde_bytes"))] pub Vec<u8>);

impl EncodedScalar {
    /// View the encoding as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decode into a scalar of `suite`.
    pub fn decode<S: Suite>(&self, suite: &S) -> CryptoResult<S::Scalar> {
        suite.scalar_from_bytes(&self.0)
    }
}
