// -*- mode: rust; -*-
//
// This file is part of randhound.
// See LICENSE for licensing information.

//! Secret sharing polynomials, their public commitments, and Lagrange
//! interpolation at zero.

use alloc::vec::Vec;

use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{CryptoError, CryptoResult};
use crate::group::{GroupPoint, GroupScalar, Suite};

/// A secret polynomial whose free coefficient is the shared secret.
#[derive(Debug, Clone)]
pub(crate) struct PriPoly<S: Suite> {
    pub(crate) coefficients: Vec<S::Scalar>,
}

impl<S: Suite> Zeroize for PriPoly<S> {
    fn zeroize(&mut self) {
        self.coefficients.iter_mut().for_each(Zeroize::zeroize);
    }
}

impl<S: Suite> Drop for PriPoly<S> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<S: Suite> ZeroizeOnDrop for PriPoly<S> {}

impl<S: Suite> PriPoly<S> {
    /// Degree `threshold - 1` polynomial with random coefficients besides
    /// `secret`.
    pub(crate) fn with_secret<R>(suite: &S, secret: S::Scalar, threshold: usize, rng: &mut R) -> PriPoly<S>
    where
        R: RngCore + CryptoRng,
    {
        let mut coefficients = Vec::with_capacity(threshold);
        coefficients.push(secret);
        for _ in 1..threshold {
            coefficients.push(suite.random_scalar(rng));
        }
        PriPoly { coefficients }
    }

    /// Horner evaluation at `x`.
    pub(crate) fn evaluate(&self, suite: &S, x: &S::Scalar) -> S::Scalar {
        self.coefficients
            .iter()
            .rev()
            .fold(suite.scalar_from_u64(0), |acc, c| acc * x + c)
    }

    /// Commit to every coefficient against `base`.
    pub(crate) fn commit(&self, base: &S::Point) -> PubPoly<S> {
        let commitments = self.coefficients.iter().map(|c| base.clone() * c).collect();
        PubPoly { commitments }
    }
}

/// Public commitments `a_k H` to the coefficients of a secret polynomial.
#[derive(Debug, Clone)]
pub struct PubPoly<S: Suite> {
    pub(crate) commitments: Vec<S::Point>,
}

impl<S: Suite> PartialEq for PubPoly<S> {
    fn eq(&self, other: &Self) -> bool {
        self.commitments == other.commitments
    }
}

impl<S: Suite> Eq for PubPoly<S> {}

impl<S: Suite> PubPoly<S> {
    /// The commitment to the shared secret, `a_0 H`.
    pub fn free_coefficient(&self) -> Option<&S::Point> {
        self.commitments.first()
    }

    /// Number of commitments, the sharing threshold.
    pub fn threshold(&self) -> usize {
        self.commitments.len()
    }

    /// Evaluate in the exponent at `x`, giving `f(x) H`.
    pub fn evaluate(&self, suite: &S, x: &S::Scalar) -> S::Point {
        self.commitments
            .iter()
            .rev()
            .fold(suite.identity(), |acc, c| acc * x + c)
    }

    /// Concatenated point encodings.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.commitments.iter().flat_map(|c| c.to_bytes()).collect()
    }

    /// Decode exactly `threshold` point encodings.
    pub fn from_bytes(suite: &S, bytes: &[u8], threshold: usize) -> CryptoResult<PubPoly<S>> {
        let len = suite.point_len();
        if bytes.len() != threshold * len {
            return Err(CryptoError::MalformedEncoding { name: "PubPoly", length: threshold * len });
        }
        let commitments = bytes
            .chunks(len)
            .map(|c| suite.point_from_bytes(c))
            .collect::<CryptoResult<Vec<_>>>()?;
        Ok(PubPoly { commitments })
    }
}

/// Lagrange coefficients for interpolating at zero from the distinct
/// abscissae `xs`.
pub(crate) fn lagrange_at_zero<S: Suite>(suite: &S, xs: &[S::Scalar]) -> CryptoResult<Vec<S::Scalar>> {
    let mut coefficients = Vec::with_capacity(xs.len());
    for (i, xi) in xs.iter().enumerate() {
        let mut num = suite.scalar_from_u64(1);
        let mut den = suite.scalar_from_u64(1);
        for (j, xj) in xs.iter().enumerate() {
            if i == j {
                continue;
            }
            num = num * xj;
            den = den * &(xj.clone() - xi);
        }
        let inv = den.invert().ok_or(CryptoError::InvalidScalar)?;
        coefficients.push(num * &inv);
    }
    Ok(coefficients)
}
