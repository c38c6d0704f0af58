// -*- mode: rust; -*-
//
// This file is part of randhound.
// See LICENSE for licensing information.

//! Publicly verifiable secret sharing.
//!
//! A dealer shares a secret scalar `s` among `n` trustees with public
//! keys `X_i = x_i G`:
//!
//! 1. [`PVSS::split`] picks a random polynomial `f` of degree `t - 1`
//!    with `f(0) = s`, publishes `a_k H` for each coefficient, and
//!    encrypts share `f(i + 1)` as `sX_i = f(i + 1) X_i`.  One batch of
//!    DLEQ proofs shows `log_H(sH_i) = log_{X_i}(sX_i)`.
//! 2. Anybody recomputes `sH_i` with [`PVSS::commits`] and checks the
//!    batch with [`PVSS::verify`], disqualifying the failing indices.
//! 3. Trustee `i` decrypts with [`PVSS::reveal`], `S_i = x_i^-1 sX_i`,
//!    proving `log_G(X_i) = log_{S_i}(sX_i)`, checked by
//!    [`PVSS::verify_decryption`].
//! 4. Any `t` decrypted shares give `s G` by Lagrange interpolation in
//!    the exponent, [`PVSS::recover`].

use alloc::vec;
use alloc::vec::Vec;

use rand_core::{CryptoRng, RngCore};
use tracing::{debug, warn};

use crate::context::{proof_context, ProofContext};
use crate::dleq::{BatchVerification, DLEQProof};
use crate::errors::{check_lengths, CryptoError, CryptoResult};
use crate::group::{GroupScalar, Suite};

mod errors;
mod polynomial;


pub use self::errors::{PVSSError, PVSSResult};
pub use self::polynomial::PubPoly;

use self::polynomial::{lagrange_at_zero, PriPoly};

/// Seed from which the default commitment base `H` is derived.
pub const COMMITMENT_BASE_SEED: &[u8] = b"H";

/// Everything the dealer publishes for one sharing.
#[derive(Debug, Clone)]
pub struct SplitShares<S: Suite> {
    /// Trustee index of each share, `0..n`.
    pub indices: Vec<usize>,
    /// Share `i` encrypted under trustee `i`'s key, `f(i + 1) X_i`.
    pub encrypted: Vec<S::Point>,
    /// Batched encryption consistency proofs, one per trustee.
    pub proofs: Vec<DLEQProof<S>>,
    /// Encoded commitments to the polynomial coefficients.
    pub commitments: Vec<u8>,
}

/// A share decrypted by its trustee, with a decryption consistency proof.
#[derive(Debug, Clone)]
pub struct DecryptedShare<S: Suite> {
    /// The plaintext share point `f(i + 1) G`.
    pub share: S::Point,
    /// Proof that `log_G(X_i) = log_{S_i}(sX_i)`.
    pub proof: DLEQProof<S>,
}

/// A PVSS session over one suite, commitment base and threshold.
#[derive(Debug, Clone)]
pub struct PVSS<S: Suite> {
    suite: S,
    h: S::Point,
    threshold: usize,
    encryption: ProofContext,
    decryption: ProofContext,
}

impl<S: Suite> PVSS<S> {
    /// Create a session sharing with commitment base `h` at `threshold`.
    pub fn new(suite: S, h: S::Point, threshold: usize) -> PVSSResult<PVSS<S>> {
        if threshold < 1 {
            return Err(PVSSError::InvalidThreshold(threshold));
        }
        Ok(PVSS {
            suite,
            h,
            threshold,
            encryption: proof_context(b"randhound pvss encryption"),
            decryption: proof_context(b"randhound pvss decryption"),
        })
    }

    /// Byzantine tolerant threshold for `n` participants, `2n/3 + 1`.
    pub fn default_threshold(n: usize) -> usize {
        2 * n / 3 + 1
    }

    /// Commitment base derived from the suite's stream seeded with
    /// `COMMITMENT_BASE_SEED`, independent of the standard base point.
    pub fn commitment_base(suite: &S) -> CryptoResult<S::Point> {
        let (h, _) = suite.pick_point(None, &mut suite.cipher(COMMITMENT_BASE_SEED))?;
        Ok(h)
    }

    /// The suite this session works in.
    pub fn suite(&self) -> &S {
        &self.suite
    }

    /// The commitment base `H`.
    pub fn h(&self) -> &S::Point {
        &self.h
    }

    /// Number of shares needed for recovery.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    fn x_coordinate(&self, index: usize) -> PVSSResult<S::Scalar> {
        let x = u64::try_from(index)
            .ok()
            .and_then(|i| i.checked_add(1))
            .ok_or(PVSSError::InvalidIndex(index))?;
        Ok(self.suite.scalar_from_u64(x))
    }

    /// Share `secret` among the holders of `public_keys`.
    pub fn split<R>(&self, public_keys: &[S::Point], secret: S::Scalar, rng: &mut R) -> PVSSResult<SplitShares<S>>
    where
        R: RngCore + CryptoRng,
    {
        let n = public_keys.len();
        if n < self.threshold {
            return Err(PVSSError::ExcessiveThreshold { threshold: self.threshold, participants: n });
        }

        let poly = PriPoly::with_secret(&self.suite, secret, self.threshold, rng);
        let indices: Vec<usize> = (0..n).collect();
        let shares = indices
            .iter()
            .map(|i| -> PVSSResult<S::Scalar> { Ok(poly.evaluate(&self.suite, &self.x_coordinate(*i)?)) })
            .collect::<PVSSResult<Vec<S::Scalar>>>()?;
        let commitments = poly.commit(&self.h).to_bytes();
        drop(poly);

        let bases = vec![self.h.clone(); n];
        let (proofs, _, encrypted) = DLEQProof::new_batch(&self.encryption, &self.suite, &bases, public_keys, &shares, rng)?;
        debug!(n, threshold = self.threshold, "pvss shares split");
        Ok(SplitShares { indices, encrypted, proofs, commitments })
    }

    /// Recompute the commitments `sH_i = f(i + 1) H` from encoded
    /// polynomial commitments, one polynomial per index.
    pub fn commits(&self, polys: &[Vec<u8>], indices: &[usize]) -> PVSSResult<Vec<S::Point>> {
        check_lengths(&[polys.len(), indices.len()])?;
        polys
            .iter()
            .zip(indices)
            .map(|(bytes, i)| -> PVSSResult<S::Point> {
                let poly = PubPoly::from_bytes(&self.suite, bytes, self.threshold)?;
                Ok(poly.evaluate(&self.suite, &self.x_coordinate(*i)?))
            })
            .collect()
    }

    /// Check encryption proofs `log_H(sH_i) = log_{X_i}(sX_i)`.  Trustees
    /// listed in `bad` must be disqualified before decryption.
    pub fn verify(
        &self,
        h: &S::Point,
        public_keys: &[S::Point],
        sh: &[S::Point],
        sx: &[S::Point],
        proofs: &[DLEQProof<S>],
    ) -> PVSSResult<BatchVerification> {
        let bases = vec![h.clone(); public_keys.len()];
        let result = DLEQProof::verify_batch(&self.encryption, &self.suite, &bases, public_keys, sh, sx, proofs)?;
        if !result.is_valid() {
            warn!(bad = ?result.bad, "pvss encrypted shares disqualified");
        }
        Ok(result)
    }

    /// Decrypt the share `sx` addressed to the holder of `secret`.
    pub fn reveal<R>(&self, secret: &S::Scalar, sx: &S::Point, rng: &mut R) -> PVSSResult<DecryptedShare<S>>
    where
        R: RngCore + CryptoRng,
    {
        let inv = secret.invert().ok_or(CryptoError::InvalidScalar)?;
        let share = sx.clone() * &inv;
        let (proof, _, _) = DLEQProof::new(&self.decryption, &self.suite, &self.suite.base(), &share, secret, rng);
        Ok(DecryptedShare { share, proof })
    }

    /// Check decryption proofs `log_G(X_i) = log_{S_i}(sX_i)`.
    pub fn verify_decryption(
        &self,
        public_keys: &[S::Point],
        sx: &[S::Point],
        decrypted: &[DecryptedShare<S>],
    ) -> PVSSResult<BatchVerification> {
        let shares: Vec<S::Point> = decrypted.iter().map(|d| d.share.clone()).collect();
        let proofs: Vec<DLEQProof<S>> = decrypted.iter().map(|d| d.proof.clone()).collect();
        let bases = vec![self.suite.base(); decrypted.len()];
        let result = DLEQProof::verify_each(&self.decryption, &self.suite, &bases, &shares, public_keys, sx, &proofs)?;
        if !result.is_valid() {
            warn!(bad = ?result.bad, "pvss decrypted shares disqualified");
        }
        Ok(result)
    }

    /// Interpolate `s G` from decrypted shares.  The first `threshold`
    /// shares are used.
    pub fn recover(&self, indices: &[usize], shares: &[S::Point]) -> PVSSResult<S::Point> {
        check_lengths(&[indices.len(), shares.len()])?;
        for (k, i) in indices.iter().enumerate() {
            if indices[..k].contains(i) {
                return Err(PVSSError::DuplicateIndex(*i));
            }
        }
        if shares.len() < self.threshold {
            return Err(PVSSError::InsufficientShares { needed: self.threshold, received: shares.len() });
        }

        let xs = indices
            .iter()
            .map(|i| self.x_coordinate(*i))
            .collect::<PVSSResult<Vec<S::Scalar>>>()?;
        let lambdas = lagrange_at_zero(&self.suite, &xs[..self.threshold])?;
        let secret = shares
            .iter()
            .zip(&lambdas)
            .fold(self.suite.identity(), |acc, (s, l)| acc + &(s.clone() * l));
        debug!(threshold = self.threshold, "pvss secret recovered");
        Ok(secret)
    }
}
