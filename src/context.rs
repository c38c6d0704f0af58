// -*- mode: rust; -*-
//
// This file is part of randhound.
// See LICENSE for licensing information.

//! Proof contexts and transcripts.
//!
//! Every challenge in this crate is derived from a `merlin::Transcript`
//! into which the protocol name, the statement and the commitments are
//! absorbed in a fixed order.  Nonces are hedged: they come from the
//! transcript, the secret witness and fresh randomness together.

use core::borrow::{Borrow, BorrowMut};

use alloc::vec;

use merlin::Transcript;
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore, SeedableRng};
use zeroize::Zeroize;

use crate::group::{GroupPoint, GroupScalar, Suite};

/// Proof transcript
///
/// An interface for Fiat-Shamir style constructions that is compatible
/// with `merlin::Transcript`, generic over the group suite.
///
/// We abstract over owned and borrowed `merlin::Transcript`s, so that
/// a proof may be embedded in a larger protocol transcript.
pub trait ProofTranscript {
    /// Extend transcript with some bytes, shadowed by `merlin::Transcript`.
    fn commit_bytes(&mut self, label: &'static [u8], bytes: &[u8]);

    /// Extend transcript with a protocol name
    fn proto_name(&mut self, label: &'static [u8]) {
        self.commit_bytes(b"proto-name", label);
    }

    /// Extend the transcript with the canonical encoding of a point
    fn commit_point<P: GroupPoint>(&mut self, label: &'static [u8], point: &P) {
        self.commit_bytes(label, &point.to_bytes());
    }

    /// Extend the transcript with a position inside a batch
    fn commit_index(&mut self, label: &'static [u8], index: usize) {
        self.commit_bytes(label, &(index as u64).to_le_bytes());
    }

    /// Produce some challenge bytes, shadowed by `merlin::Transcript`.
    fn challenge_bytes(&mut self, label: &'static [u8], dest: &mut [u8]);

    /// Produce the public challenge scalar `c`.
    fn challenge_scalar<S: Suite>(&mut self, suite: &S, label: &'static [u8]) -> S::Scalar {
        let mut buf = vec![0u8; 2 * suite.scalar_len()];
        self.challenge_bytes(label, &mut buf);
        suite.scalar_from_uniform_bytes(&buf)
    }

    /// Produce a secret witness scalar `v`, aka nonce, from the protocol
    /// transcript, the secret it protects, and the supplied randomness.
    fn witness_scalar<S, R>(&self, suite: &S, label: &'static [u8], secret: &S::Scalar, rng: &mut R) -> S::Scalar
    where
        S: Suite,
        R: RngCore + CryptoRng;
}

impl<T> ProofTranscript for T
where
    T: Borrow<Transcript> + BorrowMut<Transcript>, // Transcript, &mut Transcript
{
    fn commit_bytes(&mut self, label: &'static [u8], bytes: &[u8]) {
        Transcript::append_message(self.borrow_mut(), label, bytes);
    }

    fn challenge_bytes(&mut self, label: &'static [u8], dest: &mut [u8]) {
        Transcript::challenge_bytes(self.borrow_mut(), label, dest);
    }

    fn witness_scalar<S, R>(&self, suite: &S, label: &'static [u8], secret: &S::Scalar, rng: &mut R) -> S::Scalar
    where
        S: Suite,
        R: RngCore + CryptoRng,
    {
        let mut witness = secret.to_bytes();
        let mut r = self.borrow().build_rng()
            .rekey_with_witness_bytes(label, &witness)
            .finalize(rng);
        witness.zeroize();
        suite.random_scalar(&mut r)
    }
}

/// Proof context
///
/// We expect users to separate `ProofContext`s for each role that
/// proofs play in their protocol, e.g. share distribution versus share
/// decryption.  Prover and verifier must agree on the context.
#[derive(Clone)]
pub struct ProofContext(Transcript);

impl core::fmt::Debug for ProofContext {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("ProofContext")
    }
}

/// Initialize a proof context from a static byte string that
/// identifies the proof's role in the larger protocol.
pub fn proof_context(context: &'static [u8]) -> ProofContext {
    ProofContext::new(context)
}

impl ProofContext {
    const PROOF_CONTEXT: &'static [u8] = b"randhound proof context";

    /// Initialize a proof context from a static byte string.
    pub fn new(context: &'static [u8]) -> ProofContext {
        ProofContext(Transcript::new(Self::PROOF_CONTEXT)).with(context)
    }

    fn with(mut self, context: &'static [u8]) -> ProofContext {
        self.0.append_message(b"", context);
        self
    }

    /// A fresh transcript for one proof or one batch of proofs.
    pub fn transcript(&self) -> Transcript {
        self.0.clone()
    }

    /// A fresh transcript additionally bound to session bytes, such as a
    /// round identifier.
    pub fn bytes(&self, bytes: &[u8]) -> Transcript {
        let mut t = self.0.clone();
        t.append_message(b"session", bytes);
        t
    }
}

/// Key a ChaCha20 stream from a seed, separated by suite name.
pub(crate) fn cipher_stream(suite_name: &'static str, seed: &[u8]) -> ChaCha20Rng {
    let mut t = Transcript::new(b"randhound cipher");
    t.append_message(b"suite", suite_name.as_bytes());
    t.append_message(b"seed", seed);
    let mut key = [0u8; 32];
    t.challenge_bytes(b"key", &mut key);
    let rng = ChaCha20Rng::from_seed(key);
    key.zeroize();
    rng
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edwards::EdwardsSuite;
    use rand::thread_rng;

    #[test]
    fn challenges_depend_on_context_and_commitments() {
        let suite = EdwardsSuite::ed25519();
        let b = suite.base();

        let mut t1 = proof_context(b"one").transcript();
        let mut t2 = proof_context(b"one").transcript();
        let mut t3 = proof_context(b"two").transcript();
        for t in [&mut t1, &mut t2, &mut t3] {
            t.proto_name(b"test");
            t.commit_point(b"B", &b);
        }
        let c1 = t1.challenge_scalar(&suite, b"c");
        let c2 = t2.challenge_scalar(&suite, b"c");
        let c3 = t3.challenge_scalar(&suite, b"c");
        assert_eq!(c1, c2);
        assert_ne!(c1, c3);

        let mut t4 = proof_context(b"one").bytes(b"round 7");
        t4.proto_name(b"test");
        t4.commit_point(b"B", &b);
        assert_ne!(t4.challenge_scalar(&suite, b"c"), c1);
    }

    #[test]
    fn witnesses_are_hedged() {
        let suite = EdwardsSuite::ed25519();
        let x = suite.scalar_from_u64(42);
        let t = proof_context(b"witness").transcript();
        let v1 = t.witness_scalar(&suite, b"x", &x, &mut thread_rng());
        let v2 = t.witness_scalar(&suite, b"x", &x, &mut thread_rng());
        assert_ne!(v1, v2);
    }
}
