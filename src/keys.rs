// -*- mode: rust; -*-
//
// This file is part of randhound.
// See LICENSE for licensing information.

//! Key pairs for dealers and trustees.

use core::fmt::Debug;

use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{CryptoError, CryptoResult};
use crate::group::{GroupPoint, GroupScalar, Suite};

/// A secret scalar together with its public point `secret * Base`.
#[derive(Clone)]
pub struct Keypair<S: Suite> {
    /// The secret half of this keypair.
    pub(crate) secret: S::Scalar,
    /// The public half of this keypair.
    pub(crate) public: S::Point,
}

impl<S: Suite> Zeroize for Keypair<S> {
    fn zeroize(&mut self) {
        self.secret.zeroize();
    }
}

impl<S: Suite> Drop for Keypair<S> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<S: Suite> ZeroizeOnDrop for Keypair<S> {}

impl<S: Suite> Debug for Keypair<S> {
    fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
        f.debug_struct("Keypair").field("public", &self.public).finish_non_exhaustive()
    }
}

impl<S: Suite> Keypair<S> {
    /// Generate a keypair from the supplied stream.
    pub fn generate_with<R>(suite: &S, mut csprng: R) -> Keypair<S>
    where
        R: RngCore + CryptoRng,
    {
        loop {
            let secret = suite.random_scalar(&mut csprng);
            if !secret.is_zero() {
                return Keypair::from_secret(suite, secret);
            }
        }
    }

    /// Generate a keypair from operating system randomness.
    #[cfg(feature = "getrandom")]
    pub fn generate(suite: &S) -> Keypair<S> {
        Self::generate_with(suite, getrandom_or_panic::getrandom_or_panic())
    }

    /// Derive a keypair deterministically from seed bytes, as SHA-512 of
    /// the seed reduced modulo the group order.
    pub fn from_seed(suite: &S, seed: &[u8]) -> CryptoResult<Keypair<S>> {
        let mut h = Sha512::new();
        h.update(seed);
        let mut wide = [0u8; 64];
        wide.copy_from_slice(&h.finalize());
        let secret = suite.scalar_from_uniform_bytes(&wide);
        wide.zeroize();
        if secret.is_zero() {
            return Err(CryptoError::InvalidScalar);
        }
        Ok(Keypair::from_secret(suite, secret))
    }

    /// Complete a secret scalar into a keypair.
    pub fn from_secret(suite: &S, secret: S::Scalar) -> Keypair<S> {
        let public = suite.base() * &secret;
        Keypair { secret, public }
    }

    /// The secret scalar.
    pub fn secret(&self) -> &S::Scalar {
        &self.secret
    }

    /// The public point.
    pub fn public(&self) -> &S::Point {
        &self.public
    }

    /// Check that the public point matches the secret.
    pub fn is_consistent(&self, suite: &S) -> bool {
        suite.base() * &self.secret == self.public && !self.public.is_identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edwards::EdwardsSuite;
    use rand::thread_rng;

    #[test]
    fn public_is_secret_times_base() {
        let suite = EdwardsSuite::ed25519();
        let kp = Keypair::generate_with(&suite, thread_rng());
        assert_eq!(kp.public().clone(), suite.base() * kp.secret());
        assert!(kp.is_consistent(&suite));
    }

    #[test]
    fn seeded_keypairs_are_deterministic() {
        let suite = EdwardsSuite::ed25519();
        let a = Keypair::from_seed(&suite, b"trustee 0").unwrap();
        let b = Keypair::from_seed(&suite, b"trustee 0").unwrap();
        let c = Keypair::from_seed(&suite, b"trustee 1").unwrap();
        assert_eq!(a.public(), b.public());
        assert_ne!(a.public(), c.public());
        assert_eq!(a.secret().to_bytes().len(), 32);
    }

    #[test]
    fn zeroize_wipes_the_secret() {
        let suite = EdwardsSuite::ed25519();
        let mut kp = Keypair::from_seed(&suite, b"trustee 0").unwrap();
        assert!(!kp.secret().is_zero());
        kp.zeroize();
        assert!(kp.secret().is_zero());
        assert!(!kp.is_consistent(&suite));
    }

    #[cfg(feature = "getrandom")]
    #[test]
    fn os_randomness() {
        let suite = EdwardsSuite::ed25519();
        let kp = Keypair::generate(&suite);
        assert!(kp.is_consistent(&suite));
    }
}
