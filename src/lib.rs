// -*- mode: rust; -*-
//
// This file is part of randhound.
// See LICENSE for licensing information.

//! Publicly verifiable secret sharing over twisted Edwards curves
//!
//! This crate provides the cryptographic core of a distributed randomness
//! protocol: prime order group arithmetic on twisted Edwards curves,
//! Chaum-Pedersen proofs of discrete logarithm equality (DLEQ), and a
//! publicly verifiable secret sharing (PVSS) scheme built from them.
//!
//! # Example
//!
//! A dealer shares a secret among ten trustees, any seven of which may
//! later recover it in the exponent.
//!
//! ```
//! use rand::thread_rng;
//! use randhound::{EdwardsSuite, Keypair, Suite, PVSS};
//!
//! let suite = EdwardsSuite::ed25519();
//! let trustees: Vec<_> = (0..10)
//!     .map(|_| Keypair::generate_with(&suite, thread_rng()))
//!     .collect();
//! let public_keys: Vec<_> = trustees.iter().map(|kp| kp.public().clone()).collect();
//!
//! let h = PVSS::commitment_base(&suite).unwrap();
//! let pvss = PVSS::new(suite.clone(), h, PVSS::<EdwardsSuite>::default_threshold(10)).unwrap();
//!
//! let secret = suite.random_scalar(&mut thread_rng());
//! let split = pvss.split(&public_keys, secret.clone(), &mut thread_rng()).unwrap();
//! ```
//!
//! Anyone may check the encrypted shares against the dealer's polynomial
//! commitments, and each trustee decrypts its own share with a proof:
//!
//! ```
//! # use rand::thread_rng;
//! # use randhound::{EdwardsSuite, Keypair, Suite, PVSS};
//! # let suite = EdwardsSuite::ed25519();
//! # let trustees: Vec<_> = (0..10).map(|_| Keypair::generate_with(&suite, thread_rng())).collect();
//! # let public_keys: Vec<_> = trustees.iter().map(|kp| kp.public().clone()).collect();
//! # let h = PVSS::commitment_base(&suite).unwrap();
//! # let pvss = PVSS::new(suite.clone(), h, 7).unwrap();
//! # let secret = suite.random_scalar(&mut thread_rng());
//! # let split = pvss.split(&public_keys, secret.clone(), &mut thread_rng()).unwrap();
//! let polys = vec![split.commitments.clone(); public_keys.len()];
//! let sh = pvss.commits(&polys, &split.indices).unwrap();
//! let checked = pvss.verify(pvss.h(), &public_keys, &sh, &split.encrypted, &split.proofs).unwrap();
//! assert!(checked.is_valid());
//!
//! let shares: Vec<_> = trustees
//!     .iter()
//!     .zip(&split.encrypted)
//!     .map(|(kp, sx)| pvss.reveal(kp.secret(), sx, &mut thread_rng()).unwrap().share)
//!     .collect();
//! let recovered = pvss.recover(&split.indices, &shares).unwrap();
//! assert_eq!(recovered, suite.base() * &secret);
//! ```
//!
//! # Suites
//!
//! Protocol code is generic over the [`Suite`] trait.  The shipped suite
//! is [`EdwardsSuite`], parameterized by a curve [`Param`] set, with
//! Ed25519 built in.  Its arithmetic runs on arbitrary precision integers
//! and is not constant time.

#![no_std]
#![deny(missing_docs)] // refuse to compile if documentation is missing

extern crate alloc;

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

mod field;

pub mod context;
pub mod dleq;
pub mod edwards;
pub mod errors;
pub mod group;
pub mod keys;
pub mod pvss;

pub use crate::context::{proof_context, ProofContext, ProofTranscript};
pub use crate::dleq::{BatchVerification, DLEQProof};
pub use crate::edwards::{EdwardsPoint, EdwardsSuite, Param, Scalar};
pub use crate::errors::{CryptoError, CryptoResult};
pub use crate::group::{CompressedPoint, EncodedScalar, GroupPoint, GroupScalar, Suite};
pub use crate::keys::Keypair;
pub use crate::pvss::{DecryptedShare, PVSSError, PVSSResult, SplitShares, PVSS};
