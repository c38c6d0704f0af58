// -*- mode: rust; -*-
//
// This file is part of randhound.
// See LICENSE for licensing information.

//! Twisted Edwards curves `a x^2 + y^2 = 1 + d x^2 y^2` over a prime field.
//!
//! A curve is described by a [`Param`] set.  [`EdwardsSuite`] binds one
//! parameter set, precomputes the derived constants once, and hands out
//! [`Scalar`]s and [`EdwardsPoint`]s which share those constants.
//!
//! A suite works either on the prime order subgroup, the default, or on
//! the full group including the cofactor part.  Decoding, point picking
//! and hidden decoding all respect this choice.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};
use tracing::debug;

use crate::errors::{CryptoError, CryptoResult};
use crate::field::{to_le_bytes, PrimeField};
use crate::group::Suite;

/// Derive the owned and mixed variants of a binary operator from the
/// `&LHS op &RHS` implementation.
macro_rules! define_binop_variants {
    (impl $trait:ident, $method:ident for $lhs:ty, $rhs:ty => $out:ty) => {
        impl<'b> core::ops::$trait<&'b $rhs> for $lhs {
            type Output = $out;
            fn $method(self, rhs: &'b $rhs) -> $out {
                core::ops::$trait::$method(&self, rhs)
            }
        }

        impl<'a> core::ops::$trait<$rhs> for &'a $lhs {
            type Output = $out;
            fn $method(self, rhs: $rhs) -> $out {
                core::ops::$trait::$method(self, &rhs)
            }
        }

        impl core::ops::$trait<$rhs> for $lhs {
            type Output = $out;
            fn $method(self, rhs: $rhs) -> $out {
                core::ops::$trait::$method(&self, &rhs)
            }
        }
    };
}

mod elligator;
mod point;
mod scalar;

pub use self::point::EdwardsPoint;
pub use self::scalar::Scalar;

use self::elligator::Elligator2;

/// Maximum number of candidates `pick_point` tries before giving up.
///
/// Roughly half of all candidates decode for any curve, so exhausting
/// this bound indicates a broken stream rather than bad luck.
pub const MAX_PICK_ATTEMPTS: usize = 1024;

/// Parameters defining a twisted Edwards curve and its standard base point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    /// Human readable name, also used for domain separation.
    pub name: &'static str,
    /// Prime modulus of the underlying field.
    pub p: BigUint,
    /// Prime order of the main subgroup.
    pub q: BigUint,
    /// Cofactor, so that the full group has order `cofactor * q`.
    pub cofactor: BigUint,
    /// Edwards `a`, reduced modulo `p`.
    pub a: BigUint,
    /// Edwards `d`, reduced modulo `p`.
    pub d: BigUint,
    /// Affine x coordinate of the standard base point.
    pub base_x: BigUint,
    /// Affine y coordinate of the standard base point.
    pub base_y: BigUint,
    /// Quadratic non-residue used by Elligator 2, if hidden encoding is
    /// supported on this curve.
    pub elligator_u: Option<BigUint>,
}

impl Param {
    /// Ed25519, birationally equivalent to Curve25519.
    pub fn ed25519() -> Param {
        let p = (BigUint::one() << 255usize) - BigUint::from(19u32);
        let q = (BigUint::one() << 252usize) + BigUint::from(27742317777372353535851937790883648493u128);
        let f = PrimeField::new(p.clone());
        let a = f.from_i64(-1);
        let d = f.div(&f.from_i64(-121665), &f.from_i64(121666));
        let base_y = f.div(&f.from_i64(4), &f.from_i64(5));
        // The base point is the one with y = 4/5 and even x.
        let base_x = point::recover_x(&f, &a, &d, &base_y, false).unwrap_or_default();
        Param {
            name: "Ed25519",
            p,
            q,
            cofactor: BigUint::from(8u32),
            a,
            d,
            base_x,
            base_y,
            elligator_u: Some(BigUint::from(2u32)),
        }
    }
}

/// Constants shared by every scalar and point of one suite.
pub(crate) struct Curve {
    pub(crate) name: &'static str,
    pub(crate) full_group: bool,
    pub(crate) field: PrimeField,
    pub(crate) scalars: PrimeField,
    pub(crate) a: BigUint,
    pub(crate) d: BigUint,
    pub(crate) cofactor: BigUint,
    pub(crate) base_x: BigUint,
    pub(crate) base_y: BigUint,
    pub(crate) elligator: Option<Elligator2>,
}

impl Curve {
    /// Length of an encoded point: the y coordinate plus one sign bit.
    pub(crate) fn point_len(&self) -> usize {
        (self.field.bits() + 7 + 1) / 8
    }

    pub(crate) fn scalar_len(&self) -> usize {
        self.scalars.byte_len()
    }

    /// Bytes of caller data one picked point can carry.  One byte holds
    /// the length and at least one more byte stays random.
    pub(crate) fn pick_len(&self) -> usize {
        self.field.bits().saturating_sub(8 + 8) / 8
    }

    /// Whether `a x^2 + y^2 = 1 + d x^2 y^2` holds for affine `(x, y)`.
    pub(crate) fn on_curve(&self, x: &BigUint, y: &BigUint) -> bool {
        let f = &self.field;
        let xx = f.square(x);
        let yy = f.square(y);
        let lhs = f.add(&f.mul(&self.a, &xx), &yy);
        let rhs = f.add(&f.one(), &f.mul(&self.d, &f.mul(&xx, &yy)));
        lhs == rhs
    }

    /// Whether two handles name the same parameter set.
    pub(crate) fn same(a: &Arc<Curve>, b: &Arc<Curve>) -> bool {
        Arc::ptr_eq(a, b)
            || (a.name == b.name
                && a.full_group == b.full_group
                && a.field.modulus() == b.field.modulus()
                && a.d == b.d)
    }
}

/// Panic unless both operands come from the same suite.
pub(crate) fn assert_same_curve(a: &Arc<Curve>, b: &Arc<Curve>) {
    if !Curve::same(a, b) {
        panic!("operands belong to different suites: {} and {}", a.name, b.name);
    }
}

/// A twisted Edwards group suite.
#[derive(Clone)]
pub struct EdwardsSuite {
    pub(crate) curve: Arc<Curve>,
}

impl fmt::Debug for EdwardsSuite {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EdwardsSuite")
            .field("name", &self.curve.name)
            .field("full_group", &self.curve.full_group)
            .finish()
    }
}

impl EdwardsSuite {
    /// Bind a parameter set, validating it.
    ///
    /// With `full_group` set the suite works on the whole curve group,
    /// otherwise on the prime order subgroup generated by the base point.
    pub fn new(param: Param, full_group: bool) -> CryptoResult<EdwardsSuite> {
        let field = PrimeField::new(param.p.clone());
        let scalars = PrimeField::new(param.q.clone());
        if !field.is_canonical(&param.a)
            || !field.is_canonical(&param.d)
            || param.a.is_zero()
            || param.d.is_zero()
            || param.a == param.d
        {
            return Err(CryptoError::InvalidPoint);
        }
        let elligator = match &param.elligator_u {
            Some(u) => Some(Elligator2::new(&field, &param.a, &param.d, u).ok_or(CryptoError::InvalidPoint)?),
            None => None,
        };
        let curve = Curve {
            name: param.name,
            full_group,
            field,
            scalars,
            a: param.a,
            d: param.d,
            cofactor: param.cofactor,
            base_x: param.base_x,
            base_y: param.base_y,
            elligator,
        };
        if !curve.on_curve(&curve.base_x, &curve.base_y) {
            return Err(CryptoError::InvalidPoint);
        }
        let suite = EdwardsSuite { curve: Arc::new(curve) };
        let base = suite.base();
        if base.is_identity_point() || !base.in_prime_subgroup() {
            return Err(CryptoError::InvalidPoint);
        }
        debug!(suite = suite.curve.name, full_group, "edwards suite ready");
        Ok(suite)
    }

    /// Ed25519 restricted to its prime order subgroup.
    pub fn ed25519() -> EdwardsSuite {
        Self::new(Param::ed25519(), false)
            .expect("The built-in Ed25519 parameters are well formed")
    }

    /// Ed25519 including the eight torsion points.
    pub fn ed25519_full_group() -> EdwardsSuite {
        Self::new(Param::ed25519(), true)
            .expect("The built-in Ed25519 parameters are well formed")
    }

    /// Whether this suite works on the full group.
    pub fn full_group(&self) -> bool {
        self.curve.full_group
    }

    /// Order of the prime subgroup.
    pub fn order(&self) -> &BigUint {
        self.curve.scalars.modulus()
    }

    /// Bytes of caller data one picked point can carry.
    pub fn pick_len(&self) -> usize {
        self.curve.pick_len()
    }

    /// Length of a hidden encoding, or `None` if the curve has no
    /// Elligator 2 parameters.
    pub fn hide_len(&self) -> Option<usize> {
        self.curve.elligator.as_ref().map(|_| self.curve.field.byte_len())
    }

    /// Decode a hidden encoding produced by `EdwardsPoint::hide_encode`.
    pub fn hide_decode(&self, bytes: &[u8]) -> CryptoResult<EdwardsPoint> {
        let point = elligator::hide_decode(&self.curve, bytes)?;
        if !self.curve.full_group && !point.in_prime_subgroup() {
            return Err(CryptoError::InvalidPoint);
        }
        Ok(point)
    }
}

impl Suite for EdwardsSuite {
    type Scalar = Scalar;
    type Point = EdwardsPoint;

    fn name(&self) -> &'static str {
        self.curve.name
    }

    fn point_len(&self) -> usize {
        self.curve.point_len()
    }

    fn scalar_len(&self) -> usize {
        self.curve.scalar_len()
    }

    fn scalar_from_u64(&self, v: u64) -> Scalar {
        Scalar::from_biguint(&self.curve, &BigUint::from(v))
    }

    fn scalar_from_bytes(&self, bytes: &[u8]) -> CryptoResult<Scalar> {
        if bytes.len() != self.scalar_len() {
            return Err(CryptoError::MalformedEncoding { name: "Scalar", length: self.scalar_len() });
        }
        let v = BigUint::from_bytes_le(bytes);
        if !self.curve.scalars.is_canonical(&v) {
            return Err(CryptoError::InvalidScalar);
        }
        Ok(Scalar::from_canonical(&self.curve, v))
    }

    fn scalar_from_uniform_bytes(&self, bytes: &[u8]) -> Scalar {
        Scalar::from_biguint(&self.curve, &BigUint::from_bytes_le(bytes))
    }

    fn identity(&self) -> EdwardsPoint {
        EdwardsPoint::identity(&self.curve)
    }

    fn base(&self) -> EdwardsPoint {
        EdwardsPoint::from_affine(&self.curve, self.curve.base_x.clone(), self.curve.base_y.clone())
    }

    fn point_from_bytes(&self, bytes: &[u8]) -> CryptoResult<EdwardsPoint> {
        EdwardsPoint::from_bytes(&self.curve, bytes)
    }

    fn pick_point<'d, R: RngCore + CryptoRng>(
        &self,
        data: Option<&'d [u8]>,
        rng: &mut R,
    ) -> CryptoResult<(EdwardsPoint, &'d [u8])> {
        EdwardsPoint::pick(&self.curve, data, rng)
    }
}

/// Fixed width encoding of a field element for debug output.
pub(crate) fn fmt_hex(f: &mut fmt::Formatter, v: &BigUint, len: usize) -> fmt::Result {
    let bytes: Vec<u8> = to_le_bytes(v, len);
    for b in bytes.iter() {
        write!(f, "{:02x}", b)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupScalar;

    #[test]
    fn ed25519_constants() {
        let suite = EdwardsSuite::ed25519();
        assert_eq!(suite.name(), "Ed25519");
        assert_eq!(suite.point_len(), 32);
        assert_eq!(suite.scalar_len(), 32);
        assert_eq!(suite.pick_len(), 29);
        assert_eq!(suite.hide_len(), Some(32));
        let expected_x = BigUint::parse_bytes(
            b"15112221349535400772501151409588531511454012693041857206046113283949847762202",
            10,
        ).unwrap();
        assert_eq!(Param::ed25519().base_x, expected_x);
        assert!(!suite.full_group());
        assert!(EdwardsSuite::ed25519_full_group().full_group());
    }

    #[test]
    fn malformed_parameters_are_rejected() {
        let mut param = Param::ed25519();
        param.base_y = param.base_y + BigUint::one();
        assert_eq!(EdwardsSuite::new(param, false).unwrap_err(), CryptoError::InvalidPoint);

        let mut param = Param::ed25519();
        // 4 is a square, so it cannot drive Elligator 2.
        param.elligator_u = Some(BigUint::from(4u32));
        assert!(EdwardsSuite::new(param, false).is_err());
    }

    #[test]
    fn scalar_decoding_checks_length_and_range() {
        let suite = EdwardsSuite::ed25519();
        assert_eq!(
            suite.scalar_from_bytes(&[0u8; 31]),
            Err(CryptoError::MalformedEncoding { name: "Scalar", length: 32 })
        );
        let q = to_le_bytes(suite.order(), 32);
        assert_eq!(suite.scalar_from_bytes(&q), Err(CryptoError::InvalidScalar));
        let seven = suite.scalar_from_u64(7);
        assert_eq!(suite.scalar_from_bytes(&seven.to_bytes()).unwrap(), seven);
        // Wide reduction wraps the order to zero.
        assert!(suite.scalar_from_uniform_bytes(&q).is_zero());
    }

    #[test]
    fn separately_built_suites_interoperate() {
        let s1 = EdwardsSuite::ed25519();
        let s2 = EdwardsSuite::ed25519();
        let p = s1.base() + &s2.base();
        assert_eq!(p, s1.base() * &s2.scalar_from_u64(2));
    }

    #[test]
    #[should_panic(expected = "different suites")]
    fn mixing_suites_panics() {
        let sub = EdwardsSuite::ed25519();
        let full = EdwardsSuite::ed25519_full_group();
        let _ = sub.base() + &full.base();
    }
}
