// -*- mode: rust; -*-
//
// This file is part of randhound.
// See LICENSE for licensing information.

//! Elligator 2 over the Montgomery form `B v^2 = u^3 + A u^2 + u`
//! birationally equivalent to the Edwards curve.
//!
//! Roughly half of all points have a representative `r`, a field element
//! in the lower half, so encoded points look like uniform strings once
//! the unused top bits are filled with randomness.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use num_bigint::BigUint;
use num_traits::Zero;
use rand_core::{CryptoRng, RngCore};

use super::{Curve, EdwardsPoint};
use crate::errors::{CryptoError, CryptoResult};
use crate::field::{to_le_bytes, PrimeField};

/// Montgomery constants derived from the Edwards `a` and `d`.
pub(crate) struct Elligator2 {
    /// Fixed quadratic non-residue.
    n: BigUint,
    /// Montgomery `A = 2 (a + d) / (a - d)`.
    mont_a: BigUint,
    /// Square root of Montgomery `B = 4 / (a - d)`.
    sqrt_b: BigUint,
}

impl Elligator2 {
    /// `None` unless `n` is a non-residue and `B` is a square.
    pub(crate) fn new(f: &PrimeField, a: &BigUint, d: &BigUint, n: &BigUint) -> Option<Elligator2> {
        let n = f.reduce(n);
        if f.is_square(&n) {
            return None;
        }
        let a_minus_d = f.sub(a, d);
        let two = f.from_i64(2);
        let mont_a = f.div(&f.mul(&two, &f.add(a, d)), &a_minus_d);
        let mont_b = f.div(&f.from_i64(4), &a_minus_d);
        let sqrt_b = f.sqrt(&mont_b)?;
        Some(Elligator2 { n, mont_a, sqrt_b })
    }

    /// `u^3 + A u^2 + u`
    fn curve_rhs(&self, f: &PrimeField, u: &BigUint) -> BigUint {
        let uu = f.square(u);
        let t = f.add(&f.mul(&uu, u), &f.mul(&self.mont_a, &uu));
        f.add(&t, u)
    }
}

fn elligator_of(curve: &Curve) -> CryptoResult<&Elligator2> {
    curve.elligator.as_ref().ok_or(CryptoError::InvalidPoint)
}

/// Representative of `point`, with the bits above it randomized.
pub(crate) fn hide_encode<R: RngCore + CryptoRng>(point: &EdwardsPoint, rng: &mut R) -> Option<Vec<u8>> {
    let curve = &point.curve;
    let e = curve.elligator.as_ref()?;
    let f = &curve.field;
    let (x, y) = point.affine();
    // The identity and (0, -1) map to the Montgomery points at infinity
    // and (0, 0), neither of which has a representative.
    if x.is_zero() {
        return None;
    }

    let one = f.one();
    let u = f.div(&f.add(&one, &y), &f.sub(&one, &y));
    let v = f.mul(&e.sqrt_b, &f.div(&u, &x));

    let u_plus_a = f.add(&u, &e.mont_a);
    if u_plus_a.is_zero() {
        return None;
    }
    // Representable iff -n u (u + A) is a square.
    let t = f.neg(&f.mul(&e.n, &f.mul(&u, &u_plus_a)));
    if !f.is_square(&t) {
        return None;
    }

    let r2 = if f.is_negative(&v) {
        f.div(&f.neg(&u_plus_a), &f.mul(&e.n, &u))
    } else {
        f.div(&f.neg(&u), &f.mul(&e.n, &u_plus_a))
    };
    let r = f.abs(&f.sqrt(&r2)?);

    let len = f.byte_len();
    let mut bytes = to_le_bytes(&r, len);
    let mut pad = vec![0u8; len];
    rng.fill_bytes(&mut pad);
    for i in (f.bits() - 1)..(8 * len) {
        bytes[i / 8] |= pad[i / 8] & (1 << (i % 8));
    }
    Some(bytes)
}

/// Map a hidden encoding back to its point.  Every string of the right
/// length maps to some point.
pub(crate) fn hide_decode(curve: &Arc<Curve>, bytes: &[u8]) -> CryptoResult<EdwardsPoint> {
    let e = elligator_of(curve)?;
    let f = &curve.field;
    let len = f.byte_len();
    if bytes.len() != len {
        return Err(CryptoError::MalformedEncoding { name: "Hidden point", length: len });
    }

    let mut b = bytes.to_vec();
    for i in (f.bits() - 1)..(8 * len) {
        b[i / 8] &= !(1 << (i % 8));
    }
    let r = BigUint::from_bytes_le(&b);

    let one = f.one();
    let neg_a = f.neg(&e.mont_a);
    // x1 = -A / (1 + n r^2), with x1 = -A when the denominator vanishes
    let den = f.add(&one, &f.mul(&e.n, &f.square(&r)));
    let mut u = if den.is_zero() { f.zero() } else { f.div(&neg_a, &den) };
    if u.is_zero() {
        u = neg_a.clone();
    }

    let gu = e.curve_rhs(f, &u);
    let v = if f.is_square(&gu) {
        let root = f.sqrt(&gu).ok_or(CryptoError::InvalidPoint)?;
        f.neg(&f.abs(&root))
    } else {
        u = f.sub(&neg_a, &u);
        let root = f.sqrt(&e.curve_rhs(f, &u)).ok_or(CryptoError::InvalidPoint)?;
        f.abs(&root)
    };

    let u_plus_one = f.add(&u, &one);
    if v.is_zero() || u_plus_one.is_zero() {
        return Err(CryptoError::InvalidPoint);
    }
    let x = f.mul(&e.sqrt_b, &f.div(&u, &v));
    let y = f.div(&f.sub(&u, &one), &u_plus_one);
    if !curve.on_curve(&x, &y) {
        return Err(CryptoError::InvalidPoint);
    }
    Ok(EdwardsPoint::from_affine(curve, x, y))
}
