// -*- mode: rust; -*-
//
// This file is part of randhound.
// See LICENSE for licensing information.

//! Points in projective coordinates `(X : Y : Z)`, standing for the affine
//! point `(X/Z, Y/Z)`.
//!
//! The addition law is the unified one for twisted Edwards curves, so the
//! same formula handles doubling, the identity and negatives.  Affine
//! coordinates, and with them a field inversion, are only needed for
//! encoding.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigUint;
use num_traits::Zero;
use rand_core::{CryptoRng, RngCore};
use tracing::{trace, warn};

use super::{assert_same_curve, elligator, Curve, Scalar, MAX_PICK_ATTEMPTS};
use crate::errors::{CryptoError, CryptoResult};
use crate::field::{to_le_bytes, PrimeField};
use crate::group::GroupPoint;

/// Solve the curve equation for x given y, choosing the root whose low
/// bit matches `odd`.
pub(crate) fn recover_x(f: &PrimeField, a: &BigUint, d: &BigUint, y: &BigUint, odd: bool) -> Option<BigUint> {
    // x^2 = (y^2 - 1) / (d y^2 - a)
    let yy = f.square(y);
    let num = f.sub(&yy, &f.one());
    let den = f.sub(&f.mul(d, &yy), a);
    if den.is_zero() {
        return None;
    }
    let x = f.sqrt(&f.div(&num, &den))?;
    if x.is_zero() {
        // Zero has no negative, so a set sign bit is not canonical.
        return if odd { None } else { Some(x) };
    }
    Some(if f.is_odd(&x) == odd { x } else { f.neg(&x) })
}

/// A point of an Edwards suite.
#[derive(Clone)]
pub struct EdwardsPoint {
    x: BigUint,
    y: BigUint,
    z: BigUint,
    pub(crate) curve: Arc<Curve>,
}

impl EdwardsPoint {
    pub(crate) fn identity(curve: &Arc<Curve>) -> EdwardsPoint {
        let f = &curve.field;
        EdwardsPoint { x: f.zero(), y: f.one(), z: f.one(), curve: curve.clone() }
    }

    pub(crate) fn from_affine(curve: &Arc<Curve>, x: BigUint, y: BigUint) -> EdwardsPoint {
        debug_assert!(curve.on_curve(&x, &y));
        EdwardsPoint { x, y, z: curve.field.one(), curve: curve.clone() }
    }

    /// Affine coordinates `(x, y)`.
    pub(crate) fn affine(&self) -> (BigUint, BigUint) {
        let f = &self.curve.field;
        let zinv = f.invert(&self.z);
        (f.mul(&self.x, &zinv), f.mul(&self.y, &zinv))
    }

    /// The same point with `Z = 1`.
    pub fn normalize(&self) -> EdwardsPoint {
        let (x, y) = self.affine();
        EdwardsPoint { x, y, z: self.curve.field.one(), curve: self.curve.clone() }
    }

    pub(crate) fn is_identity_point(&self) -> bool {
        let f = &self.curve.field;
        self.x.is_zero() && f.ct_eq(&self.y, &self.z)
    }

    fn add_point(&self, other: &EdwardsPoint) -> EdwardsPoint {
        let f = &self.curve.field;
        let a = f.mul(&self.z, &other.z);
        let b = f.square(&a);
        let c = f.mul(&self.x, &other.x);
        let d = f.mul(&self.y, &other.y);
        let e = f.mul(&self.curve.d, &f.mul(&c, &d));
        let ff = f.sub(&b, &e);
        let g = f.add(&b, &e);
        let xy = f.mul(&f.add(&self.x, &self.y), &f.add(&other.x, &other.y));
        let x3 = f.mul(&f.mul(&a, &ff), &f.sub(&f.sub(&xy, &c), &d));
        let y3 = f.mul(&f.mul(&a, &g), &f.sub(&d, &f.mul(&self.curve.a, &c)));
        let z3 = f.mul(&ff, &g);
        EdwardsPoint { x: x3, y: y3, z: z3, curve: self.curve.clone() }
    }

    fn double(&self) -> EdwardsPoint {
        let f = &self.curve.field;
        let b = f.square(&f.add(&self.x, &self.y));
        let c = f.square(&self.x);
        let d = f.square(&self.y);
        let e = f.mul(&self.curve.a, &c);
        let ff = f.add(&e, &d);
        let h = f.square(&self.z);
        let j = f.sub(&ff, &f.add(&h, &h));
        let x3 = f.mul(&f.sub(&f.sub(&b, &c), &d), &j);
        let y3 = f.mul(&ff, &f.sub(&e, &d));
        let z3 = f.mul(&ff, &j);
        EdwardsPoint { x: x3, y: y3, z: z3, curve: self.curve.clone() }
    }

    /// Left to right double and add over a little-endian multiplier.
    fn mul_le_bytes(&self, k: &[u8]) -> EdwardsPoint {
        let mut acc = EdwardsPoint::identity(&self.curve);
        for byte in k.iter().rev() {
            for i in (0..8).rev() {
                acc = acc.double();
                if (byte >> i) & 1 == 1 {
                    acc = acc.add_point(self);
                }
            }
        }
        acc
    }

    /// Multiply by the cofactor, mapping any point into the prime subgroup.
    pub fn mul_by_cofactor(&self) -> EdwardsPoint {
        self.mul_le_bytes(&self.curve.cofactor.to_bytes_le())
    }

    /// Whether the point lies in the prime order subgroup.
    pub fn in_prime_subgroup(&self) -> bool {
        self.mul_le_bytes(&self.curve.scalars.modulus().to_bytes_le()).is_identity_point()
    }

    /// Decode without the subgroup check.
    fn decode_candidate(curve: &Arc<Curve>, bytes: &[u8]) -> Option<EdwardsPoint> {
        let f = &curve.field;
        let len = curve.point_len();
        if bytes.len() != len {
            return None;
        }
        let mut b = bytes.to_vec();
        let odd = b[len - 1] & 0x80 != 0;
        b[len - 1] &= 0x7f;
        let y = BigUint::from_bytes_le(&b);
        if !f.is_canonical(&y) {
            return None;
        }
        let x = recover_x(f, &curve.a, &curve.d, &y, odd)?;
        Some(EdwardsPoint::from_affine(curve, x, y))
    }

    pub(crate) fn from_bytes(curve: &Arc<Curve>, bytes: &[u8]) -> CryptoResult<EdwardsPoint> {
        if bytes.len() != curve.point_len() {
            return Err(CryptoError::MalformedEncoding { name: "EdwardsPoint", length: curve.point_len() });
        }
        let p = EdwardsPoint::decode_candidate(curve, bytes).ok_or(CryptoError::InvalidPoint)?;
        if !curve.full_group && !p.in_prime_subgroup() {
            return Err(CryptoError::InvalidPoint);
        }
        Ok(p)
    }

    /// Rejection sample candidate encodings until one decodes to a usable
    /// point.  Embedded data occupies bytes `1..` with its length in byte 0.
    pub(crate) fn pick<'d, R>(curve: &Arc<Curve>, data: Option<&'d [u8]>, rng: &mut R) -> CryptoResult<(EdwardsPoint, &'d [u8])>
    where
        R: RngCore + CryptoRng,
    {
        let dl = match data {
            Some(d) => d.len().min(curve.pick_len()).min(u8::MAX as usize),
            None => 0,
        };
        let mut b = vec![0u8; curve.point_len()];
        for attempt in 0..MAX_PICK_ATTEMPTS {
            rng.fill_bytes(&mut b);
            if let Some(d) = data {
                b[0] = dl as u8;
                b[1..1 + dl].copy_from_slice(&d[..dl]);
            }
            let p = match EdwardsPoint::decode_candidate(curve, &b) {
                Some(p) => p,
                None => {
                    trace!(attempt, "candidate does not decode");
                    continue;
                }
            };
            let rest: &'d [u8] = match data {
                Some(d) => &d[dl..],
                None => &[],
            };
            if curve.full_group {
                return Ok((p, rest));
            }
            if data.is_none() {
                let p = p.mul_by_cofactor();
                if p.is_identity_point() {
                    trace!(attempt, "candidate has small order");
                    continue;
                }
                return Ok((p, rest));
            }
            if p.in_prime_subgroup() {
                return Ok((p, rest));
            }
            trace!(attempt, "candidate lies outside the prime subgroup");
        }
        warn!(suite = curve.name, attempts = MAX_PICK_ATTEMPTS, "point derivation exhausted");
        Err(CryptoError::PointDerivationFailed { attempts: MAX_PICK_ATTEMPTS })
    }

    /// Encode as bytes indistinguishable from uniform, or `None` if this
    /// point has no such encoding.  About half of all points do; callers
    /// pick a fresh point and retry.
    ///
    /// Only available on suites with Elligator 2 parameters.
    pub fn hide_encode<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Option<Vec<u8>> {
        elligator::hide_encode(self, rng)
    }
}

impl GroupPoint for EdwardsPoint {
    type Scalar = Scalar;

    fn is_identity(&self) -> bool {
        self.is_identity_point()
    }

    fn to_bytes(&self) -> Vec<u8> {
        let f = &self.curve.field;
        let len = self.curve.point_len();
        let (x, y) = self.affine();
        let mut b = to_le_bytes(&y, len);
        if f.is_odd(&x) {
            b[len - 1] |= 0x80;
        }
        b
    }

    fn data(&self) -> CryptoResult<Vec<u8>> {
        let b = self.to_bytes();
        let dl = b[0] as usize;
        let max = self.curve.pick_len();
        if dl > max {
            return Err(CryptoError::MalformedEncoding { name: "Embedded data", length: max });
        }
        Ok(b[1..1 + dl].to_vec())
    }
}

impl PartialEq for EdwardsPoint {
    fn eq(&self, other: &EdwardsPoint) -> bool {
        assert_same_curve(&self.curve, &other.curve);
        let f = &self.curve.field;
        // X1/Z1 = X2/Z2 and Y1/Z1 = Y2/Z2
        let x = f.ct_eq(&f.mul(&self.x, &other.z), &f.mul(&other.x, &self.z));
        let y = f.ct_eq(&f.mul(&self.y, &other.z), &f.mul(&other.y, &self.z));
        x & y
    }
}

impl Eq for EdwardsPoint {}

impl fmt::Debug for EdwardsPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EdwardsPoint(")?;
        for b in self.to_bytes() {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

impl<'a, 'b> Add<&'b EdwardsPoint> for &'a EdwardsPoint {
    type Output = EdwardsPoint;
    fn add(self, rhs: &'b EdwardsPoint) -> EdwardsPoint {
        assert_same_curve(&self.curve, &rhs.curve);
        self.add_point(rhs)
    }
}

impl<'a, 'b> Sub<&'b EdwardsPoint> for &'a EdwardsPoint {
    type Output = EdwardsPoint;
    fn sub(self, rhs: &'b EdwardsPoint) -> EdwardsPoint {
        assert_same_curve(&self.curve, &rhs.curve);
        self.add_point(&-rhs)
    }
}

impl<'a, 'b> Mul<&'b Scalar> for &'a EdwardsPoint {
    type Output = EdwardsPoint;
    fn mul(self, rhs: &'b Scalar) -> EdwardsPoint {
        assert_same_curve(&self.curve, &rhs.curve);
        self.mul_le_bytes(&rhs.value.to_bytes_le())
    }
}

define_binop_variants!(impl Add, add for EdwardsPoint, EdwardsPoint => EdwardsPoint);
define_binop_variants!(impl Sub, sub for EdwardsPoint, EdwardsPoint => EdwardsPoint);
define_binop_variants!(impl Mul, mul for EdwardsPoint, Scalar => EdwardsPoint);

impl<'a> Neg for &'a EdwardsPoint {
    type Output = EdwardsPoint;
    fn neg(self) -> EdwardsPoint {
        EdwardsPoint {
            x: self.curve.field.neg(&self.x),
            y: self.y.clone(),
            z: self.z.clone(),
            curve: self.curve.clone(),
        }
    }
}

impl Neg for EdwardsPoint {
    type Output = EdwardsPoint;
    fn neg(self) -> EdwardsPoint {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edwards::EdwardsSuite;
    use crate::group::{GroupScalar, Suite};
    use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
    use curve25519_dalek::scalar::Scalar as DalekScalar;
    use hex_literal::hex;
    use rand::{thread_rng, Rng};

    /// A stream that only ever yields `0xff`.
    struct Saturated;

    impl RngCore for Saturated {
        fn next_u32(&mut self) -> u32 {
            u32::MAX
        }
        fn next_u64(&mut self) -> u64 {
            u64::MAX
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.iter_mut().for_each(|b| *b = 0xff);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for Saturated {}

    #[test]
    fn group_laws() {
        let suite = EdwardsSuite::ed25519();
        let mut rng = thread_rng();
        let g = suite.base();
        let o = suite.identity();
        let a = suite.random_scalar(&mut rng);
        let b = suite.random_scalar(&mut rng);
        let ag = g.clone() * &a;
        let bg = g.clone() * &b;

        assert!(o.is_identity());
        assert_eq!(ag.clone() + &o, ag);
        assert_eq!(ag.clone() - &ag, o);
        assert_eq!(ag.clone() + &(-&ag), o);
        assert_eq!(g.clone() + &g, g.double());
        assert_eq!(ag.clone() + &bg, g.clone() * &(a.clone() + &b));
        assert_eq!(ag.clone() * &b, bg * &a);
        assert_eq!(g.normalize(), g);
        assert!((g.clone() * &suite.scalar_from_u64(0)).is_identity());
        assert!(g.in_prime_subgroup());
    }

    #[test]
    fn scalar_multiplication_distributes_over_addition() {
        let suite = EdwardsSuite::ed25519();
        let mut rng = thread_rng();
        let p = suite.pick_point(Some(&b"P"[..]), &mut rng).unwrap().0;
        let q = suite.pick_point(Some(&b"Q"[..]), &mut rng).unwrap().0;
        let a = suite.random_scalar(&mut rng);
        assert_eq!((p.clone() + &q) * &a, p.clone() * &a + &(q.clone() * &a));
        assert_eq!((p.clone() - &q) * &a, p * &a - &(q * &a));
    }

    #[test]
    fn corrupted_encodings_never_decode_to_the_same_point() {
        let full = EdwardsSuite::ed25519_full_group();
        let mut rng = thread_rng();
        for _ in 0..8 {
            let p = full.base() * &full.random_scalar(&mut rng);
            let bytes = p.to_bytes();
            for i in 0..bytes.len() {
                let mut corrupted = bytes.clone();
                corrupted[i] ^= rng.gen_range(1..=255u8);
                if let Ok(q) = full.point_from_bytes(&corrupted) {
                    assert_ne!(q, p);
                }
            }
        }
    }

    #[test]
    fn agrees_with_curve25519_dalek() {
        let suite = EdwardsSuite::ed25519();
        let mut rng = thread_rng();
        for k in [1u64, 2, 3, 8, 255, 1 << 40] {
            let ours = suite.base() * &suite.scalar_from_u64(k);
            let theirs = ED25519_BASEPOINT_POINT * DalekScalar::from(k);
            assert_eq!(ours.to_bytes(), theirs.compress().to_bytes().to_vec());
        }
        let s = suite.random_scalar(&mut rng);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&s.to_bytes());
        let theirs = (ED25519_BASEPOINT_POINT * DalekScalar::from_bytes_mod_order(bytes)).compress();
        let ours = suite.point_from_bytes(theirs.as_bytes()).unwrap();
        assert_eq!(ours, suite.base() * &s);
        assert_eq!(suite.identity().to_bytes(), curve25519_dalek::EdwardsPoint::default().compress().to_bytes().to_vec());
    }

    #[test]
    fn base_point_encoding() {
        let suite = EdwardsSuite::ed25519();
        let b = hex!("5866666666666666666666666666666666666666666666666666666666666666");
        assert_eq!(suite.base().to_bytes(), b.to_vec());
        assert_eq!(suite.point_from_bytes(&b).unwrap(), suite.base());
        let one = hex!("0100000000000000000000000000000000000000000000000000000000000000");
        assert_eq!(suite.identity().to_bytes(), one.to_vec());
    }

    #[test]
    fn decoding_rejects_bad_encodings() {
        let suite = EdwardsSuite::ed25519();
        let full = EdwardsSuite::ed25519_full_group();

        assert_eq!(
            suite.point_from_bytes(&[0u8; 31]),
            Err(CryptoError::MalformedEncoding { name: "EdwardsPoint", length: 32 })
        );

        // y = p is out of range.
        let p = to_le_bytes(suite.curve.field.modulus(), 32);
        assert_eq!(full.point_from_bytes(&p), Err(CryptoError::InvalidPoint));

        // x = 0 with the sign bit set.
        let mut neg_zero = [0u8; 32];
        neg_zero[0] = 1;
        neg_zero[31] = 0x80;
        assert_eq!(full.point_from_bytes(&neg_zero), Err(CryptoError::InvalidPoint));

        // (0, -1) has order two: a full group point only.
        let minus_one = to_le_bytes(&(suite.curve.field.modulus() - 1u32), 32);
        assert_eq!(suite.point_from_bytes(&minus_one), Err(CryptoError::InvalidPoint));
        let t = full.point_from_bytes(&minus_one).unwrap();
        assert!(!t.is_identity());
        assert!((t.clone() + &t).is_identity());

        // Some small y has no matching x.
        let off_curve = (2u8..40).any(|y| {
            let mut b = [0u8; 32];
            b[0] = y;
            full.point_from_bytes(&b) == Err(CryptoError::InvalidPoint)
        });
        assert!(off_curve);
    }

    #[test]
    fn pick_without_data() {
        let suite = EdwardsSuite::ed25519();
        let (p, rest) = suite.pick_point(None, &mut thread_rng()).unwrap();
        assert!(rest.is_empty());
        assert!(!p.is_identity());
        assert!(p.in_prime_subgroup());

        let (p1, _) = suite.pick_point(None, &mut suite.cipher(b"pick")).unwrap();
        let (p2, _) = suite.pick_point(None, &mut suite.cipher(b"pick")).unwrap();
        assert_eq!(p1, p2);
    }

    #[test]
    fn pick_embeds_data() {
        let suite = EdwardsSuite::ed25519();
        let mut rng = thread_rng();

        let (p, rest) = suite.pick_point(Some(&b"hello"[..]), &mut rng).unwrap();
        assert!(rest.is_empty());
        assert_eq!(p.data().unwrap(), b"hello".to_vec());
        assert!(p.in_prime_subgroup());
        let decoded = suite.point_from_bytes(&p.to_bytes()).unwrap();
        assert_eq!(decoded.data().unwrap(), b"hello".to_vec());

        let long = [7u8; 40];
        let full = EdwardsSuite::ed25519_full_group();
        let (p, rest) = full.pick_point(Some(&long[..]), &mut rng).unwrap();
        assert_eq!(rest.len(), 40 - full.pick_len());
        assert_eq!(p.data().unwrap(), long[..full.pick_len()].to_vec());
    }

    #[test]
    fn data_rejects_oversized_length_byte() {
        let suite = EdwardsSuite::ed25519();
        // The base point encoding starts with 0x58.
        assert_eq!(
            suite.base().data(),
            Err(CryptoError::MalformedEncoding { name: "Embedded data", length: 29 })
        );
    }

    #[test]
    fn pick_gives_up_on_a_degenerate_stream() {
        let suite = EdwardsSuite::ed25519();
        assert_eq!(
            suite.pick_point(None, &mut Saturated),
            Err(CryptoError::PointDerivationFailed { attempts: MAX_PICK_ATTEMPTS })
        );
    }
}
