// -*- mode: rust; -*-
//
// This file is part of randhound.
// See LICENSE for licensing information.

//! Arithmetic in the prime field GF(p) underlying a curve.
//!
//! Elements are plain `BigUint`s kept fully reduced into `[0, p)`.
//! The modulus and everything precomputed from it lives in one
//! `PrimeField`, which a curve binds once and shares with every point.

use alloc::vec::Vec;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use subtle::ConstantTimeEq;

/// Fixed width little-endian encoding of `v`, which must fit in `len` bytes.
pub(crate) fn to_le_bytes(v: &BigUint, len: usize) -> Vec<u8> {
    let mut bytes = v.to_bytes_le();
    debug_assert!(bytes.len() <= len || v.is_zero());
    bytes.resize(len, 0);
    bytes
}

/// Overwrite the limbs of `v` with zeros, leaving `v == 0`.
///
/// Clearing a bit rewrites its limb in place before the limb is trimmed,
/// so no digit of the old value stays in the buffer.  Copies made by
/// earlier arithmetic are out of reach.
pub(crate) fn wipe(v: &mut BigUint) {
    for i in 0..v.bits() {
        v.set_bit(i, false);
    }
}

/// How square roots are extracted for a given modulus.
#[derive(Clone, Debug)]
enum SqrtMethod {
    /// p = 3 mod 4: a root of u is u^((p+1)/4).
    ThreeModFour { exponent: BigUint },
    /// p = 5 mod 8: the candidate u^((p+3)/8) is fixed up by sqrt(-1).
    FiveModEight { exponent: BigUint, sqrt_m1: BigUint },
    /// Everything else: p - 1 = q 2^s with q odd, z a non-residue.
    TonelliShanks { q: BigUint, s: u32, z: BigUint },
}

/// The field of integers modulo an odd prime `p`.
#[derive(Clone, Debug)]
pub(crate) struct PrimeField {
    p: BigUint,
    bits: usize,
    p_minus_two: BigUint,
    half: BigUint,
    sqrt: SqrtMethod,
}

impl PrimeField {
    /// Bind the field constants for the odd prime `p`.
    pub(crate) fn new(p: BigUint) -> PrimeField {
        let one = BigUint::one();
        let two = BigUint::from(2u32);
        let bits = p.bits() as usize;
        let p_minus_one = &p - &one;
        let p_minus_two = &p - &two;
        let half = &p_minus_one / &two;

        let mut field = PrimeField {
            p: p.clone(),
            bits,
            p_minus_two,
            half,
            // Placeholder until the real method is known; `is_square`
            // below does not depend on it.
            sqrt: SqrtMethod::ThreeModFour { exponent: BigUint::zero() },
        };

        let low = p.to_bytes_le()[0];
        field.sqrt = if low & 3 == 3 {
            SqrtMethod::ThreeModFour { exponent: (&p + &one) / BigUint::from(4u32) }
        } else if low & 7 == 5 {
            let exponent = (&p + BigUint::from(3u32)) / BigUint::from(8u32);
            // 2 is a non-residue when p = 5 mod 8, so 2^((p-1)/4) squares to -1.
            let sqrt_m1 = two.modpow(&(&p_minus_one / BigUint::from(4u32)), &p);
            SqrtMethod::FiveModEight { exponent, sqrt_m1 }
        } else {
            let mut q = p_minus_one.clone();
            let mut s = 0u32;
            while !q.bit(0) {
                q = q / &two;
                s += 1;
            }
            let mut z = two.clone();
            while field.is_square(&z) {
                z += &one;
            }
            SqrtMethod::TonelliShanks { q, s, z }
        };
        field
    }

    /// The modulus `p`.
    pub(crate) fn modulus(&self) -> &BigUint {
        &self.p
    }

    /// Bit length of `p`.
    pub(crate) fn bits(&self) -> usize {
        self.bits
    }

    /// Bytes needed to hold any element.
    pub(crate) fn byte_len(&self) -> usize {
        (self.bits + 7) / 8
    }

    pub(crate) fn zero(&self) -> BigUint {
        BigUint::zero()
    }

    pub(crate) fn one(&self) -> BigUint {
        BigUint::one()
    }

    pub(crate) fn reduce(&self, v: &BigUint) -> BigUint {
        v % &self.p
    }

    /// Embed a signed integer, mapping negatives to `p - |v|`.
    pub(crate) fn from_i64(&self, v: i64) -> BigUint {
        let m = self.reduce(&BigUint::from(v.unsigned_abs()));
        if v < 0 { self.neg(&m) } else { m }
    }

    /// Whether `v` is a canonical element, i.e. below `p`.
    pub(crate) fn is_canonical(&self, v: &BigUint) -> bool {
        v < &self.p
    }

    pub(crate) fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        let s = a + b;
        if s >= self.p { s - &self.p } else { s }
    }

    pub(crate) fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        if a >= b { a - b } else { &self.p - b + a }
    }

    pub(crate) fn neg(&self, a: &BigUint) -> BigUint {
        if a.is_zero() { BigUint::zero() } else { &self.p - a }
    }

    pub(crate) fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.p
    }

    pub(crate) fn square(&self, a: &BigUint) -> BigUint {
        self.mul(a, a)
    }

    pub(crate) fn pow(&self, a: &BigUint, e: &BigUint) -> BigUint {
        a.modpow(e, &self.p)
    }

    /// Multiplicative inverse by Fermat's little theorem.  Zero maps to zero,
    /// so callers must rule out a zero denominator themselves.
    pub(crate) fn invert(&self, a: &BigUint) -> BigUint {
        self.pow(a, &self.p_minus_two)
    }

    pub(crate) fn div(&self, a: &BigUint, b: &BigUint) -> BigUint {
        self.mul(a, &self.invert(b))
    }

    /// Euler's criterion.  Zero counts as a square.
    pub(crate) fn is_square(&self, a: &BigUint) -> bool {
        if a.is_zero() {
            return true;
        }
        self.pow(a, &self.half).is_one()
    }

    /// Whether `a` lies in the upper half `((p-1)/2, p)`.
    pub(crate) fn is_negative(&self, a: &BigUint) -> bool {
        a > &self.half
    }

    /// The representative of `{a, -a}` in the lower half.
    pub(crate) fn abs(&self, a: &BigUint) -> BigUint {
        if self.is_negative(a) { self.neg(a) } else { a.clone() }
    }

    /// Low bit of the canonical value, used as the "sign" of x in encodings.
    pub(crate) fn is_odd(&self, a: &BigUint) -> bool {
        a.bit(0)
    }

    /// A square root of `a`, or `None` when `a` is a non-residue.
    /// The root returned is not normalized; use `abs` for that.
    pub(crate) fn sqrt(&self, a: &BigUint) -> Option<BigUint> {
        if a.is_zero() {
            return Some(BigUint::zero());
        }
        let root = match &self.sqrt {
            SqrtMethod::ThreeModFour { exponent } => self.pow(a, exponent),
            SqrtMethod::FiveModEight { exponent, sqrt_m1 } => {
                let candidate = self.pow(a, exponent);
                if self.square(&candidate) == *a {
                    candidate
                } else {
                    self.mul(&candidate, sqrt_m1)
                }
            }
            SqrtMethod::TonelliShanks { q, s, z } => {
                if !self.is_square(a) {
                    return None;
                }
                self.tonelli_shanks(a, q, *s, z)
            }
        };
        if self.square(&root) == *a { Some(root) } else { None }
    }

    fn tonelli_shanks(&self, a: &BigUint, q: &BigUint, s: u32, z: &BigUint) -> BigUint {
        let one = BigUint::one();
        let mut m = s;
        let mut c = self.pow(z, q);
        let mut t = self.pow(a, q);
        let mut r = self.pow(a, &((q + &one) / BigUint::from(2u32)));
        while !t.is_one() {
            // Least i with t^(2^i) = 1; always below m for a residue.
            let mut i = 0u32;
            let mut t2 = t.clone();
            while !t2.is_one() {
                t2 = self.square(&t2);
                i += 1;
            }
            let mut b = c.clone();
            for _ in 0..(m - i - 1) {
                b = self.square(&b);
            }
            m = i;
            c = self.square(&b);
            t = self.mul(&t, &c);
            r = self.mul(&r, &b);
        }
        r
    }

    /// Compare two reduced elements through their fixed width encodings.
    pub(crate) fn ct_eq(&self, a: &BigUint, b: &BigUint) -> bool {
        let len = self.byte_len();
        let a = to_le_bytes(a, len);
        let b = to_le_bytes(b, len);
        bool::from(a.as_slice().ct_eq(b.as_slice()))
    }

    /// Fixed width little-endian encoding of an element.
    pub(crate) fn to_bytes(&self, a: &BigUint) -> Vec<u8> {
        to_le_bytes(a, self.byte_len())
    }
}
