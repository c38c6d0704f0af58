// -*- mode: rust; -*-
//
// This file is part of randhound.
// See LICENSE for licensing information.

//! Integers modulo the prime subgroup order.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigUint;
use num_traits::Zero;
use zeroize::Zeroize;

use super::{assert_same_curve, fmt_hex, Curve};
use crate::field::wipe;
use crate::group::GroupScalar;

/// A scalar of an Edwards suite, always fully reduced.
#[derive(Clone)]
pub struct Scalar {
    pub(crate) value: BigUint,
    pub(crate) curve: Arc<Curve>,
}

impl Scalar {
    /// Reduce an arbitrary integer modulo the group order.
    pub(crate) fn from_biguint(curve: &Arc<Curve>, v: &BigUint) -> Scalar {
        Scalar { value: curve.scalars.reduce(v), curve: curve.clone() }
    }

    /// Wrap an integer already known to lie below the group order.
    pub(crate) fn from_canonical(curve: &Arc<Curve>, value: BigUint) -> Scalar {
        debug_assert!(curve.scalars.is_canonical(&value));
        Scalar { value, curve: curve.clone() }
    }

    fn with_value(&self, value: BigUint) -> Scalar {
        Scalar { value, curve: self.curve.clone() }
    }
}

impl GroupScalar for Scalar {
    fn invert(&self) -> Option<Scalar> {
        if self.value.is_zero() {
            return None;
        }
        Some(self.with_value(self.curve.scalars.invert(&self.value)))
    }

    fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.curve.scalars.to_bytes(&self.value)
    }
}

/// Zeroizing leaves the zero scalar.  Only this scalar's own limbs are
/// wiped, not temporaries of the arithmetic that produced it.
impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        wipe(&mut self.value);
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Scalar) -> bool {
        assert_same_curve(&self.curve, &other.curve);
        self.curve.scalars.ct_eq(&self.value, &other.value)
    }
}

impl Eq for Scalar {}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Scalar(")?;
        fmt_hex(f, &self.value, self.curve.scalar_len())?;
        write!(f, ")")
    }
}

impl<'a, 'b> Add<&'b Scalar> for &'a Scalar {
    type Output = Scalar;
    fn add(self, rhs: &'b Scalar) -> Scalar {
        assert_same_curve(&self.curve, &rhs.curve);
        self.with_value(self.curve.scalars.add(&self.value, &rhs.value))
    }
}

impl<'a, 'b> Sub<&'b Scalar> for &'a Scalar {
    type Output = Scalar;
    fn sub(self, rhs: &'b Scalar) -> Scalar {
        assert_same_curve(&self.curve, &rhs.curve);
        self.with_value(self.curve.scalars.sub(&self.value, &rhs.value))
    }
}

impl<'a, 'b> Mul<&'b Scalar> for &'a Scalar {
    type Output = Scalar;
    fn mul(self, rhs: &'b Scalar) -> Scalar {
        assert_same_curve(&self.curve, &rhs.curve);
        self.with_value(self.curve.scalars.mul(&self.value, &rhs.value))
    }
}

define_binop_variants!(impl Add, add for Scalar, Scalar => Scalar);
define_binop_variants!(impl Sub, sub for Scalar, Scalar => Scalar);
define_binop_variants!(impl Mul, mul for Scalar, Scalar => Scalar);

impl<'a> Neg for &'a Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        self.with_value(self.curve.scalars.neg(&self.value))
    }
}

impl Neg for Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edwards::EdwardsSuite;
    use crate::group::Suite;
    use rand::thread_rng;

    #[test]
    fn field_laws() {
        let suite = EdwardsSuite::ed25519();
        let mut rng = thread_rng();
        let a = suite.random_scalar(&mut rng);
        let b = suite.random_scalar(&mut rng);
        let c = suite.random_scalar(&mut rng);

        assert_eq!(&a + &b, &b + &a);
        assert_eq!((&a + &b) * &c, &a * &c + &b * &c);
        assert_eq!(a.clone() - &a, suite.scalar_from_u64(0));
        assert_eq!(a.clone() + &(-&a), suite.scalar_from_u64(0));
        assert_eq!(a.clone() * &a.invert().unwrap(), suite.scalar_from_u64(1));
        assert!(suite.scalar_from_u64(0).invert().is_none());
    }

    #[test]
    fn subtraction_wraps_around_the_order() {
        let suite = EdwardsSuite::ed25519();
        let one = suite.scalar_from_u64(1);
        let two = suite.scalar_from_u64(2);
        let minus_one = one - &two;
        assert_eq!(minus_one.clone() + &suite.scalar_from_u64(1), suite.scalar_from_u64(0));
        // q - 1 encodes as the order with the low byte decremented.
        let mut expected = suite.order().to_bytes_le();
        expected[0] -= 1;
        assert_eq!(minus_one.to_bytes(), expected);
    }

    #[test]
    fn zeroize_leaves_zero() {
        let suite = EdwardsSuite::ed25519();
        let mut s = suite.random_scalar(&mut thread_rng());
        s.zeroize();
        assert!(s.is_zero());
        assert_eq!(s, suite.scalar_from_u64(0));
    }
}
