//! Arbitrary-precision unsigned integers for the float conversions.
//!
//! This is not a general bignum: it has exactly the operations the
//! correctly-rounded conversions need, sized for their worst cases (a few
//! thousand bits for deep subnormals). Limbs are little-endian `u32`s with
//! no trailing zero limbs; zero is the empty limb vector.

/// Largest power of five that fits a `u32` multiplier (5^13).
const POW5_CHUNK: u32 = 1_220_703_125;
const POW5_CHUNK_EXP: usize = 13;

/// Largest power of ten used for decimal chunking (10^9).
const POW10_CHUNK: u32 = 1_000_000_000;
const POW10_CHUNK_DIGITS: usize = 9;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bignum {
    limbs: Vec<u32>,
}

impl Bignum {
    pub fn zero() -> Self {
        Self { limbs: Vec::new() }
    }

    pub fn from_u64(value: u64) -> Self {
        let mut n = Self::zero();
        if value != 0 {
            n.limbs.push(value as u32);
            if value >> 32 != 0 {
                n.limbs.push((value >> 32) as u32);
            }
        }
        n
    }

    /// Builds a value from ASCII decimal digits, most significant first.
    pub fn from_decimal(digits: &[u8]) -> Self {
        let mut n = Self::zero();
        for chunk in digits.chunks(POW10_CHUNK_DIGITS) {
            let mut value: u32 = 0;
            for &d in chunk {
                value = value * 10 + u32::from(d - b'0');
            }
            n.mul_small(10u32.pow(chunk.len() as u32));
            n.add_small(value);
        }
        n
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    pub fn bit_len(&self) -> usize {
        match self.limbs.last() {
            Some(&top) => self.limbs.len() * 32 - top.leading_zeros() as usize,
            None => 0,
        }
    }

    fn trim(&mut self) {
        while self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
    }

    pub fn add_small(&mut self, value: u32) {
        let mut carry = u64::from(value);
        for limb in &mut self.limbs {
            if carry == 0 {
                return;
            }
            let sum = u64::from(*limb) + carry;
            *limb = sum as u32;
            carry = sum >> 32;
        }
        if carry != 0 {
            self.limbs.push(carry as u32);
        }
    }

    pub fn mul_small(&mut self, value: u32) {
        let mut carry: u64 = 0;
        for limb in &mut self.limbs {
            let product = u64::from(*limb) * u64::from(value) + carry;
            *limb = product as u32;
            carry = product >> 32;
        }
        if carry != 0 {
            self.limbs.push(carry as u32);
        }
        self.trim();
    }

    pub fn mul_pow5(&mut self, mut exp: usize) {
        while exp >= POW5_CHUNK_EXP {
            self.mul_small(POW5_CHUNK);
            exp -= POW5_CHUNK_EXP;
        }
        if exp > 0 {
            self.mul_small(5u32.pow(exp as u32));
        }
    }

    pub fn mul_pow10(&mut self, exp: usize) {
        self.mul_pow5(exp);
        self.shl(exp);
    }

    pub fn pow5(exp: usize) -> Self {
        let mut n = Self::from_u64(1);
        n.mul_pow5(exp);
        n
    }

    pub fn pow10(exp: usize) -> Self {
        let mut n = Self::from_u64(1);
        n.mul_pow10(exp);
        n
    }

    /// Shifts left by `bits`.
    pub fn shl(&mut self, bits: usize) {
        if self.is_zero() || bits == 0 {
            return;
        }
        let whole = bits / 32;
        let partial = bits % 32;
        if partial == 0 {
            self.limbs.splice(0..0, std::iter::repeat(0).take(whole));
            return;
        }
        let mut carry: u32 = 0;
        for limb in &mut self.limbs {
            let shifted = (u64::from(*limb) << partial) | u64::from(carry);
            *limb = shifted as u32;
            carry = (shifted >> 32) as u32;
        }
        if carry != 0 {
            self.limbs.push(carry);
        }
        self.limbs.splice(0..0, std::iter::repeat(0).take(whole));
    }

    /// Shifts right by one bit.
    pub fn shr1(&mut self) {
        let mut carry: u32 = 0;
        for limb in self.limbs.iter_mut().rev() {
            let next_carry = *limb & 1;
            *limb = (*limb >> 1) | (carry << 31);
            carry = next_carry;
        }
        self.trim();
    }

    pub fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match self.limbs.len().cmp(&other.limbs.len()) {
            Ordering::Equal => {}
            order => return order,
        }
        for (a, b) in self.limbs.iter().rev().zip(other.limbs.iter().rev()) {
            match a.cmp(b) {
                Ordering::Equal => {}
                order => return order,
            }
        }
        Ordering::Equal
    }

    /// Subtracts `other` in place. Requires `self >= other`.
    pub fn sub_assign(&mut self, other: &Self) {
        let mut borrow: i64 = 0;
        for (i, limb) in self.limbs.iter_mut().enumerate() {
            let rhs = other.limbs.get(i).copied().unwrap_or(0);
            let diff = i64::from(*limb) - i64::from(rhs) + borrow;
            if diff < 0 {
                *limb = (diff + (1 << 32)) as u32;
                borrow = -1;
            } else {
                *limb = diff as u32;
                borrow = 0;
            }
        }
        debug_assert_eq!(borrow, 0, "sub_assign underflow");
        self.trim();
    }

    /// Divides in place by a small divisor, returning the remainder.
    pub fn div_small(&mut self, divisor: u32) -> u32 {
        let mut rem: u64 = 0;
        for limb in self.limbs.iter_mut().rev() {
            let acc = (rem << 32) | u64::from(*limb);
            *limb = (acc / u64::from(divisor)) as u32;
            rem = acc % u64::from(divisor);
        }
        self.trim();
        rem as u32
    }

    /// Divides `self` by `den`, returning the quotient and leaving the
    /// remainder in place. The quotient must fit in a `u64`.
    pub fn div_rem(&mut self, den: &Self) -> u64 {
        debug_assert!(!den.is_zero());
        if self.cmp(den) == std::cmp::Ordering::Less {
            return 0;
        }
        let shift = self.bit_len() - den.bit_len();
        debug_assert!(shift < 64, "quotient too large for div_rem");
        let mut scaled = den.clone();
        scaled.shl(shift);
        let mut quotient: u64 = 0;
        for _ in 0..=shift {
            quotient <<= 1;
            if self.cmp(&scaled) != std::cmp::Ordering::Less {
                self.sub_assign(&scaled);
                quotient |= 1;
            }
            scaled.shr1();
        }
        quotient
    }

    /// Returns the ASCII decimal digits, most significant first. Zero is "0".
    pub fn to_decimal(&self) -> Vec<u8> {
        if self.is_zero() {
            return vec![b'0'];
        }
        let mut scratch = self.clone();
        let mut chunks = Vec::new();
        while !scratch.is_zero() {
            chunks.push(scratch.div_small(POW10_CHUNK));
        }
        let mut digits = Vec::with_capacity(chunks.len() * POW10_CHUNK_DIGITS);
        let mut chunks = chunks.into_iter().rev();
        if let Some(top) = chunks.next() {
            digits.extend_from_slice(top.to_string().as_bytes());
        }
        for chunk in chunks {
            digits.extend_from_slice(format!("{:09}", chunk).as_bytes());
        }
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_and_to_decimal() {
        assert_eq!(Bignum::zero().to_decimal(), b"0");
        assert_eq!(Bignum::from_u64(1).to_decimal(), b"1");
        assert_eq!(Bignum::from_u64(u64::MAX).to_decimal(), b"18446744073709551615");
        assert_eq!(
            Bignum::from_decimal(b"340282366920938463463374607431768211456").to_decimal(),
            b"340282366920938463463374607431768211456"
        );
    }

    #[test]
    fn test_powers() {
        assert_eq!(Bignum::pow5(0).to_decimal(), b"1");
        assert_eq!(Bignum::pow5(10).to_decimal(), b"9765625");
        assert_eq!(Bignum::pow10(20).to_decimal(), b"100000000000000000000");
        // 2^100
        let mut n = Bignum::from_u64(1);
        n.shl(100);
        assert_eq!(n.to_decimal(), b"1267650600228229401496703205376");
    }

    #[test]
    fn test_bit_len() {
        assert_eq!(Bignum::zero().bit_len(), 0);
        assert_eq!(Bignum::from_u64(1).bit_len(), 1);
        assert_eq!(Bignum::from_u64(255).bit_len(), 8);
        assert_eq!(Bignum::from_u64(256).bit_len(), 9);
        let mut n = Bignum::from_u64(1);
        n.shl(1000);
        assert_eq!(n.bit_len(), 1001);
    }

    #[test]
    fn test_sub_and_cmp() {
        let mut a = Bignum::pow10(30);
        let b = Bignum::from_u64(1);
        a.sub_assign(&b);
        assert_eq!(a.to_decimal(), b"999999999999999999999999999999");
        assert_eq!(a.cmp(&Bignum::pow10(30)), std::cmp::Ordering::Less);
    }

    #[test]
    fn test_div_rem() {
        // 10^20 / 3e9 = 33333333333 rem 1000000000
        let mut num = Bignum::pow10(20);
        let den = Bignum::from_u64(3_000_000_000);
        assert_eq!(num.div_rem(&den), 33_333_333_333);
        assert_eq!(num.to_decimal(), b"1000000000");

        let mut num = Bignum::from_u64(7);
        assert_eq!(num.div_rem(&Bignum::from_u64(9)), 0);
        assert_eq!(num.to_decimal(), b"7");
    }

    #[test]
    fn test_shr1() {
        let mut n = Bignum::from_u64(9);
        n.shr1();
        assert_eq!(n.to_decimal(), b"4");
        let mut n = Bignum::pow10(18);
        n.shr1();
        assert_eq!(n.to_decimal(), b"500000000000000000");
    }
}
