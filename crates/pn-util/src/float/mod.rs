//! Correctly rounded decimal ↔ binary64 conversion.
//!
//! The parser returns the round-to-nearest, ties-to-even `f64` of the exact
//! rational value of its input, with a three-way status: syntax error, in
//! range, or out of range (overflow to ±∞, a subnormal result, or underflow
//! to ±0 — the value is still produced and a caller may continue with it).
//!
//! The printer produces the shortest decimal string that re-parses to the
//! identical bits: fixed-point when the decimal exponent is in [-4, 15],
//! otherwise scientific with an explicit, two-digit-padded exponent.
//!
//! Inputs with at most 15 significant digits and a decimal exponent within
//! ±22 take a fast path of exact double arithmetic; everything else goes
//! through an exact big-integer quotient, so there is no double-rounding
//! anywhere.

mod bignum;

use bignum::Bignum;

use crate::error::ErrorCode;

/// Failure modes of [`parse_float`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FloatError {
    /// The exact value is outside the finite normal range. The payload is
    /// the clamped result: ±∞ past the largest finite double, the
    /// round-to-nearest subnormal inside the subnormal range, ±0 below the
    /// smallest subnormal. Callers may treat this as a soft error.
    Range(f64),
    /// The input is not a decimal float.
    Syntax,
}

impl FloatError {
    /// The taxonomy code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            FloatError::Range(_) => ErrorCode::FloatOverflow,
            FloatError::Syntax => ErrorCode::InvalidFloat,
        }
    }
}

/// Exact double powers of ten for the fast path; 10^22 is the largest that
/// is exactly representable.
const POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// Significant digits kept before the tail collapses into a sticky bit.
/// Distinguishing doubles never needs more than 768.
const MAX_SIG_DIGITS: usize = 800;

const SIGN_BIT: u64 = 1 << 63;
const FRAC_BITS: u32 = 52;
const FRAC_MASK: u64 = (1 << FRAC_BITS) - 1;
const IMPLICIT_BIT: u64 = 1 << FRAC_BITS;
/// Exponent of the least significant bit of a subnormal.
const MIN_EXP2: i64 = -1074;
/// Largest e2 with q in [2^52, 2^53) still finite.
const MAX_EXP2: i64 = 971;

/// Parses a byte range as a decimal float, correctly rounded.
///
/// This is the codec-level grammar, looser than the lexer's surface syntax:
/// leading zeros, `1.` and `.5` are accepted here (the lexer rejects them
/// before this code ever runs). `nan` has no sign; `inf` takes one.
pub fn parse_float(data: &[u8]) -> Result<f64, FloatError> {
    if data == b"nan" {
        return Ok(f64::NAN);
    }
    let (negative, rest) = match data.first().copied() {
        Some(b'-') => (true, &data[1..]),
        Some(b'+') => (false, &data[1..]),
        _ => (false, data),
    };
    if rest == b"inf" {
        return Ok(signed(f64::INFINITY, negative));
    }

    let decimal = scan(rest).ok_or(FloatError::Syntax)?;
    if decimal.digits.is_empty() {
        return Ok(signed(0.0, negative));
    }

    let (value, range) = convert(&decimal);
    let value = signed(value, negative);
    if range {
        Err(FloatError::Range(value))
    } else {
        Ok(value)
    }
}

fn signed(value: f64, negative: bool) -> f64 {
    if negative {
        -value
    } else {
        value
    }
}

/// A scanned decimal: `digits × 10^exp10`, digits free of leading and
/// trailing zeros. `sticky` records that nonzero digits beyond
/// [`MAX_SIG_DIGITS`] were dropped, which only matters on exact ties.
struct Decimal {
    digits: Vec<u8>,
    exp10: i64,
    sticky: bool,
}

fn scan(data: &[u8]) -> Option<Decimal> {
    let mut i = 0;
    let mut digits = Vec::new();
    let mut frac_len: i64 = 0;
    let mut mantissa_len = 0usize;

    while i < data.len() && data[i].is_ascii_digit() {
        digits.push(data[i]);
        mantissa_len += 1;
        i += 1;
    }
    if i < data.len() && data[i] == b'.' {
        i += 1;
        while i < data.len() && data[i].is_ascii_digit() {
            digits.push(data[i]);
            mantissa_len += 1;
            frac_len += 1;
            i += 1;
        }
    }
    if mantissa_len == 0 {
        return None;
    }

    let mut exp: i64 = 0;
    if i < data.len() && (data[i] == b'e' || data[i] == b'E') {
        i += 1;
        let exp_negative = match data.get(i).copied() {
            Some(b'-') => {
                i += 1;
                true
            }
            Some(b'+') => {
                i += 1;
                false
            }
            _ => false,
        };
        let exp_start = i;
        while i < data.len() && data[i].is_ascii_digit() {
            exp = (exp.saturating_mul(10)).saturating_add(i64::from(data[i] - b'0'));
            i += 1;
        }
        if i == exp_start {
            return None;
        }
        if exp_negative {
            exp = -exp;
        }
    }
    if i != data.len() {
        return None;
    }

    let mut exp10 = exp.saturating_sub(frac_len);
    match digits.iter().position(|&d| d != b'0') {
        Some(first) => {
            digits.drain(..first);
        }
        None => {
            digits.clear();
            return Some(Decimal { digits, exp10: 0, sticky: false });
        }
    }
    while digits.last() == Some(&b'0') {
        digits.pop();
        exp10 += 1;
    }
    let mut sticky = false;
    if digits.len() > MAX_SIG_DIGITS {
        // The last kept-out digit is nonzero (trailing zeros are gone), so
        // the dropped tail is never all-zero.
        sticky = true;
        exp10 += (digits.len() - MAX_SIG_DIGITS) as i64;
        digits.truncate(MAX_SIG_DIGITS);
    }
    Some(Decimal { digits, exp10, sticky })
}

/// Converts a nonzero scanned decimal. Returns the magnitude and whether it
/// fell outside the normal range.
fn convert(decimal: &Decimal) -> (f64, bool) {
    let nd = decimal.digits.len() as i64;
    // value < 10^(nd + exp10) and value >= 10^(nd - 1 + exp10): anything at
    // 1e310 and beyond overflows, anything below 1e-340 underflows to zero.
    if nd - 1 + decimal.exp10 >= 310 {
        return (f64::INFINITY, true);
    }
    if nd + decimal.exp10 <= -340 {
        return (0.0, true);
    }

    if !decimal.sticky && nd <= 15 && (-22..=22).contains(&decimal.exp10) {
        let mut mantissa: u64 = 0;
        for &d in &decimal.digits {
            mantissa = mantissa * 10 + u64::from(d - b'0');
        }
        let mantissa = mantissa as f64;
        // Both operands exact, one rounding.
        let value = if decimal.exp10 >= 0 {
            mantissa * POW10[decimal.exp10 as usize]
        } else {
            mantissa / POW10[(-decimal.exp10) as usize]
        };
        return (value, false);
    }

    slow_convert(decimal)
}

/// Exact quotient path: scale numerator and denominator so the quotient has
/// 53 bits (or sits at the subnormal exponent floor), divide, and round on
/// the exact remainder.
fn slow_convert(decimal: &Decimal) -> (f64, bool) {
    let mut num = Bignum::from_decimal(&decimal.digits);
    let mut den = Bignum::from_u64(1);
    if decimal.exp10 > 0 {
        num.mul_pow10(decimal.exp10 as usize);
    } else if decimal.exp10 < 0 {
        den = Bignum::pow10((-decimal.exp10) as usize);
    }

    let mut exp2 = num.bit_len() as i64 - den.bit_len() as i64 - 53;
    if exp2 < MIN_EXP2 {
        exp2 = MIN_EXP2;
    }
    loop {
        let mut rem = num.clone();
        let mut divisor = den.clone();
        if exp2 >= 0 {
            divisor.shl(exp2 as usize);
        } else {
            rem.shl((-exp2) as usize);
        }
        let mut quotient = rem.div_rem(&divisor);
        if quotient >= 1 << 53 {
            // The bit-length estimate was one low.
            exp2 += 1;
            continue;
        }

        rem.shl(1);
        let round_up = match rem.cmp(&divisor) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => decimal.sticky || quotient & 1 == 1,
            std::cmp::Ordering::Less => false,
        };
        if round_up {
            quotient += 1;
            if quotient == 1 << 53 {
                quotient = 1 << 52;
                exp2 += 1;
            }
        }
        return compose(quotient, exp2);
    }
}

/// Assembles `quotient × 2^exp2` into a double, reporting range failures.
fn compose(quotient: u64, exp2: i64) -> (f64, bool) {
    if quotient == 0 {
        // Nonzero digits rounded all the way to zero.
        return (0.0, true);
    }
    if exp2 > MAX_EXP2 {
        return (f64::INFINITY, true);
    }
    if quotient < IMPLICIT_BIT {
        debug_assert_eq!(exp2, MIN_EXP2);
        (f64::from_bits(quotient), true)
    } else {
        let bits = (((exp2 + 1075) as u64) << FRAC_BITS) | (quotient & FRAC_MASK);
        (f64::from_bits(bits), false)
    }
}

/// Prints the shortest decimal string that re-parses to exactly `value`.
///
/// `-0.0` prints `-0.0`; NaN prints `nan` with the sign discarded; 32 bytes
/// of output always suffice.
pub fn print_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let negative = value.is_sign_negative();
    if value.is_infinite() {
        return if negative { "-inf" } else { "inf" }.to_string();
    }
    if value == 0.0 {
        return if negative { "-0.0" } else { "0.0" }.to_string();
    }

    let bits = value.to_bits() & !SIGN_BIT;
    let (digits, exp10) = shortest_digits(bits);
    format_digits(negative, &digits, exp10)
}

/// The exact decimal expansion of a finite positive double: digit string
/// plus the decimal exponent of its leading digit.
fn exact_decimal(bits: u64) -> (Vec<u8>, i64) {
    let frac = bits & FRAC_MASK;
    let exp_field = (bits >> FRAC_BITS) & 0x7FF;
    let (mantissa, exp2) = if exp_field == 0 {
        (frac, MIN_EXP2)
    } else {
        (frac | IMPLICIT_BIT, exp_field as i64 - 1075)
    };

    let mut n = Bignum::from_u64(mantissa);
    let exp10;
    if exp2 >= 0 {
        n.shl(exp2 as usize);
        let digits = n.to_decimal();
        exp10 = digits.len() as i64 - 1;
        return (digits, exp10);
    }
    // mantissa × 2^exp2 = (mantissa × 5^-exp2) × 10^exp2
    n.mul_pow5((-exp2) as usize);
    let digits = n.to_decimal();
    exp10 = digits.len() as i64 - 1 + exp2;
    (digits, exp10)
}

/// Finds the fewest significant digits that re-parse to `bits` exactly.
fn shortest_digits(bits: u64) -> (Vec<u8>, i64) {
    let (mut exact, exp10) = exact_decimal(bits);
    while exact.last() == Some(&b'0') {
        exact.pop();
    }

    let longest = exact.len().min(17);
    for k in 1..=longest {
        if k == exact.len() {
            return (exact, exp10);
        }
        let (rounded, rounded_exp) = round_digits(&exact, exp10, k, true);
        if reparses_to(&rounded, rounded_exp, bits) {
            return (rounded, rounded_exp);
        }
        let (other, other_exp) = round_digits(&exact, exp10, k, false);
        if reparses_to(&other, other_exp, bits) {
            return (other, other_exp);
        }
    }
    // 17 significant digits always identify a double uniquely.
    let (rounded, rounded_exp) = round_digits(&exact, exp10, 17, true);
    (rounded, rounded_exp)
}

/// Rounds an exact digit string to `k` significant digits. With `nearest`
/// set, rounds half-to-even on the exact tail; otherwise takes the opposite
/// direction, giving the alternate candidate for interval checks.
fn round_digits(exact: &[u8], exp10: i64, k: usize, nearest: bool) -> (Vec<u8>, i64) {
    let mut digits = exact[..k].to_vec();
    let tail = &exact[k..];
    let up_is_nearer = match tail.first().copied() {
        None => false,
        Some(d) if d > b'5' => true,
        Some(d) if d < b'5' => false,
        Some(_) => {
            tail[1..].iter().any(|&d| d != b'0') || digits[k - 1] & 1 == 1 // tie: to even
        }
    };
    let mut exp10 = exp10;
    if up_is_nearer == nearest {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
            digits.truncate(k);
            exp10 += 1;
        }
    }
    while digits.last() == Some(&b'0') {
        digits.pop();
    }
    if digits.is_empty() {
        // Rounding 0.x down to zero significant digits cannot represent a
        // nonzero double; keep a single zero so the caller's check fails.
        digits.push(b'0');
    }
    (digits, exp10)
}

/// Checks a candidate through the parser: does it round to exactly `bits`?
fn reparses_to(digits: &[u8], exp10: i64, bits: u64) -> bool {
    let mut text = Vec::with_capacity(digits.len() + 8);
    text.extend_from_slice(digits);
    text.push(b'e');
    text.extend_from_slice((exp10 - (digits.len() as i64 - 1)).to_string().as_bytes());
    let value = match parse_float(&text) {
        Ok(v) => v,
        Err(FloatError::Range(v)) => v,
        Err(FloatError::Syntax) => return false,
    };
    value.to_bits() == bits
}

/// Applies the surface shape: fixed-point inside the [-4, 15] decimal
/// exponent window, scientific outside it.
fn format_digits(negative: bool, digits: &[u8], exp10: i64) -> String {
    let mut out = String::with_capacity(32);
    if negative {
        out.push('-');
    }
    let k = digits.len() as i64;
    let digits = std::str::from_utf8(digits).unwrap_or_default();
    if (-4..=15).contains(&exp10) {
        if exp10 >= k - 1 {
            out.push_str(digits);
            for _ in 0..exp10 - k + 1 {
                out.push('0');
            }
            out.push_str(".0");
        } else if exp10 >= 0 {
            let point = (exp10 + 1) as usize;
            out.push_str(&digits[..point]);
            out.push('.');
            out.push_str(&digits[point..]);
        } else {
            out.push_str("0.");
            for _ in 0..-exp10 - 1 {
                out.push('0');
            }
            out.push_str(digits);
        }
    } else {
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push_str(&format!("e{:+03}", exp10));
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Printing then parsing any finite double is bit-exact.
        #[test]
        fn round_trips(bits in any::<u64>()) {
            let value = f64::from_bits(bits);
            prop_assume!(!value.is_nan());
            let printed = print_float(value);
            let reparsed = match parse_float(printed.as_bytes()) {
                Ok(v) | Err(FloatError::Range(v)) => v,
                Err(FloatError::Syntax) => panic!("{printed:?} failed to re-parse"),
            };
            prop_assert_eq!(reparsed.to_bits(), value.to_bits());
        }

        /// The parser agrees with the standard library's conversion on
        /// every input the surface grammar accepts.
        #[test]
        fn matches_std(mantissa in 0u64..=u64::MAX, exp in -350i32..=350) {
            let text = format!("{mantissa}e{exp}");
            let expected: f64 = text.parse().unwrap();
            let got = match parse_float(text.as_bytes()) {
                Ok(v) | Err(FloatError::Range(v)) => v,
                Err(FloatError::Syntax) => panic!("{text:?} rejected"),
            };
            prop_assert_eq!(got.to_bits(), expected.to_bits());
        }
    }
}
