//! Exact rational numbers extended with a symbolic "big M" tier.
//!
//! A [`Fraction`] is `value + M * higher`, where `value` is an exact rational
//! and `higher` is again a `Fraction` (so `M^2`, `M^3`, ... are representable
//! when two M-carrying quantities are multiplied). `M` is a formal constant
//! larger than any finite value: every comparison looks at the highest tier
//! first and only falls back to the finite part when the tiers agree.
//!
//! All arithmetic is exact; nothing here ever rounds through `f64`.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FractionError {
    #[error("invalid fraction: denominator is zero")]
    InvalidFraction,
    #[error("invalid operand: {0}")]
    InvalidOperand(&'static str),
    #[error("cannot parse `{0}` as a fraction")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, FractionError>;

/// `value + M * higher`, always kept in canonical form:
/// `value` is reduced with a positive denominator and `higher` is `None`
/// whenever it would be zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fraction {
    value: BigRational,
    higher: Option<Box<Fraction>>,
}

impl Fraction {
    pub fn new(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Result<Self> {
        let denom = denom.into();
        if denom.is_zero() {
            return Err(FractionError::InvalidFraction);
        }
        Ok(Self::finite(BigRational::new(numer.into(), denom)))
    }

    pub fn integer(n: impl Into<BigInt>) -> Self {
        Self::finite(BigRational::from_integer(n.into()))
    }

    pub fn zero() -> Self {
        Self::finite(BigRational::zero())
    }

    pub fn one() -> Self {
        Self::finite(BigRational::one())
    }

    /// The formal constant `M` itself.
    pub fn big_m() -> Self {
        Self::one().shift()
    }

    /// `base + M * higher`.
    pub fn with_big_m(base: Fraction, higher: Fraction) -> Self {
        base + higher.shift()
    }

    /// Builds the exact value of a decimal literal such as `1.5` or `0.1`.
    ///
    /// The float is read through its shortest round-trip decimal form, so
    /// `0.1` becomes `1/10` rather than the binary expansion of the double.
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(FractionError::ParseError(value.to_string()));
        }
        let text = value.to_string();
        parse_number(&text).ok_or(FractionError::ParseError(text))
    }

    fn finite(value: BigRational) -> Self {
        Self { value, higher: None }
    }

    fn from_parts(value: BigRational, higher: Option<Fraction>) -> Self {
        Self {
            value,
            higher: higher.filter(|h| !h.is_zero()).map(Box::new),
        }
    }

    /// Multiplies by `M`.
    fn shift(self) -> Self {
        if self.is_zero() {
            return self;
        }
        Self {
            value: BigRational::zero(),
            higher: Some(Box::new(self)),
        }
    }

    /// Multiplies every tier by the finite rational `k`.
    fn scale(&self, k: &BigRational) -> Self {
        Self::from_parts(&self.value * k, self.higher.as_ref().map(|h| h.scale(k)))
    }

    /// Numerator of the finite tier.
    pub fn numer(&self) -> &BigInt {
        self.value.numer()
    }

    /// Denominator of the finite tier, always positive.
    pub fn denom(&self) -> &BigInt {
        self.value.denom()
    }

    /// Coefficient of `M`, if any.
    pub fn higher(&self) -> Option<&Fraction> {
        self.higher.as_deref()
    }

    /// The finite tier with every `M` term dropped.
    pub fn finite_part(&self) -> Fraction {
        Self::finite(self.value.clone())
    }

    pub fn is_finite(&self) -> bool {
        self.higher.is_none()
    }

    pub fn is_integer(&self) -> bool {
        self.is_finite() && self.value.is_integer()
    }

    pub fn is_zero(&self) -> bool {
        self.higher.is_none() && self.value.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.signum() == Ordering::Greater
    }

    pub fn is_negative(&self) -> bool {
        self.signum() == Ordering::Less
    }

    /// Sign of the value, decided by the highest non-zero tier.
    pub fn signum(&self) -> Ordering {
        match &self.higher {
            Some(higher) => higher.signum(),
            None => self.value.cmp(&BigRational::zero()),
        }
    }

    pub fn abs(&self) -> Fraction {
        if self.is_negative() {
            -self
        } else {
            self.clone()
        }
    }

    /// Division; the divisor must be finite and non-zero.
    pub fn checked_div(&self, divisor: &Fraction) -> Result<Fraction> {
        if !divisor.is_finite() {
            return Err(FractionError::InvalidOperand(
                "cannot divide by a quantity containing M",
            ));
        }
        if divisor.value.is_zero() {
            return Err(FractionError::InvalidOperand("division by zero"));
        }
        Ok(self.scale(&divisor.value.recip()))
    }

    pub fn recip(&self) -> Result<Fraction> {
        Fraction::one().checked_div(self)
    }

    /// Finite coefficients from the highest power of `M` down to `M^0`.
    fn tiers(&self) -> Vec<&BigRational> {
        let mut tiers = vec![&self.value];
        let mut cursor = self.higher.as_deref();
        while let Some(tier) = cursor {
            tiers.push(&tier.value);
            cursor = tier.higher.as_deref();
        }
        tiers.reverse();
        tiers
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for Fraction {
    fn from(n: i64) -> Self {
        Self::integer(n)
    }
}

impl From<BigRational> for Fraction {
    fn from(value: BigRational) -> Self {
        Self::finite(value)
    }
}

impl Add<&Fraction> for &Fraction {
    type Output = Fraction;

    fn add(self, other: &Fraction) -> Fraction {
        let higher = match (&self.higher, &other.higher) {
            (Some(a), Some(b)) => Some(&**a + &**b),
            (Some(a), None) | (None, Some(a)) => Some((**a).clone()),
            (None, None) => None,
        };
        Fraction::from_parts(&self.value + &other.value, higher)
    }
}

impl Sub<&Fraction> for &Fraction {
    type Output = Fraction;

    fn sub(self, other: &Fraction) -> Fraction {
        self + &(-other)
    }
}

impl Mul<&Fraction> for &Fraction {
    type Output = Fraction;

    // (a + M x)(b + M y) = ab + M (a y + b x + M x y)
    fn mul(self, other: &Fraction) -> Fraction {
        let mut higher = Fraction::zero();
        if let Some(x) = &self.higher {
            higher = &higher + &x.scale(&other.value);
        }
        if let Some(y) = &other.higher {
            higher = &higher + &y.scale(&self.value);
        }
        if let (Some(x), Some(y)) = (&self.higher, &other.higher) {
            higher = &higher + &(&**x * &**y).shift();
        }
        Fraction::from_parts(&self.value * &other.value, Some(higher))
    }
}

impl Neg for &Fraction {
    type Output = Fraction;

    fn neg(self) -> Fraction {
        Fraction::from_parts(-&self.value, self.higher.as_ref().map(|h| -&**h))
    }
}

impl Neg for Fraction {
    type Output = Fraction;

    fn neg(self) -> Fraction {
        -&self
    }
}

macro_rules! forward_owned_binop {
    ($imp:ident, $method:ident) => {
        impl $imp<Fraction> for Fraction {
            type Output = Fraction;

            fn $method(self, other: Fraction) -> Fraction {
                (&self).$method(&other)
            }
        }

        impl<'a> $imp<&'a Fraction> for Fraction {
            type Output = Fraction;

            fn $method(self, other: &'a Fraction) -> Fraction {
                (&self).$method(other)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        (self - other).signum()
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tiers = self.tiers();
        let top = tiers.len() - 1;
        let mut first = true;
        for (idx, coef) in tiers.iter().enumerate() {
            if coef.is_zero() {
                continue;
            }
            let power = top - idx;
            if first {
                if coef.is_negative() {
                    f.write_str("-")?;
                }
            } else if coef.is_negative() {
                f.write_str(" - ")?;
            } else {
                f.write_str(" + ")?;
            }
            first = false;

            let magnitude = coef.abs();
            if power == 0 {
                write!(f, "{}", magnitude)?;
                continue;
            }
            if !magnitude.is_one() {
                write!(f, "{}", magnitude)?;
            }
            f.write_str("M")?;
            if power > 1 {
                write!(f, "^{}", power)?;
            }
        }
        if first {
            f.write_str("0")?;
        }
        Ok(())
    }
}

fn parse_integer(text: &str) -> Option<BigInt> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_decimal(text: &str) -> Option<Fraction> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (int_part, frac_part) = body.split_once('.')?;
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = format!("{}{}", int_part, frac_part);
    let mut numer: BigInt = if digits.is_empty() { BigInt::zero() } else { digits.parse().ok()? };
    if negative {
        numer = -numer;
    }
    let denom = num_traits::pow(BigInt::from(10u32), frac_part.len());
    Some(Fraction::finite(BigRational::new(numer, denom)))
}

fn parse_number(text: &str) -> Option<Fraction> {
    if let Some((numer, denom)) = text.split_once('/') {
        let numer = parse_integer(numer.trim())?;
        let denom = parse_integer(denom.trim())?;
        if denom.is_zero() {
            return None;
        }
        return Some(Fraction::finite(BigRational::new(numer, denom)));
    }
    if text.contains('.') {
        return parse_decimal(text);
    }
    parse_integer(text).map(Fraction::integer)
}

/// Highest power of `M` accepted in text. Each power is one nested tier.
const MAX_BIG_M_POWER: u32 = 8;

/// Reads back the display form of an M-carrying value, e.g. `-3/2M^2 + M - 1/2`.
fn parse_big_m(text: &str) -> Option<Fraction> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let mut terms = Vec::new();
    let mut start = 0;
    let mut prev = None;
    for (idx, c) in compact.char_indices() {
        if idx > 0 && (c == '+' || c == '-') && prev != Some('/') && prev != Some('^') {
            terms.push(&compact[start..idx]);
            start = idx;
        }
        prev = Some(c);
    }
    terms.push(&compact[start..]);

    let mut total = Fraction::zero();
    for term in terms {
        let (negative, body) = match term.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, term.strip_prefix('+').unwrap_or(term)),
        };
        let mut value = match body.split_once('M') {
            Some((coef, power)) => {
                let mut value = if coef.is_empty() { Fraction::one() } else { parse_number(coef)? };
                let power: u32 = match power {
                    "" => 1,
                    rest => rest.strip_prefix('^')?.parse().ok()?,
                };
                if power > MAX_BIG_M_POWER {
                    return None;
                }
                for _ in 0..power {
                    value = value.shift();
                }
                value
            }
            None => parse_number(body)?,
        };
        if negative {
            value = -value;
        }
        total = &total + &value;
    }
    Some(total)
}

impl FromStr for Fraction {
    type Err = FractionError;

    /// Accepts `int`, `int/int` and `decimal`, plus the display form of
    /// values carrying `M`.
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        if let Some((_, denom)) = text.split_once('/') {
            if matches!(parse_integer(denom.trim()), Some(d) if d.is_zero()) {
                return Err(FractionError::InvalidFraction);
            }
        }
        let parsed = if text.contains('M') { parse_big_m(text) } else { parse_number(text) };
        parsed.ok_or_else(|| FractionError::ParseError(s.to_string()))
    }
}

impl Serialize for Fraction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct FractionVisitor;

impl<'de> Visitor<'de> for FractionVisitor {
    type Value = Fraction;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer, a decimal number or a \"p/q\" string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Fraction, E> {
        Ok(Fraction::integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Fraction, E> {
        Ok(Fraction::integer(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Fraction, E> {
        Fraction::from_f64(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Fraction, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Fraction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(FractionVisitor)
    }
}
