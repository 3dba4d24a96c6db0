// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::Error;

/// Number of fractional digits carried by every [`Fixed9`] value, per the
/// `precision = 9` configuration option.
pub const SCALE_EXP: u32 = 9;

/// `10^SCALE_EXP`, the conversion factor between a [`Fixed9`]'s raw integer
/// representation and its decimal value.
pub const SCALE: i128 = 1_000_000_000;

/// A signed, fixed-point decimal with 9 fractional digits, used throughout
/// the reward engine for `$FIN` amounts and dimensionless multipliers alike.
///
/// Values are stored as `raw = value * 10^9` in an `i128`, which gives
/// headroom for the multiplicative chains in the mining-rate formula
/// without intermediate overflow for any economically realistic input.
/// Arithmetic never panics: every operation is checked or saturating, and
/// division by zero is rejected at the type level by [`NonZeroScale`]-style
/// guards in the call sites that need it.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed9(i128);

impl Fixed9 {
    pub const ZERO: Fixed9 = Fixed9(0);
    pub const ONE: Fixed9 = Fixed9(SCALE);

    /// Builds a value directly from its raw (`* 10^9`) representation.
    pub const fn from_raw(raw: i128) -> Self {
        Fixed9(raw)
    }

    /// Returns the raw (`* 10^9`) representation.
    pub const fn raw(self) -> i128 {
        self.0
    }

    pub const fn from_integer(n: i64) -> Self {
        Fixed9(n as i128 * SCALE)
    }

    /// Builds `numerator / denominator` as a [`Fixed9`], rounding toward zero.
    /// `denominator` must be nonzero; a zero denominator returns `Fixed9::ZERO`
    /// since every caller in this crate passes a statically known nonzero
    /// divisor (day counts, basis points) and a panic here would be worse
    /// than a defused zero.
    pub fn from_ratio(numerator: i64, denominator: i64) -> Self {
        if denominator == 0 {
            return Fixed9::ZERO;
        }
        Fixed9((numerator as i128 * SCALE) / denominator as i128)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Fixed9) -> Option<Fixed9> {
        self.0.checked_add(rhs.0).map(Fixed9)
    }

    pub fn saturating_add(self, rhs: Fixed9) -> Fixed9 {
        Fixed9(self.0.saturating_add(rhs.0))
    }

    pub fn checked_sub(self, rhs: Fixed9) -> Option<Fixed9> {
        self.0.checked_sub(rhs.0).map(Fixed9)
    }

    pub fn saturating_sub(self, rhs: Fixed9) -> Fixed9 {
        Fixed9(self.0.saturating_sub(rhs.0))
    }

    /// `self * rhs`, rounding the product toward zero.
    pub fn checked_mul(self, rhs: Fixed9) -> Option<Fixed9> {
        let product = self.0.checked_mul(rhs.0)?;
        Some(Fixed9(product / SCALE))
    }

    pub fn saturating_mul(self, rhs: Fixed9) -> Fixed9 {
        self.checked_mul(rhs).unwrap_or(if (self.0 < 0) != (rhs.0 < 0) {
            Fixed9(i128::MIN)
        } else {
            Fixed9(i128::MAX)
        })
    }

    /// `self / rhs`, rounding toward zero. Returns `None` on division by
    /// zero or overflow.
    pub fn checked_div(self, rhs: Fixed9) -> Option<Fixed9> {
        if rhs.0 == 0 {
            return None;
        }
        let numerator = self.0.checked_mul(SCALE)?;
        Some(Fixed9(numerator / rhs.0))
    }

    /// Divides by a plain integer count (e.g. averaging over `n` days).
    pub fn checked_div_int(self, n: i64) -> Option<Fixed9> {
        if n == 0 {
            return None;
        }
        self.0.checked_div(n as i128).map(Fixed9)
    }

    pub fn min(self, rhs: Fixed9) -> Fixed9 {
        if self.0 <= rhs.0 {
            self
        } else {
            rhs
        }
    }

    pub fn max(self, rhs: Fixed9) -> Fixed9 {
        if self.0 >= rhs.0 {
            self
        } else {
            rhs
        }
    }

    pub fn clamp(self, lo: Fixed9, hi: Fixed9) -> Fixed9 {
        debug_assert!(lo.0 <= hi.0);
        self.max(lo).min(hi)
    }

    /// `e^(-x)` for `x >= 0`, computed entirely in fixed-point arithmetic:
    /// an integer power of `e^-1` via repeated squaring combined with a
    /// truncated Taylor series over the fractional remainder. Used for
    /// every regression factor in the engine (the mining whale brake, the
    /// network-quality regression, the XP level-progression factor).
    ///
    /// For negative `x` (not used by any caller today) this returns
    /// `Fixed9::ONE`, since no regression factor in this engine is ever
    /// evaluated at a negative argument.
    pub fn exp_neg(self) -> Fixed9 {
        if self.0 <= 0 {
            return Fixed9::ONE;
        }

        const E_INV: Fixed9 = Fixed9(367_879_441); // e^-1, 9 fractional digits

        let whole = (self.0 / SCALE) as u32;
        let frac = Fixed9(self.0 % SCALE);

        let integer_part = pow_saturating(E_INV, whole);
        if integer_part.is_zero() {
            return Fixed9::ZERO;
        }

        let fractional_part = exp_neg_taylor(frac);
        integer_part.saturating_mul(fractional_part)
    }
}

/// `base^exp` via repeated squaring, saturating to `Fixed9::ZERO` once the
/// value underflows the representable precision (correct for any `base`
/// in `(0, 1)`, which is the only case this crate's `exp_neg` needs).
fn pow_saturating(base: Fixed9, mut exp: u32) -> Fixed9 {
    let mut result = Fixed9::ONE;
    let mut base = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.saturating_mul(base);
        }
        if result.is_zero() {
            return Fixed9::ZERO;
        }
        base = base.saturating_mul(base);
        exp >>= 1;
    }
    result
}

/// `e^(-f)` for `f` in `[0, 1)` via a 20-term alternating Taylor series,
/// which is comfortably within the 9-digit precision budget over that
/// domain.
fn exp_neg_taylor(f: Fixed9) -> Fixed9 {
    let mut term = Fixed9::ONE;
    let mut sum = Fixed9::ONE;
    let mut negative = true;
    for n in 1..=20i64 {
        term = match term.checked_mul(f).and_then(|t| t.checked_div_int(n)) {
            Some(t) => t,
            None => break,
        };
        if term.is_zero() {
            break;
        }
        sum = if negative {
            sum.saturating_sub(term)
        } else {
            sum.saturating_add(term)
        };
        negative = !negative;
    }
    sum.max(Fixed9::ZERO)
}

impl fmt::Debug for Fixed9 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed9({})", self)
    }
}

impl fmt::Display for Fixed9 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.0 < 0;
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude / (SCALE as u128);
        let frac = magnitude % (SCALE as u128);
        if negative {
            write!(f, "-")?;
        }
        write!(f, "{whole}.{frac:0width$}", width = SCALE_EXP as usize)
    }
}

impl FromStr for Fixed9 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let negative = s.starts_with('-');
        let unsigned = s.trim_start_matches(['+', '-']);
        let mut parts = unsigned.splitn(2, '.');
        let whole_part = parts.next().unwrap_or("0");
        let frac_part = parts.next().unwrap_or("");
        if frac_part.len() > SCALE_EXP as usize || !unsigned.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(Error::Parse(s.to_string()));
        }
        let whole: i128 = whole_part
            .parse()
            .map_err(|_| Error::Parse(s.to_string()))?;
        let mut frac_digits = frac_part.to_string();
        while frac_digits.len() < SCALE_EXP as usize {
            frac_digits.push('0');
        }
        let frac: i128 = if frac_digits.is_empty() {
            0
        } else {
            frac_digits.parse().map_err(|_| Error::Parse(s.to_string()))?
        };
        let raw = whole * SCALE + frac;
        Ok(Fixed9(if negative { -raw } else { raw }))
    }
}

impl Serialize for Fixed9 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fixed9 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Fixed9::from_str(&s).map_err(de::Error::custom)
    }
}
