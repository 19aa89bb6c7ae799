use anyhow::anyhow;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_with::DeserializeFromStr;

use std::{
    fmt::{Debug, Display},
    str::FromStr,
    sync::LazyLock,
};

use crate::usd::{round_div, Usd};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-)?(\d+)(?:\.(\d+))?$").expect("valid percent regex"));

/// A percentage, held to 2 decimal places.
///
/// Stored internally as an integer number of basis points (hundredths of a
/// percent), so `15.25%` is `1525`. Used both for line-item discounts and for
/// bonus rates.
#[derive(Clone, Copy, Default, DeserializeFromStr, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Percent(i64);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const HUNDRED: Percent = Percent(10_000);

    #[must_use]
    pub const fn from_basis_points(bp: i64) -> Self {
        Self(bp)
    }

    /// Creates a percentage from a whole number of percent.
    #[must_use]
    pub const fn whole(pct: i64) -> Self {
        Self(pct * 100)
    }

    /// Rounds `pct` to 2 decimal places, half away from zero.
    ///
    /// Returns `None` if `pct` is not a finite number or is too large to
    /// represent.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_f64(pct: f64) -> Option<Self> {
        let bp = (pct * 100.0).round();
        if !bp.is_finite() || bp.abs() > 1e15 {
            return None;
        }
        Some(Self(bp as i64))
    }

    #[must_use]
    pub const fn basis_points(self) -> i64 {
        self.0
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Reports whether this is a usable discount, between 0 and 100 percent
    /// inclusive.
    #[must_use]
    pub fn is_discount(self) -> bool {
        (Self::ZERO..=Self::HUNDRED).contains(&self)
    }

    /// Returns this percentage of `amount`, rounded to the nearest cent, or
    /// `None` if the result doesn't fit in a [`Usd`].
    ///
    /// ```
    /// # use sales_leaderboard::{Percent, Usd};
    /// assert_eq!(Percent::whole(15).checked_of(Usd::from_cents(1000)), Some(Usd::from_cents(150)));
    /// assert_eq!(Percent::whole(10).checked_of(Usd::from_cents(-55)), Some(Usd::from_cents(-6)));
    /// assert_eq!(Percent::whole(200).checked_of(Usd::from_cents(i64::MAX)), None);
    /// ```
    #[must_use]
    pub fn checked_of(self, amount: Usd) -> Option<Usd> {
        let cents = round_div(i128::from(amount.cents()) * i128::from(self.0), 10_000);
        i64::try_from(cents).ok().map(Usd::from_cents)
    }
}

impl Debug for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let bp = self.0.unsigned_abs();
        f.pad(&format!("{sign}{}.{:02}%", bp / 100, bp % 100))
    }
}

impl FromStr for Percent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().trim_end_matches('%');
        let caps = NUMBER
            .captures(s)
            .ok_or_else(|| anyhow!("invalid percentage: {s:?}"))?;
        let out_of_range = || anyhow!("percentage out of range: {s:?}");
        let whole: i64 = caps[2].parse().map_err(|_| out_of_range())?;
        let digits = caps.get(3).map_or("", |m| m.as_str()).as_bytes();
        let digit = |i: usize| digits.get(i).map_or(0, |d| i64::from(d - b'0'));
        // hundredths of a percent, rounding on the third decimal
        let mut bp = digit(0) * 10 + digit(1);
        if digit(2) >= 5 {
            bp += 1;
        }
        let bp = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(bp))
            .ok_or_else(out_of_range)?;
        Ok(if caps.get(1).is_some() {
            Self(-bp)
        } else {
            Self(bp)
        })
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}
