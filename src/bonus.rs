use crate::{analyzer::SellerStats, percent::Percent};

/// Decides what percentage of their profit a seller gets as a bonus.
///
/// `rank` is the seller's 0-based position when all `total` sellers are
/// sorted by descending profit. Any `Fn(usize, usize, &SellerStats) -> Percent`
/// is a `BonusStrategy`.
pub trait BonusStrategy {
    fn bonus_rate(&self, rank: usize, total: usize, stats: &SellerStats) -> Percent;
}

impl<F> BonusStrategy for F
where
    F: Fn(usize, usize, &SellerStats) -> Percent,
{
    fn bonus_rate(&self, rank: usize, total: usize, stats: &SellerStats) -> Percent {
        self(rank, total, stats)
    }
}

/// Multipliers rewarding a seller's experience, performance, and loyalty.
///
/// Each applies when the seller's attribute meets its threshold; they
/// compound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Modifiers {
    pub min_experience: f64,
    pub experience_factor: f64,
    pub min_performance: f64,
    pub performance_factor: f64,
    pub min_loyalty: f64,
    pub loyalty_factor: f64,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            min_experience: 5.0,
            experience_factor: 1.1,
            min_performance: 85.0,
            performance_factor: 1.05,
            min_loyalty: 0.8,
            loyalty_factor: 1.02,
        }
    }
}

impl Modifiers {
    /// Returns the combined multiplier for `stats`.
    #[must_use]
    pub fn factor(&self, stats: &SellerStats) -> f64 {
        let meets = |value: Option<f64>, min: f64| value.is_some_and(|v| v >= min);
        let mut factor = 1.0;
        if meets(stats.experience, self.min_experience) {
            factor *= self.experience_factor;
        }
        if meets(stats.performance, self.min_performance) {
            factor *= self.performance_factor;
        }
        if meets(stats.loyalty, self.min_loyalty) {
            factor *= self.loyalty_factor;
        }
        factor
    }
}

/// Rank-based bonus tiers.
///
/// In order of precedence:
/// 1. The top seller gets `top`.
/// 2. The bottom seller gets `last` (unless they are also the top seller).
/// 3. Ranks 1 and 2 get `second`.
/// 4. Everyone else gets `base`.
///
/// If `modifiers` is set, the tier rate is then multiplied by the seller's
/// [`Modifiers::factor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfitBonus {
    pub top: Percent,
    pub second: Percent,
    pub base: Percent,
    pub last: Percent,
    pub modifiers: Option<Modifiers>,
}

impl Default for ProfitBonus {
    fn default() -> Self {
        Self {
            top: Percent::whole(15),
            second: Percent::whole(10),
            base: Percent::whole(5),
            last: Percent::ZERO,
            modifiers: Some(Modifiers::default()),
        }
    }
}

impl ProfitBonus {
    #[must_use]
    pub fn without_modifiers(self) -> Self {
        Self {
            modifiers: None,
            ..self
        }
    }

    /// Returns the unmodified tier rate for `rank` out of `total`.
    #[must_use]
    pub fn tier(&self, rank: usize, total: usize) -> Percent {
        if total == 0 || rank >= total {
            Percent::ZERO
        } else if rank == 0 {
            self.top
        } else if rank == total - 1 {
            self.last
        } else if rank <= 2 {
            self.second
        } else {
            self.base
        }
    }
}

impl BonusStrategy for ProfitBonus {
    fn bonus_rate(&self, rank: usize, total: usize, stats: &SellerStats) -> Percent {
        let tier = self.tier(rank, total);
        match self.modifiers {
            Some(modifiers) if tier != Percent::ZERO => {
                Percent::from_f64(tier.as_f64() * modifiers.factor(stats)).unwrap_or(Percent::ZERO)
            }
            _ => tier,
        }
    }
}

/// Calculates a bonus rate using the default [`ProfitBonus`] tiers and
/// modifiers.
///
/// ```
/// # use sales_leaderboard::{calculate_bonus, Percent, Seller, SellerStats};
/// let stats = SellerStats::new(&Seller::new("s1", "Ada"));
/// assert_eq!(calculate_bonus(0, 3, &stats), Percent::whole(15));
/// assert_eq!(calculate_bonus(2, 3, &stats), Percent::ZERO);
/// ```
#[must_use]
pub fn calculate_bonus(rank: usize, total: usize, stats: &SellerStats) -> Percent {
    ProfitBonus::default().bonus_rate(rank, total, stats)
}
