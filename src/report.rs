use serde::Serialize;

use std::fmt::Display;

use crate::{analyzer::ReportRow, usd::Usd};

/// A finished, ranked seller report.
///
/// To get a printable version of the report, use its [`Display`]
/// implementation. It serializes as the bare list of rows.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Leaderboard {
    pub rows: Vec<ReportRow>,
}

impl Leaderboard {
    #[must_use]
    pub fn new(rows: Vec<ReportRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn total_revenue(&self) -> Usd {
        self.rows.iter().fold(Usd::ZERO, |sum, r| sum.saturating_add(r.revenue))
    }

    #[must_use]
    pub fn total_profit(&self) -> Usd {
        self.rows.iter().fold(Usd::ZERO, |sum, r| sum.saturating_add(r.profit))
    }

    #[must_use]
    pub fn total_bonus(&self) -> Usd {
        self.rows.iter().fold(Usd::ZERO, |sum, r| sum.saturating_add(r.bonus))
    }

    #[must_use]
    pub fn total_sales(&self) -> u64 {
        self.rows.iter().map(|r| r.sales_count).sum()
    }
}

impl From<Vec<ReportRow>> for Leaderboard {
    fn from(rows: Vec<ReportRow>) -> Self {
        Self::new(rows)
    }
}

fn top_products(row: &ReportRow) -> String {
    row.top_products
        .iter()
        .map(|p| format!("{} x{}", p.product_id, p.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for Leaderboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Seller".len());
        writeln!(
            f,
            "{:>4} {:width$} {:>12} {:>12} {:>10} {:>6}  Top products",
            "#", "Seller", "Revenue", "Profit", "Bonus", "Units"
        )?;
        let length = width + 52;
        writeln!(f, "{:-<length$}", "")?;
        for (rank, row) in self.rows.iter().enumerate() {
            writeln!(
                f,
                "{:>4} {:width$} {:>12} {:>12} {:>10} {:>6}  {}",
                rank + 1,
                row.name,
                row.revenue,
                row.profit,
                row.bonus,
                row.sales_count,
                top_products(row),
            )?;
        }
        writeln!(f, "{:-<length$}", "")?;
        writeln!(
            f,
            "{:>4} {:width$} {:>12} {:>12} {:>10} {:>6}",
            "",
            "Total",
            self.total_revenue(),
            self.total_profit(),
            self.total_bonus(),
            self.total_sales(),
        )?;
        Ok(())
    }
}
