#![doc = include_str!("../README.md")]
mod analyzer;
mod bonus;
mod error;
pub mod input;
mod model;
mod percent;
mod report;
mod revenue;
mod usd;

pub use analyzer::{analyze, ReportRow, SellerStats, Strategies, TopProduct, TOP_PRODUCTS};
pub use bonus::{calculate_bonus, BonusStrategy, Modifiers, ProfitBonus};
pub use error::SalesError;
pub use model::{Dataset, LineItem, Product, PurchaseRecord, Seller};
pub use percent::Percent;
pub use report::Leaderboard;
pub use revenue::{calculate_revenue, RevenueStrategy, SimpleRevenue};
pub use usd::Usd;
