use serde::Serialize;
use tracing::{debug, info, warn};

use std::collections::HashMap;

use crate::{
    bonus::{BonusStrategy, ProfitBonus},
    error::SalesError,
    model::{Dataset, Product, Seller},
    percent::Percent,
    revenue::{RevenueStrategy, SimpleRevenue},
    usd::Usd,
};

/// How many products each report row lists.
pub const TOP_PRODUCTS: usize = 5;

/// Running sales totals for one seller.
#[derive(Clone, Debug, PartialEq)]
pub struct SellerStats {
    pub seller_id: String,
    pub name: String,
    pub revenue: Usd,
    pub profit: Usd,
    /// Units sold.
    pub sales_count: u64,
    pub experience: Option<f64>,
    pub performance: Option<f64>,
    pub loyalty: Option<f64>,
    products_sold: Vec<TopProduct>,
    product_index: HashMap<String, usize>,
}

impl SellerStats {
    /// Creates empty totals for `seller`.
    #[must_use]
    pub fn new(seller: &Seller) -> Self {
        Self {
            seller_id: seller.id.clone(),
            name: seller.display_name(),
            revenue: Usd::ZERO,
            profit: Usd::ZERO,
            sales_count: 0,
            experience: seller.experience,
            performance: seller.performance,
            loyalty: seller.loyalty,
            products_sold: Vec::new(),
            product_index: HashMap::new(),
        }
    }

    /// Adds one sold line item to the totals.
    ///
    /// # Errors
    ///
    /// Returns [`SalesError::InvalidInput`], leaving the totals unchanged, if
    /// the running revenue or profit would overflow.
    pub fn record(
        &mut self,
        product_id: &str,
        quantity: u32,
        revenue: Usd,
        profit: Usd,
    ) -> Result<(), SalesError> {
        let (Some(total_revenue), Some(total_profit)) = (
            self.revenue.checked_add(revenue),
            self.profit.checked_add(profit),
        ) else {
            return Err(SalesError::InvalidInput(format!(
                "running totals for seller {:?} are out of range",
                self.seller_id
            )));
        };
        self.revenue = total_revenue;
        self.profit = total_profit;
        self.sales_count += u64::from(quantity);
        match self.product_index.get(product_id) {
            Some(&i) => self.products_sold[i].quantity += u64::from(quantity),
            None => {
                self.product_index
                    .insert(product_id.to_string(), self.products_sold.len());
                self.products_sold.push(TopProduct {
                    product_id: product_id.to_string(),
                    quantity: u64::from(quantity),
                });
            }
        }
        Ok(())
    }

    /// Returns up to `n` products, most units sold first.
    ///
    /// Products with equal sales keep the order in which they were first sold.
    #[must_use]
    pub fn top_products(&self, n: usize) -> Vec<TopProduct> {
        let mut products = self.products_sold.clone();
        products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        products.truncate(n);
        products
    }
}

/// A product and how many units of it a seller sold.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TopProduct {
    pub product_id: String,
    pub quantity: u64,
}

/// One seller's line in the finished report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportRow {
    pub seller_id: String,
    pub name: String,
    pub revenue: Usd,
    pub profit: Usd,
    pub bonus: Usd,
    pub sales_count: u64,
    pub top_products: Vec<TopProduct>,
}

/// The pair of calculations an analysis is parameterised over.
#[derive(Clone, Debug)]
pub struct Strategies<R = SimpleRevenue, B = ProfitBonus> {
    pub revenue: R,
    pub bonus: B,
}

impl Strategies {
    /// [`SimpleRevenue`] with the default [`ProfitBonus`] tiers.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            revenue: SimpleRevenue,
            bonus: ProfitBonus::default(),
        }
    }
}

impl Default for Strategies {
    fn default() -> Self {
        Self::standard()
    }
}

impl<R: RevenueStrategy, B: BonusStrategy> Strategies<R, B> {
    pub fn new(revenue: R, bonus: B) -> Self {
        Self { revenue, bonus }
    }
}

/// Builds the seller leaderboard for `data`.
///
/// Every seller in the reference data gets exactly one row, including sellers
/// with no sales. Rows are sorted by descending profit; sellers with equal
/// profit stay in reference-data order. Each seller's bonus is their profit
/// times the rate `strategies.bonus` gives for their rank.
///
/// Purchases by unknown sellers, and line items for unknown products, are
/// skipped.
///
/// # Examples
///
/// ```
/// # use sales_leaderboard::*;
/// let data = Dataset {
///     sellers: vec![Seller::new("s1", "Ada"), Seller::new("s2", "Grace")],
///     products: vec![Product::new("p1", Usd::from_cents(1000), Some(Usd::from_cents(1500)))],
///     purchases: vec![PurchaseRecord::new("s2", vec![LineItem::new("p1", 2)])],
/// };
/// let rows = analyze(&data, &Strategies::standard()).unwrap();
/// assert_eq!(rows[0].seller_id, "s2");
/// assert_eq!(rows[0].profit, Usd::from_cents(1000));
/// assert_eq!(rows[0].bonus, Usd::from_cents(150));
/// assert_eq!(rows[1].sales_count, 0);
/// ```
///
/// # Errors
///
/// Returns [`SalesError::InvalidInput`] if there are no sellers, products,
/// or purchases, and [`SalesError::MalformedLineItem`] if revenue or profit
/// can't be calculated for a line item. No partial report is returned.
pub fn analyze<R, B>(
    data: &Dataset,
    strategies: &Strategies<R, B>,
) -> Result<Vec<ReportRow>, SalesError>
where
    R: RevenueStrategy,
    B: BonusStrategy,
{
    validate(data)?;

    let mut stats: Vec<SellerStats> = Vec::with_capacity(data.sellers.len());
    let mut sellers: HashMap<&str, usize> = HashMap::with_capacity(data.sellers.len());
    for seller in &data.sellers {
        if sellers.contains_key(seller.id.as_str()) {
            warn!(seller_id = %seller.id, "duplicate seller ignored");
            continue;
        }
        sellers.insert(&seller.id, stats.len());
        stats.push(SellerStats::new(seller));
    }

    let mut products: HashMap<&str, &Product> = HashMap::with_capacity(data.products.len());
    for product in &data.products {
        if products.contains_key(product.id.as_str()) {
            warn!(product_id = %product.id, "duplicate product ignored");
            continue;
        }
        products.insert(&product.id, product);
    }

    let mut skipped_purchases = 0usize;
    let mut skipped_items = 0usize;
    for purchase in &data.purchases {
        let Some(&i) = sellers.get(purchase.seller_id.as_str()) else {
            debug!(seller_id = %purchase.seller_id, "skipping purchase by unknown seller");
            skipped_purchases += 1;
            continue;
        };
        for item in &purchase.items {
            let Some(&product) = products.get(item.product_id.as_str()) else {
                debug!(product_id = %item.product_id, "skipping line item for unknown product");
                skipped_items += 1;
                continue;
            };
            let malformed = |source: SalesError| SalesError::MalformedLineItem {
                seller_id: purchase.seller_id.clone(),
                product_id: item.product_id.clone(),
                source: Box::new(source),
            };
            let revenue = strategies
                .revenue
                .revenue(item, product)
                .map_err(malformed)?;
            let cost = product.cost.checked_mul(item.quantity).ok_or_else(|| {
                malformed(SalesError::InvalidInput(format!(
                    "cost of {} units is out of range",
                    item.quantity
                )))
            })?;
            let profit = revenue.checked_sub(cost).ok_or_else(|| {
                malformed(SalesError::InvalidInput(format!(
                    "profit on revenue {revenue} and cost {cost} is out of range"
                )))
            })?;
            stats[i]
                .record(&item.product_id, item.quantity, revenue, profit)
                .map_err(malformed)?;
        }
    }

    stats.sort_by(|a, b| b.profit.cmp(&a.profit));

    let total = stats.len();
    let rows = stats
        .iter()
        .enumerate()
        .map(|(rank, s)| -> Result<ReportRow, SalesError> {
            let rate: Percent = strategies.bonus.bonus_rate(rank, total, s);
            let bonus = rate.checked_of(s.profit).ok_or_else(|| {
                SalesError::InvalidInput(format!(
                    "bonus of {rate} on profit {} for seller {:?} is out of range",
                    s.profit, s.seller_id
                ))
            })?;
            Ok(ReportRow {
                seller_id: s.seller_id.clone(),
                name: s.name.clone(),
                revenue: s.revenue,
                profit: s.profit,
                bonus,
                sales_count: s.sales_count,
                top_products: s.top_products(TOP_PRODUCTS),
            })
        })
        .collect::<Result<Vec<ReportRow>, SalesError>>()?;
    info!(
        sellers = total,
        purchases = data.purchases.len(),
        skipped_purchases,
        skipped_items,
        "sales analysis complete"
    );
    Ok(rows)
}

fn validate(data: &Dataset) -> Result<(), SalesError> {
    let missing = if data.sellers.is_empty() {
        "sellers"
    } else if data.products.is_empty() {
        "products"
    } else if data.purchases.is_empty() {
        "purchase records"
    } else {
        return Ok(());
    };
    Err(SalesError::InvalidInput(format!("no {missing} in dataset")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LineItem, PurchaseRecord};

    fn usd(cents: i64) -> Usd {
        Usd::from_cents(cents)
    }

    fn product(id: &str, cost: i64, price: i64) -> Product {
        Product::new(id, usd(cost), Some(usd(price)))
    }

    fn dataset() -> Dataset {
        Dataset {
            sellers: vec![
                Seller::new("s1", "Ada"),
                Seller::new("s2", "Grace"),
                Seller::new("s3", "Barbara"),
            ],
            products: vec![product("p1", 1000, 1500), product("p2", 2000, 2500)],
            purchases: vec![
                PurchaseRecord::new("s1", vec![LineItem::new("p1", 1)]),
                PurchaseRecord::new("s2", vec![LineItem::new("p2", 1)]),
                PurchaseRecord::new("s3", vec![LineItem::new("p2", 3)]),
            ],
        }
    }

    fn run(data: &Dataset) -> Vec<ReportRow> {
        analyze(data, &Strategies::standard()).unwrap()
    }

    #[test]
    fn analyze_fn_ranks_sellers_by_profit() {
        let rows = run(&dataset());
        let ids: Vec<_> = rows.iter().map(|r| r.seller_id.as_str()).collect();
        assert_eq!(ids, vec!["s3", "s1", "s2"]);
        assert_eq!(rows[0].profit, usd(1500));
        assert_eq!(rows[0].revenue, usd(7500));
        assert!(rows.windows(2).all(|w| w[0].profit >= w[1].profit));
    }

    #[test]
    fn analyze_fn_keeps_reference_order_for_equal_profits() {
        let mut data = dataset();
        data.purchases.pop();
        let rows = run(&data);
        let ids: Vec<_> = rows.iter().map(|r| r.seller_id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
        assert_eq!(rows[0].profit, usd(500));
        assert_eq!(rows[1].profit, usd(500));
        assert_eq!(rows[0].bonus, usd(75));
        assert_eq!(rows[1].bonus, usd(50));
        assert_eq!(rows[2].bonus, Usd::ZERO);
    }

    #[test]
    fn analyze_fn_reports_sellers_without_sales() {
        let mut data = dataset();
        data.sellers.push(Seller::new("s4", "Idle"));
        let rows = run(&data);
        assert_eq!(rows.len(), 4);
        let idle = rows.iter().find(|r| r.seller_id == "s4").unwrap();
        assert_eq!(idle.revenue, Usd::ZERO);
        assert_eq!(idle.sales_count, 0);
        assert!(idle.top_products.is_empty());
    }

    #[test]
    fn analyze_fn_accumulates_repeat_purchases_by_same_seller() {
        let mut data = dataset();
        data.purchases
            .push(PurchaseRecord::new("s1", vec![LineItem::new("p1", 4)]));
        let rows = run(&data);
        let s1 = rows.iter().find(|r| r.seller_id == "s1").unwrap();
        assert_eq!(s1.sales_count, 5);
        assert_eq!(s1.revenue, usd(7500));
        assert_eq!(
            s1.top_products,
            vec![TopProduct {
                product_id: "p1".into(),
                quantity: 5
            }]
        );
    }

    #[test]
    fn analyze_fn_skips_unknown_seller() {
        let mut data = dataset();
        data.purchases
            .push(PurchaseRecord::new("ghost", vec![LineItem::new("p1", 9)]));
        let rows = run(&data);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.iter().map(|r| r.sales_count).sum::<u64>(), 5);
    }

    #[test]
    fn analyze_fn_skips_unknown_product_but_keeps_siblings() {
        let mut data = dataset();
        data.purchases[0]
            .items
            .extend([LineItem::new("nope", 10), LineItem::new("p2", 2)]);
        let rows = run(&data);
        let s1 = rows.iter().find(|r| r.seller_id == "s1").unwrap();
        assert_eq!(s1.sales_count, 3);
        assert_eq!(s1.revenue, usd(1500 + 5000));
        assert_eq!(s1.profit, usd(500 + 1000));
    }

    #[test]
    fn analyze_fn_lists_top_five_products_with_ties_in_first_sold_order() {
        let products: Vec<_> = (1..=7).map(|n| product(&format!("p{n}"), 100, 200)).collect();
        let items = vec![
            LineItem::new("p1", 1),
            LineItem::new("p2", 3),
            LineItem::new("p3", 2),
            LineItem::new("p4", 3),
            LineItem::new("p5", 1),
            LineItem::new("p6", 2),
            LineItem::new("p7", 1),
        ];
        let data = Dataset {
            sellers: vec![Seller::new("s1", "Ada")],
            products,
            purchases: vec![PurchaseRecord::new("s1", items)],
        };
        let rows = run(&data);
        let top: Vec<_> = rows[0]
            .top_products
            .iter()
            .map(|p| (p.product_id.as_str(), p.quantity))
            .collect();
        assert_eq!(
            top,
            vec![("p2", 3), ("p4", 3), ("p3", 2), ("p6", 2), ("p1", 1)]
        );
    }

    #[test]
    fn analyze_fn_applies_discounts_and_negative_profit() {
        let data = Dataset {
            sellers: vec![Seller::new("s1", "Ada")],
            products: vec![product("p1", 1000, 1000)],
            purchases: vec![PurchaseRecord::new(
                "s1",
                vec![LineItem::new("p1", 2).with_discount(Percent::whole(25))],
            )],
        };
        let rows = run(&data);
        assert_eq!(rows[0].revenue, usd(1500));
        assert_eq!(rows[0].profit, usd(-500));
        assert_eq!(rows[0].bonus, usd(-75));
    }

    #[test]
    fn analyze_fn_returns_error_for_empty_collections() {
        let mut data = dataset();
        data.purchases.clear();
        let err = analyze(&data, &Strategies::standard()).unwrap_err();
        assert!(err.to_string().contains("purchase records"), "{err}");
        data.products.clear();
        let err = analyze(&data, &Strategies::standard()).unwrap_err();
        assert!(err.to_string().contains("products"), "{err}");
        let err = analyze(&Dataset::default(), &Strategies::standard()).unwrap_err();
        assert!(err.to_string().contains("sellers"), "{err}");
    }

    #[test]
    fn analyze_fn_aborts_on_malformed_line_item() {
        let mut data = dataset();
        data.purchases[1].items[0].discount = Percent::whole(150);
        let err = analyze(&data, &Strategies::standard()).unwrap_err();
        match err {
            SalesError::MalformedLineItem {
                seller_id,
                product_id,
                ..
            } => {
                assert_eq!(seller_id, "s2");
                assert_eq!(product_id, "p2");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn analyze_fn_ignores_duplicate_sellers() {
        let mut data = dataset();
        data.sellers.push(Seller::new("s1", "Impostor"));
        data.purchases
            .push(PurchaseRecord::new("s1", vec![LineItem::new("p1", 1)]));
        let rows = run(&data);
        assert_eq!(rows.len(), 3);
        let s1 = rows.iter().find(|r| r.seller_id == "s1").unwrap();
        assert_eq!(s1.name, "Ada");
        assert_eq!(s1.sales_count, 2);
    }

    #[test]
    fn analyze_fn_uses_injected_strategies() {
        let revenue = |item: &LineItem, _: &Product| -> Result<Usd, SalesError> {
            Ok(usd(10_000 * i64::from(item.quantity)))
        };
        let ranks = |rank: usize, _: usize, _: &SellerStats| Percent::whole(rank as i64 + 1);
        let rows = analyze(&dataset(), &Strategies::new(revenue, ranks)).unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.seller_id.as_str()).collect();
        assert_eq!(ids, vec!["s3", "s1", "s2"]);
        // s1: 100.00 revenue - 10.00 cost = 90.00 profit, at 2%
        assert_eq!(rows[1].profit, usd(9000));
        assert_eq!(rows[1].bonus, usd(180));
    }

    #[test]
    fn analyze_fn_is_repeatable() {
        let data = dataset();
        assert_eq!(run(&data), run(&data));
    }

    #[test]
    fn record_fn_tracks_units_per_product() {
        let mut stats = SellerStats::new(&Seller::new("s1", "Ada"));
        stats.record("p1", 2, usd(100), usd(50)).unwrap();
        stats.record("p2", 1, usd(100), usd(50)).unwrap();
        stats.record("p1", 3, usd(100), usd(50)).unwrap();
        assert_eq!(
            stats.top_products(TOP_PRODUCTS),
            vec![
                TopProduct {
                    product_id: "p1".into(),
                    quantity: 5
                },
                TopProduct {
                    product_id: "p2".into(),
                    quantity: 1
                },
            ]
        );
        assert_eq!(stats.sales_count, 6);
        assert_eq!(stats.profit, usd(150));
    }

    #[test]
    fn record_fn_leaves_totals_unchanged_on_overflow() {
        let mut stats = SellerStats::new(&Seller::new("s1", "Ada"));
        stats.record("p1", 1, usd(i64::MAX), usd(1)).unwrap();
        assert!(stats.record("p1", 1, usd(1), usd(1)).is_err());
        assert_eq!(stats.revenue, usd(i64::MAX));
        assert_eq!(stats.profit, usd(1));
        assert_eq!(stats.sales_count, 1);
    }

    #[test]
    fn analyze_fn_returns_error_when_seller_totals_overflow() {
        let data = Dataset {
            sellers: vec![Seller::new("s1", "Ada")],
            products: vec![product("p1", 0, i64::MAX / 2 + 1)],
            purchases: vec![PurchaseRecord::new(
                "s1",
                vec![LineItem::new("p1", 1), LineItem::new("p1", 1)],
            )],
        };
        let err = analyze(&data, &Strategies::standard()).unwrap_err();
        assert!(
            matches!(err, SalesError::MalformedLineItem { ref seller_id, .. } if seller_id == "s1"),
            "{err:?}"
        );
    }

    #[test]
    fn analyze_fn_returns_error_when_profit_overflows() {
        let data = Dataset {
            sellers: vec![Seller::new("s1", "Ada")],
            products: vec![product("p1", i64::MAX, 0)],
            purchases: vec![PurchaseRecord::new("s1", vec![LineItem::new("p1", 1)])],
        };
        let negative = |_: &LineItem, _: &Product| -> Result<Usd, SalesError> { Ok(usd(-2)) };
        let err = analyze(&data, &Strategies::new(negative, ProfitBonus::default())).unwrap_err();
        assert!(matches!(err, SalesError::MalformedLineItem { .. }), "{err:?}");
    }

    #[test]
    fn analyze_fn_returns_error_when_bonus_overflows() {
        let huge = |_: usize, _: usize, _: &SellerStats| Percent::from_basis_points(i64::MAX);
        let err = analyze(&dataset(), &Strategies::new(SimpleRevenue, huge)).unwrap_err();
        assert!(matches!(err, SalesError::InvalidInput(_)), "{err:?}");
    }
}
