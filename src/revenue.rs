use crate::{
    error::SalesError,
    model::{LineItem, Product},
    percent::Percent,
    usd::{round_div, Usd},
};

/// Works out how much revenue a single line item brought in.
///
/// Any `Fn(&LineItem, &Product) -> Result<Usd, SalesError>` is a
/// `RevenueStrategy`, so a closure can stand in for [`SimpleRevenue`].
pub trait RevenueStrategy {
    /// Returns the revenue for `item`, whose product is `product`.
    ///
    /// # Errors
    ///
    /// Returns [`SalesError::InvalidInput`] if the item's numbers can't
    /// produce a revenue figure.
    fn revenue(&self, item: &LineItem, product: &Product) -> Result<Usd, SalesError>;
}

impl<F> RevenueStrategy for F
where
    F: Fn(&LineItem, &Product) -> Result<Usd, SalesError>,
{
    fn revenue(&self, item: &LineItem, product: &Product) -> Result<Usd, SalesError> {
        self(item, product)
    }
}

/// Unit price times quantity, less the percentage discount.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleRevenue;

impl RevenueStrategy for SimpleRevenue {
    fn revenue(&self, item: &LineItem, product: &Product) -> Result<Usd, SalesError> {
        calculate_revenue(item, product)
    }
}

/// Calculates `unit price * quantity * (1 - discount / 100)`, rounded to the
/// nearest cent.
///
/// The unit price is the item's own sale price if it has one, or else the
/// product's list price.
///
/// # Examples
///
/// ```
/// # use sales_leaderboard::{calculate_revenue, LineItem, Percent, Product, Usd};
/// let product = Product::new("p1", Usd::from_cents(1000), Some(Usd::from_cents(1999)));
/// let item = LineItem::new("p1", 3).with_discount(Percent::whole(10));
/// assert_eq!(calculate_revenue(&item, &product).unwrap(), Usd::from_cents(5397));
/// ```
///
/// # Errors
///
/// Returns [`SalesError::InvalidInput`] if:
/// * Neither the item nor the product has a sale price
/// * The price is negative
/// * The discount is outside 0-100%
/// * The result doesn't fit in a [`Usd`]
pub fn calculate_revenue(item: &LineItem, product: &Product) -> Result<Usd, SalesError> {
    let Some(price) = item.sale_price.or(product.sale_price) else {
        return Err(SalesError::InvalidInput(format!(
            "no sale price for product {:?}",
            product.id
        )));
    };
    if price < Usd::ZERO {
        return Err(SalesError::InvalidInput(format!(
            "negative sale price {price} for product {:?}",
            product.id
        )));
    }
    if !item.discount.is_discount() {
        return Err(SalesError::InvalidInput(format!(
            "discount {} is outside 0-100%",
            item.discount
        )));
    }
    let remaining = Percent::HUNDRED.basis_points() - item.discount.basis_points();
    let gross = i128::from(price.cents()) * i128::from(item.quantity);
    let cents = round_div(gross * i128::from(remaining), 10_000);
    i64::try_from(cents).map(Usd::from_cents).map_err(|_| {
        SalesError::InvalidInput(format!(
            "revenue for {} x {:?} is out of range",
            item.quantity, product.id
        ))
    })
}
