use serde::Deserialize;

use crate::{percent::Percent, usd::Usd};

/// A seller, as listed in the reference data.
///
/// The display name is either given whole in `name`, or composed from
/// `first_name` and `last_name`. The optional `experience`, `performance`, and
/// `loyalty` attributes feed bonus modifiers.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Seller {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Years of experience.
    #[serde(default)]
    pub experience: Option<f64>,
    /// Performance score, out of 100.
    #[serde(default)]
    pub performance: Option<f64>,
    /// Loyalty coefficient, from 0 to 1.
    #[serde(default)]
    pub loyalty: Option<f64>,
}

impl Seller {
    /// Creates a seller with the given id and whole display name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns the name to show for this seller.
    ///
    /// ```
    /// # use sales_leaderboard::Seller;
    /// let seller = Seller {
    ///     id: "seller_1".into(),
    ///     first_name: Some("Ada".into()),
    ///     last_name: Some("Lovelace".into()),
    ///     ..Seller::default()
    /// };
    /// assert_eq!(seller.display_name(), "Ada Lovelace");
    /// ```
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let parts: Vec<&str> = [&self.first_name, &self.last_name]
            .into_iter()
            .filter_map(|p| p.as_deref().map(str::trim))
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            self.id.clone()
        } else {
            parts.join(" ")
        }
    }
}

/// A product, as listed in the reference data.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Product {
    #[serde(alias = "sku")]
    pub id: String,
    /// What the product costs the business, per unit.
    #[serde(alias = "cost_price", alias = "purchase_price")]
    pub cost: Usd,
    /// The list price, used when a line item doesn't carry its own.
    #[serde(default)]
    pub sale_price: Option<Usd>,
}

impl Product {
    #[must_use]
    pub fn new(id: impl Into<String>, cost: Usd, sale_price: Option<Usd>) -> Self {
        Self {
            id: id.into(),
            cost,
            sale_price,
        }
    }
}

/// One product, quantity, and discount within a purchase.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem {
    pub product_id: String,
    pub quantity: u32,
    pub discount: Percent,
    /// The price actually charged per unit, if it differs from the list price.
    pub sale_price: Option<Usd>,
}

impl LineItem {
    /// Creates an undiscounted line item sold at the product's list price.
    #[must_use]
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            discount: Percent::ZERO,
            sale_price: None,
        }
    }

    #[must_use]
    pub fn with_discount(mut self, discount: Percent) -> Self {
        self.discount = discount;
        self
    }

    #[must_use]
    pub fn with_sale_price(mut self, price: Usd) -> Self {
        self.sale_price = Some(price);
        self
    }
}

/// A purchase (receipt) made through one seller.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseRecord {
    pub seller_id: String,
    pub items: Vec<LineItem>,
}

impl PurchaseRecord {
    #[must_use]
    pub fn new(seller_id: impl Into<String>, items: Vec<LineItem>) -> Self {
        Self {
            seller_id: seller_id.into(),
            items,
        }
    }
}

/// All the data needed for one analysis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    pub sellers: Vec<Seller>,
    pub products: Vec<Product>,
    pub purchases: Vec<PurchaseRecord>,
}
