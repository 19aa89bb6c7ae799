use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize};

use std::{collections::HashMap, path::Path};

use crate::{
    model::{Dataset, LineItem, Product, PurchaseRecord, Seller},
    percent::Percent,
    usd::Usd,
};

/// Defines the CSV format for purchase data: one row per line item.
#[derive(Debug, Deserialize)]
struct PurchaseRow {
    receipt_id: String,
    seller_id: String,
    #[serde(alias = "sku")]
    product_id: String,
    quantity: u32,
    #[serde(default)]
    discount: Option<Percent>,
    #[serde(default)]
    sale_price: Option<Usd>,
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("{}", path.display()))?;
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result.with_context(|| format!("{}", path.display()))?);
    }
    Ok(rows)
}

/// Reads the seller reference data from the CSV file at `path`.
///
/// The file needs an `id` column, and either `name` or `first_name` and
/// `last_name`. The `experience`, `performance`, and `loyalty` columns are
/// optional.
///
/// # Errors
///
/// Returns any errors from opening or parsing the file.
pub fn read_sellers(path: impl AsRef<Path>) -> Result<Vec<Seller>> {
    read_rows(path.as_ref())
}

/// Reads the product reference data from the CSV file at `path`.
///
/// The file needs `id` (or `sku`) and `cost` (or `cost_price`, or
/// `purchase_price`) columns, and may have a `sale_price` column.
///
/// # Errors
///
/// Returns any errors from opening or parsing the file.
pub fn read_products(path: impl AsRef<Path>) -> Result<Vec<Product>> {
    read_rows(path.as_ref())
}

/// Reads purchase records from the CSV file at `path`.
///
/// Each row is one line item, with `receipt_id`, `seller_id`, `product_id`
/// (or `sku`), and `quantity` columns, plus optional `discount` and
/// `sale_price`. Rows sharing a `receipt_id` are gathered into one
/// [`PurchaseRecord`], in order of the receipt's first appearance.
///
/// # Errors
///
/// Returns errors if:
/// * The file cannot be opened
/// * A row cannot be parsed
/// * Two rows with the same `receipt_id` name different sellers
pub fn read_purchases(path: impl AsRef<Path>) -> Result<Vec<PurchaseRecord>> {
    let path = path.as_ref();
    let mut purchases: Vec<PurchaseRecord> = Vec::new();
    let mut receipts: HashMap<String, usize> = HashMap::new();
    for row in read_rows::<PurchaseRow>(path)? {
        let item = LineItem {
            product_id: row.product_id,
            quantity: row.quantity,
            discount: row.discount.unwrap_or_default(),
            sale_price: row.sale_price,
        };
        match receipts.get(&row.receipt_id) {
            Some(&i) => {
                if purchases[i].seller_id != row.seller_id {
                    bail!(
                        "reading {}: receipt {} has sellers {} and {}",
                        path.display(),
                        row.receipt_id,
                        purchases[i].seller_id,
                        row.seller_id,
                    );
                }
                purchases[i].items.push(item);
            }
            None => {
                receipts.insert(row.receipt_id, purchases.len());
                purchases.push(PurchaseRecord::new(row.seller_id, vec![item]));
            }
        }
    }
    Ok(purchases)
}

/// Reads a whole [`Dataset`] from its three CSV files.
///
/// # Errors
///
/// Returns any errors from [`read_sellers`], [`read_products`], or
/// [`read_purchases`].
pub fn read_dataset(
    sellers: impl AsRef<Path>,
    products: impl AsRef<Path>,
    purchases: impl AsRef<Path>,
) -> Result<Dataset> {
    Ok(Dataset {
        sellers: read_sellers(sellers)?,
        products: read_products(products)?,
        purchases: read_purchases(purchases)?,
    })
}
