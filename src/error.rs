use thiserror::Error;

/// Errors that abort a sales analysis.
///
/// Unknown sellers and products are not errors: records referring to them are
/// skipped.
#[derive(Error, Debug)]
pub enum SalesError {
    /// A required argument or piece of data is missing or unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A line item's numbers could not be turned into revenue or profit.
    #[error("malformed line item (seller {seller_id:?}, product {product_id:?})")]
    MalformedLineItem {
        seller_id: String,
        product_id: String,
        #[source]
        source: Box<SalesError>,
    },
}
