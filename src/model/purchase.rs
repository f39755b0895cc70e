use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A purchase links a customer to a fruit basket. The key is the
/// (account_no, basket_no) pair; the store enforces its uniqueness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Purchase {
    #[sqlx(rename = "AccountNo")]
    pub account_no: String,
    #[sqlx(rename = "BasketNo")]
    pub basket_no: String,
    #[sqlx(rename = "PurchaseDate")]
    pub purchase_date: NaiveDate,
}

impl Purchase {
    /// The composite key as a comparable tuple.
    pub fn key(&self) -> (&str, &str) {
        (&self.account_no, &self.basket_no)
    }
}
