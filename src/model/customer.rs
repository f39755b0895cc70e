use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    #[sqlx(rename = "AccountNo")]
    pub account_no: String,
    #[sqlx(rename = "Name")]
    pub name: String,
    // The base table exposes this column as plain "Address"; the purchase
    // join renames it to "DeliveryAddress".
    #[sqlx(rename = "Address")]
    pub delivery_address: String,
}
