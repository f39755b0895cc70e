use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FruitBasket {
    #[sqlx(rename = "BasketNo")]
    pub basket_no: String,
    #[sqlx(rename = "Name")]
    pub name: String,
    #[sqlx(rename = "Price")]
    pub price: f64,
}
