use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A student as stored in the registry. `personal_no` is the primary key and
/// is fixed once the row exists; edits to it are rejected before they reach
/// the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Student {
    #[sqlx(rename = "PersonalNo")]
    pub personal_no: String,
    #[sqlx(rename = "Name")]
    pub name: String,
    #[sqlx(rename = "Email")]
    pub email: String,
}
