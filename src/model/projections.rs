//! Read-only projections produced by the joined reads.
//!
//! These are deliberately separate types rather than related-record lists on
//! the base entities: they exist only as query results, are rebuilt on every
//! call, and carry no illusion of a live object graph.

use serde::{Deserialize, Serialize};

use crate::model::{Course, Customer, FruitBasket, Student};

/// A student together with every course they are enrolled in, grouped from
/// the flat enrollment join. Course order follows row order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentWithCourses {
    #[serde(flatten)]
    pub student: Student,
    pub courses: Vec<Course>,
}

/// A customer together with every basket they have purchased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerWithBaskets {
    #[serde(flatten)]
    pub customer: Customer,
    pub baskets: Vec<FruitBasket>,
}

/// A basket together with every customer who has purchased it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketWithCustomers {
    #[serde(flatten)]
    pub basket: FruitBasket,
    pub customers: Vec<Customer>,
}
