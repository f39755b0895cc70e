use crate::model::{
    BasketWithCustomers, Customer, CustomerWithBaskets, FruitBasket, Purchase, Student,
    StudentWithCourses,
};
use crate::store::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-entity access contract, uniform across entities:
///
/// - `get_all_*` returns every row, empty vec (never an error) on none;
/// - `get_*_by_*` returns `None` (not an error) when the key is absent;
/// - `save_*` fails with [`StoreError::Duplicate`] when the key exists;
/// - `update_*` is keyed by the record's current key fields and assumes the
///   caller has already verified the key is unchanged; that check is a
///   caller-side precondition, not a store responsibility;
/// - `delete_*` on an absent key is a silent no-op;
/// - `get_all_*_with_*` runs the joined read and groups rows client-side.
#[async_trait::async_trait]
pub trait StudentStore: Send + Sync {
    async fn get_all_students(&self) -> StoreResult<Vec<Student>>;
    async fn get_student_by_personal_no(&self, personal_no: &str) -> StoreResult<Option<Student>>;
    async fn save_student(&self, student: &Student) -> StoreResult<()>;
    async fn update_student(&self, student: &Student) -> StoreResult<()>;
    async fn delete_student(&self, personal_no: &str) -> StoreResult<()>;
    async fn get_all_students_with_courses(&self) -> StoreResult<Vec<StudentWithCourses>>;
}

#[async_trait::async_trait]
pub trait CustomerStore: Send + Sync {
    async fn get_all_customers(&self) -> StoreResult<Vec<Customer>>;
    async fn get_customer_by_account_no(&self, account_no: &str) -> StoreResult<Option<Customer>>;
    async fn save_customer(&self, customer: &Customer) -> StoreResult<()>;
    async fn update_customer(&self, customer: &Customer) -> StoreResult<()>;
    async fn delete_customer(&self, account_no: &str) -> StoreResult<()>;
    async fn get_all_customers_with_baskets(&self) -> StoreResult<Vec<CustomerWithBaskets>>;
}

#[async_trait::async_trait]
pub trait BasketStore: Send + Sync {
    async fn get_all_baskets(&self) -> StoreResult<Vec<FruitBasket>>;
    async fn get_basket_by_basket_no(&self, basket_no: &str) -> StoreResult<Option<FruitBasket>>;
    async fn save_basket(&self, basket: &FruitBasket) -> StoreResult<()>;
    async fn update_basket(&self, basket: &FruitBasket) -> StoreResult<()>;
    async fn delete_basket(&self, basket_no: &str) -> StoreResult<()>;
    async fn get_all_baskets_with_customers(&self) -> StoreResult<Vec<BasketWithCustomers>>;
}

#[async_trait::async_trait]
pub trait PurchaseStore: Send + Sync {
    async fn get_all_purchases(&self) -> StoreResult<Vec<Purchase>>;
    async fn get_purchase_by_key(
        &self,
        account_no: &str,
        basket_no: &str,
    ) -> StoreResult<Option<Purchase>>;
    async fn save_purchase(&self, purchase: &Purchase) -> StoreResult<()>;
    async fn update_purchase(&self, purchase: &Purchase) -> StoreResult<()>;
    async fn delete_purchase(&self, account_no: &str, basket_no: &str) -> StoreResult<()>;
}

pub trait Store: StudentStore + CustomerStore + BasketStore + PurchaseStore + Send + Sync {}

impl<T: StudentStore + CustomerStore + BasketStore + PurchaseStore> Store for T {}
