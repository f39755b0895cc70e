use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

use crate::model::{
    BasketWithCustomers, Course, Customer, CustomerWithBaskets, FruitBasket, Purchase, Student,
    StudentWithCourses,
};
use crate::store::error::StoreError;
use crate::store::grouping::group_rows;
use crate::store::traits::{BasketStore, CustomerStore, PurchaseStore, StoreResult, StudentStore};

/// SQLSTATE reported by Postgres for a unique-constraint violation; the
/// store-level signal that a primary key already exists.
const UNIQUE_VIOLATION: &str = "23505";

/// Store backed by PostgreSQL. Every operation issues exactly one call to a
/// named server-side procedure: result sets come from set-returning
/// functions (`SELECT * FROM usp...()`), mutations go through procedures
/// (`CALL usp...`). Procedure names and parameter order are fixed so the
/// database side can be swapped for any implementation with the same
/// surface.
///
/// Connections are pooled; each operation checks one out for the duration
/// of its single statement and returns it on every exit path.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Applies the embedded migrations (tables plus the stored-procedure
    /// surface), so a fresh database is usable without manual setup.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Classifies an insert failure: a unique violation on the key becomes
/// [`StoreError::Duplicate`], anything else stays a generic access error.
fn insert_error(
    e: sqlx::Error,
    entity: &'static str,
    key: &'static str,
    context: &str,
) -> StoreError {
    let unique_violation = e
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == UNIQUE_VIOLATION)
        .unwrap_or(false);

    if unique_violation {
        StoreError::Duplicate { entity, key }
    } else {
        StoreError::access(context)(e)
    }
}

/// One row of the student/course enrollment join.
#[derive(Debug, FromRow)]
struct StudentCourseRow {
    #[sqlx(rename = "StudentPersonalNo")]
    personal_no: String,
    #[sqlx(rename = "StudentName")]
    name: String,
    #[sqlx(rename = "StudentEmail")]
    email: String,
    #[sqlx(rename = "CourseCode")]
    course_code: String,
    #[sqlx(rename = "CourseName")]
    course_name: String,
    #[sqlx(rename = "CourseCredits")]
    credits: i32,
}

/// One row of the purchase join, shared by the customer-with-baskets and
/// basket-with-customers reads.
#[derive(Debug, FromRow)]
struct PurchaseJoinRow {
    #[sqlx(rename = "AccountNo")]
    account_no: String,
    #[sqlx(rename = "CustomerName")]
    customer_name: String,
    #[sqlx(rename = "DeliveryAddress")]
    delivery_address: String,
    #[sqlx(rename = "BasketNo")]
    basket_no: String,
    #[sqlx(rename = "BasketName")]
    basket_name: String,
    #[sqlx(rename = "Price")]
    price: f64,
}

impl PurchaseJoinRow {
    fn customer(&self) -> Customer {
        Customer {
            account_no: self.account_no.clone(),
            name: self.customer_name.clone(),
            delivery_address: self.delivery_address.clone(),
        }
    }

    fn basket(&self) -> FruitBasket {
        FruitBasket {
            basket_no: self.basket_no.clone(),
            name: self.basket_name.clone(),
            price: self.price,
        }
    }
}

#[async_trait::async_trait]
impl StudentStore for PostgresStore {
    async fn get_all_students(&self) -> StoreResult<Vec<Student>> {
        sqlx::query_as::<_, Student>("SELECT * FROM uspGetAllStudents()")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::access("Error fetching all students"))
    }

    async fn get_student_by_personal_no(&self, personal_no: &str) -> StoreResult<Option<Student>> {
        sqlx::query_as::<_, Student>("SELECT * FROM uspGetStudentByPersonalNo($1)")
            .bind(personal_no)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::access(format!(
                "Error fetching student with PersonalNo: {personal_no}"
            )))
    }

    async fn save_student(&self, student: &Student) -> StoreResult<()> {
        sqlx::query("CALL uspInsertStudent($1, $2, $3)")
            .bind(&student.personal_no)
            .bind(&student.name)
            .bind(&student.email)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                insert_error(
                    e,
                    "student",
                    "PersonalNo",
                    &format!("Error saving student: {}", student.personal_no),
                )
            })?;
        Ok(())
    }

    async fn update_student(&self, student: &Student) -> StoreResult<()> {
        sqlx::query("CALL uspUpdateStudent($1, $2, $3)")
            .bind(&student.personal_no)
            .bind(&student.name)
            .bind(&student.email)
            .execute(&self.pool)
            .await
            .map_err(StoreError::access(format!(
                "Error updating student: {}",
                student.personal_no
            )))?;
        Ok(())
    }

    async fn delete_student(&self, personal_no: &str) -> StoreResult<()> {
        sqlx::query("CALL uspDeleteStudent($1)")
            .bind(personal_no)
            .execute(&self.pool)
            .await
            .map_err(StoreError::access(format!(
                "Error deleting student with PersonalNo: {personal_no}"
            )))?;
        Ok(())
    }

    async fn get_all_students_with_courses(&self) -> StoreResult<Vec<StudentWithCourses>> {
        let rows =
            sqlx::query_as::<_, StudentCourseRow>("SELECT * FROM uspGetAllStudentsWithDepartments()")
                .fetch_all(&self.pool)
                .await
                .map_err(StoreError::access(
                    "Error fetching students and their courses",
                ))?;

        Ok(group_rows(
            rows,
            |row| row.personal_no.clone(),
            |row| StudentWithCourses {
                student: Student {
                    personal_no: row.personal_no.clone(),
                    name: row.name.clone(),
                    email: row.email.clone(),
                },
                courses: Vec::new(),
            },
            |group, row| {
                group.courses.push(Course {
                    course_code: row.course_code,
                    name: row.course_name,
                    credits: row.credits,
                });
            },
        ))
    }
}

#[async_trait::async_trait]
impl CustomerStore for PostgresStore {
    async fn get_all_customers(&self) -> StoreResult<Vec<Customer>> {
        sqlx::query_as::<_, Customer>("SELECT * FROM uspGetAllCustomers()")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::access("Error fetching all customers"))
    }

    async fn get_customer_by_account_no(&self, account_no: &str) -> StoreResult<Option<Customer>> {
        sqlx::query_as::<_, Customer>("SELECT * FROM uspGetCustomerByAccountNo($1)")
            .bind(account_no)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::access(format!(
                "Error fetching customer with AccountNo: {account_no}"
            )))
    }

    async fn save_customer(&self, customer: &Customer) -> StoreResult<()> {
        sqlx::query("CALL uspAddCustomer($1, $2, $3)")
            .bind(&customer.account_no)
            .bind(&customer.name)
            .bind(&customer.delivery_address)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                insert_error(
                    e,
                    "customer",
                    "AccountNo",
                    &format!("Error saving customer: {}", customer.account_no),
                )
            })?;
        Ok(())
    }

    async fn update_customer(&self, customer: &Customer) -> StoreResult<()> {
        sqlx::query("CALL uspUpdateCustomer($1, $2, $3)")
            .bind(&customer.account_no)
            .bind(&customer.name)
            .bind(&customer.delivery_address)
            .execute(&self.pool)
            .await
            .map_err(StoreError::access(format!(
                "Error updating customer: {}",
                customer.account_no
            )))?;
        Ok(())
    }

    async fn delete_customer(&self, account_no: &str) -> StoreResult<()> {
        sqlx::query("CALL uspDeleteCustomer($1)")
            .bind(account_no)
            .execute(&self.pool)
            .await
            .map_err(StoreError::access(format!(
                "Error deleting customer with AccountNo: {account_no}"
            )))?;
        Ok(())
    }

    async fn get_all_customers_with_baskets(&self) -> StoreResult<Vec<CustomerWithBaskets>> {
        let rows = sqlx::query_as::<_, PurchaseJoinRow>("SELECT * FROM uspGetAllPurchases()")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::access(
                "Error fetching customers and their baskets",
            ))?;

        Ok(group_rows(
            rows,
            |row| row.account_no.clone(),
            |row| CustomerWithBaskets {
                customer: row.customer(),
                baskets: Vec::new(),
            },
            |group, row| group.baskets.push(row.basket()),
        ))
    }
}

#[async_trait::async_trait]
impl BasketStore for PostgresStore {
    async fn get_all_baskets(&self) -> StoreResult<Vec<FruitBasket>> {
        sqlx::query_as::<_, FruitBasket>("SELECT * FROM uspGetAllBaskets()")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::access("Error fetching all baskets"))
    }

    async fn get_basket_by_basket_no(&self, basket_no: &str) -> StoreResult<Option<FruitBasket>> {
        sqlx::query_as::<_, FruitBasket>("SELECT * FROM uspGetBasketByBasketNo($1)")
            .bind(basket_no)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::access(format!(
                "Error fetching basket with BasketNo: {basket_no}"
            )))
    }

    async fn save_basket(&self, basket: &FruitBasket) -> StoreResult<()> {
        sqlx::query("CALL uspAddBasket($1, $2, $3)")
            .bind(&basket.basket_no)
            .bind(&basket.name)
            .bind(basket.price)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                insert_error(
                    e,
                    "basket",
                    "BasketNo",
                    &format!("Error saving basket: {}", basket.basket_no),
                )
            })?;
        Ok(())
    }

    async fn update_basket(&self, basket: &FruitBasket) -> StoreResult<()> {
        sqlx::query("CALL uspUpdateBasket($1, $2, $3)")
            .bind(&basket.basket_no)
            .bind(&basket.name)
            .bind(basket.price)
            .execute(&self.pool)
            .await
            .map_err(StoreError::access(format!(
                "Error updating basket: {}",
                basket.basket_no
            )))?;
        Ok(())
    }

    async fn delete_basket(&self, basket_no: &str) -> StoreResult<()> {
        sqlx::query("CALL uspDeleteBasket($1)")
            .bind(basket_no)
            .execute(&self.pool)
            .await
            .map_err(StoreError::access(format!(
                "Error deleting basket with BasketNo: {basket_no}"
            )))?;
        Ok(())
    }

    async fn get_all_baskets_with_customers(&self) -> StoreResult<Vec<BasketWithCustomers>> {
        let rows = sqlx::query_as::<_, PurchaseJoinRow>("SELECT * FROM uspGetAllPurchases()")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::access(
                "Error fetching baskets and their customers",
            ))?;

        Ok(group_rows(
            rows,
            |row| row.basket_no.clone(),
            |row| BasketWithCustomers {
                basket: row.basket(),
                customers: Vec::new(),
            },
            |group, row| group.customers.push(row.customer()),
        ))
    }
}

#[async_trait::async_trait]
impl PurchaseStore for PostgresStore {
    async fn get_all_purchases(&self) -> StoreResult<Vec<Purchase>> {
        // The purchase list reuses the joined read and consumes only the
        // key and date columns.
        sqlx::query_as::<_, Purchase>("SELECT * FROM uspGetAllPurchases()")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::access("Error fetching all purchases"))
    }

    async fn get_purchase_by_key(
        &self,
        account_no: &str,
        basket_no: &str,
    ) -> StoreResult<Option<Purchase>> {
        sqlx::query_as::<_, Purchase>("SELECT * FROM uspGetPurchaseByAccountNoBasketNo($1, $2)")
            .bind(account_no)
            .bind(basket_no)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::access(format!(
                "Error fetching purchase with AccountNo: {account_no}, BasketNo: {basket_no}"
            )))
    }

    async fn save_purchase(&self, purchase: &Purchase) -> StoreResult<()> {
        // uspAddPurchase takes the basket number first; the order is part
        // of the procedure surface and must not be normalized.
        sqlx::query("CALL uspAddPurchase($1, $2, $3)")
            .bind(&purchase.basket_no)
            .bind(&purchase.account_no)
            .bind(purchase.purchase_date)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                insert_error(
                    e,
                    "purchase",
                    "AccountNo, BasketNo",
                    &format!(
                        "Error saving purchase {}, {}",
                        purchase.account_no, purchase.basket_no
                    ),
                )
            })?;
        Ok(())
    }

    async fn update_purchase(&self, purchase: &Purchase) -> StoreResult<()> {
        sqlx::query("CALL uspUpdatePurchase($1, $2, $3)")
            .bind(&purchase.account_no)
            .bind(&purchase.basket_no)
            .bind(purchase.purchase_date)
            .execute(&self.pool)
            .await
            .map_err(StoreError::access(format!(
                "Error updating purchase: {}, {}",
                purchase.account_no, purchase.basket_no
            )))?;
        Ok(())
    }

    async fn delete_purchase(&self, account_no: &str, basket_no: &str) -> StoreResult<()> {
        sqlx::query("CALL uspDeletePurchase($1, $2)")
            .bind(account_no)
            .bind(basket_no)
            .execute(&self.pool)
            .await
            .map_err(StoreError::access(format!(
                "Error deleting purchase with AccountNo: {account_no}, BasketNo: {basket_no}"
            )))?;
        Ok(())
    }
}
