use parking_lot::RwLock;

use crate::model::{
    BasketWithCustomers, Course, Customer, CustomerWithBaskets, FruitBasket, Purchase, Student,
    StudentWithCourses,
};
use crate::store::error::StoreError;
use crate::store::grouping::group_rows;
use crate::store::traits::{BasketStore, CustomerStore, PurchaseStore, StoreResult, StudentStore};

#[derive(Debug, Clone)]
struct Enrollment {
    personal_no: String,
    course_code: String,
}

#[derive(Debug, Default)]
struct Tables {
    students: Vec<Student>,
    courses: Vec<Course>,
    enrollments: Vec<Enrollment>,
    customers: Vec<Customer>,
    baskets: Vec<FruitBasket>,
    purchases: Vec<Purchase>,
}

/// In-memory store with the same contract as [`crate::store::PostgresStore`]:
/// duplicate keys are rejected on save, deletes of absent keys are silent
/// no-ops, and the joined reads group in row order. Rows live in plain vecs,
/// so list and join order follow insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Courses have no standalone store surface; fixtures add them here.
    pub fn add_course(&self, course: Course) {
        self.tables.write().courses.push(course);
    }

    /// Enrolls a student in a course for the student joined read.
    pub fn enroll(&self, personal_no: &str, course_code: &str) {
        self.tables.write().enrollments.push(Enrollment {
            personal_no: personal_no.to_string(),
            course_code: course_code.to_string(),
        });
    }
}

#[async_trait::async_trait]
impl StudentStore for MemoryStore {
    async fn get_all_students(&self) -> StoreResult<Vec<Student>> {
        Ok(self.tables.read().students.clone())
    }

    async fn get_student_by_personal_no(&self, personal_no: &str) -> StoreResult<Option<Student>> {
        Ok(self
            .tables
            .read()
            .students
            .iter()
            .find(|s| s.personal_no == personal_no)
            .cloned())
    }

    async fn save_student(&self, student: &Student) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables
            .students
            .iter()
            .any(|s| s.personal_no == student.personal_no)
        {
            return Err(StoreError::Duplicate {
                entity: "student",
                key: "PersonalNo",
            });
        }
        tables.students.push(student.clone());
        Ok(())
    }

    async fn update_student(&self, student: &Student) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables
            .students
            .iter_mut()
            .find(|s| s.personal_no == student.personal_no)
        {
            *existing = student.clone();
        }
        Ok(())
    }

    async fn delete_student(&self, personal_no: &str) -> StoreResult<()> {
        self.tables
            .write()
            .students
            .retain(|s| s.personal_no != personal_no);
        Ok(())
    }

    async fn get_all_students_with_courses(&self) -> StoreResult<Vec<StudentWithCourses>> {
        let tables = self.tables.read();
        // Inner-join semantics: enrollments pointing at missing rows are
        // dropped, and unenrolled students do not appear.
        let rows: Vec<(Student, Course)> = tables
            .enrollments
            .iter()
            .filter_map(|e| {
                let student = tables
                    .students
                    .iter()
                    .find(|s| s.personal_no == e.personal_no)?;
                let course = tables
                    .courses
                    .iter()
                    .find(|c| c.course_code == e.course_code)?;
                Some((student.clone(), course.clone()))
            })
            .collect();

        Ok(group_rows(
            rows,
            |(student, _)| student.personal_no.clone(),
            |(student, _)| StudentWithCourses {
                student: student.clone(),
                courses: Vec::new(),
            },
            |group, (_, course)| group.courses.push(course),
        ))
    }
}

#[async_trait::async_trait]
impl CustomerStore for MemoryStore {
    async fn get_all_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(self.tables.read().customers.clone())
    }

    async fn get_customer_by_account_no(&self, account_no: &str) -> StoreResult<Option<Customer>> {
        Ok(self
            .tables
            .read()
            .customers
            .iter()
            .find(|c| c.account_no == account_no)
            .cloned())
    }

    async fn save_customer(&self, customer: &Customer) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables
            .customers
            .iter()
            .any(|c| c.account_no == customer.account_no)
        {
            return Err(StoreError::Duplicate {
                entity: "customer",
                key: "AccountNo",
            });
        }
        tables.customers.push(customer.clone());
        Ok(())
    }

    async fn update_customer(&self, customer: &Customer) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables
            .customers
            .iter_mut()
            .find(|c| c.account_no == customer.account_no)
        {
            *existing = customer.clone();
        }
        Ok(())
    }

    async fn delete_customer(&self, account_no: &str) -> StoreResult<()> {
        self.tables
            .write()
            .customers
            .retain(|c| c.account_no != account_no);
        Ok(())
    }

    async fn get_all_customers_with_baskets(&self) -> StoreResult<Vec<CustomerWithBaskets>> {
        let rows = self.purchase_join_rows();
        Ok(group_rows(
            rows,
            |(customer, _)| customer.account_no.clone(),
            |(customer, _)| CustomerWithBaskets {
                customer: customer.clone(),
                baskets: Vec::new(),
            },
            |group, (_, basket)| group.baskets.push(basket),
        ))
    }
}

#[async_trait::async_trait]
impl BasketStore for MemoryStore {
    async fn get_all_baskets(&self) -> StoreResult<Vec<FruitBasket>> {
        Ok(self.tables.read().baskets.clone())
    }

    async fn get_basket_by_basket_no(&self, basket_no: &str) -> StoreResult<Option<FruitBasket>> {
        Ok(self
            .tables
            .read()
            .baskets
            .iter()
            .find(|b| b.basket_no == basket_no)
            .cloned())
    }

    async fn save_basket(&self, basket: &FruitBasket) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.baskets.iter().any(|b| b.basket_no == basket.basket_no) {
            return Err(StoreError::Duplicate {
                entity: "basket",
                key: "BasketNo",
            });
        }
        tables.baskets.push(basket.clone());
        Ok(())
    }

    async fn update_basket(&self, basket: &FruitBasket) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables
            .baskets
            .iter_mut()
            .find(|b| b.basket_no == basket.basket_no)
        {
            *existing = basket.clone();
        }
        Ok(())
    }

    async fn delete_basket(&self, basket_no: &str) -> StoreResult<()> {
        self.tables
            .write()
            .baskets
            .retain(|b| b.basket_no != basket_no);
        Ok(())
    }

    async fn get_all_baskets_with_customers(&self) -> StoreResult<Vec<BasketWithCustomers>> {
        let rows = self.purchase_join_rows();
        Ok(group_rows(
            rows,
            |(_, basket)| basket.basket_no.clone(),
            |(_, basket)| BasketWithCustomers {
                basket: basket.clone(),
                customers: Vec::new(),
            },
            |group, (customer, _)| group.customers.push(customer),
        ))
    }
}

#[async_trait::async_trait]
impl PurchaseStore for MemoryStore {
    async fn get_all_purchases(&self) -> StoreResult<Vec<Purchase>> {
        Ok(self.tables.read().purchases.clone())
    }

    async fn get_purchase_by_key(
        &self,
        account_no: &str,
        basket_no: &str,
    ) -> StoreResult<Option<Purchase>> {
        Ok(self
            .tables
            .read()
            .purchases
            .iter()
            .find(|p| p.account_no == account_no && p.basket_no == basket_no)
            .cloned())
    }

    async fn save_purchase(&self, purchase: &Purchase) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.purchases.iter().any(|p| p.key() == purchase.key()) {
            return Err(StoreError::Duplicate {
                entity: "purchase",
                key: "AccountNo, BasketNo",
            });
        }
        tables.purchases.push(purchase.clone());
        Ok(())
    }

    async fn update_purchase(&self, purchase: &Purchase) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables
            .purchases
            .iter_mut()
            .find(|p| p.key() == purchase.key())
        {
            *existing = purchase.clone();
        }
        Ok(())
    }

    async fn delete_purchase(&self, account_no: &str, basket_no: &str) -> StoreResult<()> {
        self.tables
            .write()
            .purchases
            .retain(|p| !(p.account_no == account_no && p.basket_no == basket_no));
        Ok(())
    }
}

impl MemoryStore {
    /// The in-memory counterpart of the purchase join: one (customer,
    /// basket) pair per purchase row, in purchase insertion order.
    fn purchase_join_rows(&self) -> Vec<(Customer, FruitBasket)> {
        let tables = self.tables.read();
        tables
            .purchases
            .iter()
            .filter_map(|p| {
                let customer = tables
                    .customers
                    .iter()
                    .find(|c| c.account_no == p.account_no)?;
                let basket = tables.baskets.iter().find(|b| b.basket_no == p.basket_no)?;
                Some((customer.clone(), basket.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn customer(account_no: &str, name: &str) -> Customer {
        Customer {
            account_no: account_no.to_string(),
            name: name.to_string(),
            delivery_address: "123 Main St".to_string(),
        }
    }

    fn basket(basket_no: &str, price: f64) -> FruitBasket {
        FruitBasket {
            basket_no: basket_no.to_string(),
            name: format!("Basket {basket_no}"),
            price,
        }
    }

    fn purchase(account_no: &str, basket_no: &str) -> Purchase {
        Purchase {
            account_no: account_no.to_string(),
            basket_no: basket_no.to_string(),
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn save_then_get_by_key_round_trips() {
        let store = MemoryStore::new();
        let alice = customer("C1", "Alice");
        store.save_customer(&alice).await.unwrap();

        let loaded = store.get_customer_by_account_no("C1").await.unwrap();
        assert_eq!(loaded, Some(alice));
    }

    #[tokio::test]
    async fn duplicate_save_fails_and_leaves_existing_unchanged() {
        let store = MemoryStore::new();
        store.save_customer(&customer("C1", "Alice")).await.unwrap();

        let err = store
            .save_customer(&customer("C1", "Mallory"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(
            err.to_string(),
            "A customer with this AccountNo already exists."
        );

        let loaded = store
            .get_customer_by_account_no("C1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.name, "Alice");
    }

    #[tokio::test]
    async fn delete_of_absent_key_is_a_no_op() {
        let store = MemoryStore::new();
        store.save_customer(&customer("C1", "Alice")).await.unwrap();

        store.delete_customer("C9").await.unwrap();
        assert_eq!(store.get_all_customers().await.unwrap().len(), 1);

        store.delete_customer("C1").await.unwrap();
        store.delete_customer("C1").await.unwrap();
        assert!(store.get_all_customers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_of_absent_key_is_a_no_op() {
        let store = MemoryStore::new();
        store.update_customer(&customer("C1", "Alice")).await.unwrap();
        assert!(store.get_all_customers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_non_key_fields() {
        let store = MemoryStore::new();
        store.save_customer(&customer("C1", "Alice")).await.unwrap();

        store.update_customer(&customer("C1", "Alicia")).await.unwrap();
        let loaded = store
            .get_customer_by_account_no("C1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.name, "Alicia");
    }

    #[tokio::test]
    async fn composite_purchase_key_is_unique() {
        let store = MemoryStore::new();
        store.save_purchase(&purchase("C1", "B1")).await.unwrap();
        // Same account, different basket is a different key.
        store.save_purchase(&purchase("C1", "B2")).await.unwrap();

        let err = store.save_purchase(&purchase("C1", "B1")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "A purchase with this AccountNo, BasketNo already exists."
        );
    }

    #[tokio::test]
    async fn joined_read_groups_interleaved_purchases() {
        let store = MemoryStore::new();
        store.save_customer(&customer("C1", "Alice")).await.unwrap();
        store.save_customer(&customer("C2", "Bob")).await.unwrap();
        for no in ["B1", "B2", "B3"] {
            store.save_basket(&basket(no, 9.5)).await.unwrap();
        }

        // Three purchases for C1 interleaved with two for C2.
        store.save_purchase(&purchase("C1", "B1")).await.unwrap();
        store.save_purchase(&purchase("C2", "B1")).await.unwrap();
        store.save_purchase(&purchase("C1", "B2")).await.unwrap();
        store.save_purchase(&purchase("C2", "B3")).await.unwrap();
        store.save_purchase(&purchase("C1", "B3")).await.unwrap();

        let grouped = store.get_all_customers_with_baskets().await.unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].customer.account_no, "C1");
        assert_eq!(grouped[0].baskets.len(), 3);
        assert_eq!(grouped[1].customer.account_no, "C2");
        assert_eq!(grouped[1].baskets.len(), 2);

        // Related order follows row order.
        let basket_nos: Vec<&str> = grouped[0]
            .baskets
            .iter()
            .map(|b| b.basket_no.as_str())
            .collect();
        assert_eq!(basket_nos, vec!["B1", "B2", "B3"]);

        let by_basket = store.get_all_baskets_with_customers().await.unwrap();
        assert_eq!(by_basket.len(), 3);
        assert_eq!(by_basket[0].basket.basket_no, "B1");
        assert_eq!(by_basket[0].customers.len(), 2);
    }

    #[tokio::test]
    async fn unenrolled_students_are_absent_from_the_joined_read() {
        let store = MemoryStore::new();
        let s1 = Student {
            personal_no: "P1".to_string(),
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
        };
        let s2 = Student {
            personal_no: "P2".to_string(),
            name: "Kim".to_string(),
            email: "kim@example.com".to_string(),
        };
        store.save_student(&s1).await.unwrap();
        store.save_student(&s2).await.unwrap();
        store.add_course(Course {
            course_code: "DB01".to_string(),
            name: "Databases".to_string(),
            credits: 7,
        });
        store.enroll("P1", "DB01");

        let grouped = store.get_all_students_with_courses().await.unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].student.personal_no, "P1");
        assert_eq!(grouped[0].courses.len(), 1);
        assert_eq!(grouped[0].courses[0].credits, 7);
    }
}
