use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::logic::{ensure_key_unchanged, EditError, Editable};
use crate::model::{
    BasketWithCustomers, Customer, CustomerWithBaskets, FruitBasket, Purchase, Student,
    StudentWithCourses,
};
use crate::store::{Store, StoreError};

pub type AppState<S> = Arc<S>;

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListResponse<T> {
    fn new(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Duplicate keys are conflicts; anything else from the store is an
/// internal error. The message is the error's own human-readable text.
fn store_error(e: StoreError) -> ApiError {
    let status = if e.is_duplicate() {
        StatusCode::CONFLICT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ErrorResponse::new(&e.to_string())))
}

/// Client-side precondition failures never reached the store; they are the
/// caller's mistake.
fn edit_error(e: EditError) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(&e.to_string())))
}

fn not_found(message: String) -> ApiError {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new(&message)))
}

// ---- Students ----

pub async fn list_students<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<ListResponse<Student>>, ApiError> {
    let students = store.get_all_students().await.map_err(store_error)?;
    Ok(Json(ListResponse::new(students)))
}

pub async fn list_students_with_courses<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<ListResponse<StudentWithCourses>>, ApiError> {
    let students = store
        .get_all_students_with_courses()
        .await
        .map_err(store_error)?;
    Ok(Json(ListResponse::new(students)))
}

pub async fn get_student<S: Store>(
    State(store): State<AppState<S>>,
    Path(personal_no): Path<String>,
) -> Result<Json<Student>, ApiError> {
    store
        .get_student_by_personal_no(&personal_no)
        .await
        .map_err(store_error)?
        .map(Json)
        .ok_or_else(|| not_found(format!("No student with PersonalNo: {personal_no}")))
}

pub async fn create_student<S: Store>(
    State(store): State<AppState<S>>,
    Json(student): Json<Student>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    store.save_student(&student).await.map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn update_student<S: Store>(
    State(store): State<AppState<S>>,
    Path(personal_no): Path<String>,
    Json(student): Json<Student>,
) -> Result<Json<Student>, ApiError> {
    // The path names the record as loaded; the body carries the edit.
    ensure_key_unchanged(&personal_no, &student.personal_no, Student::KEY_DESC)
        .map_err(edit_error)?;
    store.update_student(&student).await.map_err(store_error)?;
    Ok(Json(student))
}

pub async fn delete_student<S: Store>(
    State(store): State<AppState<S>>,
    Path(personal_no): Path<String>,
) -> Result<StatusCode, ApiError> {
    store
        .delete_student(&personal_no)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Customers ----

pub async fn list_customers<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<ListResponse<Customer>>, ApiError> {
    let customers = store.get_all_customers().await.map_err(store_error)?;
    Ok(Json(ListResponse::new(customers)))
}

pub async fn list_customers_with_baskets<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<ListResponse<CustomerWithBaskets>>, ApiError> {
    let customers = store
        .get_all_customers_with_baskets()
        .await
        .map_err(store_error)?;
    Ok(Json(ListResponse::new(customers)))
}

pub async fn get_customer<S: Store>(
    State(store): State<AppState<S>>,
    Path(account_no): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    store
        .get_customer_by_account_no(&account_no)
        .await
        .map_err(store_error)?
        .map(Json)
        .ok_or_else(|| not_found(format!("No customer with AccountNo: {account_no}")))
}

pub async fn create_customer<S: Store>(
    State(store): State<AppState<S>>,
    Json(customer): Json<Customer>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    store.save_customer(&customer).await.map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update_customer<S: Store>(
    State(store): State<AppState<S>>,
    Path(account_no): Path<String>,
    Json(customer): Json<Customer>,
) -> Result<Json<Customer>, ApiError> {
    ensure_key_unchanged(&account_no, &customer.account_no, Customer::KEY_DESC)
        .map_err(edit_error)?;
    store.update_customer(&customer).await.map_err(store_error)?;
    Ok(Json(customer))
}

pub async fn delete_customer<S: Store>(
    State(store): State<AppState<S>>,
    Path(account_no): Path<String>,
) -> Result<StatusCode, ApiError> {
    store
        .delete_customer(&account_no)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Baskets ----

pub async fn list_baskets<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<ListResponse<FruitBasket>>, ApiError> {
    let baskets = store.get_all_baskets().await.map_err(store_error)?;
    Ok(Json(ListResponse::new(baskets)))
}

pub async fn list_baskets_with_customers<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<ListResponse<BasketWithCustomers>>, ApiError> {
    let baskets = store
        .get_all_baskets_with_customers()
        .await
        .map_err(store_error)?;
    Ok(Json(ListResponse::new(baskets)))
}

pub async fn get_basket<S: Store>(
    State(store): State<AppState<S>>,
    Path(basket_no): Path<String>,
) -> Result<Json<FruitBasket>, ApiError> {
    store
        .get_basket_by_basket_no(&basket_no)
        .await
        .map_err(store_error)?
        .map(Json)
        .ok_or_else(|| not_found(format!("No basket with BasketNo: {basket_no}")))
}

pub async fn create_basket<S: Store>(
    State(store): State<AppState<S>>,
    Json(basket): Json<FruitBasket>,
) -> Result<(StatusCode, Json<FruitBasket>), ApiError> {
    store.save_basket(&basket).await.map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(basket)))
}

pub async fn update_basket<S: Store>(
    State(store): State<AppState<S>>,
    Path(basket_no): Path<String>,
    Json(basket): Json<FruitBasket>,
) -> Result<Json<FruitBasket>, ApiError> {
    ensure_key_unchanged(&basket_no, &basket.basket_no, FruitBasket::KEY_DESC)
        .map_err(edit_error)?;
    store.update_basket(&basket).await.map_err(store_error)?;
    Ok(Json(basket))
}

pub async fn delete_basket<S: Store>(
    State(store): State<AppState<S>>,
    Path(basket_no): Path<String>,
) -> Result<StatusCode, ApiError> {
    store.delete_basket(&basket_no).await.map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Purchases ----

pub async fn list_purchases<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<ListResponse<Purchase>>, ApiError> {
    let purchases = store.get_all_purchases().await.map_err(store_error)?;
    Ok(Json(ListResponse::new(purchases)))
}

pub async fn get_purchase<S: Store>(
    State(store): State<AppState<S>>,
    Path((account_no, basket_no)): Path<(String, String)>,
) -> Result<Json<Purchase>, ApiError> {
    store
        .get_purchase_by_key(&account_no, &basket_no)
        .await
        .map_err(store_error)?
        .map(Json)
        .ok_or_else(|| {
            not_found(format!(
                "No purchase with AccountNo: {account_no}, BasketNo: {basket_no}"
            ))
        })
}

pub async fn create_purchase<S: Store>(
    State(store): State<AppState<S>>,
    Json(purchase): Json<Purchase>,
) -> Result<(StatusCode, Json<Purchase>), ApiError> {
    store.save_purchase(&purchase).await.map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

pub async fn update_purchase<S: Store>(
    State(store): State<AppState<S>>,
    Path((account_no, basket_no)): Path<(String, String)>,
    Json(purchase): Json<Purchase>,
) -> Result<Json<Purchase>, ApiError> {
    ensure_key_unchanged(
        (&account_no, &basket_no),
        (&purchase.account_no, &purchase.basket_no),
        Purchase::KEY_DESC,
    )
    .map_err(edit_error)?;
    store.update_purchase(&purchase).await.map_err(store_error)?;
    Ok(Json(purchase))
}

pub async fn delete_purchase<S: Store>(
    State(store): State<AppState<S>>,
    Path((account_no, basket_no)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    store
        .delete_purchase(&account_no, &basket_no)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}
