use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Students
        .route("/students", get(handlers::list_students::<S>))
        .route("/students", post(handlers::create_student::<S>))
        .route(
            "/students/with-courses",
            get(handlers::list_students_with_courses::<S>),
        )
        .route("/students/:personal_no", get(handlers::get_student::<S>))
        .route("/students/:personal_no", put(handlers::update_student::<S>))
        .route(
            "/students/:personal_no",
            delete(handlers::delete_student::<S>),
        )
        // Customers
        .route("/customers", get(handlers::list_customers::<S>))
        .route("/customers", post(handlers::create_customer::<S>))
        .route(
            "/customers/with-baskets",
            get(handlers::list_customers_with_baskets::<S>),
        )
        .route("/customers/:account_no", get(handlers::get_customer::<S>))
        .route("/customers/:account_no", put(handlers::update_customer::<S>))
        .route(
            "/customers/:account_no",
            delete(handlers::delete_customer::<S>),
        )
        // Baskets
        .route("/baskets", get(handlers::list_baskets::<S>))
        .route("/baskets", post(handlers::create_basket::<S>))
        .route(
            "/baskets/with-customers",
            get(handlers::list_baskets_with_customers::<S>),
        )
        .route("/baskets/:basket_no", get(handlers::get_basket::<S>))
        .route("/baskets/:basket_no", put(handlers::update_basket::<S>))
        .route("/baskets/:basket_no", delete(handlers::delete_basket::<S>))
        // Purchases (composite key in the path)
        .route("/purchases", get(handlers::list_purchases::<S>))
        .route("/purchases", post(handlers::create_purchase::<S>))
        .route(
            "/purchases/:account_no/:basket_no",
            get(handlers::get_purchase::<S>),
        )
        .route(
            "/purchases/:account_no/:basket_no",
            put(handlers::update_purchase::<S>),
        )
        .route(
            "/purchases/:account_no/:basket_no",
            delete(handlers::delete_purchase::<S>),
        )
}
