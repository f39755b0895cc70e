use std::sync::Arc;

use fruitdesk::model::Course;
use fruitdesk::routes::create_router;
use fruitdesk::store::MemoryStore;
use reqwest::Client;
use serde_json::{json, Value};

// Test client wrapper for making API calls
struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn put(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .put(format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    async fn delete(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .delete(format!("{}{}", self.base_url, path))
            .send()
            .await
    }
}

/// Boots the router over an in-memory store on an OS-assigned port and
/// returns a client for it, plus the store handle for fixtures the API has
/// no surface for (courses and enrollments).
async fn spawn_server() -> (TestClient, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let app = create_router().with_state(store.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("listener has no local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server crashed");
    });

    (TestClient::new(format!("http://{addr}")), store)
}

async fn error_message(resp: reqwest::Response) -> String {
    let body: Value = resp.json().await.expect("error body is not JSON");
    body["error"].as_str().expect("missing error field").to_string()
}

#[tokio::test]
async fn health_check_responds() {
    let (client, _store) = spawn_server().await;

    let resp = client.get("/health").await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn customer_lifecycle() {
    let (client, _store) = spawn_server().await;

    // Starts empty, not missing.
    let resp = client.get("/customers").await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 0);

    let alice = json!({
        "account_no": "C1",
        "name": "Alice",
        "delivery_address": "123 Main St"
    });
    let resp = client.post("/customers", alice.clone()).await.unwrap();
    assert_eq!(resp.status(), 201);

    let resp = client.get("/customers").await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0], alice);

    // Update with the key unchanged goes through.
    let alicia = json!({
        "account_no": "C1",
        "name": "Alicia",
        "delivery_address": "123 Main St"
    });
    let resp = client.put("/customers/C1", alicia.clone()).await.unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client.get("/customers/C1").await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "Alicia");

    // Changing the key is rejected before the store is touched.
    let renamed_key = json!({
        "account_no": "C2",
        "name": "Alicia",
        "delivery_address": "123 Main St"
    });
    let resp = client.put("/customers/C1", renamed_key).await.unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(
        error_message(resp).await,
        "Cannot update the customer account number!"
    );

    let resp = client.get("/customers/C1").await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "Alicia");

    // Deletes are idempotent.
    assert_eq!(client.delete("/customers/C1").await.unwrap().status(), 204);
    assert_eq!(client.delete("/customers/C1").await.unwrap().status(), 204);
    assert_eq!(client.get("/customers/C1").await.unwrap().status(), 404);
}

#[tokio::test]
async fn duplicate_customer_is_a_conflict() {
    let (client, _store) = spawn_server().await;

    let alice = json!({
        "account_no": "C1",
        "name": "Alice",
        "delivery_address": "123 Main St"
    });
    assert_eq!(client.post("/customers", alice.clone()).await.unwrap().status(), 201);

    let resp = client.post("/customers", alice).await.unwrap();
    assert_eq!(resp.status(), 409);
    assert_eq!(
        error_message(resp).await,
        "A customer with this AccountNo already exists."
    );

    // The original record is untouched.
    let resp = client.get("/customers/C1").await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "Alice");
}

#[tokio::test]
async fn purchase_composite_key_lifecycle() {
    let (client, _store) = spawn_server().await;

    let customer = json!({
        "account_no": "C1",
        "name": "Alice",
        "delivery_address": "123 Main St"
    });
    let basket = json!({
        "basket_no": "B1",
        "name": "Citrus Mix",
        "price": 19.75
    });
    assert_eq!(client.post("/customers", customer).await.unwrap().status(), 201);
    assert_eq!(client.post("/baskets", basket).await.unwrap().status(), 201);

    let purchase = json!({
        "account_no": "C1",
        "basket_no": "B1",
        "purchase_date": "2024-01-01"
    });
    assert_eq!(client.post("/purchases", purchase.clone()).await.unwrap().status(), 201);

    // Same composite key again is a conflict.
    let resp = client.post("/purchases", purchase).await.unwrap();
    assert_eq!(resp.status(), 409);
    assert_eq!(
        error_message(resp).await,
        "A purchase with this AccountNo, BasketNo already exists."
    );

    let resp = client.get("/purchases/C1/B1").await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["purchase_date"], "2024-01-01");

    // Moving a purchase to another basket would change the key.
    let moved = json!({
        "account_no": "C1",
        "basket_no": "B2",
        "purchase_date": "2024-01-01"
    });
    let resp = client.put("/purchases/C1/B1", moved).await.unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(
        error_message(resp).await,
        "Cannot update the purchase account or basket number!"
    );

    // Date edits keep the key and go through.
    let rescheduled = json!({
        "account_no": "C1",
        "basket_no": "B1",
        "purchase_date": "2024-02-02"
    });
    assert_eq!(client.put("/purchases/C1/B1", rescheduled).await.unwrap().status(), 200);
    let resp = client.get("/purchases/C1/B1").await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["purchase_date"], "2024-02-02");

    assert_eq!(client.delete("/purchases/C1/B1").await.unwrap().status(), 204);
    assert_eq!(client.get("/purchases/C1/B1").await.unwrap().status(), 404);
}

#[tokio::test]
async fn joined_reads_group_by_primary_key() {
    let (client, store) = spawn_server().await;

    for (no, name) in [("C1", "Alice"), ("C2", "Bob")] {
        let resp = client
            .post(
                "/customers",
                json!({"account_no": no, "name": name, "delivery_address": "1 Road"}),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }
    for no in ["B1", "B2"] {
        let resp = client
            .post(
                "/baskets",
                json!({"basket_no": no, "name": format!("Basket {no}"), "price": 12.0}),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }
    for (account_no, basket_no) in [("C1", "B1"), ("C2", "B1"), ("C1", "B2")] {
        let resp = client
            .post(
                "/purchases",
                json!({
                    "account_no": account_no,
                    "basket_no": basket_no,
                    "purchase_date": "2024-03-03"
                }),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let resp = client.get("/customers/with-baskets").await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"][0]["account_no"], "C1");
    assert_eq!(body["items"][0]["baskets"].as_array().unwrap().len(), 2);
    assert_eq!(body["items"][1]["account_no"], "C2");
    assert_eq!(body["items"][1]["baskets"].as_array().unwrap().len(), 1);

    let resp = client.get("/baskets/with-customers").await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"][0]["basket_no"], "B1");
    assert_eq!(body["items"][0]["customers"].as_array().unwrap().len(), 2);

    // Students enroll through fixtures; the joined read groups the same way.
    for (no, name) in [("P1", "Sam"), ("P2", "Kim")] {
        let resp = client
            .post(
                "/students",
                json!({"personal_no": no, "name": name, "email": format!("{no}@example.com")}),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }
    store.add_course(Course {
        course_code: "DB01".to_string(),
        name: "Databases".to_string(),
        credits: 7,
    });
    store.add_course(Course {
        course_code: "OS01".to_string(),
        name: "Operating Systems".to_string(),
        credits: 5,
    });
    store.enroll("P1", "DB01");
    store.enroll("P2", "DB01");
    store.enroll("P1", "OS01");

    let resp = client.get("/students/with-courses").await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"][0]["personal_no"], "P1");
    assert_eq!(body["items"][0]["courses"].as_array().unwrap().len(), 2);
    assert_eq!(body["items"][1]["personal_no"], "P2");
    assert_eq!(body["items"][1]["courses"].as_array().unwrap().len(), 1);
}
