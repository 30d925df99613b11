//! End-to-end flow against a real in-process server.

use axum::http::HeaderValue;
use budget_tracker_backend::db::DbConnection;
use budget_tracker_backend::domain::BudgetService;
use budget_tracker_backend::rest::{create_router, AppState};
use budget_tracker_client::{BudgetClient, ClientError};
use shared::{Category, Month, UpdateAmountRequest};

/// Start the backend on an ephemeral port over its own in-memory
/// database and return a client pointed at it.
async fn start_server(db_name: &str) -> BudgetClient {
    let db_url = format!("file:memdb_{}?mode=memory&cache=shared", db_name);
    let db = DbConnection::new(&db_url)
        .await
        .expect("Failed to create test database");
    let state = AppState::new(BudgetService::new(db));
    let app = create_router(state, HeaderValue::from_static("http://localhost:5173"));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server stopped unexpectedly");
    });

    BudgetClient::new(&format!("http://{}", addr)).expect("Failed to build client")
}

#[tokio::test]
async fn test_full_budget_flow() {
    let client = start_server("client_full_flow").await;

    let health = client.health().await.expect("Health check failed");
    assert_eq!(health.status, "ok");
    assert!(!health.timestamp.is_empty());

    // Fresh database: both categories present, no items
    let budget = client.budget().await.expect("Failed to fetch budget");
    assert!(budget.income.is_empty());
    assert!(budget.expenses.is_empty());

    // Create one item per category
    let created = client
        .create_item(Category::Income, "Salary")
        .await
        .expect("Failed to create Salary");
    assert!(created.id > 0);
    assert_eq!(created.category, Category::Income);
    assert_eq!(created.item_name, "Salary");

    client
        .create_item(Category::Expenses, "Rent")
        .await
        .expect("Failed to create Rent");

    // Creating the same item again is a conflict with the server's message
    let err = client
        .create_item(Category::Income, "Salary")
        .await
        .expect_err("Duplicate create should fail");
    assert_eq!(err.status(), 409);
    assert!(matches!(
        err,
        ClientError::Api { status: 409, ref message } if message == "Budget item already exists"
    ));

    // Every month was seeded at zero
    let budget = client.budget().await.expect("Failed to fetch budget");
    let salary = budget.income.get("Salary").expect("Salary missing");
    assert_eq!(salary.len(), 12);
    for month in Month::ALL {
        let cell = salary.get(&month).expect("Month missing");
        assert_eq!(cell.planned, 0.0);
        assert_eq!(cell.actual, 0.0);
    }

    // Partial updates keep the sibling field
    let after = client
        .update_amount(
            Category::Income,
            "Salary",
            Month::Jan,
            &UpdateAmountRequest::planned(5000.0),
        )
        .await
        .expect("Failed to update planned");
    assert_eq!(after.planned, 5000.0);
    assert_eq!(after.actual, 0.0);

    let after = client
        .update_amount(
            Category::Income,
            "Salary",
            Month::Jan,
            &UpdateAmountRequest::actual(5250.5),
        )
        .await
        .expect("Failed to update actual");
    assert_eq!(after.planned, 5000.0);
    assert_eq!(after.actual, 5250.5);

    client
        .update_amount(
            Category::Expenses,
            "Rent",
            Month::Jan,
            &UpdateAmountRequest::planned(1800.0),
        )
        .await
        .expect("Failed to update Rent");

    // An empty patch is rejected by the server
    let err = client
        .update_amount(
            Category::Income,
            "Salary",
            Month::Feb,
            &UpdateAmountRequest::default(),
        )
        .await
        .expect_err("Empty patch should fail");
    assert_eq!(err.status(), 400);

    // Unknown items are a 404 with the server's message
    let err = client
        .update_amount(
            Category::Income,
            "Ghost",
            Month::Jan,
            &UpdateAmountRequest::planned(1.0),
        )
        .await
        .expect_err("Unknown item should fail");
    assert_eq!(err.status(), 404);
    assert!(err.to_string().contains("Budget item not found"));

    // Summary reflects the updates, net is income minus expenses
    let summary = client.summary().await.expect("Failed to fetch summary");
    assert_eq!(summary.income.planned, 5000.0);
    assert_eq!(summary.income.actual, 5250.5);
    assert_eq!(summary.income.variance, 250.5);
    assert_eq!(summary.expenses.planned, 1800.0);
    assert_eq!(summary.net.planned, summary.income.planned - summary.expenses.planned);
    assert_eq!(summary.net.actual, summary.income.actual - summary.expenses.actual);

    // Delete and verify the second delete is a 404
    client
        .delete_item(Category::Expenses, "Rent")
        .await
        .expect("Failed to delete Rent");

    let budget = client.budget().await.expect("Failed to fetch budget");
    assert!(budget.expenses.is_empty());
    assert!(budget.income.contains_key("Salary"));

    let err = client
        .delete_item(Category::Expenses, "Rent")
        .await
        .expect_err("Second delete should fail");
    assert_eq!(err.status(), 404);
}

#[tokio::test]
async fn test_item_names_with_spaces_round_trip() {
    let client = start_server("client_encoded_names").await;

    client
        .create_item(Category::Expenses, "Dining Out")
        .await
        .expect("Failed to create item");

    let after = client
        .update_amount(
            Category::Expenses,
            "Dining Out",
            Month::Jul,
            &UpdateAmountRequest::actual(64.0),
        )
        .await
        .expect("Failed to update item with a space in its name");
    assert_eq!(after.actual, 64.0);

    client
        .delete_item(Category::Expenses, "Dining Out")
        .await
        .expect("Failed to delete item with a space in its name");
}

#[tokio::test]
async fn test_unreachable_server_reports_status_zero() {
    // Nothing listens here; the request fails before any HTTP exchange
    let client = BudgetClient::new("http://127.0.0.1:9").expect("Failed to build client");

    let err = client.health().await.expect_err("Expected a network error");
    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(err.status(), 0);
    assert_eq!(err.to_string(), "Network error or server unavailable");
}
