//! In-process stub of the account resource server.
//!
//! Implements the upstream wire contract the bridge consumes: account
//! representations with embedded `_links`, deposit/withdraw mutations,
//! and the conditional `withdraw` link that exists only while the
//! balance is positive.

// Each test binary uses a different slice of this module.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub holder: String,
    pub balance: f64,
    pub currency: String,
}

/// Shared state of the stub bank.
#[derive(Clone)]
pub struct BankState {
    accounts: Arc<RwLock<HashMap<String, AccountRecord>>>,
}

impl BankState {
    /// Seed accounts: one healthy, one overdrawn.
    pub fn seeded() -> Self {
        let mut accounts = HashMap::new();
        accounts.insert(
            "acc-123".to_string(),
            AccountRecord {
                holder: "John Doe".to_string(),
                balance: 1250.75,
                currency: "USD".to_string(),
            },
        );
        accounts.insert(
            "acc-456".to_string(),
            AccountRecord {
                holder: "Jane Smith".to_string(),
                balance: -150.25,
                currency: "USD".to_string(),
            },
        );
        Self {
            accounts: Arc::new(RwLock::new(accounts)),
        }
    }

    pub fn balance(&self, id: &str) -> Option<f64> {
        self.accounts.read().unwrap().get(id).map(|a| a.balance)
    }

    pub fn set_balance(&self, id: &str, balance: f64) {
        if let Some(account) = self.accounts.write().unwrap().get_mut(id) {
            account.balance = balance;
        }
    }
}

fn representation(id: &str, account: &AccountRecord) -> Value {
    let mut links = json!({
        "self": {
            "href": format!("/accounts/{}", id),
            "method": "GET",
            "rel": "self"
        },
        "deposit": {
            "href": format!("/accounts/{}/deposit", id),
            "method": "POST",
            "rel": "deposit"
        }
    });
    // The withdraw transition is advertised only while money is there.
    if account.balance > 0.0 {
        links["withdraw"] = json!({
            "href": format!("/accounts/{}/withdraw", id),
            "method": "POST",
            "rel": "withdraw"
        });
    }

    json!({
        "accountId": id,
        "accountHolder": account.holder,
        "balance": account.balance,
        "currency": account.currency,
        "_links": links
    })
}

fn parse_amount(body: &Value) -> Result<f64, (StatusCode, Json<Value>)> {
    let amount = body
        .get("amount")
        .and_then(Value::as_f64)
        .ok_or((StatusCode::BAD_REQUEST, Json(json!({"error": "Malformed body"}))))?;
    if amount <= 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Amount must be positive"})),
        ));
    }
    Ok(amount)
}

async fn get_account(
    State(state): State<BankState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let accounts = state.accounts.read().unwrap();
    match accounts.get(&id) {
        Some(account) => (StatusCode::OK, Json(representation(&id, account))).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn deposit(
    State(state): State<BankState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let amount = match parse_amount(&body) {
        Ok(amount) => amount,
        Err(rejection) => return rejection.into_response(),
    };

    let mut accounts = state.accounts.write().unwrap();
    match accounts.get_mut(&id) {
        Some(account) => {
            account.balance += amount;
            (StatusCode::OK, Json(representation(&id, account))).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn withdraw(
    State(state): State<BankState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut accounts = state.accounts.write().unwrap();
    let account = match accounts.get_mut(&id) {
        Some(account) => account,
        None => return StatusCode::NOT_FOUND.into_response(),
    };

    if account.balance <= 0.0 {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Withdrawal not allowed with negative balance"})),
        )
            .into_response();
    }

    let amount = match parse_amount(&body) {
        Ok(amount) => amount,
        Err(rejection) => return rejection.into_response(),
    };

    account.balance -= amount;
    (StatusCode::OK, Json(representation(&id, account))).into_response()
}

pub fn router(state: BankState) -> Router {
    Router::new()
        .route("/accounts/:id", get(get_account))
        .route("/accounts/:id/deposit", post(deposit))
        .route("/accounts/:id/withdraw", post(withdraw))
        .with_state(state)
}

/// Bind the stub bank on an ephemeral port and serve it in the
/// background. Returns the base URL and a handle to the shared state.
pub async fn spawn_bank() -> (String, BankState) {
    let state = BankState::seeded();
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub bank");
    let addr: SocketAddr = listener.local_addr().expect("stub bank addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub bank serve");
    });

    (format!("http://{}", addr), state)
}
