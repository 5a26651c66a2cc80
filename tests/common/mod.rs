#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::sync::Notify;

use staffscope::api::Endpoints;
use staffscope::runner::{Options, Runner};

/// What the mock hiring-test API answers, plus what it has seen.
#[derive(Debug)]
pub struct MockState {
    /// Fixed activation body; `None` hands out `code-1`, `code-2`, ...
    pub activation: Option<Value>,
    pub employees: Value,
    pub employees_status: u16,
    /// Raw body sent with a non-200 list status.
    pub employees_error: String,
    pub add_status: u16,
    pub add_response: Value,
    /// Park the first list request until [`MockApi::release`] is called.
    pub hold_first_list: bool,
    pub activation_calls: usize,
    pub list_codes: Vec<String>,
    pub added: Vec<Value>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            activation: None,
            employees: roster(),
            employees_status: 200,
            employees_error: String::new(),
            add_status: 200,
            add_response: json!({ "message": "Employee added successfully" }),
            hold_first_list: false,
            activation_calls: 0,
            list_codes: Vec::new(),
            added: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct MockApi {
    state: Arc<Mutex<MockState>>,
    arrived: Arc<Notify>,
    gate: Arc<Notify>,
    pub base_url: String,
}

impl MockApi {
    pub async fn spawn(state: MockState) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock api");
        let addr = listener.local_addr().expect("mock api address");
        let api = Self {
            state: Arc::new(Mutex::new(state)),
            arrived: Arc::new(Notify::new()),
            gate: Arc::new(Notify::new()),
            base_url: format!("http://{addr}/"),
        };

        let app = Router::new()
            .route("/get_activation_code", post(activation))
            .route("/get_all_employee", post(list_employees))
            .route("/add_employee", post(add_employee))
            .with_state(api.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        api
    }

    pub fn update(&self, f: impl FnOnce(&mut MockState)) {
        f(&mut self.state.lock().expect("mock state"));
    }

    pub fn read<T>(&self, f: impl FnOnce(&MockState) -> T) -> T {
        f(&self.state.lock().expect("mock state"))
    }

    /// Resolves once the held list request has reached the server.
    pub async fn first_list_arrived(&self) {
        self.arrived.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::from_base(&self.base_url).expect("mock endpoints")
    }

    pub fn runner(&self) -> Runner {
        Runner::new(Options {
            endpoints: self.endpoints(),
            timeout_seconds: 5,
            refresh_interval: Duration::from_secs(3600),
            ..Options::default()
        })
        .expect("runner")
    }
}

async fn activation(State(api): State<MockApi>) -> Json<Value> {
    let mut state = api.state.lock().expect("mock state");
    state.activation_calls += 1;
    let body = match state.activation.clone() {
        Some(body) => body,
        None => json!({ "activationCode": format!("code-{}", state.activation_calls) }),
    };
    Json(body)
}

async fn list_employees(
    State(api): State<MockApi>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let hold = {
        let mut state = api.state.lock().expect("mock state");
        let code = body["activationCode"].as_str().unwrap_or_default().to_string();
        state.list_codes.push(code);
        state.hold_first_list && state.list_codes.len() == 1
    };
    if hold {
        api.arrived.notify_one();
        api.gate.notified().await;
    }

    let state = api.state.lock().expect("mock state");
    let status = StatusCode::from_u16(state.employees_status).expect("status");
    if status.is_success() {
        (status, state.employees.to_string())
    } else {
        (status, state.employees_error.clone())
    }
}

async fn add_employee(
    State(api): State<MockApi>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = api.state.lock().expect("mock state");
    state.added.push(body);
    let status = StatusCode::from_u16(state.add_status).expect("status");
    (status, Json(state.add_response.clone()))
}

/// Scenario records: mixed id shapes, a null city and one without coordinates.
pub fn roster() -> Value {
    json!([
        {
            "Hiring_TestID": "T2",
            "firstName": "Bilal",
            "lastName": "Khan",
            "email": "bilal@example.com",
            "city": "Lahore",
            "country": "Pakistan",
            "latitude": 31.5204,
            "longitude": "74.3587"
        },
        {
            "Hiring_TestID": "T10",
            "firstName": "Ayesha",
            "lastName": "Raza",
            "city": "Karachi",
            "country": "Pakistan",
            "latitude": "24.8607",
            "longitude": 67.0011
        },
        {
            "Hiring_TestID": "T1",
            "firstName": "Omar",
            "lastName": null,
            "city": null,
            "country": "Pakistan"
        }
    ])
}
