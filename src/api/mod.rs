use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::{Employee, NewEmployee};

pub const DEFAULT_BASE_URL: &str = "https://api.findofficers.com/hiring_test/";
pub const ACTIVATION_PATH: &str = "get_activation_code";
pub const EMPLOYEES_PATH: &str = "get_all_employee";
pub const ADD_EMPLOYEE_PATH: &str = "add_employee";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("activation code is missing")]
    MissingActivationCode,

    #[error("invalid employee data format: expected a JSON array")]
    InvalidEmployeeList,

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("add employee rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid endpoint URL '{url}'")]
    InvalidEndpoint { url: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub activation: String,
    pub employees: String,
    pub add_employee: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            activation: format!("{DEFAULT_BASE_URL}{ACTIVATION_PATH}"),
            employees: format!("{DEFAULT_BASE_URL}{EMPLOYEES_PATH}"),
            add_employee: format!("{DEFAULT_BASE_URL}{ADD_EMPLOYEE_PATH}"),
        }
    }
}

impl Endpoints {
    /// All three endpoints under one base URL.
    pub fn from_base(base: &str) -> Result<Self, ApiError> {
        let mut base = base.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let parsed = reqwest::Url::parse(&base)
            .map_err(|_| ApiError::InvalidEndpoint { url: base.clone() })?;
        let join = |path: &str| {
            parsed
                .join(path)
                .map(|u| u.to_string())
                .map_err(|_| ApiError::InvalidEndpoint {
                    url: format!("{base}{path}"),
                })
        };
        Ok(Self {
            activation: join(ACTIVATION_PATH)?,
            employees: join(EMPLOYEES_PATH)?,
            add_employee: join(ADD_EMPLOYEE_PATH)?,
        })
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        for url in [&self.activation, &self.employees, &self.add_employee] {
            if reqwest::Url::parse(url).is_err() {
                return Err(ApiError::InvalidEndpoint { url: url.clone() });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ActivationResponse {
    #[serde(rename = "activationCode", default)]
    activation_code: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AddEmployeeResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Client for the activation, list and add-employee endpoints.
///
/// Every operation runs its own activation request first; codes are not cached.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(client: reqwest::Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn activation_code(&self) -> Result<String, ApiError> {
        const ENDPOINT: &str = "activation endpoint";
        let resp = self
            .client
            .post(&self.endpoints.activation)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: ENDPOINT,
                source,
            })?;
        let status = resp.status();
        let body = read_body(resp, ENDPOINT).await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: ENDPOINT,
                status: status.as_u16(),
                body,
            });
        }
        let parsed: ActivationResponse =
            serde_json::from_str(&body).map_err(|source| ApiError::Decode {
                endpoint: ENDPOINT,
                source,
            })?;
        match parsed.activation_code {
            Some(Value::String(code)) if !code.trim().is_empty() => Ok(code),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(ApiError::MissingActivationCode),
        }
    }

    pub async fn list_employees(&self, activation_code: &str) -> Result<Vec<Employee>, ApiError> {
        const ENDPOINT: &str = "employee list endpoint";
        let resp = self
            .client
            .post(&self.endpoints.employees)
            .json(&serde_json::json!({ "activationCode": activation_code }))
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: ENDPOINT,
                source,
            })?;
        let status = resp.status();
        let body = read_body(resp, ENDPOINT).await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: ENDPOINT,
                status: status.as_u16(),
                body,
            });
        }
        let value: Value = serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            endpoint: ENDPOINT,
            source,
        })?;
        if !value.is_array() {
            return Err(ApiError::InvalidEmployeeList);
        }
        serde_json::from_value(value).map_err(|source| ApiError::Decode {
            endpoint: ENDPOINT,
            source,
        })
    }

    /// One complete fetch cycle: activation followed by the list request.
    pub async fn fetch_employees(&self) -> Result<Vec<Employee>, ApiError> {
        let code = self.activation_code().await?;
        self.list_employees(&code).await
    }

    pub async fn add_employee(&self, form: &NewEmployee) -> Result<AddEmployeeResponse, ApiError> {
        const ENDPOINT: &str = "add employee endpoint";
        let code = self.activation_code().await?;

        let mut payload = match serde_json::to_value(form) {
            Ok(Value::Object(map)) => map,
            Ok(_) => serde_json::Map::new(),
            Err(source) => {
                return Err(ApiError::Decode {
                    endpoint: ENDPOINT,
                    source,
                })
            }
        };
        payload.insert("activationCode".to_string(), Value::String(code));

        let resp = self
            .client
            .post(&self.endpoints.add_employee)
            .json(&payload)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: ENDPOINT,
                source,
            })?;
        let status = resp.status();
        let body = read_body(resp, ENDPOINT).await?;
        let parsed = serde_json::from_str::<AddEmployeeResponse>(&body);
        if !status.is_success() {
            let message = match parsed {
                Ok(AddEmployeeResponse {
                    message: Some(message),
                    ..
                }) => message,
                _ => body,
            };
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        parsed.map_err(|source| ApiError::Decode {
            endpoint: ENDPOINT,
            source,
        })
    }
}

async fn read_body(resp: reqwest::Response, endpoint: &'static str) -> Result<String, ApiError> {
    resp.text()
        .await
        .map_err(|source| ApiError::Transport { endpoint, source })
}
