use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::{self, Debug, Display};

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub code: i32,
    pub message: String,
    /// Raw upstream text, kept for logs only.
    pub cause: Option<String>,
}

const ENV_VAR: i32 = 1;
const DATABASE: i32 = 2;
const UPSTREAM_UNAVAILABLE: i32 = 4;
const UNEXPECTED: i32 = 5;
const GENERATION: i32 = 6;
const SCHEMA_VALIDATION: i32 = 7;

const INVALID_STATE: i32 = 100;
const INVALID_INPUT: i32 = 101;
const UNAUTHORIZED: i32 = 102;
const NOT_FOUND: i32 = 103;
const NO_ROUTE_FOUND: i32 = 104;
const LOCATION_NOT_FOUND: i32 = 105;

impl Error {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    pub fn is_invalid_input_error(&self) -> bool {
        self.code == INVALID_INPUT
    }

    pub fn is_schema_validation_error(&self) -> bool {
        self.code == SCHEMA_VALIDATION
    }

    pub fn is_upstream_unavailable_error(&self) -> bool {
        self.code == UPSTREAM_UNAVAILABLE
    }

    pub fn is_no_route_found_error(&self) -> bool {
        self.code == NO_ROUTE_FOUND
    }

    pub fn is_generation_error(&self) -> bool {
        self.code == GENERATION
    }

    pub fn is_not_found_error(&self) -> bool {
        self.code == NOT_FOUND
    }

    pub fn is_unauthorized_error(&self) -> bool {
        self.code == UNAUTHORIZED
    }

    pub fn is_location_not_found_error(&self) -> bool {
        self.code == LOCATION_NOT_FOUND
    }

    pub fn is_invalid_state_error(&self) -> bool {
        self.code == INVALID_STATE
    }

    fn status(&self) -> StatusCode {
        match self.code {
            UPSTREAM_UNAVAILABLE => StatusCode::SERVICE_UNAVAILABLE,
            GENERATION | SCHEMA_VALIDATION => StatusCode::BAD_GATEWAY,
            1..=99 => StatusCode::INTERNAL_SERVER_ERROR,
            INVALID_STATE => StatusCode::CONFLICT,
            UNAUTHORIZED => StatusCode::FORBIDDEN,
            NOT_FOUND | NO_ROUTE_FOUND => StatusCode::NOT_FOUND,
            LOCATION_NOT_FOUND => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        schema_validation_error(err.to_string())
    }
}

impl From<oso::OsoError> for Error {
    fn from(err: oso::OsoError) -> Self {
        unexpected_error().with_cause(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(code = self.code, cause = ?self.cause, "{}", self.message);
        }

        let body = Json(json!({
            "code": self.code,
            "error": self.message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_state_error(message: impl Into<String>) -> Error {
    Error::new(INVALID_STATE, message)
}

pub fn invalid_input_error(message: impl Into<String>) -> Error {
    Error::new(INVALID_INPUT, message)
}

pub fn unauthorized_error() -> Error {
    Error::new(UNAUTHORIZED, "unauthorized")
}

pub fn not_found_error(what: impl Display) -> Error {
    Error::new(NOT_FOUND, format!("{} not found", what))
}

pub fn no_route_found_error() -> Error {
    Error::new(NO_ROUTE_FOUND, "could not find a route")
}

pub fn location_not_found_error() -> Error {
    Error::new(
        LOCATION_NOT_FOUND,
        "could not determine coordinates for the location",
    )
}

pub fn env_var_error(err: env::VarError) -> Error {
    Error::new(ENV_VAR, "environment variable error").with_cause(err)
}

pub fn database_error<T: Debug>(err: T) -> Error {
    Error::new(DATABASE, "database error").with_cause(format!("{:?}", err))
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    upstream_unavailable_error("upstream service unreachable").with_cause(err)
}

pub fn upstream_unavailable_error(message: impl Into<String>) -> Error {
    Error::new(UPSTREAM_UNAVAILABLE, message)
}

pub fn generation_error(cause: impl Display) -> Error {
    Error::new(GENERATION, "text generation failed").with_cause(cause)
}

pub fn schema_validation_error(cause: impl Display) -> Error {
    Error::new(SCHEMA_VALIDATION, "unexpected response shape").with_cause(cause)
}

pub fn unexpected_error() -> Error {
    Error::new(UNEXPECTED, "unexpected error")
}
