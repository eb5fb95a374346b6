use aide::OperationOutput;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{error, info};
use schemars::JsonSchema;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollateServerError {
    #[error("Initialisation error: {0}")]
    InitError(#[source] anyhow::Error),

    #[error("Client error: {0:?}")]
    ClientError(#[source] anyhow::Error),

    #[error("Server error: {0:?}")]
    ServerError(#[source] anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(#[source] anyhow::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(#[source] anyhow::Error),
}

impl CollateServerError {
    pub fn serialize(&self) -> SerializedError {
        match self {
            Self::InitError(error)
            | Self::ClientError(error)
            | Self::ServerError(error)
            | Self::NotFound(error)
            | Self::Unauthorized(error) => error.into(),
        }
    }
}

impl IntoResponse for CollateServerError {
    fn into_response(self) -> Response {
        let body = Json(self.serialize());

        match self {
            Self::InitError(_) | Self::ServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
            Self::ClientError(_) => (StatusCode::BAD_REQUEST, body).into_response(),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, body).into_response(),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, body).into_response(),
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SerializedError {
    pub message: String,
    pub causes: Vec<String>,
}

impl From<&anyhow::Error> for SerializedError {
    fn from(error: &anyhow::Error) -> SerializedError {
        let mut causes = vec![];
        let mut current_error = error.source();
        while let Some(error) = current_error {
            causes.push(error.to_string());
            current_error = error.source();
        }

        SerializedError {
            message: error.to_string(),
            causes,
        }
    }
}

impl OperationOutput for CollateServerError {
    type Inner = Self;
}

pub const fn init_error(error: anyhow::Error) -> CollateServerError {
    CollateServerError::InitError(error)
}

pub fn server_error(error: anyhow::Error) -> CollateServerError {
    error!("Server error: {:?}", error);
    CollateServerError::ServerError(error)
}

pub fn client_error(error: anyhow::Error) -> CollateServerError {
    info!("Client error: {:?}", error);
    CollateServerError::ClientError(error)
}

pub fn not_found_error(error: anyhow::Error) -> CollateServerError {
    info!("Not found error: {:?}", error);
    CollateServerError::NotFound(error)
}

pub fn unauthorized_error(error: anyhow::Error) -> CollateServerError {
    info!("Unauthorized error: {:?}", error);
    CollateServerError::Unauthorized(error)
}
