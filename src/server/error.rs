use crate::features::{AccountError, BlockchainId, TransactionError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("User not found!")]
    UserNotFound(BlockchainId),

    #[error("Banker not found!")]
    BankerNotFound(BlockchainId),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("Storage task failed")]
    Blocking(#[from] tokio::task::JoinError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::UserNotFound(_) | AppError::BankerNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Account(AccountError::MissingBlockchainId)
            | AppError::Transaction(TransactionError::InvalidAmount(_))
            | AppError::Transaction(TransactionError::AmountOutOfRange(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Account(AccountError::Record(_))
            | AppError::Transaction(TransactionError::Record(_))
            | AppError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Plain-text bodies. Storage failures are logged with their cause and hidden from the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{:#}", anyhow::Error::from(self));
            return (status, "Internal Server Error").into_response();
        }

        match &self {
            AppError::UserNotFound(id) | AppError::BankerNotFound(id) => {
                warn!("No account with id {}", id)
            }
            _ => debug!("Rejected request: {}", self),
        }
        let body = self.to_string();
        (status, body).into_response()
    }
}
