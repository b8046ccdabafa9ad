//! Password hashing and bearer-token authentication.

pub mod middleware;
pub mod password;
pub mod token;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token has expired")]
    ExpiredToken,

    #[error("token is invalid")]
    InvalidToken,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("token signing failed")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

pub use middleware::bearer_auth_middleware;
pub use token::{Claims, TokenMaker};
