//! Keepsake Authentication
//!
//! This crate provides JWT-based admin authentication for Keepsake:
//! token issue/verification and argon2 password hashing.

pub mod error;
pub mod jwt;
pub mod password;

pub use error::AuthError;
pub use jwt::{AuthAdmin, Claims, JwtManager, ADMIN_TOKEN_COOKIE};
pub use password::{hash_password, verify_password};
