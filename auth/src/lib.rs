//! Credential primitives for the identity service.
//!
//! Provides the building blocks the identity core composes:
//! - Password hashing (Argon2id, adjustable work factor)
//! - Numeric one-time code generation
//! - Access token (JWT, HS256) issuance and verification
//! - Opaque refresh token generation
//! - A shared, injectable secure random source
//!
//! Nothing in here touches storage or knows what a user is; the service layer
//! decides what a subject or a code means.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! assert!(!hasher.verify("not_my_password", &hash).unwrap());
//! ```
//!
//! ## Tokens and Codes
//! ```
//! use std::sync::Arc;
//!
//! use auth::{CodeGenerator, OsRandom, SecureRandom, TokenIssuer};
//!
//! let random: Arc<dyn SecureRandom> = Arc::new(OsRandom);
//! let issuer = TokenIssuer::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     chrono::Duration::minutes(15),
//!     Arc::clone(&random),
//! )
//! .unwrap();
//!
//! let access = issuer.issue_access(7).unwrap();
//! assert_eq!(issuer.verify_access(&access.token).unwrap(), "7");
//!
//! let refresh = issuer.issue_refresh();
//! assert_eq!(refresh.len(), 88);
//!
//! let code = CodeGenerator::new(random).generate(6);
//! assert_eq!(code.len(), 6);
//! ```

pub mod code;
pub mod issuer;
pub mod jwt;
pub mod password;
pub mod random;

// Re-export commonly used items
pub use code::CodeGenerator;
pub use issuer::AccessToken;
pub use issuer::TokenIssuer;
pub use jwt::AccessClaims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use random::OsRandom;
pub use random::SecureRandom;
pub use random::SeededRandom;
