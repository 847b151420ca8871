//! # Gateway Authentication
//!
//! Bearer token handling for the plant configuration gateway.
//!
//! ## Overview
//!
//! The gateway does not issue tokens. It only:
//! - extracts the bearer token from the `Authorization` header
//! - verifies signature and expiry with `jsonwebtoken`
//! - exposes the tenant, subtenant, user name and scopes carried by the token
//!
//! Authorization (which app, which scope, which role) happens downstream in
//! `gateway-core`; everything that fails here is a 401.
//!
//! ## Features
//!
//! - `jwt` (default): JWT verification using jsonwebtoken
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gateway_auth::{bearer_token, GatewayClaims, TokenService};
//! use chrono::Duration;
//!
//! let service = TokenService::with_secret("your-secret-key").unwrap();
//!
//! let claims = GatewayClaims::new("acme", "jane@acme.io", Duration::hours(1))
//!     .with_subtenant("north")
//!     .with_scopes(["plantcfg.user"]);
//! let token = service.encode_claims(&claims).unwrap();
//!
//! let header = format!("Bearer {}", token);
//! let decoded = service.validate_token(bearer_token(Some(&header)).unwrap()).unwrap();
//! assert_eq!(decoded.tenant(), Some("acme"));
//! ```

pub mod claims;
pub mod error;
#[cfg(feature = "jwt")]
pub mod jwt;

// Re-export main types
pub use claims::GatewayClaims;
pub use error::{AuthError, AuthResult};

#[cfg(feature = "jwt")]
pub use jwt::{bearer_token, JwtAlgorithm, JwtConfig, TokenService};
