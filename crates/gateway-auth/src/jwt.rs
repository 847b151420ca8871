//! JWT token verification
//!
//! This module verifies platform-issued bearer tokens using the jsonwebtoken
//! crate. It supports RS256, RS384, RS512, ES256, ES384 and the HS family.
//! Encoding is kept for tests and local tooling.

use crate::claims::GatewayClaims;
use crate::error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};

/// JWT configuration for token verification.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC algorithms (HS256, HS384, HS512)
    pub secret: Option<String>,

    /// Private key (PEM) for RSA/EC algorithms, only needed to mint tokens
    pub private_key: Option<String>,

    /// Public key (PEM) for RSA/EC algorithms
    pub public_key: Option<String>,

    /// Algorithm to use
    pub algorithm: JwtAlgorithm,

    /// Expected issuer (not checked when `None`)
    pub issuer: Option<String>,

    /// Clock skew tolerance in seconds
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            private_key: None,
            public_key: None,
            algorithm: JwtAlgorithm::HS256,
            issuer: None,
            leeway_secs: 60,
        }
    }
}

impl JwtConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `JWT_SECRET`: HMAC secret
    /// - `JWT_PUBLIC_KEY`: PEM public key for RSA/EC verification
    /// - `JWT_ALGORITHM`: algorithm name (default: HS256, or RS256 when only a public key is set)
    /// - `JWT_ISSUER`: expected issuer (optional)
    /// - `JWT_LEEWAY_SECS`: clock skew tolerance (default: 60)
    pub fn from_env() -> AuthResult<Self> {
        let default = Self::default();
        let secret = std::env::var("JWT_SECRET").ok();
        let public_key = std::env::var("JWT_PUBLIC_KEY").ok();

        let algorithm = match std::env::var("JWT_ALGORITHM") {
            Ok(name) => JwtAlgorithm::parse(&name)
                .ok_or_else(|| AuthError::ConfigError(format!("Unknown JWT algorithm: {}", name)))?,
            Err(_) if secret.is_none() && public_key.is_some() => JwtAlgorithm::RS256,
            Err(_) => default.algorithm,
        };

        Ok(Self {
            secret,
            private_key: None,
            public_key,
            algorithm,
            issuer: std::env::var("JWT_ISSUER").ok(),
            leeway_secs: std::env::var("JWT_LEEWAY_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.leeway_secs),
        })
    }
}

/// Supported JWT algorithms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    RS512,
    /// ECDSA using P-256 and SHA-256
    ES256,
    /// ECDSA using P-384 and SHA-384
    ES384,
}

impl JwtAlgorithm {
    /// Parse an algorithm name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "HS256" => Some(Self::HS256),
            "HS384" => Some(Self::HS384),
            "HS512" => Some(Self::HS512),
            "RS256" => Some(Self::RS256),
            "RS384" => Some(Self::RS384),
            "RS512" => Some(Self::RS512),
            "ES256" => Some(Self::ES256),
            "ES384" => Some(Self::ES384),
            _ => None,
        }
    }

    fn is_hmac(&self) -> bool {
        matches!(self, Self::HS256 | Self::HS384 | Self::HS512)
    }
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
            JwtAlgorithm::RS256 => Algorithm::RS256,
            JwtAlgorithm::RS384 => Algorithm::RS384,
            JwtAlgorithm::RS512 => Algorithm::RS512,
            JwtAlgorithm::ES256 => Algorithm::ES256,
            JwtAlgorithm::ES384 => Algorithm::ES384,
        }
    }
}

/// Extract the token from an `Authorization` header value.
///
/// # Examples
///
/// ```
/// use gateway_auth::{bearer_token, AuthError};
///
/// assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
/// assert!(matches!(bearer_token(None), Err(AuthError::MissingToken)));
/// assert!(matches!(bearer_token(Some("Basic xyz")), Err(AuthError::MissingToken)));
/// ```
pub fn bearer_token(header: Option<&str>) -> AuthResult<&str> {
    let value = header.ok_or(AuthError::MissingToken)?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .ok_or(AuthError::MissingToken)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Token verification service.
pub struct TokenService {
    config: JwtConfig,
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.config.algorithm)
            .field("issuer", &self.config.issuer)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl TokenService {
    /// Create a new token service with the given configuration.
    ///
    /// # Returns
    ///
    /// Token service or configuration error
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        let decoding_key = Self::create_decoding_key(&config)?;
        let encoding_key = Self::create_encoding_key(&config)?;

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
        })
    }

    /// Create with a simple secret (HS256).
    pub fn with_secret(secret: impl Into<String>) -> AuthResult<Self> {
        let config = JwtConfig {
            secret: Some(secret.into()),
            algorithm: JwtAlgorithm::HS256,
            ..Default::default()
        };
        Self::new(config)
    }

    fn create_encoding_key(config: &JwtConfig) -> AuthResult<Option<EncodingKey>> {
        if config.algorithm.is_hmac() {
            return Ok(config
                .secret
                .as_ref()
                .map(|secret| EncodingKey::from_secret(secret.as_bytes())));
        }

        let Some(key) = config.private_key.as_ref() else {
            return Ok(None);
        };

        let key = match config.algorithm {
            JwtAlgorithm::ES256 | JwtAlgorithm::ES384 => EncodingKey::from_ec_pem(key.as_bytes())
                .map_err(|e| AuthError::ConfigError(format!("Invalid EC private key: {}", e)))?,
            _ => EncodingKey::from_rsa_pem(key.as_bytes())
                .map_err(|e| AuthError::ConfigError(format!("Invalid RSA private key: {}", e)))?,
        };
        Ok(Some(key))
    }

    fn create_decoding_key(config: &JwtConfig) -> AuthResult<DecodingKey> {
        match config.algorithm {
            JwtAlgorithm::HS256 | JwtAlgorithm::HS384 | JwtAlgorithm::HS512 => {
                let secret = config
                    .secret
                    .as_ref()
                    .ok_or_else(|| AuthError::ConfigError("Secret required for HMAC".to_string()))?;
                Ok(DecodingKey::from_secret(secret.as_bytes()))
            }
            JwtAlgorithm::RS256 | JwtAlgorithm::RS384 | JwtAlgorithm::RS512 => {
                let key = config
                    .public_key
                    .as_ref()
                    .ok_or_else(|| AuthError::ConfigError("Public key required for RSA".to_string()))?;
                DecodingKey::from_rsa_pem(key.as_bytes())
                    .map_err(|e| AuthError::ConfigError(format!("Invalid RSA public key: {}", e)))
            }
            JwtAlgorithm::ES256 | JwtAlgorithm::ES384 => {
                let key = config
                    .public_key
                    .as_ref()
                    .ok_or_else(|| AuthError::ConfigError("Public key required for EC".to_string()))?;
                DecodingKey::from_ec_pem(key.as_bytes())
                    .map_err(|e| AuthError::ConfigError(format!("Invalid EC public key: {}", e)))
            }
        }
    }

    /// Encode claims into a signed token.
    ///
    /// # Errors
    ///
    /// `ConfigError` when no signing key is configured.
    pub fn encode_claims(&self, claims: &GatewayClaims) -> AuthResult<String> {
        let key = self
            .encoding_key
            .as_ref()
            .ok_or_else(|| AuthError::ConfigError("No signing key configured".to_string()))?;
        let header = Header::new(self.config.algorithm.into());
        encode(&header, claims, key)
            .map_err(|e| AuthError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Validate and decode a token.
    ///
    /// Checks signature, expiry and (if configured) issuer. Audience is not
    /// checked; app access is decided by scope downstream.
    pub fn validate_token(&self, token: &str) -> AuthResult<GatewayClaims> {
        let mut validation = Validation::new(self.config.algorithm.into());
        validation.leeway = self.config.leeway_secs;
        validation.validate_aud = false;
        if let Some(ref issuer) = self.config.issuer {
            validation.set_issuer(&[issuer]);
        }

        let token_data: TokenData<GatewayClaims> = decode(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AuthError::InvalidToken("Malformed token".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("Invalid signature".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AuthError::InvalidToken("Invalid issuer".to_string())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Get the configuration.
    pub fn config(&self) -> &JwtConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_secret() -> String {
        "test-secret-key-for-jwt-signing-minimum-32-chars".to_string()
    }

    fn claims() -> GatewayClaims {
        GatewayClaims::new("T", "jane@t.io", Duration::hours(1))
            .with_subtenant("S2")
            .with_scopes(["plantcfg.user"])
    }

    #[test]
    fn test_token_service_creation() {
        let service = TokenService::with_secret(test_secret()).unwrap();
        assert_eq!(service.config().algorithm, JwtAlgorithm::HS256);
    }

    #[test]
    fn test_token_encoding_and_validation() {
        let service = TokenService::with_secret(test_secret()).unwrap();
        let original = claims();
        let token = service.encode_claims(&original).unwrap();
        let decoded = service.validate_token(&token).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(decoded.tenant(), Some("T"));
        assert_eq!(decoded.subtenant(), Some("S2"));
    }

    #[test]
    fn test_invalid_token() {
        let service = TokenService::with_secret(test_secret()).unwrap();
        let result = service.validate_token("invalid-token");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = TokenService::with_secret("another-secret-key-that-is-long-enough").unwrap();
        let service = TokenService::with_secret(test_secret()).unwrap();
        let token = issuer.encode_claims(&claims()).unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let service = TokenService::with_secret(test_secret()).unwrap();
        let mut expired = claims();
        expired.exp = chrono::Utc::now().timestamp() - 3600;

        let token = service.encode_claims(&expired).unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_issuer_is_checked_when_configured() {
        let service = TokenService::new(JwtConfig {
            secret: Some(test_secret()),
            issuer: Some("https://platform.example".to_string()),
            ..Default::default()
        })
        .unwrap();

        let foreign = service
            .encode_claims(&claims().with_issuer("https://elsewhere.example"))
            .unwrap();
        assert!(matches!(
            service.validate_token(&foreign),
            Err(AuthError::InvalidToken(_))
        ));

        let own = service
            .encode_claims(&claims().with_issuer("https://platform.example"))
            .unwrap();
        assert!(service.validate_token(&own).is_ok());
    }

    #[test]
    fn test_rsa_requires_public_key() {
        let result = TokenService::new(JwtConfig {
            algorithm: JwtAlgorithm::RS256,
            ..Default::default()
        });
        assert!(matches!(result, Err(AuthError::ConfigError(_))));
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
        assert!(matches!(bearer_token(Some("Bearer ")), Err(AuthError::MissingToken)));
        assert!(matches!(bearer_token(Some("abc")), Err(AuthError::MissingToken)));
    }
}
