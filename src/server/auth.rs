//! Bearer-token authentication for the Pokedex API.
//!
//! Routes marked as requiring auth in the route table are wrapped with
//! [`require_bearer`]. The middleware expects exactly
//! `Authorization: Bearer <token>`, verifies the token (HS256) against the
//! shared secret and stores the decoded claims in the request extensions,
//! where handlers pick them up through the [`AuthenticatedUser`] extractor.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pokedex::server::auth::AuthenticatedUser;
//!
//! async fn whoami(user: AuthenticatedUser) -> String {
//!     user.subject.unwrap_or_default()
//! }
//! ```
//!
//! # Configuration
//!
//! - `POKEDEX_JWT_SECRET` / `JWT_SECRET` - Required HS256 secret
//! - `POKEDEX_JWT_ISSUER` - Expected issuer claim (optional)
//! - `POKEDEX_JWT_AUDIENCE` - Expected audience claim (optional)

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::config::AuthConfig;
use crate::errors::{PokedexError, PokedexResult};

/// Claims written into tokens minted by this service.
///
/// Incoming tokens are not required to follow this shape; any claim set
/// that verifies is accepted and exposed as raw JSON.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (typically a user or service name)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Caller identity attached to a request by [`require_bearer`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The `sub` claim, when present and a string
    pub subject: Option<String>,
    /// The full decoded claim set
    pub claims: Value,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Value) -> Self {
        let subject = claims
            .get("sub")
            .and_then(Value::as_str)
            .map(String::from);
        Self { subject, claims }
    }
}

/// Authentication errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Missing Authorization header
    MissingToken,
    /// Header present but not exactly `Bearer <token>`
    InvalidHeader,
    /// Token signature is valid but `exp` has passed
    TokenExpired,
    /// Token is malformed, badly signed or carries the wrong claims
    InvalidToken(String),
    /// Any other verification failure
    VerificationFailed(String),
}

impl AuthError {
    /// The `message` field of the response body.
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Bearer token is missing",
            AuthError::InvalidHeader => "Authorization header must be 'Bearer <token>'",
            AuthError::TokenExpired => "Token has expired",
            AuthError::InvalidToken(_) => "Token is invalid",
            AuthError::VerificationFailed(_) => "Token verification failed",
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidToken(msg) | AuthError::VerificationFailed(msg) => {
                write!(f, "{}: {msg}", self.message())
            }
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "error": "Unauthorized",
            "message": self.message(),
        });

        match &self {
            AuthError::InvalidToken(details) | AuthError::VerificationFailed(details) => {
                body["details"] = Value::String(details.clone());
            }
            _ => {}
        }

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// JWT validator for token verification.
#[derive(Clone)]
pub struct JwtValidator {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
    issuer: Option<String>,
    audience: Option<String>,
    expiration_secs: u64,
}

impl JwtValidator {
    /// Create a new JWT validator from auth configuration.
    pub fn from_config(config: &AuthConfig) -> PokedexResult<Self> {
        if config.jwt_secret.is_empty() {
            return Err(PokedexError::ConfigError(
                "jwt_secret is required for bearer authentication".to_string(),
            ));
        }

        // Resolve secret (support env: prefix for environment variable)
        let secret = if let Some(env_var) = config.jwt_secret.strip_prefix("env:") {
            std::env::var(env_var).map_err(|_| {
                PokedexError::ConfigError(format!(
                    "environment variable '{env_var}' not found for jwt_secret"
                ))
            })?
        } else {
            config.jwt_secret.clone()
        };

        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked when present but no claim is mandatory.
        validation.required_spec_claims.clear();
        validation.validate_exp = true;

        if let Some(issuer) = &config.jwt_issuer {
            validation.set_issuer(&[issuer]);
            validation.required_spec_claims.insert("iss".to_string());
        }

        match &config.jwt_audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                validation.required_spec_claims.insert("aud".to_string());
            }
            None => validation.validate_aud = false,
        }

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            expiration_secs: config.token_expiration_secs,
        })
    }

    /// Verify a token and return its decoded claims.
    pub fn validate_token(&self, token: &str) -> Result<Value, AuthError> {
        decode::<Value>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidToken
                | ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName
                | ErrorKind::ImmatureSignature
                | ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience
                | ErrorKind::InvalidSubject
                | ErrorKind::MissingRequiredClaim(_)
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => AuthError::InvalidToken(e.to_string()),
                _ => AuthError::VerificationFailed(e.to_string()),
            })
    }

    /// Mint a token for `subject` using the configured lifetime.
    pub fn create_token(&self, subject: &str) -> PokedexResult<String> {
        let now = Utc::now().timestamp();
        let lifetime = i64::try_from(self.expiration_secs)
            .map_err(|_| PokedexError::Token("token lifetime is too large".to_string()))?;

        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + lifetime,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| PokedexError::Token(format!("failed to create token: {e}")))
    }
}

impl std::fmt::Debug for JwtValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtValidator")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiration_secs", &self.expiration_secs)
            .finish()
    }
}

/// Shared state for the bearer middleware.
#[derive(Clone, Debug)]
pub struct AuthState {
    pub validator: Arc<JwtValidator>,
}

impl AuthState {
    pub fn new(validator: JwtValidator) -> Self {
        Self {
            validator: Arc::new(validator),
        }
    }

    /// Create auth state from configuration.
    pub fn from_config(config: &AuthConfig) -> PokedexResult<Self> {
        Ok(Self::new(JwtValidator::from_config(config)?))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The header must split on single spaces into exactly two parts, the
/// first being the literal `Bearer`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::InvalidHeader),
    }
}

/// Middleware guarding routes that require a bearer token.
pub async fn require_bearer(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let verified =
        bearer_token(request.headers()).and_then(|token| auth.validator.validate_token(token));

    let claims = match verified {
        Ok(claims) => claims,
        Err(e) => {
            warn!(path = %request.uri().path(), reason = %e, "Rejected unauthenticated request");
            return Err(e);
        }
    };

    request
        .extensions_mut()
        .insert(AuthenticatedUser::from_claims(claims));

    Ok(next.run(request).await)
}

/// Axum extractor for the identity stored by [`require_bearer`].
///
/// Only usable on routes wrapped by the middleware; elsewhere it rejects
/// with [`AuthError::MissingToken`].
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-key-for-testing-only".to_string(),
            ..Default::default()
        }
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    fn sign(claims: &Value, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn create_and_validate_token() {
        let validator = JwtValidator::from_config(&test_config()).unwrap();

        let token = validator.create_token("ash").unwrap();
        let claims = validator.validate_token(&token).unwrap();

        assert_eq!(claims["sub"], "ash");
        assert!(claims["exp"].as_i64().unwrap() > claims["iat"].as_i64().unwrap());
    }

    #[test]
    fn reject_invalid_token() {
        let validator = JwtValidator::from_config(&test_config()).unwrap();

        let result = validator.validate_token("invalid-token");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn reject_wrong_secret() {
        let validator = JwtValidator::from_config(&test_config()).unwrap();
        let token = sign(&serde_json::json!({ "sub": "ash" }), "different-secret");

        let result = validator.validate_token(&token);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn reject_expired_token() {
        let config = test_config();
        let validator = JwtValidator::from_config(&config).unwrap();

        let token = sign(
            &serde_json::json!({ "sub": "ash", "iat": now() - 7200, "exp": now() - 3600 }),
            &config.jwt_secret,
        );

        let result = validator.validate_token(&token);
        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[test]
    fn arbitrary_claims_without_exp_are_accepted() {
        let config = test_config();
        let validator = JwtValidator::from_config(&config).unwrap();

        let token = sign(
            &serde_json::json!({ "name": "Misty", "role": "gym-leader" }),
            &config.jwt_secret,
        );

        let claims = validator.validate_token(&token).unwrap();
        assert_eq!(claims["role"], "gym-leader");
        assert!(AuthenticatedUser::from_claims(claims).subject.is_none());
    }

    #[test]
    fn reject_wrong_issuer() {
        let validator = JwtValidator::from_config(&test_config()).unwrap();
        let token = validator.create_token("ash").unwrap();

        let other_config = AuthConfig {
            jwt_issuer: Some("other-issuer".to_string()),
            ..test_config()
        };
        let other_validator = JwtValidator::from_config(&other_config).unwrap();

        let result = other_validator.validate_token(&token);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn issuer_and_audience_round_trip() {
        let config = AuthConfig {
            jwt_issuer: Some("pokedex".to_string()),
            jwt_audience: Some("pokedex-api".to_string()),
            ..test_config()
        };
        let validator = JwtValidator::from_config(&config).unwrap();

        let token = validator.create_token("oak").unwrap();
        let claims = validator.validate_token(&token).unwrap();
        assert_eq!(claims["iss"], "pokedex");
        assert_eq!(claims["aud"], "pokedex-api");
    }

    #[test]
    fn empty_secret_fails() {
        let result = JwtValidator::from_config(&AuthConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")), Ok("abc"));
        assert_eq!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingToken)
        );
        assert_eq!(
            bearer_token(&headers_with("Basic abc")),
            Err(AuthError::InvalidHeader)
        );
        assert_eq!(
            bearer_token(&headers_with("Bearer abc def")),
            Err(AuthError::InvalidHeader)
        );
        assert_eq!(
            bearer_token(&headers_with("Bearer ")),
            Err(AuthError::InvalidHeader)
        );
        assert_eq!(
            bearer_token(&headers_with("Bearer")),
            Err(AuthError::InvalidHeader)
        );
        assert_eq!(
            bearer_token(&headers_with("bearer abc")),
            Err(AuthError::InvalidHeader)
        );
    }

    #[test]
    fn expired_and_invalid_have_distinct_messages() {
        assert_eq!(AuthError::TokenExpired.message(), "Token has expired");
        assert_eq!(
            AuthError::InvalidToken("bad".to_string()).message(),
            "Token is invalid"
        );
        assert_eq!(
            AuthError::TokenExpired.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
