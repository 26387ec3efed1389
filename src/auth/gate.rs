use axum::http::HeaderMap;
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use super::{extract, jwt, AuthError};

/// The caller is authenticated but does not own the resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("user {caller} does not own a resource owned by {owner}")]
pub struct NotOwner {
    pub caller: Uuid,
    pub owner: Uuid,
}

/// Answers who the caller is, whether they own a resource, and whether they
/// are the trusted webhook backend.
///
/// Holds only read-only secrets from startup configuration.
#[derive(Clone)]
pub struct AuthGate {
    jwt_secret: String,
    service_api_key: Option<String>,
}

impl AuthGate {
    pub fn new(jwt_secret: impl Into<String>, service_api_key: Option<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            service_api_key,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Resolve the user behind `Authorization: Bearer <access token>`.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Uuid, AuthError> {
        let token = extract::get_bearer_token(headers)?;
        jwt::validate_jwt(token, &self.jwt_secret)
    }

    /// Accept `Authorization: ApiKey <key>` only if it matches the configured
    /// service key. Missing and wrong keys fail identically for the caller.
    pub fn authenticate_service(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let provided = extract::get_api_key(headers).map_err(|e| {
            tracing::warn!("service auth: missing ApiKey authorization header");
            e
        })?;

        let Some(expected) = self.service_api_key.as_deref() else {
            tracing::error!("service auth: POLKA_KEY is not configured, rejecting");
            return Err(AuthError::ApiKeyMismatch);
        };

        if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(())
        } else {
            // Never log the expected key or the full provided key
            tracing::warn!("service auth: invalid api key (provided: '{}')", mask(provided));
            Err(AuthError::ApiKeyMismatch)
        }
    }
}

/// Ownership check for user-scoped mutations.
pub fn ensure_owner(caller: Uuid, owner: Uuid) -> Result<(), NotOwner> {
    if caller == owner {
        Ok(())
    } else {
        Err(NotOwner { caller, owner })
    }
}

fn mask(key: &str) -> String {
    if key.len() > 8 && key.is_char_boundary(4) && key.is_char_boundary(key.len() - 4) {
        format!("{}…{}", &key[..4], &key[key.len() - 4..])
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, HeaderValue};
    use chrono::Duration;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn test_authenticate_resolves_subject() {
        let gate = AuthGate::new("secret", None);
        let user_id = Uuid::new_v4();
        let token = jwt::make_jwt(user_id, "secret", Duration::minutes(5)).unwrap();

        assert_eq!(
            gate.authenticate(&headers(&format!("Bearer {}", token))),
            Ok(user_id)
        );
    }

    #[test]
    fn test_authenticate_failures_stay_distinct() {
        let gate = AuthGate::new("secret", None);
        let token = jwt::make_jwt(Uuid::new_v4(), "other-secret", Duration::minutes(5)).unwrap();

        assert_eq!(
            gate.authenticate(&HeaderMap::new()),
            Err(AuthError::NoTokenFound)
        );
        assert_eq!(
            gate.authenticate(&headers(&format!("bearer {}", token))),
            Err(AuthError::NoTokenFound)
        );
        assert_eq!(
            gate.authenticate(&headers(&format!("Bearer {}", token))),
            Err(AuthError::SignatureInvalid)
        );
    }

    #[test]
    fn test_ensure_owner() {
        let me = Uuid::new_v4();
        let someone = Uuid::new_v4();
        assert!(ensure_owner(me, me).is_ok());
        assert_eq!(
            ensure_owner(me, someone),
            Err(NotOwner {
                caller: me,
                owner: someone
            })
        );
    }

    #[test]
    fn test_service_key() {
        let gate = AuthGate::new("secret", Some("f271c81ff7084ee5b99a5091b42d486e".into()));

        assert!(gate
            .authenticate_service(&headers("ApiKey f271c81ff7084ee5b99a5091b42d486e"))
            .is_ok());
        assert_eq!(
            gate.authenticate_service(&headers("ApiKey wrong")),
            Err(AuthError::ApiKeyMismatch)
        );
        assert_eq!(
            gate.authenticate_service(&headers("Bearer f271c81ff7084ee5b99a5091b42d486e")),
            Err(AuthError::NoApiKeyFound)
        );
        assert_eq!(
            gate.authenticate_service(&HeaderMap::new()),
            Err(AuthError::NoApiKeyFound)
        );
    }

    #[test]
    fn test_unconfigured_service_key_never_matches() {
        let gate = AuthGate::new("secret", None);
        assert_eq!(
            gate.authenticate_service(&headers("ApiKey ")),
            Err(AuthError::ApiKeyMismatch)
        );
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("short"), "****");
        assert_eq!(mask("abcdefghijkl"), "abcd…ijkl");
    }
}
