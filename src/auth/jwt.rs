use std::time::Duration;

use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::{
        claims::{AccessClaims, RefreshClaims, TokenKind},
        repo_types::User,
    },
    config::JwtConfig,
};

/// Why a token was refused. Callers outside this module only ever see
/// "invalid or expired"; the split exists for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        }
    }
}

/// One secret and lifetime for one kind of token.
#[derive(Clone)]
pub struct KeyPair {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl KeyPair {
    fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::from_secs((ttl_minutes.max(0) as u64) * 60),
        }
    }
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub access: KeyPair,
    pub refresh: KeyPair,
    pub issuer: String,
    pub audience: String,
}

fn unix_window(ttl: Duration) -> (usize, usize) {
    let now = OffsetDateTime::now_utc();
    let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
    (now.unix_timestamp() as usize, exp.unix_timestamp() as usize)
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            access: KeyPair::new(&cfg.access_secret, cfg.access_ttl_minutes),
            refresh: KeyPair::new(&cfg.refresh_secret, cfg.refresh_ttl_minutes),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }

    pub fn sign_access(&self, user: &User) -> anyhow::Result<String> {
        let (iat, exp) = unix_window(self.access.ttl);
        let claims = AccessClaims {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            iat,
            exp,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind: TokenKind::Access,
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::default(), &claims, &self.access.encoding)?;
        debug!(user_id = %user.id, kind = ?TokenKind::Access, "jwt signed");
        Ok(token)
    }

    pub fn sign_refresh(&self, user_id: Uuid) -> anyhow::Result<String> {
        let (iat, exp) = unix_window(self.refresh.ttl);
        let claims = RefreshClaims {
            sub: user_id,
            iat,
            exp,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind: TokenKind::Refresh,
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::default(), &claims, &self.refresh.encoding)?;
        debug!(user_id = %user_id, kind = ?TokenKind::Refresh, "jwt signed");
        Ok(token)
    }

    fn decode_with<T: DeserializeOwned>(&self, token: &str, key: &DecodingKey) -> Result<T, TokenError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<T>(token, key, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            TokenError::from(e)
        })?;
        Ok(data.claims)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let claims: AccessClaims = self.decode_with(token, &self.access.decoding)?;
        if claims.kind != TokenKind::Access {
            return Err(TokenError::Invalid);
        }
        debug!(user_id = %claims.sub, "access token verified");
        Ok(claims)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims: RefreshClaims = self.decode_with(token, &self.refresh.decoding)?;
        if claims.kind != TokenKind::Refresh {
            return Err(TokenError::Invalid);
        }
        debug!(user_id = %claims.sub, "refresh token verified");
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_user, test_jwt_config};
    use crate::auth::repo_types::Role;

    fn make_keys() -> JwtKeys {
        JwtKeys::from_config(&test_jwt_config())
    }

    #[test]
    fn sign_and_verify_access_token() {
        let keys = make_keys();
        let user = sample_user("asha", Role::Farmer, "Ranchi", "Jharkhand");
        let token = keys.sign_access(&user).expect("sign access");
        let claims = keys.verify_access(&token).expect("verify token");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "asha");
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.full_name, user.full_name);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn sign_and_verify_refresh_token() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_refresh(user_id).expect("sign refresh");
        let claims = keys.verify_refresh(&token).expect("verify refresh");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.kind, TokenKind::Refresh);
    }

    #[test]
    fn tokens_are_not_interchangeable() {
        let keys = make_keys();
        let user = sample_user("asha", Role::Farmer, "Ranchi", "Jharkhand");
        let access = keys.sign_access(&user).unwrap();
        let refresh = keys.sign_refresh(user.id).unwrap();
        assert_eq!(keys.verify_refresh(&access).unwrap_err(), TokenError::Invalid);
        assert_eq!(keys.verify_access(&refresh).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn refresh_tokens_differ_even_within_one_second() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let a = keys.sign_refresh(user_id).unwrap();
        let b = keys.sign_refresh(user_id).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = RefreshClaims {
            sub: Uuid::new_v4(),
            iat: now - 7200,
            exp: now - 3600,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
            kind: TokenKind::Refresh,
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::default(), &claims, &keys.refresh.encoding).unwrap();
        assert_eq!(keys.verify_refresh(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn tampered_or_garbage_tokens_are_invalid() {
        let keys = make_keys();
        let user = sample_user("asha", Role::Farmer, "Ranchi", "Jharkhand");
        let mut token = keys.sign_access(&user).unwrap();
        token.push('x');
        assert_eq!(keys.verify_access(&token).unwrap_err(), TokenError::Invalid);
        assert_eq!(keys.verify_access("not-a-jwt").unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = make_keys();
        let mut cfg = test_jwt_config();
        cfg.issuer = "bad-iss".into();
        cfg.audience = "bad-aud".into();
        let bad = JwtKeys::from_config(&cfg);
        let user = sample_user("asha", Role::Farmer, "Ranchi", "Jharkhand");
        let token = good.sign_access(&user).expect("sign access");
        assert!(bad.verify_access(&token).is_err());
    }
}
