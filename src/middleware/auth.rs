use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::models::auth::{AuthenticatedUser, Claims};

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or((StatusCode::UNAUTHORIZED, "Invalid Authorization header format"))?;

        let secret = parts
            .extensions
            .get::<JwtSecret>()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "JWT secret not configured"))?;

        decode_access_token(token, &secret.0)
            .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid or expired token"))
    }
}

/// Extension type to carry the JWT secret through request extensions.
#[derive(Clone)]
pub struct JwtSecret(pub String);

pub fn decode_access_token(token: &str, secret: &str) -> Result<AuthenticatedUser, anyhow::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &key, &validation)?;
    let claims = data.claims;

    Ok(AuthenticatedUser {
        user_id: claims.sub.parse()?,
        group_id: claims.group.parse()?,
        role: claims.role,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    use super::*;
    use crate::models::auth::MemberRole;

    pub(crate) fn token_for(user_id: Uuid, group_id: Uuid, role: MemberRole, secret: &str) -> String {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            group: group_id.to_string(),
            role,
            iat: now,
            exp: now + 900,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_decode_round_trips_claims() {
        let (user, group) = (Uuid::new_v4(), Uuid::new_v4());
        let token = token_for(user, group, MemberRole::Admin, "secret");

        let decoded = decode_access_token(&token, "secret").unwrap();

        assert_eq!(decoded.user_id, user);
        assert_eq!(decoded.group_id, group);
        assert!(decoded.is_admin());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = token_for(Uuid::new_v4(), Uuid::new_v4(), MemberRole::Member, "secret");
        assert!(decode_access_token(&token, "other").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            group: Uuid::new_v4().to_string(),
            role: MemberRole::Member,
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();
        assert!(decode_access_token(&token, "secret").is_err());
    }
}
