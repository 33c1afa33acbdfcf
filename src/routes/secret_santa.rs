use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    models::{
        auth::AuthenticatedUser,
        participant::{ParticipantRecord, SetParticipationRequest},
        secret_santa::{ShuffleContext, ShuffleVariant},
    },
    services::secret_santa::{
        error::SecretSantaError, report::report, store::PgSecretSantaStore, SecretSantaService,
    },
    AppState,
};

type ApiError = (StatusCode, Json<Value>);

fn forbidden() -> ApiError {
    (StatusCode::FORBIDDEN, Json(json!({ "success": false, "error": "Access denied" })))
}

/// Tokens are scoped to a single group.
fn require_member(user: &AuthenticatedUser, group_id: Uuid) -> Result<ShuffleContext, ApiError> {
    if user.group_id != group_id {
        return Err(forbidden());
    }
    Ok(ShuffleContext { group_id, acting_user_id: user.user_id })
}

fn require_admin(user: &AuthenticatedUser, group_id: Uuid) -> Result<ShuffleContext, ApiError> {
    let ctx = require_member(user, group_id)?;
    if !user.is_admin() {
        return Err(forbidden());
    }
    Ok(ctx)
}

fn error_response(e: SecretSantaError) -> ApiError {
    (
        e.status_code(),
        Json(json!({ "success": false, "error": e.to_string(), "code": e.code() })),
    )
}

/// POST /groups/{group_id}/secret-santa/{variant}/shuffle
pub async fn shuffle(
    State(state): State<AppState>,
    Path((group_id, variant)): Path<(Uuid, ShuffleVariant)>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError> {
    let ctx = require_admin(&user, group_id)?;
    let store = PgSecretSantaStore::new(state.db.clone());
    let max_attempts = state.config.secret_santa_max_attempts;

    let result = SecretSantaService::shuffle(&store, ctx, variant, max_attempts).await;
    let outcome = report(&ctx, variant, &result);
    match result {
        Ok(_) => Ok(Json(json!({ "success": outcome.success }))),
        Err(e) => Err(error_response(e)),
    }
}

/// GET /groups/{group_id}/participants/{participant_id}/secret-santa
pub async fn get_assignment(
    State(state): State<AppState>,
    Path((group_id, participant_id)): Path<(Uuid, Uuid)>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError> {
    require_member(&user, group_id)?;
    let store = PgSecretSantaStore::new(state.db.clone());

    let result = SecretSantaService::participant(&store, group_id, participant_id).await;
    let record = visible_record(&user, participant_id, result)?;

    Ok(Json(json!({
        "participant_id": record.profile.id,
        "in_secret_santa": record.in_secret_santa,
        "recipients": record.assignment.recipients,
        "assigned_at": record.assignment.assigned_at,
    })))
}

/// Members see their own draw and the kids'; admins see everyone's. A member
/// asking about anyone else gets the same 403 whether or not the record
/// exists.
fn visible_record(
    user: &AuthenticatedUser,
    participant_id: Uuid,
    result: Result<ParticipantRecord, SecretSantaError>,
) -> Result<ParticipantRecord, ApiError> {
    if user.is_admin() || participant_id == user.user_id {
        return result.map_err(error_response);
    }
    match result {
        Ok(record) if !record.profile.kind.is_adult() => Ok(record),
        Ok(_) | Err(SecretSantaError::ParticipantNotFound(_)) => Err(forbidden()),
        Err(e) => Err(error_response(e)),
    }
}

/// PUT /groups/{group_id}/participants/{participant_id}/secret-santa
pub async fn set_participation(
    State(state): State<AppState>,
    Path((group_id, participant_id)): Path<(Uuid, Uuid)>,
    user: AuthenticatedUser,
    Json(body): Json<SetParticipationRequest>,
) -> Result<Json<Value>, ApiError> {
    let ctx = require_admin(&user, group_id)?;
    let store = PgSecretSantaStore::new(state.db.clone());

    SecretSantaService::set_participation(&store, ctx, participant_id, body.in_secret_santa)
        .await
        .map(|_| Json(json!({ "success": true, "in_secret_santa": body.in_secret_santa })))
        .map_err(error_response)
}

/// POST /groups/{group_id}/secret-santa/archive
pub async fn archive(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError> {
    let ctx = require_admin(&user, group_id)?;
    let store = PgSecretSantaStore::new(state.db.clone());

    SecretSantaService::archive(&store, ctx)
        .await
        .map(|carried| Json(json!({ "success": true, "archived": carried })))
        .map_err(error_response)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::Request,
        Router,
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        app::router,
        config::Config,
        middleware::auth::tests::token_for,
        models::{
            auth::MemberRole,
            participant::{ParticipantKind, ParticipantProfile},
        },
    };

    const SECRET: &str = "test-secret";

    // The pool never connects; every request below is rejected before the
    // database is touched.
    fn app() -> Router {
        let config = Config {
            database_url: "postgres://localhost/unused".into(),
            jwt_secret: SECRET.into(),
            host: "127.0.0.1".into(),
            port: 0,
            app_base_url: "http://localhost".into(),
            secret_santa_max_attempts: 1000,
        };
        let db = PgPoolOptions::new().connect_lazy(&config.database_url).unwrap();
        router(AppState { db, config: Arc::new(config) })
    }

    fn post(uri: &str, token: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_shuffle_requires_a_token() {
        let group = uuid::Uuid::new_v4();
        let res = app()
            .oneshot(post(&format!("/groups/{group}/secret-santa/adults/shuffle"), None))
            .await
            .unwrap();
        assert_eq!(res.status(), super::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_shuffle_requires_an_admin() {
        let group = uuid::Uuid::new_v4();
        let token = token_for(uuid::Uuid::new_v4(), group, MemberRole::Member, SECRET);
        let res = app()
            .oneshot(post(&format!("/groups/{group}/secret-santa/kids/shuffle"), Some(token)))
            .await
            .unwrap();
        assert_eq!(res.status(), super::StatusCode::FORBIDDEN);

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_admin_of_another_group_is_rejected() {
        let group = uuid::Uuid::new_v4();
        let token = token_for(uuid::Uuid::new_v4(), uuid::Uuid::new_v4(), MemberRole::Admin, SECRET);
        let res = app()
            .oneshot(post(&format!("/groups/{group}/secret-santa/archive"), Some(token)))
            .await
            .unwrap();
        assert_eq!(res.status(), super::StatusCode::FORBIDDEN);
    }

    fn record(id: uuid::Uuid, email: Option<&str>) -> ParticipantRecord {
        ParticipantRecord {
            profile: ParticipantProfile {
                id,
                display_name: "p".into(),
                kind: ParticipantKind::from_email(email.map(Into::into)),
                partner_id: None,
                sibling_ids: vec![],
                previous_recipient_ids: vec![],
            },
            in_secret_santa: true,
            assignment: Default::default(),
        }
    }

    fn user(role: MemberRole) -> AuthenticatedUser {
        AuthenticatedUser { user_id: uuid::Uuid::new_v4(), group_id: uuid::Uuid::new_v4(), role }
    }

    #[test]
    fn test_member_denied_alike_for_adult_and_missing_records() {
        let member = user(MemberRole::Member);
        let (other, missing) = (uuid::Uuid::new_v4(), uuid::Uuid::new_v4());

        let existing = visible_record(&member, other, Ok(record(other, Some("a@b.c")))).unwrap_err();
        let absent =
            visible_record(&member, missing, Err(SecretSantaError::ParticipantNotFound(missing))).unwrap_err();

        assert_eq!(existing.0, super::StatusCode::FORBIDDEN);
        assert_eq!(absent.0, existing.0);
        assert_eq!(absent.1 .0, existing.1 .0);
    }

    #[test]
    fn test_visibility_of_own_child_and_admin_reads() {
        let member = user(MemberRole::Member);
        let child = uuid::Uuid::new_v4();
        assert!(visible_record(&member, child, Ok(record(child, None))).is_ok());
        assert!(visible_record(&member, member.user_id, Ok(record(member.user_id, Some("me@x.y")))).is_ok());

        let missing = visible_record(
            &member,
            member.user_id,
            Err(SecretSantaError::ParticipantNotFound(member.user_id)),
        )
        .unwrap_err();
        assert_eq!(missing.0, super::StatusCode::NOT_FOUND);

        let admin = user(MemberRole::Admin);
        let other = uuid::Uuid::new_v4();
        assert!(visible_record(&admin, other, Ok(record(other, Some("a@b.c")))).is_ok());
        let absent =
            visible_record(&admin, other, Err(SecretSantaError::ParticipantNotFound(other))).unwrap_err();
        assert_eq!(absent.0, super::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_variant_is_a_client_error() {
        let group = uuid::Uuid::new_v4();
        let token = token_for(uuid::Uuid::new_v4(), group, MemberRole::Admin, SECRET);
        let res = app()
            .oneshot(post(&format!("/groups/{group}/secret-santa/grownups/shuffle"), Some(token)))
            .await
            .unwrap();
        assert!(res.status().is_client_error());
    }
}
