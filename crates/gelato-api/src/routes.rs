use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use gelato_core::remote::SecretAdminGate;
use gelato_core::{Entry, NewEntry};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::db::EntryStore;
use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    store: EntryStore,
    admin: Arc<SecretAdminGate>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: EntryStore) -> Self {
        Self {
            admin: Arc::new(SecretAdminGate::new(config.admin_password.clone())),
            store,
            config,
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/entries", get(list_entries).post(create_entry))
        .route("/api/entries/{id}", delete(delete_entry))
        .route("/api/verify-admin", post(verify_admin))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
    })
}

async fn list_entries(State(state): State<AppState>) -> Result<Json<Vec<Entry>>, AppError> {
    Ok(Json(state.store.list().await?))
}

/// Create payload. Every field is optional so missing ones can be reported
/// together; `flavour` is the legacy spelling of `flavor`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateEntryBody {
    pub shop: Option<String>,
    pub flavor: Option<String>,
    pub flavour: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
    pub person: Option<String>,
}

impl CreateEntryBody {
    fn into_request(self) -> Result<NewEntry, AppError> {
        let flavor = self.flavor.or(self.flavour);
        let fields = [
            ("shop", &self.shop),
            ("flavor", &flavor),
            ("date", &self.date),
            ("person", &self.person),
        ];
        let missing = fields
            .iter()
            .filter(|(_, value)| !value.as_deref().is_some_and(|value| !value.trim().is_empty()))
            .map(|(name, _)| *name)
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(AppError::bad_request(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let date = self
            .date
            .as_deref()
            .map(str::trim)
            .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
            .ok_or_else(|| AppError::bad_request("date must be YYYY-MM-DD"))?;

        Ok(NewEntry {
            shop: self.shop.unwrap_or_default().trim().to_string(),
            flavor: flavor.unwrap_or_default().trim().to_string(),
            date,
            notes: self.notes.unwrap_or_default(),
            person: self.person.unwrap_or_default().trim().to_string(),
        })
    }
}

async fn create_entry(
    State(state): State<AppState>,
    body: Result<Json<CreateEntryBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Entry>), AppError> {
    let Json(body) = body.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let request = body.into_request()?;

    let entry = state.store.insert(request).await?;
    tracing::info!(entry = %entry.id, shop = %entry.shop, "Created entry");
    Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    deleted: bool,
    id: i64,
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = id
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::bad_request(format!("invalid entry id '{id}'")))?;

    if state.store.delete(id).await? {
        tracing::info!(entry = id, "Deleted entry");
        Ok(Json(DeleteResponse { deleted: true, id }))
    } else {
        Err(AppError::not_found("Entry not found"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyAdminBody {
    pub password: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct VerifyAdminResponse {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

impl VerifyAdminResponse {
    const fn rejected(error: &'static str) -> Self {
        Self {
            valid: false,
            message: None,
            error: Some(error),
        }
    }
}

async fn verify_admin(
    State(state): State<AppState>,
    body: Result<Json<VerifyAdminBody>, JsonRejection>,
) -> (StatusCode, Json<VerifyAdminResponse>) {
    let password = body
        .ok()
        .and_then(|Json(body)| body.password)
        .filter(|password| !password.is_empty());
    let Some(password) = password else {
        return (
            StatusCode::BAD_REQUEST,
            Json(VerifyAdminResponse::rejected("Password is required")),
        );
    };

    match state.admin.check(&password) {
        Ok(true) => (
            StatusCode::OK,
            Json(VerifyAdminResponse {
                valid: true,
                message: Some("Authentication successful"),
                error: None,
            }),
        ),
        Ok(false) => (
            StatusCode::UNAUTHORIZED,
            Json(VerifyAdminResponse::rejected("Invalid password")),
        ),
        Err(error) => {
            tracing::error!(%error, "Admin verification unavailable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(VerifyAdminResponse::rejected("Internal server error")),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn state(admin_password: Option<&str>) -> AppState {
        let config = AppConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            db_path: ":memory:".into(),
            admin_password: admin_password.map(str::to_string),
        };
        AppState::new(Arc::new(config), EntryStore::open_in_memory().unwrap())
    }

    fn body(flavor: &str) -> CreateEntryBody {
        CreateEntryBody {
            shop: Some("Joelato".to_string()),
            flavor: Some(flavor.to_string()),
            date: Some("2024-03-01".to_string()),
            person: Some("Ana".to_string()),
            ..CreateEntryBody::default()
        }
    }

    fn password(value: &str) -> Result<Json<VerifyAdminBody>, JsonRejection> {
        Ok(Json(VerifyAdminBody {
            password: Some(value.to_string()),
        }))
    }

    #[tokio::test]
    async fn create_trims_flavor_and_defaults_notes() {
        let state = state(None);

        let (status, Json(entry)) = create_entry(State(state.clone()), Ok(Json(body("  Mint "))))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(entry.flavor, "Mint");
        assert_eq!(entry.notes, "");

        let Json(listed) = list_entries(State(state)).await.unwrap();
        assert_eq!(listed, vec![entry]);
    }

    #[test]
    fn create_reports_every_missing_field() {
        let err = CreateEntryBody {
            flavor: Some(" ".to_string()),
            ..CreateEntryBody::default()
        }
        .into_request()
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid request: Missing required fields: shop, flavor, date, person"
        );
    }

    #[test]
    fn create_accepts_legacy_flavour_key() {
        let request = CreateEntryBody {
            flavor: None,
            flavour: Some("Lemon".to_string()),
            ..body("")
        }
        .into_request()
        .unwrap();

        assert_eq!(request.flavor, "Lemon");
    }

    #[test]
    fn create_rejects_malformed_date() {
        let err = CreateEntryBody {
            date: Some("March 1st".to_string()),
            ..body("Mint")
        }
        .into_request()
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn delete_returns_not_found_for_missing_entry() {
        let state = state(None);
        let err = delete_entry(State(state), Path("42".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_existing_entry() {
        let state = state(None);
        let (_, Json(entry)) = create_entry(State(state.clone()), Ok(Json(body("Mint"))))
            .await
            .unwrap();

        let Json(response) = delete_entry(State(state.clone()), Path(entry.id.to_string()))
            .await
            .unwrap();

        assert!(response.deleted);
        let Json(listed) = list_entries(State(state)).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn verify_admin_statuses() {
        let state = state(Some("scoop"));

        let (status, Json(response)) = verify_admin(State(state.clone()), password("scoop")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(response.valid);

        let (status, Json(response)) = verify_admin(State(state.clone()), password("cone")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(response, VerifyAdminResponse::rejected("Invalid password"));

        let (status, _) = verify_admin(State(state), password("")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn verify_admin_hides_missing_secret() {
        let (status, Json(response)) = verify_admin(State(state(None)), password("scoop")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response, VerifyAdminResponse::rejected("Internal server error"));
    }
}
