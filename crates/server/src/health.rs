use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use ventura_db::DbPool;

#[derive(Clone)]
pub struct HealthState {
    pub db_pool: DbPool,
    pub model_configured: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

/// Readiness follows the database only; an unconfigured model is reported
/// but still answers 200 so the gateway can be probed before keys are set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub database: HealthCheck,
    pub assistant: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let ready = database.status == "ready";

    let assistant = if state.model_configured {
        HealthCheck { status: "ready", detail: "model credential configured".to_owned() }
    } else {
        HealthCheck { status: "unconfigured", detail: "llm.api_key is not set".to_owned() }
    };

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck { status: "ready", detail: "ventura-server accepting requests".to_owned() },
        database,
        assistant,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthCheck { status: "ready", detail: "database answered SELECT 1".to_owned() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};
    use ventura_db::connect_in_memory;

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn ready_when_database_answers() {
        let pool = connect_in_memory().await.expect("pool should connect");

        let (status, Json(payload)) =
            health(State(HealthState { db_pool: pool.clone(), model_configured: true })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.database.status, "ready");
        assert_eq!(payload.assistant.status, "ready");

        pool.close().await;
    }

    #[tokio::test]
    async fn missing_credential_is_reported_without_failing_readiness() {
        let pool = connect_in_memory().await.expect("pool should connect");

        let (status, Json(payload)) =
            health(State(HealthState { db_pool: pool.clone(), model_configured: false })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.assistant.status, "unconfigured");

        pool.close().await;
    }

    #[tokio::test]
    async fn unavailable_when_database_is_closed() {
        let pool = connect_in_memory().await.expect("pool should connect");
        pool.close().await;

        let (status, Json(payload)) =
            health(State(HealthState { db_pool: pool, model_configured: true })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.database.status, "degraded");
    }
}
