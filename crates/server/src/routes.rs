use std::sync::Arc;

use axum::Router;
use ventura_agent::runtime::AssistantRuntime;
use ventura_db::repositories::SessionRepository;
use ventura_db::DbPool;

use crate::assistant::{self, AssistantState};
use crate::auth::Authenticator;
use crate::health::{self, HealthState};

pub fn router(
    runtime: Arc<AssistantRuntime>,
    sessions: Arc<dyn SessionRepository>,
    db_pool: DbPool,
) -> Router {
    let health_state = HealthState { db_pool, model_configured: runtime.has_model() };
    let assistant_state = AssistantState { runtime, authenticator: Authenticator::new(sessions) };

    Router::new().merge(assistant::router(assistant_state)).merge(health::router(health_state))
}
