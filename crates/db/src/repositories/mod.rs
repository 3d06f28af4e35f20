use async_trait::async_trait;
use thiserror::Error;

use ventura_core::domain::caller::{Caller, UserId};
use ventura_core::domain::platform::{
    ConversationSummary, FundingRequestSummary, InvestorSummary, VentureSummary,
};

pub mod memory;
pub mod platform;
pub mod session;

pub use memory::{InMemoryPlatformRepository, InMemorySessionRepository, PlatformOperation};
pub use platform::SqlPlatformRepository;
pub use session::{hash_session_token, SqlSessionRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only queries the assistant issues against the platform store.
#[async_trait]
pub trait PlatformReadRepository: Send + Sync {
    async fn list_ventures(
        &self,
        limit: u32,
        category: Option<&str>,
    ) -> Result<Vec<VentureSummary>, RepositoryError>;

    /// Case-insensitive substring match on name or description.
    async fn search_ventures(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<VentureSummary>, RepositoryError>;

    async fn list_investors(&self, limit: u32) -> Result<Vec<InvestorSummary>, RepositoryError>;

    async fn count_ventures_owned(&self, user_id: UserId) -> Result<i64, RepositoryError>;

    async fn count_funding_requests_sent(&self, user_id: UserId) -> Result<i64, RepositoryError>;

    async fn count_contact_requests_received(
        &self,
        user_id: UserId,
    ) -> Result<i64, RepositoryError>;

    async fn count_chats(&self, user_id: UserId) -> Result<i64, RepositoryError>;

    async fn list_conversations(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<ConversationSummary>, RepositoryError>;

    async fn list_funding_requests(
        &self,
        limit: u32,
        status: Option<&str>,
    ) -> Result<Vec<FundingRequestSummary>, RepositoryError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Resolves a raw bearer token to the caller it was issued for, ignoring
    /// expired sessions.
    async fn find_caller(&self, token: &str) -> Result<Option<Caller>, RepositoryError>;
}
