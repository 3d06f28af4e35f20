use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use ventura_core::domain::caller::UserId;
use ventura_core::domain::platform::{
    ConversationSummary, FundingRequestSummary, InvestorSummary, UserStatistics, VentureSummary,
};
use ventura_core::errors::DataError;
use ventura_db::repositories::{PlatformReadRepository, RepositoryError};

/// Upper bound on rows any capability hands to the context assembler.
pub const MAX_ROWS: u32 = 10;
pub const DEFAULT_LIST_LIMIT: u32 = 10;
pub const SEARCH_LIMIT: u32 = 5;
pub const CONVERSATION_LIMIT: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CapabilityId {
    ListVentures,
    SearchVentures,
    ListInvestors,
    UserStatistics,
    UserConversations,
    ListFundingRequests,
}

impl CapabilityId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListVentures => "list_ventures",
            Self::SearchVentures => "search_ventures",
            Self::ListInvestors => "list_investors",
            Self::UserStatistics => "user_statistics",
            Self::UserConversations => "user_conversations",
            Self::ListFundingRequests => "list_funding_requests",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListVenturesParams {
    pub limit: u32,
    pub category: Option<String>,
}

impl Default for ListVenturesParams {
    fn default() -> Self {
        Self { limit: DEFAULT_LIST_LIMIT, category: None }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchVenturesParams {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListInvestorsParams {
    pub limit: u32,
}

impl Default for ListInvestorsParams {
    fn default() -> Self {
        Self { limit: DEFAULT_LIST_LIMIT }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserStatisticsParams {
    pub user_id: UserId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserConversationsParams {
    pub user_id: UserId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListFundingRequestsParams {
    pub limit: u32,
    pub status: Option<String>,
}

impl Default for ListFundingRequestsParams {
    fn default() -> Self {
        Self { limit: DEFAULT_LIST_LIMIT, status: None }
    }
}

/// One retrieval the detector decided the model needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntentSignal {
    ListVentures(ListVenturesParams),
    SearchVentures(SearchVenturesParams),
    ListInvestors(ListInvestorsParams),
    UserStatistics(UserStatisticsParams),
    UserConversations(UserConversationsParams),
    ListFundingRequests(ListFundingRequestsParams),
}

impl IntentSignal {
    pub fn capability(&self) -> CapabilityId {
        match self {
            Self::ListVentures(_) => CapabilityId::ListVentures,
            Self::SearchVentures(_) => CapabilityId::SearchVentures,
            Self::ListInvestors(_) => CapabilityId::ListInvestors,
            Self::UserStatistics(_) => CapabilityId::UserStatistics,
            Self::UserConversations(_) => CapabilityId::UserConversations,
            Self::ListFundingRequests(_) => CapabilityId::ListFundingRequests,
        }
    }
}

/// Result of one capability, tagged with the parameters the renderer needs.
#[derive(Clone, Debug, PartialEq)]
pub enum CapabilityOutput {
    Ventures { category: Option<String>, rows: Vec<VentureSummary> },
    SearchResults { name: String, rows: Vec<VentureSummary> },
    Investors(Vec<InvestorSummary>),
    Statistics(UserStatistics),
    Conversations(Vec<ConversationSummary>),
    FundingRequests { status: Option<String>, rows: Vec<FundingRequestSummary> },
}

impl CapabilityOutput {
    /// Statistics are never empty; they render zero-filled.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Ventures { rows, .. } | Self::SearchResults { rows, .. } => rows.is_empty(),
            Self::Investors(rows) => rows.is_empty(),
            Self::Statistics(_) => false,
            Self::Conversations(rows) => rows.is_empty(),
            Self::FundingRequests { rows, .. } => rows.is_empty(),
        }
    }
}

fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_ROWS)
}

/// The closed set of read capabilities. Every method is total: store
/// failures and timeouts are logged and turned into empty results.
pub struct CapabilityRegistry {
    repository: Arc<dyn PlatformReadRepository>,
    timeout: Duration,
}

impl CapabilityRegistry {
    pub fn new(repository: Arc<dyn PlatformReadRepository>, timeout: Duration) -> Self {
        Self { repository, timeout }
    }

    pub async fn execute(&self, signal: &IntentSignal) -> CapabilityOutput {
        debug!(
            event_name = "assistant.capability.start",
            capability = signal.capability().as_str(),
            "executing capability"
        );
        match signal {
            IntentSignal::ListVentures(params) => CapabilityOutput::Ventures {
                category: params.category.clone(),
                rows: self.list_ventures(params).await,
            },
            IntentSignal::SearchVentures(params) => CapabilityOutput::SearchResults {
                name: params.name.clone(),
                rows: self.search_ventures(params).await,
            },
            IntentSignal::ListInvestors(params) => {
                CapabilityOutput::Investors(self.list_investors(params).await)
            }
            IntentSignal::UserStatistics(params) => {
                CapabilityOutput::Statistics(self.user_statistics(params).await)
            }
            IntentSignal::UserConversations(params) => {
                CapabilityOutput::Conversations(self.user_conversations(params).await)
            }
            IntentSignal::ListFundingRequests(params) => CapabilityOutput::FundingRequests {
                status: params.status.clone(),
                rows: self.list_funding_requests(params).await,
            },
        }
    }

    pub async fn list_ventures(&self, params: &ListVenturesParams) -> Vec<VentureSummary> {
        let result = self
            .bounded(
                self.repository
                    .list_ventures(clamp_limit(params.limit), params.category.as_deref()),
            )
            .await;
        absorb(CapabilityId::ListVentures, "list", result)
    }

    pub async fn search_ventures(&self, params: &SearchVenturesParams) -> Vec<VentureSummary> {
        if params.name.trim().is_empty() {
            return Vec::new();
        }
        let result =
            self.bounded(self.repository.search_ventures(&params.name, SEARCH_LIMIT)).await;
        absorb(CapabilityId::SearchVentures, "search", result)
    }

    pub async fn list_investors(&self, params: &ListInvestorsParams) -> Vec<InvestorSummary> {
        let result = self.bounded(self.repository.list_investors(clamp_limit(params.limit))).await;
        absorb(CapabilityId::ListInvestors, "list", result)
    }

    /// Four independent counts, joined; each failing count contributes 0.
    pub async fn user_statistics(&self, params: &UserStatisticsParams) -> UserStatistics {
        let user_id = params.user_id;
        let (ventures_owned, funding_requests_sent, contact_requests_received, chats) = tokio::join!(
            self.bounded(self.repository.count_ventures_owned(user_id)),
            self.bounded(self.repository.count_funding_requests_sent(user_id)),
            self.bounded(self.repository.count_contact_requests_received(user_id)),
            self.bounded(self.repository.count_chats(user_id)),
        );

        UserStatistics {
            ventures_owned: absorb(CapabilityId::UserStatistics, "ventures_owned", ventures_owned),
            funding_requests_sent: absorb(
                CapabilityId::UserStatistics,
                "funding_requests_sent",
                funding_requests_sent,
            ),
            contact_requests_received: absorb(
                CapabilityId::UserStatistics,
                "contact_requests_received",
                contact_requests_received,
            ),
            chats: absorb(CapabilityId::UserStatistics, "chats", chats),
        }
    }

    pub async fn user_conversations(
        &self,
        params: &UserConversationsParams,
    ) -> Vec<ConversationSummary> {
        let result = self
            .bounded(self.repository.list_conversations(params.user_id, CONVERSATION_LIMIT))
            .await;
        absorb(CapabilityId::UserConversations, "list", result)
    }

    pub async fn list_funding_requests(
        &self,
        params: &ListFundingRequestsParams,
    ) -> Vec<FundingRequestSummary> {
        let result = self
            .bounded(
                self.repository
                    .list_funding_requests(clamp_limit(params.limit), params.status.as_deref()),
            )
            .await;
        absorb(CapabilityId::ListFundingRequests, "list", result)
    }

    async fn bounded<T, F>(&self, query: F) -> Result<T, DataError>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(DataError::Store(error.to_string())),
            Err(_) => Err(DataError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

fn absorb<T: Default>(
    capability: CapabilityId,
    query: &'static str,
    result: Result<T, DataError>,
) -> T {
    match result {
        Ok(value) => value,
        Err(error) => {
            warn!(
                event_name = "assistant.capability.failed",
                capability = capability.as_str(),
                query,
                error = %error,
                "capability query failed; continuing with empty result"
            );
            T::default()
        }
    }
}
