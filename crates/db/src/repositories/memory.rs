use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;

use ventura_core::domain::caller::{Caller, UserId};
use ventura_core::domain::platform::{
    ConversationSummary, FundingRequestSummary, InvestorSummary, UserStatistics, VentureSummary,
};

use super::{PlatformReadRepository, RepositoryError, SessionRepository};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlatformOperation {
    ListVentures,
    SearchVentures,
    ListInvestors,
    CountVenturesOwned,
    CountFundingRequestsSent,
    CountContactRequestsReceived,
    CountChats,
    ListConversations,
    ListFundingRequests,
}

impl PlatformOperation {
    pub const ALL: [PlatformOperation; 9] = [
        Self::ListVentures,
        Self::SearchVentures,
        Self::ListInvestors,
        Self::CountVenturesOwned,
        Self::CountFundingRequestsSent,
        Self::CountContactRequestsReceived,
        Self::CountChats,
        Self::ListConversations,
        Self::ListFundingRequests,
    ];
}

/// Snapshot-backed platform store with injectable failures and latency.
#[derive(Default)]
pub struct InMemoryPlatformRepository {
    ventures: RwLock<Vec<VentureSummary>>,
    investors: RwLock<Vec<InvestorSummary>>,
    statistics: RwLock<HashMap<UserId, UserStatistics>>,
    conversations: RwLock<HashMap<UserId, Vec<ConversationSummary>>>,
    funding_requests: RwLock<Vec<FundingRequestSummary>>,
    failing: RwLock<HashSet<PlatformOperation>>,
    latency: RwLock<Option<Duration>>,
    operation_latency: RwLock<HashMap<PlatformOperation, Duration>>,
    calls: AtomicUsize,
}

impl InMemoryPlatformRepository {
    /// Entries are returned in insertion order, so callers insert newest first.
    pub async fn push_venture(&self, venture: VentureSummary) {
        self.ventures.write().await.push(venture);
    }

    pub async fn push_investor(&self, investor: InvestorSummary) {
        self.investors.write().await.push(investor);
    }

    pub async fn set_statistics(&self, user_id: UserId, statistics: UserStatistics) {
        self.statistics.write().await.insert(user_id, statistics);
    }

    pub async fn push_conversation(&self, user_id: UserId, conversation: ConversationSummary) {
        self.conversations.write().await.entry(user_id).or_default().push(conversation);
    }

    pub async fn push_funding_request(&self, request: FundingRequestSummary) {
        self.funding_requests.write().await.push(request);
    }

    pub async fn fail(&self, operation: PlatformOperation) {
        self.failing.write().await.insert(operation);
    }

    pub async fn fail_all(&self) {
        self.failing.write().await.extend(PlatformOperation::ALL);
    }

    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = Some(latency);
    }

    /// Overrides the store-wide latency for one operation.
    pub async fn set_operation_latency(&self, operation: PlatformOperation, latency: Duration) {
        self.operation_latency.write().await.insert(operation, latency);
    }

    /// Number of queries issued so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, operation: PlatformOperation) -> Result<(), RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let latency = match self.operation_latency.read().await.get(&operation) {
            Some(latency) => Some(*latency),
            None => *self.latency.read().await,
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.read().await.contains(&operation) {
            return Err(RepositoryError::Unavailable(format!("{operation:?} is failing")));
        }
        Ok(())
    }

    async fn statistics_for(&self, user_id: UserId) -> UserStatistics {
        self.statistics.read().await.get(&user_id).copied().unwrap_or_default()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

#[async_trait::async_trait]
impl PlatformReadRepository for InMemoryPlatformRepository {
    async fn list_ventures(
        &self,
        limit: u32,
        category: Option<&str>,
    ) -> Result<Vec<VentureSummary>, RepositoryError> {
        self.enter(PlatformOperation::ListVentures).await?;
        let ventures = self.ventures.read().await;
        Ok(ventures
            .iter()
            .filter(|venture| match category {
                Some(category) => venture
                    .category
                    .as_deref()
                    .is_some_and(|name| contains_ignore_case(name, category)),
                None => true,
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn search_ventures(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<VentureSummary>, RepositoryError> {
        self.enter(PlatformOperation::SearchVentures).await?;
        let ventures = self.ventures.read().await;
        Ok(ventures
            .iter()
            .filter(|venture| {
                contains_ignore_case(&venture.name, name)
                    || venture
                        .description
                        .as_deref()
                        .is_some_and(|description| contains_ignore_case(description, name))
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_investors(&self, limit: u32) -> Result<Vec<InvestorSummary>, RepositoryError> {
        self.enter(PlatformOperation::ListInvestors).await?;
        Ok(self.investors.read().await.iter().take(limit as usize).cloned().collect())
    }

    async fn count_ventures_owned(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        self.enter(PlatformOperation::CountVenturesOwned).await?;
        Ok(self.statistics_for(user_id).await.ventures_owned)
    }

    async fn count_funding_requests_sent(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        self.enter(PlatformOperation::CountFundingRequestsSent).await?;
        Ok(self.statistics_for(user_id).await.funding_requests_sent)
    }

    async fn count_contact_requests_received(
        &self,
        user_id: UserId,
    ) -> Result<i64, RepositoryError> {
        self.enter(PlatformOperation::CountContactRequestsReceived).await?;
        Ok(self.statistics_for(user_id).await.contact_requests_received)
    }

    async fn count_chats(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        self.enter(PlatformOperation::CountChats).await?;
        Ok(self.statistics_for(user_id).await.chats)
    }

    async fn list_conversations(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<ConversationSummary>, RepositoryError> {
        self.enter(PlatformOperation::ListConversations).await?;
        let conversations = self.conversations.read().await;
        Ok(conversations
            .get(&user_id)
            .map(|rows| rows.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_funding_requests(
        &self,
        limit: u32,
        status: Option<&str>,
    ) -> Result<Vec<FundingRequestSummary>, RepositoryError> {
        self.enter(PlatformOperation::ListFundingRequests).await?;
        let requests = self.funding_requests.read().await;
        Ok(requests
            .iter()
            .filter(|request| {
                status.map_or(true, |status| request.status.eq_ignore_ascii_case(status.trim()))
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, Caller>>,
    unavailable: RwLock<bool>,
    lookups: AtomicUsize,
}

impl InMemorySessionRepository {
    pub async fn insert(&self, token: impl Into<String>, caller: Caller) {
        self.sessions.write().await.insert(token.into(), caller);
    }

    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_caller(&self, token: &str) -> Result<Option<Caller>, RepositoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if *self.unavailable.read().await {
            return Err(RepositoryError::Unavailable("session store offline".to_owned()));
        }
        Ok(self.sessions.read().await.get(token).copied())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use ventura_core::domain::caller::{Caller, UserId, UserRole};
    use ventura_core::domain::platform::{UserStatistics, VentureSummary};

    use crate::repositories::{
        InMemoryPlatformRepository, InMemorySessionRepository, PlatformOperation,
        PlatformReadRepository, RepositoryError, SessionRepository,
    };

    fn venture(id: i64, name: &str, category: &str) -> VentureSummary {
        VentureSummary {
            id,
            name: name.to_owned(),
            description: None,
            category: Some(category.to_owned()),
            owner_name: "Ana".to_owned(),
            funding_goal: None,
            created_at: "2024-01-01 00:00:00".to_owned(),
        }
    }

    #[tokio::test]
    async fn filters_by_category_and_limit() {
        let repo = InMemoryPlatformRepository::default();
        repo.push_venture(venture(3, "Uno", "Tecnología")).await;
        repo.push_venture(venture(2, "Dos", "Salud")).await;
        repo.push_venture(venture(1, "Tres", "Tecnología")).await;

        let tech = repo.list_ventures(10, Some("tecno")).await.expect("list");
        assert_eq!(tech.iter().map(|v| v.id).collect::<Vec<_>>(), vec![3, 1]);

        let limited = repo.list_ventures(1, None).await.expect("list");
        assert_eq!(limited.len(), 1);
        assert_eq!(repo.calls(), 2);
    }

    #[tokio::test]
    async fn failing_operation_returns_unavailable() {
        let repo = InMemoryPlatformRepository::default();
        repo.set_statistics(UserId(7), UserStatistics { chats: 4, ..Default::default() }).await;
        repo.fail(PlatformOperation::CountChats).await;

        assert!(matches!(
            repo.count_chats(UserId(7)).await,
            Err(RepositoryError::Unavailable(_))
        ));
        assert_eq!(repo.count_ventures_owned(UserId(7)).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn operation_latency_only_slows_that_operation() {
        let repo = InMemoryPlatformRepository::default();
        repo.set_operation_latency(PlatformOperation::CountChats, Duration::from_millis(150))
            .await;

        let started = Instant::now();
        repo.count_ventures_owned(UserId(1)).await.expect("count");
        assert!(started.elapsed() < Duration::from_millis(100));

        let started = Instant::now();
        repo.count_chats(UserId(1)).await.expect("count");
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn session_lookup_counts_calls() {
        let sessions = InMemorySessionRepository::default();
        let caller = Caller { user_id: UserId(1), role: UserRole::Investor };
        sessions.insert("tok", caller).await;

        assert_eq!(sessions.find_caller("tok").await.expect("lookup"), Some(caller));
        assert_eq!(sessions.find_caller("other").await.expect("lookup"), None);
        assert_eq!(sessions.lookups(), 2);
    }
}
