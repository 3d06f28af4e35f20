//! Read models the assistant pulls from the platform store.

use serde::{Deserialize, Serialize};

use super::caller::UserId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VentureSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub owner_name: String,
    pub funding_goal: Option<f64>,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub ventures_owned: i64,
    pub funding_requests_sent: i64,
    pub contact_requests_received: i64,
    pub chats: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub chat_id: i64,
    pub counterpart_name: String,
    pub unread_count: i64,
    pub last_message: Option<String>,
    pub last_activity: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundingRequestSummary {
    pub id: i64,
    pub venture_name: String,
    pub requester_name: String,
    pub investor_name: Option<String>,
    pub amount: f64,
    pub status: String,
    pub requested_at: String,
}
