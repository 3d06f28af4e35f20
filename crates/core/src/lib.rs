pub mod config;
pub mod domain;
pub mod errors;

pub use domain::caller::{Caller, UserId, UserRole};
pub use domain::conversation::{last_user_message, ConversationTurn, TurnRole};
pub use domain::platform::{
    ConversationSummary, FundingRequestSummary, InvestorSummary, UserStatistics, VentureSummary,
};
pub use errors::{AssistantError, AuthError, DataError, InterfaceError};
