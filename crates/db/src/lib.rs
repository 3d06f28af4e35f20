pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_in_memory, connect_with_settings, DbPool};
pub use fixtures::{
    DemoDataset, SeedResult, VerificationResult, DEMO_ENTREPRENEUR_ID, DEMO_INVESTOR_ID,
    DEMO_SESSION_TOKEN,
};
pub use repositories::{
    PlatformReadRepository, RepositoryError, SessionRepository, SqlPlatformRepository,
    SqlSessionRepository,
};
