use ventura_core::domain::caller::{UserId, UserRole};
use ventura_db::{
    connect, migrations, DemoDataset, PlatformReadRepository, SessionRepository,
    SqlPlatformRepository, SqlSessionRepository, DEMO_ENTREPRENEUR_ID, DEMO_SESSION_TOKEN,
};

#[tokio::test]
async fn seeded_file_database_serves_assistant_reads() {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("ventura.db").display());

    let pool = connect(&url).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrate");
    DemoDataset::load(&pool).await.expect("seed");

    let sessions = SqlSessionRepository::new(pool.clone());
    let caller =
        sessions.find_caller(DEMO_SESSION_TOKEN).await.expect("lookup").expect("demo session");
    assert_eq!(caller.user_id, UserId(DEMO_ENTREPRENEUR_ID));
    assert_eq!(caller.role, UserRole::Entrepreneur);

    let platform = SqlPlatformRepository::new(pool.clone());
    let ventures = platform.list_ventures(5, None).await.expect("ventures");
    assert_eq!(ventures.len(), 3);
    let investors = platform.list_investors(5).await.expect("investors");
    assert_eq!(investors.len(), 2);
    let pending = platform.list_funding_requests(5, Some("pendiente")).await.expect("requests");
    assert_eq!(pending.len(), 2);

    pool.close().await;
}

#[tokio::test]
async fn reopening_the_database_keeps_seed_and_migrations() {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("ventura.db").display());

    let pool = connect(&url).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrate");
    DemoDataset::load(&pool).await.expect("seed");
    pool.close().await;

    let reopened = connect(&url).await.expect("reconnect");
    migrations::run_pending(&reopened).await.expect("migrate again");
    let verification = DemoDataset::verify(&reopened).await.expect("verify");
    assert!(verification.all_present, "{:?}", verification.checks);

    reopened.close().await;
}
