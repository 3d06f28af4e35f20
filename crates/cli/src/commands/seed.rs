use ventura_db::{DemoDataset, SeedResult};

use crate::commands::{migrated_pool, prepare, CommandResult, StepFailure};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = migrated_pool(&config).await?;

        let outcome = load_and_verify(&pool).await;
        pool.close().await;
        outcome
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", summary(&seeded)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

async fn load_and_verify(pool: &ventura_db::DbPool) -> Result<SeedResult, StepFailure> {
    let seeded = DemoDataset::load(pool)
        .await
        .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

    let verification = DemoDataset::verify(pool)
        .await
        .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

    if verification.all_present {
        Ok(seeded)
    } else {
        let failed: Vec<&str> = verification
            .checks
            .iter()
            .filter_map(|(check, passed)| (!passed).then_some(*check))
            .collect();
        Err(("seed_verification", verification_message(&failed), 6u8))
    }
}

fn verification_message(failed_checks: &[&str]) -> String {
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

fn summary(seeded: &SeedResult) -> String {
    let tables: Vec<String> = seeded
        .tables_seeded
        .iter()
        .map(|info| format!("  - {}: {} rows", info.table, info.rows))
        .collect();

    format!(
        "Demo dataset loaded:\n{}\nDemo session token for user {}: {}",
        tables.join("\n"),
        seeded.session_user_id,
        seeded.session_token
    )
}
