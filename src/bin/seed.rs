//! Inserts sample users into a development database.

use clap::Parser;
use tracing::{info, warn};
use users_backend::{
    config::Config,
    database::pool::create_pool,
    logging::init_tracing,
    models::user::{NewUser, UserFilter, UserStatus},
};

const SEED_USERS: [(&str, &str, UserStatus); 10] = [
    ("John Doe", "john.doe@example.com", UserStatus::Active),
    ("Jane Smith", "jane.smith@example.com", UserStatus::Active),
    ("Bob Johnson", "bob.johnson@example.com", UserStatus::Inactive),
    ("Alice Brown", "alice.brown@example.com", UserStatus::Active),
    ("Charlie Wilson", "charlie.wilson@example.com", UserStatus::Suspended),
    ("Diana Davis", "diana.davis@example.com", UserStatus::Active),
    ("Eve Miller", "eve.miller@example.com", UserStatus::Active),
    ("Frank Garcia", "frank.garcia@example.com", UserStatus::Inactive),
    ("Grace Martinez", "grace.martinez@example.com", UserStatus::Active),
    ("Henry Rodriguez", "henry.rodriguez@example.com", UserStatus::Active),
];

#[derive(Parser, Debug)]
#[command(name = "seed", about = "Seed the users table with sample data")]
struct Cli {
    /// Add seed rows even when the table already has users.
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config)?;

    if !config.is_dev() {
        anyhow::bail!("seeding is only allowed when ENV is dev or local");
    }

    let db = create_pool(&config).await?;
    db.migrate().await?;
    let repo = db.user_repository();
    info!(env = %config.env, driver = %db.driver(), "seeding database");

    let everyone = UserFilter {
        offset: 0,
        limit: 1,
        status: None,
        search: None,
    };
    let (_, existing) = repo.list(&everyone).await?;
    if existing > 0 && !cli.force {
        warn!(existing, "users table is not empty, rerun with --force to add seed data");
        db.close().await;
        return Ok(());
    }

    let mut created = 0;
    for (name, email, status) in SEED_USERS {
        if repo.get_by_email(email).await?.is_some() {
            info!(email, "skipping existing user");
            continue;
        }
        let user = repo
            .create(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                status,
            })
            .await?;
        info!(user_id = user.id, email, "created user");
        created += 1;
    }

    info!(created, skipped = SEED_USERS.len() - created, "seeding finished");
    db.close().await;
    Ok(())
}
