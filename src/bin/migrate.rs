use dotenvy::dotenv;

use bookmark_service::config::DatabaseConfig;
use bookmark_service::database::DatabaseService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv();
    env_logger::builder().filter_level(log::LevelFilter::Info).init();

    // Only the database settings are needed here, so JWT_SECRET may be absent.
    let config = DatabaseConfig {
        url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set in environment")?,
        max_connections: 1,
    };
    let dir = std::env::args().nth(1).unwrap_or_else(|| "migrations".to_string());

    let db = DatabaseService::new(&config).await?;
    let applied = db.run_migrations(&dir).await?;

    if applied.is_empty() {
        println!("No pending migrations in {}/", dir);
    } else {
        for name in &applied {
            println!("Applied: {}", name);
        }
    }
    println!("Migrations complete");
    Ok(())
}
