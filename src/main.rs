use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use slotbook_api::{ApiState, config::ApiConfig, middleware::auth::hash_password};
use slotbook_booking::LogNotifier;
use slotbook_core::clock::SystemClock;
use slotbook_db::{
    AppointmentStore, MemoryAppointmentStore, PgAppointmentStore, create_pool,
    schema::initialize_database,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // `slotbook hash-password <password>` prints a value for ADMIN_PASSWORD_HASH
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [command, password] = args.as_slice() {
        if command == "hash-password" {
            println!("{}", hash_password(password)?);
            return Ok(());
        }
    }

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    slotbook_api::init_tracing(config.log_level)?;

    let store: Arc<dyn AppointmentStore> = match &config.database_url {
        Some(database_url) => {
            let db_pool = create_pool(database_url).await?;
            initialize_database(&db_pool).await?;
            Arc::new(PgAppointmentStore::connect(db_pool).await?)
        }
        None => {
            warn!("DATABASE_URL is not set, appointments are kept in memory only");
            Arc::new(MemoryAppointmentStore::new())
        }
    };

    if config.admin_password_hash.is_none() {
        warn!("ADMIN_PASSWORD_HASH is not set, admin endpoints are disabled");
    }

    let clock = Arc::new(SystemClock::with_offset_hours(config.utc_offset_hours));
    let state = ApiState::new(
        store,
        clock,
        Arc::new(LogNotifier),
        config.admin_password_hash.clone(),
    )
    .await?;
    info!("Clinic clock offset: UTC{:+}", config.utc_offset_hours);

    // Start API server
    slotbook_api::start_server(config, state).await?;

    Ok(())
}
