//! SplitBuddy Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;

use anyhow::Context;
use teloxide::prelude::*;
use tracing::{info, warn};

use SplitBuddy::{
    config::{SessionBackend, Settings, StorageBackend},
    database::{create_pool, run_migrations, DatabaseService, LedgerStore, MemoryLedger},
    dispatch::{DispatchSerializer, Router},
    handlers,
    i18n::I18n,
    services::ServiceFactory,
    state::{MemorySessionStorage, RedisSessionStorage, SessionStorage},
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;

    if std::env::args().any(|arg| arg == "--print-config") {
        println!("{}", settings.to_toml()?);
        return Ok(());
    }

    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", SplitBuddy::info());

    let store: Arc<dyn LedgerStore> = match settings.storage.backend {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let pool = create_pool(&settings.database).await?;

            info!("Running database migrations...");
            run_migrations(&pool).await?;

            Arc::new(DatabaseService::new(pool))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory ledger, expenses are lost on restart");
            Arc::new(MemoryLedger::new())
        }
    };

    let sessions: Arc<dyn SessionStorage> = match settings.sessions.backend {
        SessionBackend::Redis => {
            info!("Connecting to Redis...");
            let storage = RedisSessionStorage::new(settings.redis.clone()).await?;
            storage.test_connection().await?;
            Arc::new(storage)
        }
        SessionBackend::Memory => Arc::new(MemorySessionStorage::new()),
    };

    info!("Loading translations...");
    let mut i18n = I18n::new(&settings.i18n);
    i18n.load_translations().await?;
    let i18n = Arc::new(i18n);

    let services = ServiceFactory::new(store, &settings);
    let router = Router::new(&services, &settings.dialog);
    let serializer = DispatchSerializer::new(Arc::new(router), sessions, &settings.dispatch);

    let bot = Bot::new(&settings.bot.token);
    if let Err(e) = handlers::register_commands(&bot, &i18n).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let mut dispatcher = Dispatcher::builder(bot, handlers::schema())
        .dependencies(dptree::deps![serializer, i18n])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    info!("SplitBuddy bot is ready, starting polling...");
    dispatcher.dispatch().await;

    info!("SplitBuddy bot has been shut down.");
    Ok(())
}
