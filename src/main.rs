use std::env;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use penang::application::ports::{Authenticator, JobRepository, ProgressNotifier, QuestionExtractor};
use penang::application::services::{ParseService, ParseWorker};
use penang::infrastructure::auth::HmacTokenSigner;
use penang::infrastructure::llm::OpenAiExtractor;
use penang::infrastructure::notify::ChannelNotifier;
use penang::infrastructure::observability::{TracingConfig, init_tracing};
use penang::infrastructure::persistence::{MemoryJobRepository, PgJobRepository, create_pg_pool};
use penang::presentation::{AppState, Environment, Settings, create_router};

const PARSE_QUEUE_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment)?;

    init_tracing(
        TracingConfig {
            environment: environment.to_string(),
            json_format: settings.logging.enable_json,
        },
        settings.server.port,
    );

    let job_repository: Arc<dyn JobRepository> = if settings.database.url == "memory" {
        tracing::warn!("Using in-memory job store; jobs will not survive a restart");
        Arc::new(MemoryJobRepository::new())
    } else {
        let pool =
            create_pg_pool(&settings.database.url, settings.database.max_connections).await?;
        if settings.database.run_migrations {
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations applied");
        }
        Arc::new(PgJobRepository::new(pool))
    };
    let notifier: Arc<dyn ProgressNotifier> = Arc::new(ChannelNotifier::new());
    let extractor: Arc<dyn QuestionExtractor> =
        Arc::new(OpenAiExtractor::from_settings(&settings.llm));
    let authenticator: Arc<dyn Authenticator> = Arc::new(HmacTokenSigner::new(
        settings.auth.secret_key.clone(),
        settings.auth.token_ttl_hours,
    ));

    let (sender, receiver) = mpsc::channel(PARSE_QUEUE_CAPACITY);
    let worker = ParseWorker::new(
        receiver,
        extractor,
        Arc::clone(&job_repository),
        Arc::clone(&notifier),
        Duration::from_secs(settings.llm.extraction_timeout_seconds),
    );
    tokio::spawn(worker.run());

    let parse_service = Arc::new(ParseService::new(
        Arc::clone(&job_repository),
        Arc::clone(&notifier),
        sender,
        settings.upload.max_bytes(),
    ));

    let host: IpAddr = settings.server.host.parse()?;
    let addr = SocketAddr::new(host, settings.server.port);

    let state = AppState {
        parse_service,
        job_repository,
        notifier,
        authenticator,
        settings,
    };
    let router = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
