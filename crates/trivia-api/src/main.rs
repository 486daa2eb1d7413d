//! Trivia session API server entry point.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use trivia_core::catalog::QuizCatalog;
use trivia_core::clock::{Clock, SystemClock};
use trivia_core::ledger::ScoreLedger;
use trivia_scoreboard::refresher::{ScoreboardRefresher, watch_refresh_task};
use trivia_session::application::narration::NoNarration;
use trivia_session::application::timer_driver::TimerDriver;
use trivia_session::domain::session::{QuizSession, SessionSettings};
use trivia_session::domain::tracker::AnsweredTracker;
use trivia_store::pg_backend::PgQuizBackend;
use trivia_store::progress_file::JsonFileProgressStore;
use trivia_store::schema::MIGRATOR;
use uuid::Uuid;

use trivia_api::config::Config;
use trivia_api::error::AppError;
use trivia_api::routes;
use trivia_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting trivia session API server");

    let config = Config::from_env()?;

    // Create database connection pool and bring the schema up to date.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(AppError::from)?;
    MIGRATOR.run(&pool).await.map_err(AppError::from)?;

    let backend = Arc::new(PgQuizBackend::new(pool));
    let catalog: Arc<dyn QuizCatalog> = backend.clone();
    let ledger: Arc<dyn ScoreLedger> = backend;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Restore progress from the previous run.
    let progress = Arc::new(JsonFileProgressStore::new(config.progress_path.clone()));
    tracing::info!(path = %progress.path().display(), "opening progress store");
    let tracker = AnsweredTracker::open(progress);
    let session = QuizSession::new(
        Uuid::new_v4(),
        SessionSettings {
            default_timer_seconds: config.default_timer_seconds,
        },
        tracker,
    );
    let driver = TimerDriver::new(Arc::clone(&clock), Arc::new(NoNarration));

    let refresher = ScoreboardRefresher::new(
        Arc::clone(&ledger),
        Arc::clone(&catalog),
        Arc::clone(&clock),
        config.scoreboard_refresh,
    );
    let (scoreboard, refresh_task) = refresher.spawn();
    tokio::spawn(watch_refresh_task(refresh_task));

    // Build application state.
    let app_state = AppState::new(
        Arc::new(Mutex::new(session)),
        Arc::new(driver),
        catalog,
        ledger,
        clock,
        scoreboard,
        config.ledger_timeout,
    );

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::api_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr = config.listen_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(AppError::from)?;

    axum::serve(listener, app).await.map_err(AppError::from)?;

    Ok(())
}
