use std::{
    error::Error,
    fs::OpenOptions,
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use time::{Date, macros::format_description};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use tally_rs::{
    AppState, DEFAULT_PLAID_TIMEOUT, PlaidClient, PlaidConfig, PlaidEnvironment,
    TransactionWindow, build_router, graceful_shutdown,
};

/// The web server for Tally.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_PATH")]
    db_path: String,

    /// The port to serve the app from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Also write debug level logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// The secret used to sign and encrypt session cookies.
    #[arg(long, env = "SECRET", hide_env_values = true)]
    secret: String,

    /// The client ID for the Plaid API.
    #[arg(long, env = "PLAID_CLIENT_ID")]
    plaid_client_id: String,

    /// The secret for the Plaid API.
    #[arg(long, env = "PLAID_SECRET", hide_env_values = true)]
    plaid_secret: String,

    /// The Plaid environment: sandbox, development or production.
    #[arg(long, env = "PLAID_ENV", default_value = "sandbox")]
    plaid_env: PlaidEnvironment,

    /// Seconds to wait for Plaid before failing a request.
    #[arg(
        long,
        default_value_t = DEFAULT_PLAID_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    plaid_timeout_secs: u64,

    /// The first day to fetch linked transactions for, as YYYY-MM-DD.
    #[arg(long, value_parser = parse_date, default_value = "2024-01-01")]
    plaid_start_date: Date,

    /// The last day to fetch linked transactions for, as YYYY-MM-DD.
    #[arg(long, value_parser = parse_date, default_value = "2024-12-31")]
    plaid_end_date: Date,
}

fn parse_date(text: &str) -> Result<Date, String> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map_err(|error| format!("expected a date like 2024-01-31: {error}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    setup_logging(args.log_file.as_ref())?;

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let mut plaid_config =
        PlaidConfig::new(&args.plaid_client_id, &args.plaid_secret, args.plaid_env);
    plaid_config.timeout = Duration::from_secs(args.plaid_timeout_secs);
    let plaid_client = PlaidClient::new(plaid_config)?;
    let transaction_window = TransactionWindow::new(args.plaid_start_date, args.plaid_end_date)?;

    let conn = Connection::open(&args.db_path)?;
    let app_state = AppState::new(
        conn,
        &args.secret,
        Arc::new(plaid_client),
        transaction_window,
    )?;

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    tracing::info!(
        "HTTP server listening on {} using the Plaid {} environment",
        addr,
        args.plaid_env
    );
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

fn setup_logging(log_file: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let debug_log = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .with_filter(filter::LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but errors are
        // already logged where they are handled.
        .on_failure(());

    router.layer(tracing_layer)
}
