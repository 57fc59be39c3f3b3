mod error;
mod handlers;
mod views;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use contact_book_core::ContactStore;
use contact_book_store_memory::InMemoryContactStore;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::handlers::ContactHandler;
use crate::views::Views;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Parser)]
#[command(name = "contact-book")]
#[command(about = "Server-rendered contact book")]
struct Args {
    /// Directory served under /static/.
    #[arg(long, default_value = "./ui/static/")]
    dir: PathBuf,
    /// Root holding the html/ and components/ templates.
    #[arg(long, default_value = "./ui")]
    templates: PathBuf,
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,
    /// Start with an empty store instead of the demo contacts.
    #[arg(long)]
    no_seed: bool,
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn app(contacts: ContactHandler, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/contacts", get(handlers::list_contacts))
        .route("/contacts/", get(handlers::list_contacts))
        .route("/contacts/new", get(handlers::new_contact_form).post(handlers::create_contact))
        .route(
            "/contacts/:id/edit",
            get(handlers::edit_contact_form).post(handlers::update_contact),
        )
        .route("/contacts/:id/delete", post(handlers::delete_contact))
        .fallback(handlers::strip_trailing_slash)
        .with_state(contacts)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
}

/// Resolves on SIGTERM or SIGINT (Ctrl-C elsewhere). If the handlers cannot be installed the
/// server keeps running rather than shutting down at once.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut terminate), Ok(mut interrupt)) => {
                tokio::select! {
                    _ = terminate.recv() => {}
                    _ = interrupt.recv() => {}
                }
            }
            (Err(err), _) | (_, Err(err)) => {
                tracing::error!(error = %err, "failed to install shutdown signal handlers");
                std::future::pending::<()>().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install shutdown signal handler");
            std::future::pending::<()>().await;
        }
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let store: Arc<dyn ContactStore> = if args.no_seed {
        Arc::new(InMemoryContactStore::new())
    } else {
        Arc::new(InMemoryContactStore::seeded())
    };
    let views = Views::new(args.templates);
    tracing::info!(
        templates = %views.root().display(),
        static_dir = %args.dir.display(),
        "loaded configuration"
    );

    let contacts = ContactHandler::new(store, views, tracing::info_span!("contacts"));
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    tracing::info!(addr = %args.bind, "listening");
    axum::serve(listener, app(contacts, &args.dir))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
