mod app;
mod completion;
mod config;
mod dto;
mod error;
mod handler;
mod mailer;
mod service;
#[cfg(test)]
mod testing;

use std::{env, sync::Arc};

use tracing_subscriber::EnvFilter;

use completion::GroqClient;
use mailer::SmtpMailer;
use service::EmailService;

/// `RUST_LOG` directives when given and valid, INFO otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn status(present: bool) -> &'static str {
    if present { "set" } else { "missing" }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(env::var("RUST_LOG").ok().as_deref()))
        .init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load configuration: {e}");
        panic!("failed to load configuration: {e}");
    });
    tracing::info!("Successfully loaded email sender config");

    let presence = cfg.presence();
    tracing::info!(
        groq_api_key = status(presence.groq_api_key),
        email_user = status(presence.email_user),
        email_pass = status(presence.email_pass),
        "Credential status"
    );

    // Setup adapters and service
    let completion = GroqClient::new(cfg.completion.clone()).unwrap_or_else(|e| {
        tracing::error!("Failed to create completion client: {e}");
        panic!("failed to create completion client: {e}");
    });
    let mailer = SmtpMailer::new(cfg.smtp.clone());
    let service = Arc::new(EmailService::new(
        Arc::new(completion),
        Arc::new(mailer),
        presence,
    ));

    // Setup router
    let router = app::build_router(service, &cfg);

    // Start server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", cfg.port))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind to port {}: {e}", cfg.port);
            panic!("failed to bind to port {}: {e}", cfg.port);
        });

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Email sender starting, listening on {}", addr),
        Err(e) => tracing::warn!("Listening, but local address is unavailable: {e}"),
    }
    tracing::info!("Serving static files from {}", cfg.static_dir.display());
    tracing::info!("Endpoints: GET /, GET /api/health, POST /api/generate-email, POST /api/send-email");

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("HTTP server error: {e}");
        panic!("failed to start HTTP server: {e}");
    }
}
