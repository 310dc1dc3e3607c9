//! Contact form relay server.
//!
//! Serves `POST /send-email` and forwards each valid submission to the
//! configured SMTP relay.

use anyhow::Result;
use contact_relay::{router, ContactRelay, EmailConfig, ServerConfig, SmtpMailer};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("contact_relay=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let email_config = EmailConfig::from_env();
    let missing = email_config.missing_settings();
    if !missing.is_empty() {
        warn!(?missing, "SMTP settings incomplete, sends will fail until they are set");
    }
    info!(
        host = email_config.smtp_host.as_deref().unwrap_or("<unset>"),
        port = email_config.smtp_port,
        secure = email_config.smtp_secure,
        "Loaded SMTP settings"
    );

    let mailer = Arc::new(SmtpMailer::new(email_config.clone()));
    let app = router(ContactRelay::new(email_config, mailer));

    let server_config = ServerConfig::from_env();
    let listener = tokio::net::TcpListener::bind(server_config.addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
