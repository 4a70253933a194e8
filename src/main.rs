//! AcctGuard Server: account lockout and session lifecycle sweeps
//!
//! Main entry point that wires the crates together and runs the background
//! sweeps until interrupted.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use acctguard_auth::{
    AuditRecorder, CredentialGate, LockoutStateMachine, PasswordExpirationPolicy, SessionRegistry,
};
use acctguard_core::config::AppConfig;
use acctguard_core::traits::{Clock, SystemClock};
use acctguard_store::traits::{AuditSink, SessionStore, UserStore};
use acctguard_store::{MemorySessionStore, MemoryUserStore, TracingAuditSink};
use acctguard_worker::CronScheduler;

#[tokio::main]
async fn main() {
    let env = std::env::var("ACCTGUARD_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %format!("{e:#}"), "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Wires the services and runs the scheduler until Ctrl-C.
async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting AcctGuard v{}", env!("CARGO_PKG_VERSION"));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
    let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let sink: Arc<dyn AuditSink> = Arc::new(TracingAuditSink::new());
    let audit = AuditRecorder::new(sink);

    let lockout = Arc::new(LockoutStateMachine::new(
        Arc::clone(&users),
        audit.clone(),
        Arc::clone(&clock),
        config.lockout.clone(),
    ));
    let policy = Arc::new(PasswordExpirationPolicy::new(
        Arc::clone(&users),
        Arc::clone(&clock),
        config.password.clone(),
    ));
    let registry = Arc::new(SessionRegistry::new(
        sessions,
        Arc::clone(&users),
        Arc::clone(&clock),
        config.session.clone(),
    ));

    // Handed to the HTTP layer when one is mounted in front of this process.
    let gate = CredentialGate::new(
        Arc::clone(&users),
        Arc::clone(&lockout),
        policy,
        Arc::clone(&registry),
        audit,
        Arc::clone(&clock),
    );
    tracing::debug!(gate = ?gate, "Credential gate ready");

    if !config.worker.enabled {
        tracing::warn!("Background sweeps disabled; waiting for shutdown signal");
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for shutdown signal")?;
        return Ok(());
    }

    let executor = Arc::new(CronScheduler::default_executor(lockout, registry));
    let mut scheduler = CronScheduler::new(executor, clock, config.worker.clone())
        .await
        .context("Failed to create scheduler")?;
    scheduler.register_default_tasks().await?;
    scheduler.start().await?;

    tracing::info!("AcctGuard running; press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    tracing::info!("Shutdown signal received");
    scheduler.shutdown().await?;
    tracing::info!("AcctGuard stopped");
    Ok(())
}
