//! Circulib overdue reminder sweep
//!
//! Composition root: wires the catalog store, member directory, and
//! notification pipeline into the library service, then sends a reminder
//! to every borrower with overdue copies.

use anyhow::Context;
use chrono::Local;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use circulib::{
    config::AppConfig,
    notify::{
        email::{EmailReminder, SmtpMailer},
        OverduePublisher,
    },
    services::{library::LibraryService, members::FileMemberDirectory},
    store::MediaStore,
};

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("circulib={}", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Circulib reminder sweep v{}", env!("CARGO_PKG_VERSION"));

    let members = FileMemberDirectory::load(&config.members.path)?;
    tracing::info!(members = members.len(), "member directory loaded");

    // Subscribers are registered here, at the composition root
    let mut publisher = OverduePublisher::new();
    publisher.subscribe(Box::new(EmailReminder::new(Box::new(SmtpMailer::new(
        config.email.clone(),
    )))));

    let today = Local::now().date_naive();
    let mut service = LibraryService::open(
        MediaStore::new(&config.store.path),
        Box::new(members),
        publisher,
        today,
    )?;

    let borrowers = service.overdue_borrowers(today);
    tracing::info!(count = borrowers.len(), "borrowers with overdue copies");

    let mut delivery_failures = 0usize;
    for username in &borrowers {
        match service.send_overdue_reminder(username, today) {
            Ok(outcome) => delivery_failures += outcome.report.failures.len(),
            Err(e) => {
                delivery_failures += 1;
                tracing::error!(user = %username, error = %e, "reminder failed");
            }
        }
    }

    if delivery_failures > 0 {
        tracing::warn!(delivery_failures, "sweep finished with delivery failures");
    } else {
        tracing::info!("sweep finished");
    }

    Ok(())
}
