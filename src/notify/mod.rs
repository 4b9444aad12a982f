//! Overdue notification pipeline
//!
//! Decouples "this user has overdue copies" from how the user is contacted.
//! Fan-out is synchronous and in registration order; a failure in one
//! subscriber is reported and never blocks the others.

pub mod email;

use crate::{error::AppResult, models::media::MediaItem};

/// Transient overdue event handed to every subscriber; never persisted
#[derive(Debug, Clone)]
pub struct OverdueEvent {
    pub username: String,
    pub contact_address: String,
    pub items: Vec<MediaItem>,
}

/// What a subscriber did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    Skipped,
}

/// Delivery capability registered with the publisher
pub trait OverdueSubscriber {
    /// Short identifier used in logs and failure reports
    fn name(&self) -> &str;

    fn deliver(&self, event: &OverdueEvent) -> AppResult<DeliveryStatus>;
}

/// Fan-out summary for one event
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub sent: usize,
    pub skipped: usize,
    pub failures: Vec<String>,
}

impl DeliveryReport {
    pub fn attempted(&self) -> usize {
        self.sent + self.skipped + self.failures.len()
    }
}

/// Holds the subscriber list; constructed and populated by the composition
/// root, then owned by the library service. No process-wide statics.
#[derive(Default)]
pub struct OverduePublisher {
    subscribers: Vec<Box<dyn OverdueSubscriber>>,
}

impl OverduePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; registration order is delivery order
    pub fn subscribe(&mut self, subscriber: Box<dyn OverdueSubscriber>) {
        self.subscribers.push(subscriber);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver the event to every subscriber, isolating failures
    pub fn notify(&self, event: &OverdueEvent) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for subscriber in &self.subscribers {
            match subscriber.deliver(event) {
                Ok(DeliveryStatus::Sent) => report.sent += 1,
                Ok(DeliveryStatus::Skipped) => report.skipped += 1,
                Err(e) => {
                    tracing::error!(
                        subscriber = subscriber.name(),
                        user = %event.username,
                        error = %e,
                        "overdue notification delivery failed"
                    );
                    report.failures.push(format!("{}: {}", subscriber.name(), e));
                }
            }
        }
        report
    }
}
