//! Library circulation service
//!
//! Orchestrates the lending domain: owns the working set of copies, runs
//! borrow/return/payment against it, keeps fines current, rewrites the
//! store after every mutation, and publishes overdue events.
//!
//! "Today" is an explicit parameter on every time-sensitive operation so
//! callers (and tests) control the clock.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::media::{MediaItem, MediaStatus, MediaType},
    notify::{DeliveryReport, OverdueEvent, OverduePublisher},
    services::members::MemberLookup,
    store::MediaStore,
};

/// Searchable catalog fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
    CatalogId,
}

/// Read-only view of one copy handed to the presentation layer
///
/// `fine_preview` is a display-only estimate priced at Silver tier; the
/// borrower's real tier is only used where a fine is persisted.
#[derive(Debug, Clone)]
pub struct CopySnapshot {
    pub media_type: MediaType,
    pub title: String,
    pub author: String,
    pub catalog_id: String,
    pub copy_id: i32,
    pub status: MediaStatus,
    pub due_date: Option<NaiveDate>,
    pub borrowed_by: String,
    pub fine_preview: Decimal,
}

/// Result of a fine payment
#[derive(Debug)]
pub struct PaymentOutcome {
    pub remaining: Decimal,
    pub auto_returned: bool,
}

/// Result of an overdue reminder
#[derive(Debug)]
pub struct ReminderOutcome {
    pub overdue_items: usize,
    pub report: DeliveryReport,
}

pub struct LibraryService {
    store: MediaStore,
    members: Box<dyn MemberLookup>,
    publisher: OverduePublisher,
    items: Vec<MediaItem>,
}

impl LibraryService {
    /// Build the service and load the working set from the store
    pub fn open(
        store: MediaStore,
        members: Box<dyn MemberLookup>,
        publisher: OverduePublisher,
        today: NaiveDate,
    ) -> AppResult<Self> {
        let mut service = Self {
            store,
            members,
            publisher,
            items: Vec::new(),
        };
        service.reload(today)?;
        Ok(service)
    }

    /// Reload the working set from the store
    ///
    /// Overdue borrowed records get their fine recalculated with the
    /// borrower's tier before joining the working set. On load failure the
    /// current working set is left untouched.
    pub fn reload(&mut self, today: NaiveDate) -> AppResult<usize> {
        let mut loaded = self.store.load()?;
        for item in &mut loaded {
            if !item.borrowed_by.is_empty() && item.is_overdue(today) {
                let tier = self.members.tier(&item.borrowed_by);
                item.recalculate_fine(today, tier);
            }
        }
        self.items = loaded;
        tracing::info!(count = self.items.len(), "catalog reloaded");
        Ok(self.items.len())
    }

    /// Add a new copy of a title; returns the assigned copy id
    ///
    /// Text fields are trimmed here so the in-memory value is always the
    /// canonical form the store codec reproduces.
    pub fn add_copy(
        &mut self,
        media_type: MediaType,
        title: &str,
        author: &str,
        catalog_id: &str,
    ) -> AppResult<i32> {
        let title = title.trim();
        let author = author.trim();
        let catalog_id = catalog_id.trim();
        if title.is_empty() || catalog_id.is_empty() {
            return Err(AppError::Validation(
                "Title and catalog id are required".to_string(),
            ));
        }

        let copy_id = self
            .items
            .iter()
            .filter(|i| i.catalog_id == catalog_id)
            .map(MediaItem::copy_id)
            .max()
            .unwrap_or(0)
            + 1;

        self.items
            .push(MediaItem::new(media_type, title, author, catalog_id, copy_id));
        self.persist()?;

        tracing::info!(%catalog_id, copy_id, %media_type, "copy added to catalog");
        Ok(copy_id)
    }

    /// Remove a copy from the catalog; rejected while the copy is on loan
    pub fn remove_copy(&mut self, catalog_id: &str, copy_id: i32) -> AppResult<()> {
        let idx = self.position(catalog_id, copy_id)?;
        if self.items[idx].status != MediaStatus::Available {
            return Err(AppError::BusinessRule(
                "Cannot remove a copy that is on loan".to_string(),
            ));
        }
        self.items.remove(idx);
        self.persist()?;

        tracing::info!(%catalog_id, copy_id, "copy removed from catalog");
        Ok(())
    }

    /// Lend a copy to `username`; returns the due date
    pub fn borrow(
        &mut self,
        catalog_id: &str,
        copy_id: i32,
        username: &str,
        today: NaiveDate,
    ) -> AppResult<NaiveDate> {
        Self::require_user(username)?;
        let idx = self.position(catalog_id, copy_id)?;

        let due = self.items[idx].borrow(username, today)?;
        self.persist()?;

        tracing::info!(%catalog_id, copy_id, user = username, %due, "copy borrowed");
        Ok(due)
    }

    /// Return a copy
    ///
    /// Uniform policy: a copy with any outstanding fine (priced at the
    /// borrower's real tier as of `today`) cannot be returned until the
    /// fine is settled.
    pub fn return_item(
        &mut self,
        catalog_id: &str,
        copy_id: i32,
        username: &str,
        today: NaiveDate,
    ) -> AppResult<()> {
        Self::require_user(username)?;
        let idx = self.position(catalog_id, copy_id)?;
        self.require_owner(idx, username)?;

        // probe on a clone so a rejected return leaves state untouched
        let mut probe = self.items[idx].clone();
        probe.recalculate_fine(today, self.members.tier(username));
        if probe.fine_amount > Decimal::ZERO {
            return Err(AppError::BusinessRule(format!(
                "Outstanding fine of {} must be settled before return",
                probe.fine_amount
            )));
        }

        self.items[idx].return_item();
        self.persist()?;

        tracing::info!(%catalog_id, copy_id, user = username, "copy returned");
        Ok(())
    }

    /// Pay against the outstanding fine on a copy
    ///
    /// A payment that clears the fine auto-returns the copy.
    pub fn pay_fine(
        &mut self,
        catalog_id: &str,
        copy_id: i32,
        username: &str,
        amount: Decimal,
        today: NaiveDate,
    ) -> AppResult<PaymentOutcome> {
        Self::require_user(username)?;
        let idx = self.position(catalog_id, copy_id)?;
        self.require_owner(idx, username)?;

        let tier = self.members.tier(username);
        let mut probe = self.items[idx].clone();
        probe.recalculate_fine(today, tier);
        probe.apply_payment(amount)?;
        probe.recalculate_fine(today, tier);

        let remaining = probe.fine_amount;
        let auto_returned = remaining == Decimal::ZERO;
        if auto_returned {
            probe.return_item();
        }

        self.items[idx] = probe;
        self.persist()?;

        tracing::info!(
            %catalog_id, copy_id, user = username, %amount, %remaining, auto_returned,
            "fine payment applied"
        );
        Ok(PaymentOutcome {
            remaining,
            auto_returned,
        })
    }

    /// Case-insensitive substring search over one field
    pub fn search(&self, keyword: &str, field: SearchField, today: NaiveDate) -> Vec<CopySnapshot> {
        let needle = keyword.to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                let haystack = match field {
                    SearchField::Title => &item.title,
                    SearchField::Author => &item.author,
                    SearchField::CatalogId => &item.catalog_id,
                };
                haystack.to_lowercase().contains(&needle)
            })
            .map(|item| Self::snapshot(item, today))
            .collect()
    }

    /// Read snapshot of the whole catalog for the presentation layer
    pub fn catalog(&self, today: NaiveDate) -> Vec<CopySnapshot> {
        self.items
            .iter()
            .map(|item| Self::snapshot(item, today))
            .collect()
    }

    /// Look up one copy
    pub fn copy(&self, catalog_id: &str, copy_id: i32) -> Option<&MediaItem> {
        self.items
            .iter()
            .find(|i| i.catalog_id == catalog_id && i.copy_id() == copy_id)
    }

    /// Recalculate and notify the user's overdue copies
    ///
    /// Fines are refreshed with the user's real tier and persisted before
    /// fan-out, so a delivery failure never corrupts stored state. With no
    /// overdue copies the outcome reports zero items and no deliveries.
    pub fn send_overdue_reminder(
        &mut self,
        username: &str,
        today: NaiveDate,
    ) -> AppResult<ReminderOutcome> {
        Self::require_user(username)?;

        let tier = self.members.tier(username);
        let mut overdue = Vec::new();
        for item in &mut self.items {
            if item.borrowed_by == username && item.is_overdue(today) {
                item.recalculate_fine(today, tier);
                overdue.push(item.clone());
            }
        }

        if overdue.is_empty() {
            tracing::debug!(user = username, "no overdue copies, nothing to send");
            return Ok(ReminderOutcome {
                overdue_items: 0,
                report: DeliveryReport::default(),
            });
        }

        self.persist()?;

        let event = OverdueEvent {
            username: username.to_string(),
            contact_address: self.members.contact(username).unwrap_or_default(),
            items: overdue,
        };
        let report = self.publisher.notify(&event);

        tracing::info!(
            user = username,
            items = event.items.len(),
            sent = report.sent,
            skipped = report.skipped,
            failed = report.failures.len(),
            "overdue reminder processed"
        );
        Ok(ReminderOutcome {
            overdue_items: event.items.len(),
            report,
        })
    }

    /// Usernames with at least one overdue copy as of `today`
    pub fn overdue_borrowers(&self, today: NaiveDate) -> Vec<String> {
        let mut users: Vec<String> = self
            .items
            .iter()
            .filter(|i| !i.borrowed_by.is_empty() && i.is_overdue(today))
            .map(|i| i.borrowed_by.clone())
            .collect();
        users.sort();
        users.dedup();
        users
    }

    fn persist(&self) -> AppResult<()> {
        self.store.save(&self.items)
    }

    fn position(&self, catalog_id: &str, copy_id: i32) -> AppResult<usize> {
        self.items
            .iter()
            .position(|i| i.catalog_id == catalog_id && i.copy_id() == copy_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Copy {}/{} not found", catalog_id, copy_id))
            })
    }

    fn require_user(username: &str) -> AppResult<()> {
        if username.trim().is_empty() {
            return Err(AppError::Validation("No user signed in".to_string()));
        }
        Ok(())
    }

    fn require_owner(&self, idx: usize, username: &str) -> AppResult<()> {
        let item = &self.items[idx];
        if item.status == MediaStatus::Available {
            return Err(AppError::BusinessRule("Item is not on loan".to_string()));
        }
        if item.borrowed_by != username {
            return Err(AppError::Validation(
                "Item is borrowed by another user".to_string(),
            ));
        }
        Ok(())
    }

    fn snapshot(item: &MediaItem, today: NaiveDate) -> CopySnapshot {
        CopySnapshot {
            media_type: item.media_type,
            title: item.title.clone(),
            author: item.author.clone(),
            catalog_id: item.catalog_id.clone(),
            copy_id: item.copy_id(),
            status: item.status,
            due_date: item.due_date,
            borrowed_by: item.borrowed_by.clone(),
            fine_preview: item.fine_preview(today),
        }
    }
}
