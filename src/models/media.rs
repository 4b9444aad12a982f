//! Media item model and its borrow/return/overdue state machine

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::member::MembershipTier,
    services::fines,
};

/// Media type of a circulating copy
///
/// Carries the per-type lending policy: loan period and base daily fine rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    #[default]
    Book,
    Disc,
}

impl MediaType {
    /// Parse a media type label, defaulting to Book for unrecognized input
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "disc" | "cd" | "dvd" => MediaType::Disc,
            _ => MediaType::Book,
        }
    }

    /// Number of days a copy of this type may be held
    pub fn loan_period_days(&self) -> i64 {
        match self {
            MediaType::Book => 28,
            MediaType::Disc => 7,
        }
    }

    /// Currency charged per overdue day before the tier discount
    pub fn daily_fine_rate(&self) -> Decimal {
        match self {
            // 1.0
            MediaType::Book => Decimal::new(10, 1),
            // 2.0
            MediaType::Disc => Decimal::new(20, 1),
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MediaType::Book => "Book",
            MediaType::Disc => "Disc",
        };
        write!(f, "{}", label)
    }
}

/// Circulation status of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaStatus {
    #[default]
    Available,
    Borrowed,
    Overdue,
}

impl MediaStatus {
    /// Parse a status label, defaulting to Available for unrecognized input
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "borrowed" => MediaStatus::Borrowed,
            "overdue" => MediaStatus::Overdue,
            _ => MediaStatus::Available,
        }
    }
}

impl std::fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MediaStatus::Available => "Available",
            MediaStatus::Borrowed => "Borrowed",
            MediaStatus::Overdue => "Overdue",
        };
        write!(f, "{}", label)
    }
}

/// One physical copy of a cataloged title
///
/// `catalog_id` is shared across copies of the same title; `copy_id` is
/// unique per copy of a given `catalog_id` and immutable after creation.
///
/// Invariant: `status == Available` holds exactly when `borrowed_by` is
/// empty, `due_date` is `None`, and both fine fields are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub media_type: MediaType,
    pub title: String,
    pub author: String,
    pub catalog_id: String,
    copy_id: i32,
    pub status: MediaStatus,
    pub due_date: Option<NaiveDate>,
    pub fine_amount: Decimal,
    pub borrowed_by: String,
    pub amount_paid: Decimal,
}

impl MediaItem {
    /// Create a newly cataloged copy in the Available state
    pub fn new(
        media_type: MediaType,
        title: impl Into<String>,
        author: impl Into<String>,
        catalog_id: impl Into<String>,
        copy_id: i32,
    ) -> Self {
        Self {
            media_type,
            title: title.into(),
            author: author.into(),
            catalog_id: catalog_id.into(),
            copy_id,
            status: MediaStatus::Available,
            due_date: None,
            fine_amount: Decimal::ZERO,
            borrowed_by: String::new(),
            amount_paid: Decimal::ZERO,
        }
    }

    /// Rebuild a copy from stored fields; used by the persistence codec
    #[allow(clippy::too_many_arguments)]
    pub fn from_record(
        media_type: MediaType,
        title: String,
        author: String,
        catalog_id: String,
        copy_id: i32,
        status: MediaStatus,
        due_date: Option<NaiveDate>,
        fine_amount: Decimal,
        borrowed_by: String,
        amount_paid: Decimal,
    ) -> Self {
        Self {
            media_type,
            title,
            author,
            catalog_id,
            copy_id,
            status,
            due_date,
            fine_amount,
            borrowed_by,
            amount_paid,
        }
    }

    pub fn copy_id(&self) -> i32 {
        self.copy_id
    }

    /// Lend this copy to `username`, returning the due date
    ///
    /// Due date is `today` plus the type's loan period; fine fields reset.
    pub fn borrow(&mut self, username: &str, today: NaiveDate) -> AppResult<NaiveDate> {
        if self.status != MediaStatus::Available {
            return Err(AppError::BusinessRule("Item already borrowed".to_string()));
        }
        let due = today + chrono::Duration::days(self.media_type.loan_period_days());
        self.status = MediaStatus::Borrowed;
        self.borrowed_by = username.to_string();
        self.due_date = Some(due);
        self.fine_amount = Decimal::ZERO;
        self.amount_paid = Decimal::ZERO;
        Ok(due)
    }

    /// Reset this copy to the Available state unconditionally
    ///
    /// Whether an outstanding fine blocks the return is caller policy; the
    /// service applies it uniformly before calling this.
    pub fn return_item(&mut self) {
        self.status = MediaStatus::Available;
        self.borrowed_by = String::new();
        self.due_date = None;
        self.fine_amount = Decimal::ZERO;
        self.amount_paid = Decimal::ZERO;
    }

    /// A due date equal to `today` is not overdue; strict comparison only
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => today > due,
            None => false,
        }
    }

    /// Recompute the outstanding fine for `today` and the borrower's tier
    ///
    /// Not overdue: fine drops to zero, and a copy previously flagged
    /// Overdue heals back to Borrowed (the due date was extended or reset).
    /// Overdue: fine is the tier-priced debt less payments already applied,
    /// floored at zero.
    pub fn recalculate_fine(&mut self, today: NaiveDate, tier: MembershipTier) {
        let overdue_days = match self.due_date {
            Some(due) if today > due => (today - due).num_days(),
            _ => {
                self.fine_amount = Decimal::ZERO;
                if self.status == MediaStatus::Overdue {
                    self.status = MediaStatus::Borrowed;
                }
                return;
            }
        };

        let total_debt = fines::calculate(overdue_days, self.media_type.daily_fine_rate(), tier);
        self.fine_amount = (total_debt - self.amount_paid).max(Decimal::ZERO);
        self.status = MediaStatus::Overdue;
    }

    /// Apply a payment against the current fine
    ///
    /// Callers must re-run [`recalculate_fine`](Self::recalculate_fine)
    /// afterward, and auto-return the copy once the balance reaches zero.
    pub fn apply_payment(&mut self, amount: Decimal) -> AppResult<()> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Payment must be greater than zero".to_string(),
            ));
        }
        if amount > self.fine_amount {
            return Err(AppError::Validation(
                "Payment exceeds fine amount".to_string(),
            ));
        }
        self.amount_paid += amount;
        Ok(())
    }

    /// Display-only fine estimate, always priced at Silver tier
    ///
    /// Catalog and search snapshots shown to anyone other than the borrower
    /// use this preview; the borrower's real tier is only consulted where a
    /// fine is actually persisted.
    pub fn fine_preview(&self, today: NaiveDate) -> Decimal {
        match self.due_date {
            Some(due) if today > due => {
                let days = (today - due).num_days();
                let debt =
                    fines::calculate(days, self.media_type.daily_fine_rate(), MembershipTier::Silver);
                (debt - self.amount_paid).max(Decimal::ZERO)
            }
            _ => Decimal::ZERO,
        }
    }
}
