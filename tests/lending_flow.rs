//! End-to-end lending scenarios against a real temp-file store

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use circulib::error::AppError;
use circulib::models::media::{MediaStatus, MediaType};
use circulib::notify::{DeliveryStatus, OverdueEvent, OverduePublisher, OverdueSubscriber};
use circulib::services::library::{LibraryService, SearchField};
use circulib::services::members::FileMemberDirectory;
use circulib::store::MediaStore;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Recorder {
    events: Rc<RefCell<Vec<OverdueEvent>>>,
}

impl OverdueSubscriber for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn deliver(&self, event: &OverdueEvent) -> Result<DeliveryStatus, AppError> {
        self.events.borrow_mut().push(event.clone());
        Ok(DeliveryStatus::Sent)
    }
}

#[test]
fn borrow_overdue_pay_and_auto_return_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("catalog.txt");
    let members_path = dir.path().join("members.txt");
    fs::write(&members_path, "u1,Gold,u1@example.org\n").unwrap();

    // Session one: catalog two copies, u1 borrows the book.
    let day_one = date(2025, 1, 10);
    {
        let members = FileMemberDirectory::load(&members_path).unwrap();
        let mut service = LibraryService::open(
            MediaStore::new(&store_path),
            Box::new(members),
            OverduePublisher::new(),
            day_one,
        )
        .unwrap();

        service
            .add_copy(MediaType::Book, "Clean Code", "Robert Martin", "111")
            .unwrap();
        service
            .add_copy(MediaType::Disc, "OK Computer", "Radiohead", "208")
            .unwrap();

        let due = service.borrow("111", 1, "u1", day_one).unwrap();
        assert_eq!(due, date(2025, 2, 7));
    }

    // Session two, ten days past due: the reload prices the fine at u1's
    // real (Gold) tier, the reminder goes out, and full payment auto-returns.
    let later = date(2025, 2, 17);
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut publisher = OverduePublisher::new();
    publisher.subscribe(Box::new(Recorder {
        events: Rc::clone(&events),
    }));

    let members = FileMemberDirectory::load(&members_path).unwrap();
    let mut service = LibraryService::open(
        MediaStore::new(&store_path),
        Box::new(members),
        publisher,
        later,
    )
    .unwrap();

    let book = service.copy("111", 1).unwrap();
    assert_eq!(book.status, MediaStatus::Overdue);
    assert_eq!(book.fine_amount, Decimal::new(50, 1)); // 10 days * 1.0 * 0.5

    let outcome = service.send_overdue_reminder("u1", later).unwrap();
    assert_eq!(outcome.overdue_items, 1);
    assert_eq!(outcome.report.sent, 1);
    {
        let recorded = events.borrow();
        assert_eq!(recorded[0].contact_address, "u1@example.org");
        assert_eq!(recorded[0].items[0].title, "Clean Code");
    }

    // Return is blocked until the fine is settled.
    let err = service.return_item("111", 1, "u1", later).unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    let partial = service
        .pay_fine("111", 1, "u1", Decimal::new(20, 1), later)
        .unwrap();
    assert!(!partial.auto_returned);
    assert_eq!(partial.remaining, Decimal::new(30, 1));

    let full = service
        .pay_fine("111", 1, "u1", Decimal::new(30, 1), later)
        .unwrap();
    assert!(full.auto_returned);
    assert_eq!(full.remaining, Decimal::ZERO);
    assert_eq!(service.copy("111", 1).unwrap().status, MediaStatus::Available);

    // The durable snapshot reflects the auto-return.
    let on_disk = fs::read_to_string(&store_path).unwrap();
    assert!(on_disk.contains("Book,Clean Code,Robert Martin,111,1,Available,,0,,0"));
    assert_eq!(on_disk.lines().count(), 2);
}

#[test]
fn damaged_store_lines_are_skipped_and_normalized_on_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("catalog.txt");
    let members_path = dir.path().join("members.txt");
    fs::write(&members_path, "").unwrap();
    fs::write(
        &store_path,
        "CD,X,Y,1\nnot a record\nBook,T,A,2,zzz,???,bad-date,NaN,0.0,oops\n",
    )
    .unwrap();

    let today = date(2025, 6, 1);
    let members = FileMemberDirectory::load(&members_path).unwrap();
    let mut service = LibraryService::open(
        MediaStore::new(&store_path),
        Box::new(members),
        OverduePublisher::new(),
        today,
    )
    .unwrap();

    let snapshots = service.catalog(today);
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].media_type, MediaType::Disc);
    assert_eq!(snapshots[0].status, MediaStatus::Available);
    assert_eq!(snapshots[1].copy_id, 1); // "zzz" defaulted

    // Any mutation rewrites the whole store in canonical ten-field form.
    service.add_copy(MediaType::Book, "New", "N", "3").unwrap();
    let on_disk = fs::read_to_string(&store_path).unwrap();
    assert_eq!(on_disk.lines().count(), 3);
    for line in on_disk.lines() {
        assert_eq!(line.split(',').count(), 10);
    }

    assert_eq!(service.search("x", SearchField::Title, today).len(), 1);
}
