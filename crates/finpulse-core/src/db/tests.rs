//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{Alert, EmitOutcome, MemorySink, NotificationSink};
    use crate::analytics::Ledger;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use rusqlite::params;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (Database, OwnerId) {
        let db = Database::in_memory().unwrap();
        let owner = db.upsert_owner("Jordan", "jordan@example.com").unwrap();
        (db, owner)
    }

    fn expense(category: &str, amount: f64, on: NaiveDate) -> NewTransaction {
        NewTransaction::new(TransactionKind::Expense, category, amount, on)
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_owners().unwrap().is_empty());
    }

    #[test]
    fn test_owner_upsert_by_email() {
        let db = Database::in_memory().unwrap();

        let id = db.upsert_owner("Jordan", "jordan@example.com").unwrap();
        assert!(id > 0);

        // Same email returns same ID
        let id2 = db.upsert_owner("Jordan B.", "jordan@example.com").unwrap();
        assert_eq!(id, id2);

        assert_eq!(db.list_owners().unwrap().len(), 1);
        assert_eq!(db.require_owner(id).unwrap().name, "Jordan");
        assert!(matches!(db.require_owner(999), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_schema_exists() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('notifications') WHERE name IN ('id', 'owner_id', 'message', 'severity', 'is_read', 'created_at')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 6, "notifications table should have 6 expected columns");

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('budgets') WHERE name IN ('owner_id', 'period', 'limit_amount')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 3);
    }

    #[test]
    fn test_transaction_crud() {
        let (db, owner) = setup();

        let id = db
            .insert_transaction(owner, &expense("Food", 42.0, date(2026, 10, 3)).with_description("Groceries"))
            .unwrap()
            .id();

        let tx = db.get_transaction(owner, id).unwrap();
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert_eq!(tx.amount, 42.0);
        assert_eq!(tx.description.as_deref(), Some("Groceries"));
        assert_eq!(tx.date, date(2026, 10, 3));

        let updated = db
            .update_transaction(owner, id, &expense("Dining", 55.0, date(2026, 10, 4)))
            .unwrap();
        assert_eq!(updated.category, "Dining");
        assert_eq!(updated.description, None);

        db.delete_transaction(owner, id).unwrap();
        assert!(matches!(db.get_transaction(owner, id), Err(Error::NotFound(_))));
        assert!(matches!(db.delete_transaction(owner, id), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_transaction_scoped_to_owner() {
        let (db, owner) = setup();
        let other = db.upsert_owner("Riley", "riley@example.com").unwrap();

        let id = db
            .insert_transaction(owner, &expense("Food", 10.0, date(2026, 10, 3)))
            .unwrap()
            .id();

        assert!(db.get_transaction(other, id).is_err());
        assert!(db
            .update_transaction(other, id, &expense("Food", 1.0, date(2026, 10, 3)))
            .is_err());
        assert!(db.delete_transaction(other, id).is_err());
        assert!(db.list_transactions(other, None).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let (db, owner) = setup();

        let result = db.insert_transaction(owner, &expense("Food", 0.0, date(2026, 10, 3)));
        assert!(matches!(result, Err(Error::InvalidData(_))));

        let result = db.insert_transaction(owner, &expense("Food", -10.0, date(2026, 10, 3)));
        assert!(matches!(result, Err(Error::InvalidData(_))));

        assert_eq!(db.count_transactions(owner).unwrap(), 0);
    }

    #[test]
    fn test_import_hash_duplicate() {
        let (db, owner) = setup();
        let mut tx = expense("Food", 10.0, date(2026, 10, 3));
        tx.import_hash = Some("abc123".to_string());

        let first = db.insert_transaction(owner, &tx).unwrap();
        let second = db.insert_transaction(owner, &tx).unwrap();

        assert!(matches!(first, TransactionInsertResult::Inserted(_)));
        assert_eq!(second, TransactionInsertResult::Duplicate(first.id()));
    }

    #[test]
    fn test_list_transactions_range_and_order() {
        let (db, owner) = setup();
        db.insert_transaction(owner, &expense("A", 1.0, date(2026, 9, 30))).unwrap();
        db.insert_transaction(owner, &expense("B", 2.0, date(2026, 10, 1))).unwrap();
        db.insert_transaction(owner, &expense("C", 3.0, date(2026, 10, 31))).unwrap();
        db.insert_transaction(owner, &expense("D", 4.0, date(2026, 11, 1))).unwrap();

        let oct: Period = "2026-10".parse().unwrap();
        let rows = db.list_transactions(owner, Some(oct.range())).unwrap();
        let categories: Vec<&str> = rows.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(categories, vec!["C", "B"]);

        assert_eq!(db.list_transactions(owner, None).unwrap().len(), 4);
    }

    #[test]
    fn test_budget_upsert() {
        let (db, owner) = setup();
        let oct: Period = "2026-10".parse().unwrap();

        assert!(db.get_budget(owner, oct).unwrap().is_none());

        let first = db.upsert_budget(owner, oct, 1000.0).unwrap();
        let second = db.upsert_budget(owner, oct, 1500.0).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.limit_amount, 1500.0);
        assert_eq!(db.list_budgets(owner).unwrap().len(), 1);

        assert!(matches!(
            db.upsert_budget(owner, oct, 0.0),
            Err(Error::InvalidData(_))
        ));

        db.delete_budget(owner, oct).unwrap();
        assert!(db.get_budget(owner, oct).unwrap().is_none());
    }

    #[test]
    fn test_ledger_sums() {
        let (db, owner) = setup();
        let oct: Period = "2026-10".parse().unwrap();

        assert_eq!(db.sum(owner, TransactionKind::Expense, oct.range()).unwrap(), 0.0);
        assert!(db
            .sum_by_category(owner, TransactionKind::Expense, oct.range())
            .unwrap()
            .is_empty());

        db.insert_transaction(owner, &expense("Food", 10.25, date(2026, 10, 1))).unwrap();
        db.insert_transaction(owner, &expense("Food", 4.75, date(2026, 10, 31))).unwrap();
        db.insert_transaction(owner, &expense("Rent", 900.0, date(2026, 10, 2))).unwrap();
        db.insert_transaction(owner, &expense("Rent", 900.0, date(2026, 11, 2))).unwrap();
        db.insert_transaction(
            owner,
            &NewTransaction::new(TransactionKind::Income, "Salary", 3000.0, date(2026, 10, 1)),
        )
        .unwrap();

        assert_eq!(db.sum(owner, TransactionKind::Expense, oct.range()).unwrap(), 915.0);
        assert_eq!(db.sum(owner, TransactionKind::Income, oct.range()).unwrap(), 3000.0);

        let by_category = db
            .sum_by_category(owner, TransactionKind::Expense, oct.range())
            .unwrap();
        assert_eq!(by_category.len(), 2);
        assert_eq!(by_category["Food"], 15.0);
        assert_eq!(by_category["Rent"], 900.0);

        let single = DateRange::single_day(date(2026, 10, 31));
        assert_eq!(db.sum(owner, TransactionKind::Expense, single).unwrap(), 4.75);
    }

    #[test]
    fn test_notification_sink_dedup() {
        let (db, owner) = setup();
        let sink = DbNotificationSink::new(&db);
        let t0 = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();

        let alert = Alert::new(owner, Severity::Critical, "Budget exceeded", t0);
        let first = sink.emit(&alert).unwrap();
        assert!(matches!(first, EmitOutcome::Delivered(_)));

        let again = Alert::new(owner, Severity::Critical, "Budget exceeded", t0 + Duration::minutes(59));
        assert_eq!(sink.emit(&again).unwrap(), EmitOutcome::Duplicate);
        assert_eq!(db.list_notifications(owner).unwrap().len(), 1);

        let later = Alert::new(owner, Severity::Critical, "Budget exceeded", t0 + Duration::minutes(61));
        assert!(sink.emit(&later).unwrap().is_delivered());
        assert_eq!(db.list_notifications(owner).unwrap().len(), 2);
    }

    #[test]
    fn test_notification_sink_custom_window() {
        let (db, owner) = setup();
        let sink = DbNotificationSink::new(&db).with_window(Duration::minutes(5));
        let t0 = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();

        sink.emit(&Alert::new(owner, Severity::Info, "msg", t0)).unwrap();
        let outcome = sink
            .emit(&Alert::new(owner, Severity::Info, "msg", t0 + Duration::minutes(10)))
            .unwrap();
        assert!(outcome.is_delivered());
    }

    #[test]
    fn test_notification_sink_dedup_keeps_subsecond_precision() {
        let (db, owner) = setup();
        let sink = DbNotificationSink::new(&db);
        let memory = MemorySink::new();
        let t0 = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap() + Duration::milliseconds(900);

        let first = Alert::new(owner, Severity::Critical, "Budget exceeded", t0);
        assert!(sink.emit(&first).unwrap().is_delivered());
        assert!(memory.emit(&first).unwrap().is_delivered());

        // 59m 59.6s later is still inside the hour
        let inside = Alert::new(
            owner,
            Severity::Critical,
            "Budget exceeded",
            t0 + Duration::milliseconds(3_599_600),
        );
        assert_eq!(sink.emit(&inside).unwrap(), EmitOutcome::Duplicate);
        assert_eq!(memory.emit(&inside).unwrap(), EmitOutcome::Duplicate);
        assert_eq!(db.list_notifications(owner).unwrap().len(), 1);

        // The stored timestamp round-trips with its fraction
        assert_eq!(db.list_notifications(owner).unwrap()[0].created_at, t0);

        // 0.1s past the hour is a new alert for both sinks
        let outside = Alert::new(
            owner,
            Severity::Critical,
            "Budget exceeded",
            t0 + Duration::milliseconds(3_600_100),
        );
        assert!(sink.emit(&outside).unwrap().is_delivered());
        assert!(memory.emit(&outside).unwrap().is_delivered());
        assert_eq!(db.list_notifications(owner).unwrap().len(), 2);
    }

    #[test]
    fn test_notification_sink_rejects_out_of_range_window() {
        let (db, owner) = setup();
        let sink = DbNotificationSink::new(&db).with_window(Duration::MAX);
        let t0 = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();

        let result = sink.emit(&Alert::new(owner, Severity::Info, "msg", t0));
        assert!(matches!(result, Err(Error::InvalidData(_))));
        assert!(db.list_notifications(owner).unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_emits_store_once() {
        let (db, owner) = setup();
        let t0 = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let db = db.clone();
                std::thread::spawn(move || {
                    let sink = DbNotificationSink::new(&db);
                    sink.emit(&Alert::new(owner, Severity::Warning, "same message", t0))
                })
            })
            .collect();

        let outcomes: Vec<EmitOutcome> = handles
            .into_iter()
            .map(|h| h.join().unwrap().expect("emit failed"))
            .collect();
        let delivered = outcomes.iter().filter(|o| o.is_delivered()).count();
        let duplicates = outcomes
            .iter()
            .filter(|o| **o == EmitOutcome::Duplicate)
            .count();

        assert_eq!(delivered, 1);
        assert_eq!(duplicates, outcomes.len() - 1);
        assert_eq!(db.list_notifications(owner).unwrap().len(), 1);
    }

    #[test]
    fn test_notification_read_state() {
        let (db, owner) = setup();
        let other = db.upsert_owner("Riley", "riley@example.com").unwrap();
        let sink = DbNotificationSink::new(&db);
        let t0 = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();

        let EmitOutcome::Delivered(first) = sink.emit(&Alert::new(owner, Severity::Info, "one", t0)).unwrap() else {
            panic!("expected delivery");
        };
        sink.emit(&Alert::new(owner, Severity::Warning, "two", t0 + Duration::minutes(1)))
            .unwrap();

        assert_eq!(db.unread_notification_count(owner).unwrap(), 2);
        let listed = db.list_notifications(owner).unwrap();
        assert_eq!(listed[0].message, "two");

        assert!(matches!(
            db.mark_notification_read(other, first),
            Err(Error::NotFound(_))
        ));
        db.mark_notification_read(owner, first).unwrap();
        assert_eq!(db.list_unread_notifications(owner).unwrap().len(), 1);

        assert_eq!(db.mark_all_notifications_read(owner).unwrap(), 1);
        assert_eq!(db.unread_notification_count(owner).unwrap(), 0);
    }

    #[test]
    fn test_reminder_crud_and_due() {
        let (db, owner) = setup();
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();

        let id = db
            .create_reminder(
                owner,
                &NewReminder {
                    title: "Rent".to_string(),
                    message: "Transfer rent".to_string(),
                    remind_at: now - Duration::minutes(1),
                },
            )
            .unwrap();

        let due = db.due_reminders(now, Duration::minutes(5)).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, id);

        db.complete_reminder(id).unwrap();
        assert!(db.due_reminders(now, Duration::minutes(5)).unwrap().is_empty());

        // Rescheduling re-arms the reminder
        let updated = db
            .update_reminder(
                owner,
                id,
                &NewReminder {
                    title: "Rent".to_string(),
                    message: "Transfer rent today".to_string(),
                    remind_at: now + Duration::hours(1),
                },
            )
            .unwrap();
        assert!(!updated.completed);
        assert_eq!(db.list_reminders(owner).unwrap().len(), 1);

        db.delete_reminder(owner, id).unwrap();
        assert!(db.list_reminders(owner).unwrap().is_empty());
    }

    #[test]
    fn test_owner_delete_cascades() {
        let (db, owner) = setup();
        db.insert_transaction(owner, &expense("Food", 10.0, date(2026, 10, 3))).unwrap();

        let conn = db.conn().unwrap();
        conn.execute("DELETE FROM owners WHERE id = ?", params![owner])
            .unwrap();
        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
