//! Importing a legacy CSV log into the SQLite store and exporting it back.

use crate::common::{date, fix, staff, time, Harness};
use fieldtrack_core::csv_io;
use fieldtrack_core::{Action, EventLog, SqliteEventStore, VisitDetails};
use pretty_assertions::assert_eq;

const LEGACY: &str = "\
username,role,action,lat,lon,timestamp,km_travelled,collection_amount,pt_date,customer_name,product,ptp_feedback
staff1,staff,punch_in,0.0,0.0,2024-06-03 09:00:00,0,0,,,,
staff1,staff,clock_in,0.0,0.5,2024-06-03 10:00:00,55.6,400,2024-06-04,Ravi,gold,
staff2,staff,punch_in,,,2024-06-03 09:30:00,0,0,,,,
staff2,staff,clock_in,,,2024-06-03 11:00:00,0,100,2024-06-04,Meena,tractor,paid already
";

#[test]
fn imported_log_drives_gate_and_travel() {
    let h = Harness::sqlite(time(date(2024, 6, 4), 9, 0));
    let events = csv_io::read_events(LEGACY.as_bytes()).unwrap();
    let imported = csv_io::import_into(h.store.as_ref(), events).unwrap();
    assert_eq!(imported, 4);

    let history = h.service.history(&staff("staff1")).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].distance_km, 55.6);

    // staff1's promise is due with no feedback; staff2's carried feedback over.
    let pending = h.service.pending_staff_today().unwrap();
    assert_eq!(pending.into_iter().collect::<Vec<_>>(), vec![staff("staff1")]);
    assert!(!h.service.followup_status(&staff("staff2")).unwrap().is_pending());

    let end = h.service.end_shift(&staff("staff1"), fix(0.0, 1.5)).unwrap();
    assert!((end.distance_km - 111.19).abs() < 0.01);
}

#[test]
fn export_then_import_into_fresh_store_matches() {
    let day = date(2024, 6, 3);
    let source = Harness::in_memory(time(day, 9, 0));
    let s = staff("staff1");
    source.service.start_shift(&s, fix(0.0, 0.0)).unwrap();
    source.at(time(day, 10, 0));
    let details = VisitDetails {
        customer_name: "Ravi".to_string(),
        product: "gold".to_string(),
        collection_amount: 250.0,
        followup_due_date: Some(date(2024, 6, 5)),
    };
    let visit = source.service.start_visit(&s, fix(0.0, 0.25), details).unwrap();
    source.service.amend_followup(&s, visit.id, "half paid", Some(date(2024, 6, 9))).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staff_locations.csv");
    csv_io::write_file(&path, &source.service.all_events(None).unwrap()).unwrap();

    let target = Harness::sqlite(time(day, 12, 0));
    csv_io::import_into(target.store.as_ref(), csv_io::read_file(&path).unwrap()).unwrap();

    let copied = target.service.history(&s).unwrap();
    let recorded = source.service.history(&s).unwrap();
    assert_eq!(copied, recorded);
    assert_eq!(copied[1].action, Action::StartVisit);
    assert_eq!(copied[1].next_followup_date, Some(date(2024, 6, 9)));
}

#[test]
fn failed_import_leaves_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fieldtrack.db");
    let store = SqliteEventStore::open(&path).unwrap();
    rusqlite::Connection::open(&path)
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER reject_meena BEFORE INSERT ON staff_events \
             WHEN NEW.customer_name = 'Meena' BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();

    let events = csv_io::read_events(LEGACY.as_bytes()).unwrap();
    assert!(csv_io::import_into(&store, events).is_err());
    assert!(store.all_events().unwrap().is_empty());
}

#[test]
fn reimport_appends_again() {
    let h = Harness::in_memory(time(date(2024, 6, 4), 9, 0));
    for _ in 0..2 {
        let events = csv_io::read_events(LEGACY.as_bytes()).unwrap();
        csv_io::import_into(h.store.as_ref(), events).unwrap();
    }
    let all = h.service.all_events(None).unwrap();
    assert_eq!(all.len(), 8);
    let ids: std::collections::BTreeSet<_> = all.iter().map(|e| e.id).collect();
    assert_eq!(ids.len(), 8);
}
