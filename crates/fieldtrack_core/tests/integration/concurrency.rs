//! Concurrent staff actions against one shared SQLite store.

use crate::common::{date, fix, staff, time, Harness};
use fieldtrack_core::{DateWindow, VisitDetails};
use std::collections::BTreeSet;
use std::thread;

const STAFF: usize = 8;
const VISITS: usize = 25;

#[test]
fn parallel_staff_appends_are_all_recorded() {
    let h = Harness::sqlite(time(date(2024, 7, 1), 9, 0));

    thread::scope(|scope| {
        for n in 0..STAFF {
            let service = h.service.clone();
            scope.spawn(move || {
                let s = staff(&format!("staff{n}"));
                service.start_shift(&s, fix(0.0, 0.0)).unwrap();
                for v in 0..VISITS {
                    let details = VisitDetails {
                        customer_name: format!("customer-{v}"),
                        collection_amount: 10.0,
                        ..VisitDetails::default()
                    };
                    service.start_visit(&s, fix(0.0, (v + 1) as f64 * 0.01), details).unwrap();
                }
                service.end_shift(&s, None).unwrap();
            });
        }
    });

    let events = h.service.all_events(None).unwrap();
    assert_eq!(events.len(), STAFF * (VISITS + 2));
    let ids: BTreeSet<_> = events.iter().map(|e| e.id).collect();
    assert_eq!(ids.len(), events.len(), "ids must be unique");

    let fleet = h.service.fleet_summary(DateWindow::all()).unwrap();
    assert_eq!(fleet.len(), STAFF);
    for summary in fleet.values() {
        assert_eq!(summary.customer_visits, VISITS);
        assert_eq!(summary.total_amount, 10.0 * VISITS as f64);
        // Each visit steps 0.01 degrees east of the previous one.
        assert!((summary.total_km - 0.25 * 111.19).abs() < 0.05, "got {}", summary.total_km);
    }
}
