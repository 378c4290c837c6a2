//! Staff action workflow: travel distance, validation, ordering, amendments, summaries.

use crate::common::{date, fix, staff, time, Harness};
use fieldtrack_core::{Action, CoreError, DateWindow, VisitDetails};

fn visit(customer: &str, amount: f64) -> VisitDetails {
    VisitDetails {
        customer_name: customer.to_string(),
        product: "two wheeler loan".to_string(),
        collection_amount: amount,
        followup_due_date: None,
    }
}

#[test]
fn first_event_has_zero_distance_for_every_action() {
    let day = date(2024, 8, 1);
    for action in [Action::StartShift, Action::StartVisit, Action::EndShift] {
        let h = Harness::in_memory(time(day, 9, 0));
        let event = h
            .service
            .record(&staff("staff1"), action, fix(12.97, 77.59), VisitDetails::default())
            .expect("record");
        assert_eq!(event.distance_km, 0.0, "{action} should start at zero");
    }
}

#[test]
fn distance_measured_from_previous_fix_across_action_types() {
    let day = date(2024, 8, 1);
    let h = Harness::sqlite(time(day, 9, 0));
    let s = staff("staff1");

    h.service.start_shift(&s, fix(0.0, 0.0)).expect("start shift");
    h.at(time(day, 10, 0));
    let no_fix = h.service.start_visit(&s, None, visit("Ravi", 500.0)).expect("visit without fix");
    assert_eq!(no_fix.distance_km, 0.0);

    h.at(time(day, 18, 0));
    let end = h.service.end_shift(&s, fix(0.0, 1.0)).expect("end shift");
    assert!((end.distance_km - 111.19).abs() < 0.01, "got {}", end.distance_km);
    assert_eq!(end.collection_amount, 0.0);
}

#[test]
fn distance_is_per_staff() {
    let day = date(2024, 8, 1);
    let h = Harness::in_memory(time(day, 9, 0));
    h.service.start_shift(&staff("staff1"), fix(0.0, 0.0)).unwrap();
    let other = h.service.start_shift(&staff("staff2"), fix(0.0, 1.0)).unwrap();
    assert_eq!(other.distance_km, 0.0);
}

#[test]
fn negative_amount_rejected_before_any_mutation() {
    let h = Harness::in_memory(time(date(2024, 8, 1), 9, 0));
    let s = staff("staff1");
    let err = h.service.start_visit(&s, fix(1.0, 1.0), visit("Ravi", -5.0)).unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
    assert!(h.service.history(&s).unwrap().is_empty());
}

#[test]
fn generic_record_validates_visit_amount() {
    let h = Harness::sqlite(time(date(2024, 8, 1), 9, 0));
    let s = staff("staff1");
    for amount in [-1.0, f64::NAN, f64::INFINITY] {
        let err = h
            .service
            .record(&s, Action::StartVisit, fix(1.0, 1.0), visit("Ravi", amount))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)), "{amount}: {err:?}");
    }
    assert!(h.service.history(&s).unwrap().is_empty());
    assert_eq!(h.service.summary_for(&s, DateWindow::all()).unwrap().total_amount, 0.0);
}

#[test]
fn visit_details_are_dropped_on_shift_events() {
    let h = Harness::in_memory(time(date(2024, 8, 1), 9, 0));
    let event = h
        .service
        .record(&staff("staff1"), Action::StartShift, None, visit("Ravi", 900.0))
        .unwrap();
    assert_eq!(event.collection_amount, 0.0);
    assert_eq!(event.customer_name, "");
    assert_eq!(event.followup_due_date, None);
}

#[test]
fn clock_going_backwards_keeps_history_ordered() {
    let day = date(2024, 8, 1);
    let h = Harness::in_memory(time(day, 12, 0));
    let s = staff("staff1");
    let first = h.service.start_shift(&s, None).unwrap();
    h.at(time(day, 11, 0));
    let second = h.service.end_shift(&s, None).unwrap();
    assert_eq!(second.timestamp, first.timestamp);

    let history = h.service.history(&s).unwrap();
    let ids: Vec<_> = history.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn amend_rules() {
    let day = date(2024, 8, 1);
    let h = Harness::sqlite(time(day, 9, 0));
    let s = staff("staff1");
    let shift = h.service.start_shift(&s, None).unwrap();
    let v = h.service.start_visit(&s, None, visit("Ravi", 100.0)).unwrap();

    assert!(matches!(
        h.service.amend_followup(&s, shift.id, "paid", None),
        Err(CoreError::InvalidAction { action: Action::StartShift, .. })
    ));
    assert!(matches!(h.service.amend_followup(&s, 9_999, "paid", None), Err(CoreError::NotFound(9_999))));
    assert!(matches!(
        h.service.amend_followup(&staff("staff2"), v.id, "paid", None),
        Err(CoreError::NotFound(_))
    ));
    assert!(matches!(h.service.amend_followup(&s, v.id, "  ", None), Err(CoreError::InvalidInput(_))));

    let next = date(2024, 8, 8);
    let amended = h.service.amend_followup(&s, v.id, "promised next week", Some(next)).unwrap();
    assert_eq!(amended.followup_feedback, "promised next week");
    assert_eq!(amended.next_followup_date, Some(next));
    assert_eq!(amended.collection_amount, 100.0);
    assert_eq!(amended.timestamp, v.timestamp);
}

#[test]
fn summaries_and_fleet_rollup() {
    let day = date(2024, 8, 1);
    let h = Harness::in_memory(time(day, 9, 0));
    let a = staff("staff1");
    let b = staff("staff2");

    h.service.start_shift(&a, fix(0.0, 0.0)).unwrap();
    h.at(time(day, 10, 0));
    h.service.start_visit(&a, fix(0.0, 1.0), visit("Ravi", 1500.0)).unwrap();
    h.service.start_shift(&b, fix(10.0, 10.0)).unwrap();
    h.at(time(day, 11, 0));
    h.service.start_visit(&b, fix(10.0, 10.0), visit("Meena", 250.0)).unwrap();
    h.service.end_shift(&b, None).unwrap();

    let sa = h.service.summary_for(&a, DateWindow::all()).unwrap();
    assert_eq!(sa.visit_count, 2);
    assert_eq!(sa.customer_visits, 1);
    assert_eq!(sa.total_amount, 1500.0);
    assert!((sa.total_km - 111.19).abs() < 0.01);

    let fleet = h.service.fleet_summary(DateWindow::all()).unwrap();
    assert_eq!(fleet.len(), 2);
    assert_eq!(fleet[&b].visit_count, 3);
    let fleet_km: f64 = fleet.values().map(|s| s.total_km).sum();
    let per_staff_km = sa.total_km + h.service.summary_for(&b, DateWindow::all()).unwrap().total_km;
    assert_eq!(fleet_km, per_staff_km);

    let staff_filtered = h.service.all_events(Some(&b)).unwrap();
    assert!(staff_filtered.iter().all(|e| e.staff_id == b));
    assert_eq!(h.service.all_events(None).unwrap().len(), 5);
}

#[test]
fn track_lists_fixes_in_order() {
    let day = date(2024, 8, 1);
    let h = Harness::in_memory(time(day, 9, 0));
    let s = staff("staff1");
    h.service.start_shift(&s, fix(0.0, 0.0)).unwrap();
    h.at(time(day, 10, 0));
    h.service.start_visit(&s, None, visit("Ravi", 0.0)).unwrap();
    h.at(time(day, 11, 0));
    h.service.start_visit(&s, fix(0.5, 0.5), visit("Meena", 0.0)).unwrap();

    let track = h.service.track_for(&s).unwrap();
    let customers: Vec<&str> = track.iter().map(|p| p.customer_name.as_str()).collect();
    assert_eq!(customers, vec!["", "Meena"]);
}
