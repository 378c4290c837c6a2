//! Same-day follow-up gate across real service calls.

use crate::common::{date, fix, staff, time, Harness};
use chrono::NaiveDate;
use fieldtrack_core::{CoreError, DayStatus, VisitDetails};

fn promise(customer: &str, due: NaiveDate) -> VisitDetails {
    VisitDetails {
        customer_name: customer.to_string(),
        product: "gold loan".to_string(),
        collection_amount: 0.0,
        followup_due_date: Some(due),
    }
}

#[test]
fn due_followup_blocks_next_visit_until_amended() {
    let yesterday = date(2024, 9, 2);
    let today = date(2024, 9, 3);
    let h = Harness::sqlite(time(yesterday, 15, 0));
    let s = staff("staff1");

    let promised = h.service.start_visit(&s, fix(1.0, 1.0), promise("Ravi", today)).unwrap();

    h.at(time(today, 9, 0));
    h.service.start_shift(&s, fix(1.0, 1.0)).expect("shift start is never gated");

    match h.service.start_visit(&s, fix(1.1, 1.1), VisitDetails::default()) {
        Err(CoreError::Blocked(pending)) => {
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].event_id, promised.id);
            assert_eq!(pending[0].customer_name, "Ravi");
            assert_eq!(pending[0].due_date, today);
        }
        other => panic!("expected Blocked, got {other:?}"),
    }
    // The rejected visit left nothing behind.
    assert_eq!(h.service.history(&s).unwrap().len(), 2);
    assert_eq!(h.service.pending_staff_today().unwrap().len(), 1);

    h.service.amend_followup(&s, promised.id, "customer paid half", None).unwrap();
    let status = h.service.followup_status(&s).unwrap();
    assert!(matches!(status, DayStatus::Cleared { ref due_today } if due_today.len() == 1));

    h.service
        .start_visit(&s, fix(1.1, 1.1), VisitDetails::default())
        .expect("visit allowed after feedback");
    h.service.end_shift(&s, None).unwrap();
    assert!(h.service.pending_staff_today().unwrap().is_empty());
}

#[test]
fn end_shift_goes_through_while_pending() {
    let today = date(2024, 9, 3);
    let h = Harness::in_memory(time(today, 9, 0));
    let s = staff("staff1");
    h.service.start_visit(&s, None, promise("Meena", today)).unwrap();
    assert!(h.service.followup_status(&s).unwrap().is_pending());
    h.service.end_shift(&s, None).expect("end shift is never gated");
}

#[test]
fn future_due_date_blocks_only_on_that_day() {
    let today = date(2024, 9, 3);
    let tomorrow = date(2024, 9, 4);
    let h = Harness::in_memory(time(today, 9, 0));
    let s = staff("staff1");

    h.service.start_visit(&s, None, promise("Ravi", tomorrow)).unwrap();
    assert_eq!(h.service.followup_status(&s).unwrap(), DayStatus::NoObligation);
    h.service.start_visit(&s, None, VisitDetails::default()).expect("not due yet");

    h.at(time(tomorrow, 9, 0));
    assert!(h.service.followup_status(&s).unwrap().is_pending());
    assert!(h.service.start_visit(&s, None, VisitDetails::default()).unwrap_err().is_blocked());

    h.at(time(date(2024, 9, 5), 9, 0));
    assert_eq!(h.service.followup_status(&s).unwrap(), DayStatus::NoObligation);
}

#[test]
fn next_followup_date_does_not_move_the_due_date() {
    let today = date(2024, 9, 3);
    let next = date(2024, 9, 10);
    let h = Harness::in_memory(time(today, 9, 0));
    let s = staff("staff1");
    let promised = h.service.start_visit(&s, None, promise("Ravi", today)).unwrap();

    let amended = h.service.amend_followup(&s, promised.id, "asked for a week", Some(next)).unwrap();
    assert_eq!(amended.followup_due_date, Some(today));
    assert_eq!(amended.next_followup_date, Some(next));

    h.at(time(next, 9, 0));
    assert_eq!(h.service.followup_status(&s).unwrap(), DayStatus::NoObligation);
}

#[test]
fn one_staff_member_pending_does_not_block_another() {
    let today = date(2024, 9, 3);
    let h = Harness::in_memory(time(today, 9, 0));
    h.service.start_visit(&staff("staff1"), None, promise("Ravi", today)).unwrap();
    h.service
        .start_visit(&staff("staff2"), None, VisitDetails::default())
        .expect("other staff unaffected");
    let pending = h.service.pending_staff_today().unwrap();
    assert_eq!(pending.into_iter().collect::<Vec<_>>(), vec![staff("staff1")]);
}
