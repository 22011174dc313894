use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use u_timeline::calendar::{CalendarRegistry, WorkingCalendar};
use u_timeline::containment::TaskEdit;
use u_timeline::costing::resource_cost;
use u_timeline::diff::RegenerateDiff;
use u_timeline::models::{Phase, Resource, Role, Task};
use u_timeline::timeline::Timeline;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
}

fn date() -> impl Strategy<Value = NaiveDate> {
    // Dec 2024 through Jan 2027, covering every built-in holiday
    (0i64..790).prop_map(|offset| base() + Duration::days(offset))
}

fn region() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("MY"), Just("SG"), Just("VN")]
}

fn calendar(region: &str) -> WorkingCalendar {
    CalendarRegistry::shared().get(region).unwrap().clone()
}

fn phases(durations: &[i64]) -> Vec<Phase> {
    durations
        .iter()
        .enumerate()
        .map(|(i, &wd)| Phase::new(format!("P{i}"), format!("Phase {i}")).with_schedule(0, wd))
        .collect()
}

proptest! {
    #[test]
    fn prop_working_day_round_trip(d in date(), n in -300i64..300, r in region()) {
        let cal = calendar(r);
        let end = cal.add_working_days(d, n);
        prop_assert_eq!(cal.working_days_between(d, end), n);
    }

    #[test]
    fn prop_add_is_monotonic(d in date(), n in 0i64..200, r in region()) {
        let cal = calendar(r);
        prop_assert!(cal.add_working_days(d, n) <= cal.add_working_days(d, n + 1));
        prop_assert!(cal.is_working_day(cal.add_working_days(d, n + 1)));
    }

    #[test]
    fn prop_rederive_is_idempotent(d in date(), n in 0i64..120, r in region()) {
        let cal = calendar(r);
        let task = Task::with_duration("T1", "Task", d, n, &cal).unwrap();
        let first = task.derive_working_days(&cal);
        let second = task.derive_working_days(&cal);
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, task.working_days());
    }

    #[test]
    fn prop_cost_monotonic(
        allocation in 0.0f64..200.0,
        extra_allocation in 0.0f64..50.0,
        rate in 0.0f64..500.0,
        extra_rate in 0.0f64..100.0,
        days in 0i64..250,
    ) {
        let r = Resource::new("R1", Role::Consultant, "MY")
            .with_allocation(allocation)
            .with_hourly_rate(rate);
        let base_cost = resource_cost(&r, days);

        let more_allocation = r.clone().with_allocation((allocation + extra_allocation).min(200.0));
        prop_assert!(resource_cost(&more_allocation, days) >= base_cost);

        let more_rate = r.with_hourly_rate(rate + extra_rate);
        prop_assert!(resource_cost(&more_rate, days) >= base_cost);
    }

    #[test]
    fn prop_diff_counts_never_both_positive(
        current in proptest::collection::vec(0i64..60, 0..12),
        new in proptest::collection::vec(0i64..60, 0..12),
    ) {
        let diff = RegenerateDiff::compute(&phases(&current), &phases(&new), &[], 0.0, 0.0);
        prop_assert!(diff.phases_added == 0 || diff.phases_removed == 0);
        prop_assert_eq!(
            diff.phases_added as i64 - diff.phases_removed as i64,
            new.len() as i64 - current.len() as i64
        );
    }

    #[test]
    fn prop_successful_task_edits_stay_inside_phase(
        offset in 0i64..40,
        phase_days in 1i64..40,
        task_offset in 0i64..40,
        task_days in 0i64..40,
        edits in proptest::collection::vec((0u8..3, -10i64..50), 1..20),
        r in region(),
    ) {
        let epoch = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut tl = Timeline::new(epoch, r, CalendarRegistry::shared()).unwrap();
        tl.add_phase(Phase::new("P1", "Phase").with_schedule(offset, phase_days)).unwrap();

        let span = tl.phase_span("P1").unwrap();
        let cal = tl.calendar().clone();
        let start = cal.add_working_days(span.start, task_offset.min(phase_days));
        let task = Task::with_duration("T1", "Task", start, task_days, &cal).unwrap();
        let added = tl.add_task("P1", task).is_ok();

        for (kind, amount) in edits {
            if !added {
                break;
            }
            let before = tl.phase("P1").unwrap().task("T1").unwrap().clone();
            let edit = match kind {
                0 => TaskEdit::WorkingDays(amount),
                1 => TaskEdit::StartDate(cal.add_working_days(span.start, amount)),
                _ => TaskEdit::EndDate(cal.add_working_days(span.start, amount)),
            };
            let result = tl.edit_task("P1", "T1", edit);
            let after = tl.phase("P1").unwrap().task("T1").unwrap();
            if result.is_ok() {
                prop_assert!(span.start <= after.start_date());
                prop_assert!(after.end_date() <= span.end);
                prop_assert!(after.is_consistent(&cal));
            } else {
                prop_assert_eq!(after, &before);
            }
        }
    }
}
