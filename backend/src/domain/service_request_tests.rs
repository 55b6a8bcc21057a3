//! Regression coverage for this module.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};

use ServiceRequestStatus::{Assigned, Cancelled, Completed, Pending};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[fixture]
fn draft() -> ServiceRequestDraft {
    ServiceRequestDraft {
        category_id: CategoryId::new(1),
        claim_id: None,
        subject: "Broken boiler".into(),
        description: "No hot water since Monday".into(),
        wanted_date_start: date(2026, 1, 9),
        wanted_date_end: date(2026, 1, 10),
        time_shift: "morning".into(),
    }
}

#[fixture]
fn assigned_request() -> ServiceRequest {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).single().expect("timestamp");
    ServiceRequest {
        id: ServiceRequestId::new(1),
        requesting_user_id: UserId::new(10),
        technician_id: Some(TechnicianId::new(3)),
        category_id: CategoryId::new(1),
        claim_id: None,
        kind: RequestKind::TechnicalService,
        status: Assigned,
        subject: "Broken boiler".into(),
        description: "No hot water".into(),
        wanted_date_start: date(2026, 1, 9),
        wanted_date_end: date(2026, 1, 10),
        time_shift: "morning".into(),
        created_at: now,
        updated_at: now,
    }
}

#[rstest]
#[case(Pending, Pending, false)]
#[case(Pending, Assigned, true)]
#[case(Pending, Completed, false)]
#[case(Pending, Cancelled, true)]
#[case(Assigned, Pending, false)]
#[case(Assigned, Assigned, false)]
#[case(Assigned, Completed, true)]
#[case(Assigned, Cancelled, true)]
#[case(Completed, Pending, false)]
#[case(Completed, Assigned, false)]
#[case(Completed, Completed, false)]
#[case(Completed, Cancelled, false)]
#[case(Cancelled, Pending, false)]
#[case(Cancelled, Assigned, false)]
#[case(Cancelled, Completed, false)]
#[case(Cancelled, Cancelled, false)]
fn lifecycle_graph_is_exact(
    #[case] from: ServiceRequestStatus,
    #[case] to: ServiceRequestStatus,
    #[case] allowed: bool,
) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[rstest]
fn status_tokens_round_trip() {
    for status in ServiceRequestStatus::ALL {
        assert_eq!(status.as_str().parse::<ServiceRequestStatus>(), Ok(status));
    }
    assert!("done".parse::<ServiceRequestStatus>().is_err());
}

#[rstest]
fn window_ending_before_start_is_rejected(mut draft: ServiceRequestDraft) {
    draft.wanted_date_start = date(2026, 1, 10);
    draft.wanted_date_end = date(2026, 1, 9);
    let err = NewServiceRequest::try_new(UserId::new(1), draft).expect_err("invalid window");
    assert_eq!(err, ServiceRequestValidationError::WindowEndsBeforeStart);
}

#[rstest]
fn same_day_window_is_accepted(mut draft: ServiceRequestDraft) {
    draft.wanted_date_end = draft.wanted_date_start;
    assert!(NewServiceRequest::try_new(UserId::new(1), draft).is_ok());
}

#[rstest]
#[case("", "desc", "morning", ServiceRequestValidationError::EmptySubject)]
#[case("ok", "  ", "morning", ServiceRequestValidationError::EmptyDescription)]
#[case(
    "ok",
    "desc",
    "night",
    ServiceRequestValidationError::UnknownTimeShift("night".into())
)]
fn invalid_drafts_fail(
    mut draft: ServiceRequestDraft,
    #[case] subject: &str,
    #[case] description: &str,
    #[case] shift: &str,
    #[case] expected: ServiceRequestValidationError,
) {
    draft.subject = subject.into();
    draft.description = description.into();
    draft.time_shift = shift.into();
    let err = NewServiceRequest::try_new(UserId::new(1), draft).expect_err("invalid draft");
    assert_eq!(err, expected);
}

#[rstest]
fn subject_longer_than_limit_fails(mut draft: ServiceRequestDraft) {
    draft.subject = "s".repeat(SUBJECT_MAX + 1);
    let err = NewServiceRequest::try_new(UserId::new(1), draft).expect_err("too long");
    assert_eq!(err.field(), "subject");
}

#[rstest]
fn patch_cancelling_drops_technician(assigned_request: ServiceRequest) {
    let patch = ServiceRequestPatch {
        status: Some(Cancelled),
        ..ServiceRequestPatch::default()
    };
    let next = patch.apply_to(&assigned_request).expect("valid patch");
    assert_eq!(next.status, Cancelled);
    assert_eq!(next.technician_id, None);
}

#[rstest]
fn patch_reassigns_technician(assigned_request: ServiceRequest) {
    let patch = ServiceRequestPatch {
        technician_id: Some(Some(TechnicianId::new(8))),
        ..ServiceRequestPatch::default()
    };
    let next = patch.apply_to(&assigned_request).expect("valid patch");
    assert_eq!(next.technician_id, Some(TechnicianId::new(8)));
    assert_eq!(next.status, Assigned);
}

#[rstest]
#[case(Some(Completed), Some(None), ServiceRequestValidationError::TechnicianRequired(Completed))]
#[case(
    Some(Pending),
    Some(Some(TechnicianId::new(2))),
    ServiceRequestValidationError::TechnicianNotAllowed(Pending)
)]
fn patch_enforces_status_technician_coupling(
    assigned_request: ServiceRequest,
    #[case] status: Option<ServiceRequestStatus>,
    #[case] technician_id: Option<Option<TechnicianId>>,
    #[case] expected: ServiceRequestValidationError,
) {
    let patch = ServiceRequestPatch {
        status,
        technician_id,
        ..ServiceRequestPatch::default()
    };
    assert_eq!(patch.apply_to(&assigned_request), Err(expected));
}

#[rstest]
fn patch_validates_merged_window(assigned_request: ServiceRequest) {
    let patch = ServiceRequestPatch {
        wanted_date_end: Some(date(2026, 1, 1)),
        ..ServiceRequestPatch::default()
    };
    assert_eq!(
        patch.apply_to(&assigned_request),
        Err(ServiceRequestValidationError::WindowEndsBeforeStart)
    );
}

#[rstest]
fn filter_matches_subject_or_description(assigned_request: ServiceRequest) {
    let filter = ServiceRequestFilter {
        search: Some("  HOT ".into()),
        ..ServiceRequestFilter::default()
    };
    assert!(filter.matches(&assigned_request));

    let filter = ServiceRequestFilter {
        status: Some(Pending),
        ..ServiceRequestFilter::default()
    };
    assert!(!filter.matches(&assigned_request));
}
