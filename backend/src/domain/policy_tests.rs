//! Regression coverage for this module.

use super::*;
use crate::domain::{CategoryId, ClaimId, ClaimStatus, ErrorCode, RequestKind, ServiceRequestId};
use chrono::{NaiveDate, TimeZone, Utc};
use rstest::{fixture, rstest};

const OWNER: UserId = UserId::new(10);
const TECH_USER: UserId = UserId::new(20);
const TECH: TechnicianId = TechnicianId::new(2);

#[fixture]
fn pending_request() -> ServiceRequest {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).single().expect("timestamp");
    let day = NaiveDate::from_ymd_opt(2026, 1, 10).expect("date");
    ServiceRequest {
        id: ServiceRequestId::new(1),
        requesting_user_id: OWNER,
        technician_id: None,
        category_id: CategoryId::new(1),
        claim_id: None,
        kind: RequestKind::TechnicalService,
        status: ServiceRequestStatus::Pending,
        subject: "Leak".into(),
        description: "Kitchen sink".into(),
        wanted_date_start: day,
        wanted_date_end: day,
        time_shift: "morning".into(),
        created_at: now,
        updated_at: now,
    }
}

#[fixture]
fn assigned_request(mut pending_request: ServiceRequest) -> ServiceRequest {
    pending_request.status = ServiceRequestStatus::Assigned;
    pending_request.technician_id = Some(TECH);
    pending_request
}

fn reason(decision: Decision) -> Option<DenialReason> {
    decision.err().map(|denial| denial.reason)
}

#[rstest]
#[case(Actor::user(OWNER), None)]
#[case(Actor::technician(TECH_USER, Some(TECH)), None)]
#[case(Actor::admin(UserId::new(1)), None)]
#[case(Actor::user(UserId::new(99)), Some(DenialReason::NotOwner))]
#[case(Actor::technician(UserId::new(98), Some(TechnicianId::new(7))), Some(DenialReason::NotOwner))]
fn view_request_allows_owner_technician_and_admin(
    assigned_request: ServiceRequest,
    #[case] actor: Actor,
    #[case] expected: Option<DenialReason>,
) {
    assert_eq!(reason(view_request(&actor, &assigned_request)), expected);
}

#[rstest]
#[case(Actor::user(OWNER), Some(DenialReason::RoleNotPermitted))]
#[case(Actor::admin(UserId::new(1)), Some(DenialReason::RoleNotPermitted))]
#[case(Actor::technician(TECH_USER, Some(TECH)), None)]
fn only_technicians_self_assign(
    pending_request: ServiceRequest,
    #[case] actor: Actor,
    #[case] expected: Option<DenialReason>,
) {
    assert_eq!(reason(assign_to_self(&actor, &pending_request)), expected);
}

#[rstest]
fn self_assign_requires_unassigned_and_pending(
    assigned_request: ServiceRequest,
    mut pending_request: ServiceRequest,
) {
    let actor = Actor::technician(TECH_USER, Some(TechnicianId::new(5)));
    assert_eq!(
        reason(assign_to_self(&actor, &assigned_request)),
        Some(DenialReason::AlreadyAssigned)
    );
    pending_request.status = ServiceRequestStatus::Cancelled;
    assert_eq!(
        reason(assign_to_self(&actor, &pending_request)),
        Some(DenialReason::NotPending)
    );
}

#[rstest]
#[case(Actor::admin(UserId::new(1)), None)]
#[case(Actor::technician(TECH_USER, Some(TECH)), None)]
#[case(
    Actor::technician(TECH_USER, Some(TechnicianId::new(9))),
    Some(DenialReason::NotAssignedTechnician)
)]
#[case(Actor::technician(TECH_USER, None), Some(DenialReason::NotAssignedTechnician))]
#[case(Actor::user(OWNER), Some(DenialReason::RoleNotPermitted))]
fn status_updates_need_admin_or_assigned_technician(
    assigned_request: ServiceRequest,
    #[case] actor: Actor,
    #[case] expected: Option<DenialReason>,
) {
    assert_eq!(reason(update_request_status(&actor, &assigned_request)), expected);
}

#[fixture]
fn owners_claim() -> Claim {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).single().expect("timestamp");
    Claim {
        id: ClaimId::new(3),
        requesting_user_id: OWNER,
        category_id: CategoryId::new(1),
        status: ClaimStatus::Pending,
        subject: "Broken heater".into(),
        description: "No heat since Monday".into(),
        answer: None,
        answered_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[rstest]
#[case(Actor::user(OWNER), None)]
#[case(Actor::admin(UserId::new(1)), None)]
#[case(Actor::user(UserId::new(99)), Some(DenialReason::NotOwner))]
#[case(Actor::technician(TECH_USER, Some(TECH)), Some(DenialReason::NotOwner))]
fn only_the_claim_owner_or_admin_links_a_claim(
    owners_claim: Claim,
    #[case] actor: Actor,
    #[case] expected: Option<DenialReason>,
) {
    assert_eq!(reason(link_claim(&actor, &owners_claim)), expected);
}

#[rstest]
fn rating_checks_run_in_order(assigned_request: ServiceRequest) {
    assert_eq!(
        reason(create_rating(UserId::new(5), &assigned_request, TECH, false)),
        Some(DenialReason::NotOwner)
    );
    assert_eq!(
        reason(create_rating(OWNER, &assigned_request, TechnicianId::new(3), true)),
        Some(DenialReason::TechnicianMismatch)
    );
    assert_eq!(
        reason(create_rating(OWNER, &assigned_request, TECH, true)),
        Some(DenialReason::DuplicateRating)
    );
    assert_eq!(reason(create_rating(OWNER, &assigned_request, TECH, false)), None);
}

#[rstest]
#[case(None, false, None)]
#[case(Some(Actor::user(OWNER)), false, None)]
#[case(None, true, Some(DenialReason::Unauthenticated))]
#[case(Some(Actor::user(OWNER)), true, Some(DenialReason::RoleNotPermitted))]
#[case(Some(Actor::admin(UserId::new(1))), true, None)]
fn admin_bootstrap_rule(
    #[case] caller: Option<Actor>,
    #[case] admin_exists: bool,
    #[case] expected: Option<DenialReason>,
) {
    assert_eq!(reason(create_admin(caller.as_ref(), admin_exists)), expected);
}

#[rstest]
#[case(DenialReason::Unauthenticated, ErrorCode::Unauthorized)]
#[case(DenialReason::NotOwner, ErrorCode::Forbidden)]
#[case(DenialReason::AlreadyAssigned, ErrorCode::Conflict)]
#[case(DenialReason::NotPending, ErrorCode::InvalidState)]
#[case(DenialReason::TechnicianMismatch, ErrorCode::Conflict)]
#[case(DenialReason::DuplicateRating, ErrorCode::Conflict)]
fn denials_map_to_error_codes(#[case] reason: DenialReason, #[case] code: ErrorCode) {
    let error = Error::from(Denial {
        action: Action::CreateRating,
        reason,
    });
    assert_eq!(error.code(), code);
    assert_eq!(
        error.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
        Some(reason.code())
    );
}
