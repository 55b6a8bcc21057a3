//! Authorization policy set.
//!
//! Every check is a pure function over the caller and, where relevant, the
//! target record. Services evaluate the matching check before touching state
//! and abort on denial via [`enforce`].

use std::fmt;

use serde_json::json;
use tracing::warn;

use super::{
    Actor, Claim, Error, Role, ServiceRequest, ServiceRequestStatus, TechnicianId, UserId,
};

/// Operation being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateRequest,
    ViewRequest,
    ViewAnyRequests,
    ViewTechnicianQueue,
    AssignToSelf,
    UpdateRequestStatus,
    UpdateRequest,
    DeleteRequest,
    CreateClaim,
    ViewAnyClaims,
    MutateClaim,
    CreateRating,
    CreateAdmin,
    ManageTechnicians,
}

impl Action {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateRequest => "service_request.create",
            Self::ViewRequest => "service_request.view",
            Self::ViewAnyRequests => "service_request.view_any",
            Self::ViewTechnicianQueue => "service_request.technician_queue",
            Self::AssignToSelf => "service_request.assign_to_self",
            Self::UpdateRequestStatus => "service_request.update_status",
            Self::UpdateRequest => "service_request.update",
            Self::DeleteRequest => "service_request.delete",
            Self::CreateClaim => "claim.create",
            Self::ViewAnyClaims => "claim.view_any",
            Self::MutateClaim => "claim.mutate",
            Self::CreateRating => "rating.create",
            Self::CreateAdmin => "user.create_admin",
            Self::ManageTechnicians => "technician.manage",
        }
    }
}

/// Reason code attached to a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    Unauthenticated,
    RoleNotPermitted,
    NotOwner,
    NotAssignedTechnician,
    AlreadyAssigned,
    NotPending,
    TechnicianMismatch,
    DuplicateRating,
}

impl DenialReason {
    /// Stable code surfaced in `details.code`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::RoleNotPermitted => "role_not_permitted",
            Self::NotOwner => "not_owner",
            Self::NotAssignedTechnician => "not_assigned_technician",
            Self::AlreadyAssigned => "already_assigned",
            Self::NotPending => "not_pending",
            Self::TechnicianMismatch => "technician_mismatch",
            Self::DuplicateRating => "duplicate_rating",
        }
    }
}

/// A refused check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denial {
    pub action: Action,
    pub reason: DenialReason,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} denied: {}", self.action.as_str(), self.reason.code())
    }
}

/// Outcome of a policy check.
pub type Decision = Result<(), Denial>;

const fn deny(action: Action, reason: DenialReason) -> Decision {
    Err(Denial { action, reason })
}

fn require_role(actor: &Actor, action: Action, roles: &[Role]) -> Decision {
    if roles.contains(&actor.role()) {
        Ok(())
    } else {
        deny(action, DenialReason::RoleNotPermitted)
    }
}

/// Any authenticated role may open a service request.
pub fn create_request(actor: &Actor) -> Decision {
    require_role(actor, Action::CreateRequest, &Role::ALL)
}

/// A new request may reference only a claim the caller filed, unless the
/// caller is an admin.
pub fn link_claim(actor: &Actor, claim: &Claim) -> Decision {
    if actor.is_admin() || claim.is_owned_by(actor.user_id()) {
        Ok(())
    } else {
        deny(Action::CreateRequest, DenialReason::NotOwner)
    }
}

/// Owner, assigned technician or admin.
pub fn view_request(actor: &Actor, request: &ServiceRequest) -> Decision {
    if actor.is_admin()
        || request.is_owned_by(actor.user_id())
        || request.is_assigned_to(actor.technician_id())
    {
        Ok(())
    } else {
        deny(Action::ViewRequest, DenialReason::NotOwner)
    }
}

/// Listings across every owner and the dashboard figures.
pub fn view_any_requests(actor: &Actor) -> Decision {
    require_role(actor, Action::ViewAnyRequests, &[Role::Admin])
}

/// The unassigned queue and a technician's own assignments.
pub fn technician_queue(actor: &Actor) -> Decision {
    require_role(actor, Action::ViewTechnicianQueue, &[Role::Technician])
}

/// Technicians may claim a request only while it is unassigned and pending.
pub fn assign_to_self(actor: &Actor, request: &ServiceRequest) -> Decision {
    require_role(actor, Action::AssignToSelf, &[Role::Technician])?;
    if request.technician_id.is_some() {
        return deny(Action::AssignToSelf, DenialReason::AlreadyAssigned);
    }
    if request.status != ServiceRequestStatus::Pending {
        return deny(Action::AssignToSelf, DenialReason::NotPending);
    }
    Ok(())
}

/// Admins may move any request; a technician only their own assignment.
pub fn update_request_status(actor: &Actor, request: &ServiceRequest) -> Decision {
    match actor.role() {
        Role::Admin => Ok(()),
        Role::Technician if request.is_assigned_to(actor.technician_id()) => Ok(()),
        Role::Technician => deny(
            Action::UpdateRequestStatus,
            DenialReason::NotAssignedTechnician,
        ),
        Role::User => deny(Action::UpdateRequestStatus, DenialReason::RoleNotPermitted),
    }
}

/// Full updates and deletes.
pub fn admin_only(actor: &Actor, action: Action) -> Decision {
    require_role(actor, action, &[Role::Admin])
}

/// Any authenticated role may file and read their own claims.
pub fn create_claim(actor: &Actor) -> Decision {
    require_role(actor, Action::CreateClaim, &Role::ALL)
}

/// Rating linkage: owner of the request, matching technician, one rating per
/// request.
pub fn create_rating(
    actor_user_id: UserId,
    request: &ServiceRequest,
    technician_id: TechnicianId,
    already_rated: bool,
) -> Decision {
    if !request.is_owned_by(actor_user_id) {
        return deny(Action::CreateRating, DenialReason::NotOwner);
    }
    if request.technician_id != Some(technician_id) {
        return deny(Action::CreateRating, DenialReason::TechnicianMismatch);
    }
    if already_rated {
        return deny(Action::CreateRating, DenialReason::DuplicateRating);
    }
    Ok(())
}

/// First admin bootstraps freely; afterwards only admins create admins.
pub fn create_admin(caller: Option<&Actor>, admin_exists: bool) -> Decision {
    if !admin_exists {
        return Ok(());
    }
    match caller {
        None => deny(Action::CreateAdmin, DenialReason::Unauthenticated),
        Some(actor) => require_role(actor, Action::CreateAdmin, &[Role::Admin]),
    }
}

impl From<Denial> for Error {
    fn from(denial: Denial) -> Self {
        let details = json!({ "code": denial.reason.code() });
        let error = match denial.reason {
            DenialReason::Unauthenticated => Self::unauthorized("login required"),
            DenialReason::RoleNotPermitted
            | DenialReason::NotOwner
            | DenialReason::NotAssignedTechnician => {
                Self::forbidden("not permitted to perform this action")
            }
            DenialReason::AlreadyAssigned => {
                Self::conflict("service request is already assigned")
            }
            DenialReason::NotPending => Self::invalid_state("service request is not pending"),
            DenialReason::TechnicianMismatch => {
                Self::conflict("technician did not handle this service request")
            }
            DenialReason::DuplicateRating => {
                Self::conflict("service request has already been rated")
            }
        };
        error.with_details(details)
    }
}

/// Convert a decision into a domain result, logging denials.
pub fn enforce(decision: Decision, actor_id: Option<UserId>) -> Result<(), Error> {
    decision.map_err(|denial| {
        warn!(
            actor_id = actor_id.map(UserId::get),
            action = denial.action.as_str(),
            reason = denial.reason.code(),
            "policy denied operation"
        );
        Error::from(denial)
    })
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
