//! Optional relations resolved alongside a record.
//!
//! Callers pass a comma-separated list such as `requester,category`.
//! Unknown tokens are ignored so clients can over-ask without failing.

use std::collections::BTreeSet;

use serde::Serialize;
use utoipa::ToSchema;

use super::{Category, Claim, ServiceRequest, TechnicianProfile, UserAccount};

/// A relation name that can be parsed from an include token.
pub trait Relation: Copy + Ord {
    fn from_token(token: &str) -> Option<Self>;
}

/// Set of relations requested by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeSet<R: Relation> {
    relations: BTreeSet<R>,
}

impl<R: Relation> Default for IncludeSet<R> {
    fn default() -> Self {
        Self {
            relations: BTreeSet::new(),
        }
    }
}

impl<R: Relation> IncludeSet<R> {
    /// Parse a raw include parameter. `None` and blank input yield an empty set.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let relations = raw
            .unwrap_or_default()
            .split(',')
            .map(|token| token.trim().to_ascii_lowercase())
            .filter_map(|token| R::from_token(&token))
            .collect();
        Self { relations }
    }

    #[must_use]
    pub fn of(relations: impl IntoIterator<Item = R>) -> Self {
        Self {
            relations: relations.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, relation: R) -> bool {
        self.relations.contains(&relation)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

/// Relations available on a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RequestRelation {
    Requester,
    Technician,
    Category,
    Claim,
}

impl Relation for RequestRelation {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "requester" => Some(Self::Requester),
            "technician" => Some(Self::Technician),
            "category" => Some(Self::Category),
            "claim" => Some(Self::Claim),
            _ => None,
        }
    }
}

/// Relations available on a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClaimRelation {
    Requester,
    Category,
}

impl Relation for ClaimRelation {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "requester" => Some(Self::Requester),
            "category" => Some(Self::Category),
            _ => None,
        }
    }
}

/// A service request plus whichever relations were asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestView {
    #[serde(flatten)]
    pub request: ServiceRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<UserAccount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technician: Option<TechnicianProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim: Option<Claim>,
}

impl From<ServiceRequest> for ServiceRequestView {
    fn from(request: ServiceRequest) -> Self {
        Self {
            request,
            requester: None,
            technician: None,
            category: None,
            claim: None,
        }
    }
}

/// A claim plus whichever relations were asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimView {
    #[serde(flatten)]
    pub claim: Claim,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<UserAccount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl From<Claim> for ClaimView {
    fn from(claim: Claim) -> Self {
        Self {
            claim,
            requester: None,
            category: None,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, &[])]
    #[case(Some(""), &[])]
    #[case(Some("requester, Category"), &[RequestRelation::Requester, RequestRelation::Category])]
    #[case(Some("bogus,claim,,claim"), &[RequestRelation::Claim])]
    fn parses_request_includes(#[case] raw: Option<&str>, #[case] expected: &[RequestRelation]) {
        let set = IncludeSet::<RequestRelation>::parse(raw);
        assert_eq!(set, IncludeSet::of(expected.iter().copied()));
    }

    #[rstest]
    fn claim_includes_ignore_request_only_relations() {
        let set = IncludeSet::<ClaimRelation>::parse(Some("technician,requester"));
        assert!(set.contains(ClaimRelation::Requester));
        assert!(!set.contains(ClaimRelation::Category));
    }
}
