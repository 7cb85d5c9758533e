// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Typed vocabulary shared by the gateway handlers and the operator-side
//! client. Loosely-typed upstream JSON is reconciled into these types in
//! [`crate::record`]; raw request bodies are validated into them in
//! [`crate::validation`].
//!
//! ## Model Categories
//!
//! - **Classification**: [`ApplicationType`], [`ReviewStatus`], [`ListKind`]
//! - **Identifiers**: [`ApplicationId`]
//! - **Requests**: [`ReviewSubmission`] (operator form), [`UpstreamReview`]
//!   (canonical body sent upstream), [`BlacklistEntry`]

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Application Type
// =============================================================================

/// Which upstream collection an application belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    /// Dealer (bayi) application form.
    DealerForm,
    /// Corporate (kurumsal) application form.
    CorporateForm,
    /// Carrier (taşıyıcı) application.
    CarrierApplication,
}

impl ApplicationType {
    pub const ALL: [ApplicationType; 3] = [
        ApplicationType::DealerForm,
        ApplicationType::CorporateForm,
        ApplicationType::CarrierApplication,
    ];

    /// Strict, case-sensitive parse of the wire value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dealer_form" => Some(ApplicationType::DealerForm),
            "corporate_form" => Some(ApplicationType::CorporateForm),
            "carrier_application" => Some(ApplicationType::CarrierApplication),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationType::DealerForm => "dealer_form",
            ApplicationType::CorporateForm => "corporate_form",
            ApplicationType::CarrierApplication => "carrier_application",
        }
    }

    /// The list collection holding applications of this type.
    pub fn list_kind(&self) -> ListKind {
        match self {
            ApplicationType::DealerForm => ListKind::DealerForms,
            ApplicationType::CorporateForm => ListKind::CorporateForms,
            ApplicationType::CarrierApplication => ListKind::CarrierApplications,
        }
    }

    /// Operator-facing label.
    pub fn display_name(&self) -> &'static str {
        match self {
            ApplicationType::DealerForm => "Bayi Başvurusu",
            ApplicationType::CorporateForm => "Kurumsal Başvuru",
            ApplicationType::CarrierApplication => "Taşıyıcı Başvurusu",
        }
    }
}

impl std::fmt::Display for ApplicationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// List Kind
// =============================================================================

/// Upstream list collections, addressed by their path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    DealerForms,
    CorporateForms,
    CarrierApplications,
}

impl ListKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            ListKind::DealerForms => "dealer-forms",
            ListKind::CorporateForms => "corporate-forms",
            ListKind::CarrierApplications => "carrier-applications",
        }
    }

    pub fn application_type(&self) -> ApplicationType {
        match self {
            ListKind::DealerForms => ApplicationType::DealerForm,
            ListKind::CorporateForms => ApplicationType::CorporateForm,
            ListKind::CarrierApplications => ApplicationType::CarrierApplication,
        }
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path_segment())
    }
}

// =============================================================================
// Review Status
// =============================================================================

/// Review state of an application. Transitions are enforced upstream.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    /// Strict, case-sensitive parse of the wire value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ReviewStatus::Pending),
            "approved" => Some(ReviewStatus::Approved),
            "rejected" => Some(ReviewStatus::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }

    /// Operator-facing badge label.
    pub fn label(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "Beklemede",
            ReviewStatus::Approved => "Onaylandı",
            ReviewStatus::Rejected => "Reddedildi",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReviewStatus::Approved | ReviewStatus::Rejected)
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Application Id
// =============================================================================

/// Application identifier, normalized to its string form.
///
/// Only meaningful together with an [`ApplicationType`]; ids are not unique
/// across types.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ApplicationId {
    fn from(value: String) -> Self {
        ApplicationId(value)
    }
}

impl From<&str> for ApplicationId {
    fn from(value: &str) -> Self {
        ApplicationId(value.to_string())
    }
}

// =============================================================================
// Review Models
// =============================================================================

/// Review as entered by an operator: duration still in display form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ReviewSubmission {
    pub application_type: ApplicationType,
    /// String or number on the wire; normalized to a string upstream.
    pub application_id: ApplicationId,
    pub status: ReviewStatus,
    /// Free-text call notes. Optional; defaults to an empty string.
    #[serde(default)]
    pub review_notes: String,
    /// Call length as `"M:SS"` (or a raw number of seconds).
    #[schema(example = "7:30")]
    pub call_duration: String,
}

/// Review body forwarded upstream: duration in canonical seconds.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UpstreamReview {
    pub application_type: ApplicationType,
    pub application_id: ApplicationId,
    pub status: ReviewStatus,
    pub review_notes: String,
    /// Call length in seconds.
    pub call_duration: u64,
}

// =============================================================================
// Blacklist Models
// =============================================================================

/// Blacklist enrollment request. Every field is mandatory and non-blank.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct BlacklistEntry {
    pub application_type: ApplicationType,
    pub application_id: ApplicationId,
    pub email: String,
    pub phone: String,
    pub name: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_type_parse_is_case_sensitive() {
        assert_eq!(
            ApplicationType::parse("dealer_form"),
            Some(ApplicationType::DealerForm)
        );
        assert_eq!(ApplicationType::parse("Dealer_Form"), None);
        assert_eq!(ApplicationType::parse("dealer-forms"), None);
    }

    #[test]
    fn application_type_round_trips_through_serde() {
        for ty in ApplicationType::ALL {
            let json = serde_json::to_value(ty).unwrap();
            assert_eq!(json, serde_json::Value::String(ty.as_str().to_string()));
            assert_eq!(ApplicationType::parse(ty.as_str()), Some(ty));
        }
    }

    #[test]
    fn list_kind_maps_back_to_type() {
        for ty in ApplicationType::ALL {
            assert_eq!(ty.list_kind().application_type(), ty);
        }
        assert_eq!(ListKind::CorporateForms.path_segment(), "corporate-forms");
    }

    #[test]
    fn review_status_defaults_to_pending() {
        assert_eq!(ReviewStatus::default(), ReviewStatus::Pending);
        assert!(!ReviewStatus::Pending.is_terminal());
        assert!(ReviewStatus::Rejected.is_terminal());
        assert_eq!(ReviewStatus::Approved.label(), "Onaylandı");
    }

    #[test]
    fn upstream_review_serializes_id_as_string() {
        let review = UpstreamReview {
            application_type: ApplicationType::CarrierApplication,
            application_id: ApplicationId::from("42"),
            status: ReviewStatus::Approved,
            review_notes: "ok".into(),
            call_duration: 315,
        };
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["application_id"], "42");
        assert_eq!(json["call_duration"], 315);
        assert_eq!(json["application_type"], "carrier_application");
    }
}
