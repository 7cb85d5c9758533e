// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Two-step blacklist enrollment: the operator writes a reason, then
//! confirms explicitly. Identity fields always come from the resolved record.

use tracing::info;

use super::ApplicationsApi;
use crate::{
    models::{ApplicationId, ApplicationType, BlacklistEntry},
    record::{ApplicationRecord, Contact},
};

pub const ENROLL_FAILED_MESSAGE: &str = "Kara listeye eklenemedi.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlacklistPhase {
    #[default]
    Drafting,
    Confirming,
    Submitting,
}

#[derive(Debug, Clone, Default)]
pub struct BlacklistController {
    pub reason: String,
    phase: BlacklistPhase,
    error: Option<String>,
}

impl BlacklistController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> BlacklistPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Not already submitting, a non-blank reason, and a contact with name,
    /// email and phone.
    pub fn can_confirm(&self, contact: &Contact) -> bool {
        self.phase != BlacklistPhase::Submitting
            && !self.reason.trim().is_empty()
            && contact.is_complete()
    }

    /// Opens the confirmation step. Returns whether it opened.
    pub fn propose(&mut self, contact: &Contact) -> bool {
        if self.phase == BlacklistPhase::Drafting && self.can_confirm(contact) {
            self.phase = BlacklistPhase::Confirming;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        if self.phase == BlacklistPhase::Confirming {
            self.phase = BlacklistPhase::Drafting;
        }
    }

    /// Sends the enrollment. Only valid from the confirmation step; returns
    /// whether upstream accepted it. The reason is cleared on success.
    pub async fn confirm<A: ApplicationsApi>(
        &mut self,
        api: &A,
        application_type: ApplicationType,
        application_id: &str,
        record: &ApplicationRecord,
    ) -> bool {
        if self.phase != BlacklistPhase::Confirming || !self.can_confirm(&record.contact) {
            return false;
        }
        self.phase = BlacklistPhase::Submitting;
        self.error = None;

        let entry = BlacklistEntry {
            application_type,
            application_id: ApplicationId::from(application_id),
            email: record.contact.email.clone(),
            phone: record.contact.phone.clone(),
            name: record.contact.name.clone(),
            reason: self.reason.clone(),
        };

        let accepted = match api.enroll_blacklist(&entry).await {
            Ok(reply) if reply.is_success() => {
                info!(%application_type, application_id, "Contact blacklisted");
                self.reason.clear();
                true
            }
            Ok(reply) => {
                self.error = Some(reply.error_message());
                false
            }
            Err(_) => {
                self.error = Some(ENROLL_FAILED_MESSAGE.to_string());
                false
            }
        };

        self.phase = BlacklistPhase::Drafting;
        accepted
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::{
        fake::{ok, status, Call, FakeApi},
        ClientError,
    };

    fn record() -> ApplicationRecord {
        ApplicationRecord::from_value(json!({
            "id": 5,
            "firstName": "Mehmet",
            "lastName": "Kaya",
            "email": "m@k.com",
            "phoneNumber": "5550001122"
        }))
    }

    #[test]
    fn confirm_is_gated_on_reason_and_contact() {
        let mut controller = BlacklistController::new();
        let contact = record().contact;
        assert!(!controller.can_confirm(&contact));

        controller.reason = "   ".into();
        assert!(!controller.can_confirm(&contact));

        controller.reason = "Sahte belge".into();
        assert!(controller.can_confirm(&contact));

        let no_phone = Contact {
            phone: String::new(),
            ..contact.clone()
        };
        let no_name = Contact {
            name: "  ".into(),
            ..contact.clone()
        };
        let no_email = Contact {
            email: String::new(),
            ..contact.clone()
        };
        for incomplete in [&no_phone, &no_name, &no_email] {
            assert!(!controller.can_confirm(incomplete));
        }
        assert!(!controller.propose(&no_name));
        assert!(!controller.propose(&no_email));
        assert!(!controller.propose(&no_phone));
        assert_eq!(controller.phase(), BlacklistPhase::Drafting);

        assert!(controller.propose(&contact));
        assert_eq!(controller.phase(), BlacklistPhase::Confirming);
        controller.cancel();
        assert_eq!(controller.phase(), BlacklistPhase::Drafting);
    }

    #[tokio::test]
    async fn confirm_requires_the_confirmation_step() {
        let api = FakeApi::new();
        let mut controller = BlacklistController {
            reason: "spam".into(),
            ..Default::default()
        };
        assert!(
            !controller
                .confirm(&api, ApplicationType::DealerForm, "5", &record())
                .await
        );
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn accepted_enrollment_clears_reason() {
        let api = FakeApi::new().write(ok(json!({"success": true})));
        let record = record();
        let mut controller = BlacklistController::new();
        controller.reason = "Sahte başvuru".into();
        assert!(controller.propose(&record.contact));

        assert!(
            controller
                .confirm(&api, ApplicationType::CarrierApplication, "5", &record)
                .await
        );
        assert_eq!(controller.reason, "");
        assert_eq!(controller.phase(), BlacklistPhase::Drafting);
        assert_eq!(
            api.calls(),
            vec![Call::Enroll(BlacklistEntry {
                application_type: ApplicationType::CarrierApplication,
                application_id: ApplicationId::from("5"),
                email: "m@k.com".into(),
                phone: "5550001122".into(),
                name: "Mehmet Kaya".into(),
                reason: "Sahte başvuru".into(),
            })]
        );
    }

    #[tokio::test]
    async fn failures_keep_reason_and_report() {
        let record = record();

        let api = FakeApi::new().write(status(409, json!({"message": "Zaten kara listede."})));
        let mut controller = BlacklistController::new();
        controller.reason = "tekrar".into();
        controller.propose(&record.contact);
        assert!(
            !controller
                .confirm(&api, ApplicationType::DealerForm, "5", &record)
                .await
        );
        assert_eq!(controller.error(), Some("Zaten kara listede."));
        assert_eq!(controller.reason, "tekrar");

        let api = FakeApi::new().write(Err(ClientError::Transport("reset".into())));
        controller.propose(&record.contact);
        controller
            .confirm(&api, ApplicationType::DealerForm, "5", &record)
            .await;
        assert_eq!(controller.error(), Some(ENROLL_FAILED_MESSAGE));
    }
}
