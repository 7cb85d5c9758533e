// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Review form and submission.

use tracing::info;

use super::{
    resolution::{DetailResolver, LoadResult, Outcome},
    ApplicationsApi,
};
use crate::{
    duration,
    models::{ApplicationId, ReviewStatus, ReviewSubmission},
    record::ApplicationRecord,
    validation::ValidationError,
};

pub const SAVED_MESSAGE: &str = "Görüşme kaydedildi.";
pub const SAVE_FAILED_MESSAGE: &str = "Görüşme kaydedilemedi.";

/// What the operator is editing. Starts as pending, no notes, `0:00`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewForm {
    pub status: ReviewStatus,
    pub review_notes: String,
    /// Display form, `"M:SS"`.
    pub call_duration: String,
}

impl Default for ReviewForm {
    fn default() -> Self {
        Self {
            status: ReviewStatus::Pending,
            review_notes: String::new(),
            call_duration: duration::format(0),
        }
    }
}

impl ReviewForm {
    /// Prefills the form from what upstream has stored.
    pub fn seed_from(record: &ApplicationRecord) -> Self {
        Self {
            status: record.effective_status(),
            review_notes: record.review.notes.clone().unwrap_or_default(),
            call_duration: record.display_duration(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPhase {
    Idle,
    Saving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

pub struct ReviewController<'r, A> {
    resolver: &'r DetailResolver<A>,
    pub form: ReviewForm,
    phase: ReviewPhase,
    notice: Option<Notice>,
}

impl<'r, A: ApplicationsApi> ReviewController<'r, A> {
    /// Seeds the form from the resolver's current record, if any.
    pub fn new(resolver: &'r DetailResolver<A>) -> Self {
        let form = resolver
            .record()
            .map(|record| ReviewForm::seed_from(&record))
            .unwrap_or_default();
        Self {
            resolver,
            form,
            phase: ReviewPhase::Idle,
            notice: None,
        }
    }

    pub fn phase(&self) -> ReviewPhase {
        self.phase
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Submits the form and, on success, reloads the record and re-seeds
    /// the form from it. On failure the form is left as it was.
    pub async fn submit(&mut self) -> &Notice {
        self.phase = ReviewPhase::Saving;
        self.notice = None;

        let notice = match self.save().await {
            Ok(()) => {
                self.refresh().await;
                Notice::Success(SAVED_MESSAGE.to_string())
            }
            Err(message) => Notice::Error(message),
        };

        self.phase = ReviewPhase::Idle;
        self.notice.insert(notice)
    }

    async fn save(&self) -> Result<(), String> {
        if duration::parse(&self.form.call_duration).is_none() {
            return Err(ValidationError::CallDuration.to_string());
        }

        let submission = ReviewSubmission {
            application_type: self.resolver.application_type(),
            application_id: ApplicationId::from(self.resolver.application_id()),
            status: self.form.status,
            review_notes: self.form.review_notes.clone(),
            call_duration: self.form.call_duration.clone(),
        };

        match self.resolver.api().submit_review(&submission).await {
            Ok(reply) if reply.is_success() => {
                info!(
                    application_type = %submission.application_type,
                    application_id = %submission.application_id,
                    status = %submission.status,
                    "Review saved"
                );
                Ok(())
            }
            Ok(reply) => Err(reply.error_message()),
            Err(_) => Err(SAVE_FAILED_MESSAGE.to_string()),
        }
    }

    async fn refresh(&mut self) {
        if let LoadResult::Committed(Outcome::Resolved(record)) = self.resolver.load().await {
            self.form = ReviewForm::seed_from(&record);
        }
    }
}
