// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! [`ApplicationsApi`] over HTTP, against this service's `/api/support` routes.

use reqwest::{
    header::{ACCEPT, AUTHORIZATION},
    Client, RequestBuilder,
};
use tracing::warn;
use url::Url;

use super::{ApiReply, ApplicationsApi, ClientError};
use crate::{
    auth::SessionToken,
    models::{ApplicationType, BlacklistEntry, ListKind, ReviewSubmission},
    upstream::{client::parse_body, QueryParams},
    validation::ContactLookup,
};

#[derive(Debug, Clone)]
pub struct HttpApplicationsApi {
    /// Base of the support routes, e.g. `https://backoffice.example/api/support`.
    base_url: Url,
    http: Client,
    token: SessionToken,
}

impl HttpApplicationsApi {
    pub fn new(base_url: Url, token: SessionToken) -> Self {
        Self {
            base_url,
            http: Client::new(),
            token,
        }
    }

    fn url(&self, segments: &[&str], query: Option<&QueryParams>) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Transport(format!("invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .push("applications")
            .extend(segments);
        url.set_query(query.filter(|q| !q.is_empty()).map(|q| q.to_query_string()).as_deref());
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<ApiReply, ClientError> {
        let response = request
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, self.token.bearer())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Support API request failed");
                ClientError::Transport(e.to_string())
            })?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(ApiReply::new(status, parse_body(&text)))
    }
}

impl ApplicationsApi for HttpApplicationsApi {
    async fn fetch_detail(
        &self,
        application_type: ApplicationType,
        application_id: &str,
    ) -> Result<ApiReply, ClientError> {
        let url = self.url(&[application_type.as_str(), application_id], None)?;
        self.send(self.http.get(url)).await
    }

    async fn fetch_list(
        &self,
        kind: ListKind,
        query: &QueryParams,
    ) -> Result<ApiReply, ClientError> {
        let url = self.url(&[kind.path_segment()], Some(query))?;
        self.send(self.http.get(url)).await
    }

    async fn submit_review(&self, review: &ReviewSubmission) -> Result<ApiReply, ClientError> {
        let url = self.url(&["review"], None)?;
        self.send(self.http.post(url).json(review)).await
    }

    async fn enroll_blacklist(&self, entry: &BlacklistEntry) -> Result<ApiReply, ClientError> {
        let url = self.url(&["blacklist"], None)?;
        self.send(self.http.post(url).json(entry)).await
    }

    async fn check_blacklist(&self, lookup: &ContactLookup) -> Result<ApiReply, ClientError> {
        let mut query = QueryParams::new();
        if let Some(email) = &lookup.email {
            query.append("email", email.as_str());
        }
        if let Some(phone) = &lookup.phone {
            query.append("phone", phone.as_str());
        }
        let url = self.url(&["blacklist", "check"], Some(&query))?;
        self.send(self.http.get(url)).await
    }
}
