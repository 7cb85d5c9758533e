// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated access to the upstream application platform.

pub mod client;
pub mod paging;

pub use client::{ForwardError, UpstreamError, UpstreamGateway, UpstreamRequest, UpstreamResponse};
pub use paging::{normalize_paging, QueryParams};
