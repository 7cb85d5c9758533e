// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Support Review Server - call-center application review gateway
//!
//! Operators review dealer, corporate and carrier applications and enroll
//! contacts on a blacklist. This crate sits between the back-office and the
//! upstream platform: it validates operator input, attaches the operator's
//! credential and relays upstream answers.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Operator session extraction
//! - `upstream` - Authenticated gateway to the upstream platform
//! - `validation` / `duration` - Request validation and the call duration codec
//! - `record` - Reconciliation of loosely-shaped application records
//! - `client` - Operator-side workflows (detail resolution, review, blacklist, lists)

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod duration;
pub mod error;
pub mod models;
pub mod record;
pub mod state;
pub mod telemetry;
pub mod upstream;
pub mod validation;
