// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local HTTP JSON API for crescent.
//!
//! Serves the conversation list and detail surfaces, message creation, and
//! the endpoint settings surface over whichever storage adapter the binary
//! wired at startup. The router is generic over the adapter type, so the
//! backend is fixed per deployment rather than chosen per request.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{router, start_server, GatewayState, ServerConfig};
