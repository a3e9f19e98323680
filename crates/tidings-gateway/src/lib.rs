// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thin admin HTTP surface over the scraper registry.

pub mod handlers;
pub mod server;

pub use server::{router, start_server, GatewayState, ServerConfig};
