// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Tidings pipeline.
//!
//! Holds the four tables the pipeline lives on: `sources`, `articles`,
//! `source_state` (per-scraper control blocks), and `queue` (the message
//! bus). All access funnels through a single background writer thread via
//! tokio-rusqlite; migrations are embedded and run on open.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod timefmt;
pub mod vector;

pub use database::Database;
pub use models::QueueEntry;
pub use vector::{decode_embedding, encode_embedding};
