// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blob storage for raw article text.

pub mod key;
pub mod store;

pub use key::content_key;
pub use store::FsBlobStore;
