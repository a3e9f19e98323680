// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules, one per table.

pub mod articles;
pub mod queue;
pub mod source_state;
pub mod sources;
