// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

//! Per-tab node placement.

pub mod positions;

pub use positions::{default_position, PositionStore};
