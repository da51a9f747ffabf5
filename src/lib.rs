// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

//! Orgweave: org-chart graph-consistency engine.
//!
//! In-memory node/edge graph with connection validation, derived
//! business-scope propagation, per-tab view filtering, and per-tab node
//! positions. The editor/UI and member CRUD are external collaborators.

pub mod editor;
pub mod layout;
pub mod model;
pub mod ops;
pub mod query;
pub mod scope;
pub mod store;

#[cfg(test)]
mod tests {
    #[test]
    fn sanity() {
        assert_eq!(2 + 2, 4);
    }
}
