// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing engine for the ClawRouter proxy: classification orchestration
//! and cheapest-capable model selection.

pub mod router;
pub mod selector;

pub use router::{
    ModelRouter, LARGE_CONTEXT_TOKENS, SIGNAL_FORCED_COMPLEX, SIGNAL_FORCED_MEDIUM,
};
pub use selector::{Selection, Selector};
