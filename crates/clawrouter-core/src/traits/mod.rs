// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits at the proxy's external seams.

pub mod credentials;
pub mod telemetry;

pub use credentials::{Credential, CredentialResolver};
pub use telemetry::{TelemetrySink, TracingTelemetry};
