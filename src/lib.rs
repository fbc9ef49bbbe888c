//! Violation lifecycle and automated decisioning for a municipal
//! violation-reporting portal.
//!
//! Citizens report violations, the decision engine stamps an immutable
//! decision snapshot from the municipal rule catalogue, permit holders accept
//! or object, and enforcement officers adjudicate objections. The workflow
//! lives behind storage and notification trait seams so the HTTP layer and
//! the test suite drive the same facade.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
