//! Financial Advisor Engine
//!
//! Deterministic decision logic behind three financial-planning questions:
//! - Which government benefit schemes an applicant qualifies for
//! - Which income-tax regime minimises liability
//! - How a systematic investment plan grows, with ranked scheme recommendations
//!
//! Reference data and classifier collaborators live in a read-only
//! `AdvisorContext` built once at startup.
//!
//! REQUEST FLOW:
//! INPUT → VALIDATE → COMPUTE → (CLASSIFIER SIDE CHANNEL) → RESULT

pub mod api;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod context;
pub mod eligibility;
pub mod error;
pub mod format;
pub mod models;
pub mod tax;
pub mod validation;
pub mod wealth;

pub use error::{AdvisorError, Result};

// Re-export common types
pub use config::AdvisorConfig;
pub use context::AdvisorContext;
pub use models::*;
pub use tax::RebatePolicy;
