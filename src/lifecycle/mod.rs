//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Logging/metrics → Resolve plan
//!     → Shared client → Bootstrap → Exit status
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then observability, then the store
//! - No degraded mode: bootstrap either completes or the process exits non-zero

pub mod startup;
