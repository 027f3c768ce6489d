//! Bootstrap subsystem.
//!
//! # Data Flow
//! ```text
//! dataset name
//!     → registry.rs (name → SetupPlan, NotFound on miss)
//!     → handle.rs (process-wide client, built once, retried)
//!     → coordinator.rs
//!         connect (retried)
//!         → snapshot + marker read (retried)
//!         → present: AlreadyInitialized
//!         → absent: step 1 .. step n, each retried on its own → Initialized
//! ```

pub mod coordinator;
pub mod handle;
pub mod plan;
pub mod registry;

pub use coordinator::BootstrapCoordinator;
pub use handle::{shared_client, ClientCache};
pub use plan::{BootstrapStatus, Marker, SetupPlan, SetupStep};
pub use registry::SetupRegistry;
