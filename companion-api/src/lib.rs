//! companion-api: REST client for the CareCompanion backend.
//!
//! Fire-and-refetch: mutations never patch local state; callers
//! refetch and re-derive. The [`guard::FetchGuard`] keeps overlapping
//! fetches from applying out of order.

pub mod client;
pub mod guard;
pub mod types;

pub use client::ApiClient;
pub use guard::{FetchGuard, FetchToken};
pub use types::{CompleteRequest, DoseLogRequest, MaterializeRequest, TaskPatch};
