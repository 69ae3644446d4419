//! Prompt Routing
//!
//! Classification, optional enhancement and per-tier fallback dispatch.
//!
//! ```text
//! prompt ─► Classifier ─► (tier, task)
//!                            │
//!                            ▼
//!            Enhancer (High only, skippable)
//!                            │
//!                            ▼
//!     tier adapter ─► candidate 1 ─► candidate 2 ─► ... ─► RouteResult
//! ```

pub mod classifier;
pub mod enhancer;
pub mod orchestrator;
pub mod types;

pub use classifier::{Classification, Classifier};
pub use enhancer::{Enhanced, Enhancer, SkipDirective};
pub use orchestrator::{ProviderHealth, Router, RouterBuilder, TierRoute};
pub use types::{AttemptOutcome, RouteOptions, RouteRequest, RouteResult};
