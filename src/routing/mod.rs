//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming (method, url)
//!     → matcher.rs (strip query, compare compiled segments)
//!     → router.rs (exact → parameterized → prefix)
//!     → Return: RouteMatch { handler, params } or None
//!
//! Route Compilation (at startup):
//!     "/users/:id"
//!     → [Literal("users"), Capture("id")]
//!     → stored in registration order, exact keys indexed in a HashMap
//! ```
//!
//! # Design Decisions
//! - Routes compiled at registration, immutable once the resolver is shared
//! - No regex in the lookup path
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod router;

pub use matcher::{pathname, PathParams, PathPattern, Segment};
pub use router::{MatchKind, RouteEntry, RouteMatch, RouteResolver};
