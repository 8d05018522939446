//! Per-role dashboard controllers: concurrent REST fan-out with per-slice
//! fallbacks, refreshed on a fixed interval without overlap.

pub mod admin;
pub mod professional;
pub mod refresh;

pub use admin::{AdminDashboard, AdminSnapshot};
pub use professional::{ProfessionalDashboard, ProfessionalSnapshot};
pub use refresh::{RefreshGuard, run_periodic, run_until};
