//! Domain managers for authority state.
//!
//! Each manager owns one domain of the authority's tables. Managers only
//! store and fetch; authorization and invariants are enforced by the
//! authority before it writes.

pub mod roles;
pub mod schedules;
pub mod targets;

pub use roles::RoleManager;
pub use schedules::ScheduleManager;
pub use targets::TargetManager;
