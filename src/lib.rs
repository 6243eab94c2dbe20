//! gatehouse - central permission and delayed-execution authority.
//!
//! Protected resources ask the authority whether a caller may invoke one of
//! their functions, and if not immediately, after what delay. Delayed calls
//! go through a schedule → wait → execute protocol with expiration and
//! cancellation. The authority administers itself with the same role system
//! it offers to everyone else.
//!
//! - [`host`]: in-process contract host with per-frame rollback
//! - [`authority`]: the [`AccessManager`](authority::AccessManager)
//! - [`managed`]: guard embedded by protected resources
//! - [`probe`]: tolerant `canCall` probe
//! - [`state`]: journaled tables, events and observers

pub mod authority;
pub mod clock;
pub mod config;
pub mod console;
pub mod error;
pub mod genesis;
pub mod host;
pub mod http;
pub mod managed;
pub mod metrics;
pub mod probe;
pub mod state;
pub mod telemetry;

pub use authority::{AccessManager, Policy};
pub use clock::{Clock, Delay, ManualClock, SystemClock, Timepoint};
pub use error::{AuthorityError, CallError, ErrorKind, ManagedError};
pub use host::{CallContext, Checkpoint, Contract, Host};
pub use managed::AccessManaged;
