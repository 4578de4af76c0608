//! Order lifecycle view models
//!
//! - [`ProcessQueue`]: employee list of NEW orders and the assign action
//! - [`OrderHistory`]: orders placed by the current user
//! - [`OrderDetail`]: one order, with stale responses discarded
//!
//! Orders move `NEW → PROCESSING → {COMPLETED, CANCELLED}` on the backend
//! only; these types replace snapshots, they never change a status.

mod detail;
mod history;
mod queue;

pub use detail::{DETAIL_FAILED, DetailState, OrderDetail};
pub use history::{HISTORY_FAILED, OrderHistory};
pub use queue::{AssignmentOutcome, ProcessQueue, QUEUE_FAILED};
