//! Edit planning for Relist.
//!
//! Given the current state of a container and a desired order of content
//! ids, this crate computes the delete/insert/move operations that turn
//! one into the other:
//!
//! - [`align`]: duplicate-aware multiset alignment of two sequences
//! - [`Planner`]: turns an alignment into a [`Plan`], validated against a
//!   [`WorkingCopy`]
//! - [`PlanObserver`]: optional hook for diagnostics (titles, progress)
//!
//! The crate performs no I/O. Executing a plan against a remote store is
//! the job of `relist-sync`.
//!
//! # Example
//!
//! ```
//! use relist_plan::Planner;
//! use relist_types::{ContainerId, Sequence, TargetOrder};
//!
//! let current = Sequence::synthetic(ContainerId::from("PL1"), ["a", "b", "c"]);
//! let target: TargetOrder = ["b", "c", "d"].into_iter().collect();
//!
//! let plan = Planner::new().plan(&target, &current).unwrap();
//! assert_eq!(plan.deletes().len(), 1);
//! assert_eq!(plan.inserts().len(), 1);
//! assert_eq!(plan.simulate(&current).unwrap(), target.into_inner());
//! ```

mod alignment;
mod error;
mod observer;
mod plan;
mod planner;
mod working_copy;

pub use alignment::{align, Alignment};
pub use error::{InvariantViolation, PlanError, PlanResult};
pub use observer::{PlanObserver, TracingObserver};
pub use plan::{Delete, Insert, Move, Plan};
pub use planner::Planner;
pub use working_copy::WorkingCopy;
