//! Application services for task lifecycle control.

mod error;
mod inspect;
mod launcher;
mod mutation;
mod resolver;
mod tokens;
mod transition;

pub use error::{TaskControlError, TaskControlResult};
pub use inspect::{AttachmentSlot, TaskInspector};
pub use launcher::{LaunchOutcome, LaunchRequest, WorkflowLauncher};
pub use mutation::{MutationBuilder, MutationRequest};
pub use resolver::{ConsistencyResolver, Relocation, RelocationReport};
pub use tokens::{ConcurrencyTokenManager, LockedStep};
pub use transition::{ReassignRequest, TransitionEngine};
