//! Transfer-hook safety policy.

mod registry;

pub use registry::{HookEntry, HookRegistry, HookStatus};
