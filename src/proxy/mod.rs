mod assignable;
mod dynamic;

pub use assignable::{AssignableProxy, CommitState};
pub use dynamic::DynamicReadableProxy;
