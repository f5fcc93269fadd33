//! Keeps the local cache in step with the remote mirror.

mod controller;
mod hooks;

pub use controller::{SyncController, SyncState, ANNOUNCEMENT_TOAST, ANNOUNCEMENT_TOAST_DURATION};
pub use hooks::SyncHooks;
