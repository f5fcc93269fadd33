//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::TestProfile;
//!
//! #[tokio::test]
//! async fn test_two_tabs() {
//!     let profile = TestProfile::new();
//!     let tab_a = profile.open_tab();
//!     let tab_b = profile.open_tab();
//!     // ...
//! }
//! ```

mod fixtures;
mod storage;
mod view;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use fixtures::{job, remote_job, wait_until, TestProfile, TestTab};
#[allow(unused_imports)]
pub use storage::FailingStorage;
#[allow(unused_imports)]
pub use view::{RecordingHooks, RecordingView};
