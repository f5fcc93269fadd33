//! The job list as one tab presents it.

mod card;
mod job_board;

pub use card::{excerpt, JobCard};
pub use job_board::{BoardView, JobBoard, TOAST_DURATION};
