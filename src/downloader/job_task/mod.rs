//! Job task execution: the background routine driving one channel job.
//!
//! Split into focused submodules:
//! - [`context`] - Shared state and status transitions
//! - [`orchestration`] - Connect, read checkpoint, enumerate, download in order
//! - [`finalization`] - Final status and completion event

mod context;
mod finalization;
mod orchestration;


pub(crate) use context::JobTaskContext;
pub(crate) use orchestration::run_job_task;
