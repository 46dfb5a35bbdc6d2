mod error;

pub mod overrides;
pub mod progress;
pub mod scoring;
pub mod workflow;

pub use error::WorkflowError;
