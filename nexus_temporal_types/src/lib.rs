use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod options;

/// How an exposed operation produces its result.
///
/// This is a minimal shared copy so that both `nexus_temporal_core` and
/// `nexus_temporal_gen` agree on the same vocabulary without depending on
/// each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExecutionStyle {
    /// Handled synchronously, the result is returned from the start request.
    #[default]
    Direct,

    /// Backed by a durable workflow run, the result is delivered when the run
    /// completes.
    WorkflowRun,
}

/// Raised when an `execution_style` option carries a tag outside the enum.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unknown execution style tag {0}")]
pub struct UnknownExecutionStyle(pub i32);

impl ExecutionStyle {
    pub const ALL: [ExecutionStyle; 2] = [ExecutionStyle::Direct, ExecutionStyle::WorkflowRun];

    /// Maps the protobuf enum number of `nexustemporal.v1.ExecutionStyle`.
    ///
    /// `EXECUTION_STYLE_UNSPECIFIED` (0) falls back to [`ExecutionStyle::Direct`].
    pub fn from_tag(tag: i32) -> Result<Self, UnknownExecutionStyle> {
        match tag {
            0 | 1 => Ok(ExecutionStyle::Direct),
            2 => Ok(ExecutionStyle::WorkflowRun),
            other => Err(UnknownExecutionStyle(other)),
        }
    }

    pub fn tag(self) -> i32 {
        match self {
            ExecutionStyle::Direct => 1,
            ExecutionStyle::WorkflowRun => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionStyle::Direct => "direct",
            ExecutionStyle::WorkflowRun => "workflow_run",
        }
    }
}

impl std::fmt::Display for ExecutionStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
