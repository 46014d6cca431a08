//! Resource task capability

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single provisionable unit (a server, a load balancer, ...)
///
/// Implementations own their resource-specific state and talk to the
/// provider through the session `S` handed in by the executor. The engine
/// never looks inside a task beyond these methods.
#[async_trait]
pub trait ResourceTask<S>: Send + Sync
where
    S: Send + Sync + ?Sized,
{
    /// Name used in logs and error reports
    fn name(&self) -> &str;

    /// Provision the resource
    async fn create(&self, session: &S) -> anyhow::Result<()>;

    /// Tear the resource down
    async fn destroy(&self, session: &S) -> anyhow::Result<()>;

    /// Re-attach to an already provisioned resource.
    ///
    /// Resources with nothing to re-attach keep the default.
    async fn restore(&self, _session: &S) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Which task method a batch invokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Destroy,
    Restore,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Destroy => write!(f, "destroy"),
            Operation::Restore => write!(f, "restore"),
        }
    }
}

/// Progress of one task within the current batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Waiting for a worker slot
    Unstarted,
    InProgress,
    Completed,
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Unstarted => write!(f, "unstarted"),
            TaskState::InProgress => write!(f, "in progress"),
            TaskState::Completed => write!(f, "completed"),
            TaskState::Failed => write!(f, "failed"),
        }
    }
}
