//! Provider environments
//!
//! An environment is the ordered set of resource tasks provisioned together
//! for one provider. How a failed batch surfaces is a per-provider decision
//! captured in [`EnvironmentPolicy`].

use crate::credentials::ProviderKind;
use crate::error::{CloudError, Result};
use crate::executor::Executor;
use crate::task::{Operation, ResourceTask};
use std::sync::Arc;

/// What an environment does with a failed create/destroy batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Return the error to the caller
    Propagate,
    /// Log the error and report success
    LogAndContinue,
}

/// Whether the provider has anything to restore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSupport {
    /// Restore runs a [`Operation::Restore`] batch
    Batch,
    /// Restore is an explicit no-op
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentPolicy {
    pub on_failure: FailurePolicy,
    pub restore: RestoreSupport,
}

impl EnvironmentPolicy {
    pub const fn propagating() -> Self {
        Self {
            on_failure: FailurePolicy::Propagate,
            restore: RestoreSupport::Batch,
        }
    }
}

impl Default for EnvironmentPolicy {
    fn default() -> Self {
        Self::propagating()
    }
}

/// Resource tasks of one provider, driven as a unit
pub struct Environment<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    name: String,
    provider: ProviderKind,
    policy: EnvironmentPolicy,
    executor: Executor,
    tasks: Vec<Arc<dyn ResourceTask<S>>>,
    sealed: bool,
}

impl<S> Environment<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    pub fn new(
        name: impl Into<String>,
        provider: ProviderKind,
        policy: EnvironmentPolicy,
        executor: Executor,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            policy,
            executor,
            tasks: Vec::new(),
            sealed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn policy(&self) -> EnvironmentPolicy {
        self.policy
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn tasks(&self) -> &[Arc<dyn ResourceTask<S>>] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// `true` once a lifecycle batch has been started
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Append a task and hand back a shared handle to it.
    pub fn add_resource_task<T>(&mut self, task: T) -> Result<Arc<T>>
    where
        T: ResourceTask<S> + 'static,
    {
        let task = Arc::new(task);
        self.add_shared_task(Arc::clone(&task) as Arc<dyn ResourceTask<S>>)?;
        Ok(task)
    }

    /// Append a task that is already shared elsewhere.
    pub fn add_shared_task(&mut self, task: Arc<dyn ResourceTask<S>>) -> Result<()> {
        if self.sealed {
            return Err(CloudError::EnvironmentSealed(self.name.clone()));
        }
        tracing::debug!(environment = %self.name, task = task.name(), "Added resource task");
        self.tasks.push(task);
        Ok(())
    }

    pub async fn create(&mut self, session: Arc<S>) -> Result<()> {
        self.run_batch(Operation::Create, session).await
    }

    pub async fn destroy(&mut self, session: Arc<S>) -> Result<()> {
        self.run_batch(Operation::Destroy, session).await
    }

    pub async fn restore(&mut self, session: Arc<S>) -> Result<()> {
        if self.policy.restore == RestoreSupport::Unsupported {
            tracing::debug!(
                environment = %self.name,
                provider = %self.provider,
                "Nothing to restore"
            );
            return Ok(());
        }
        self.run_batch(Operation::Restore, session).await
    }

    async fn run_batch(&mut self, operation: Operation, session: Arc<S>) -> Result<()> {
        self.sealed = true;
        tracing::info!(
            environment = %self.name,
            provider = %self.provider,
            tasks = self.tasks.len(),
            "Running {} for environment",
            operation
        );

        match self.executor.run(&self.tasks, operation, session).await {
            Ok(_) => Ok(()),
            Err(e) => match self.policy.on_failure {
                FailurePolicy::Propagate => Err(e),
                FailurePolicy::LogAndContinue => {
                    tracing::warn!(
                        environment = %self.name,
                        "Exception during {} of {} resources: {:#}",
                        operation,
                        self.provider,
                        e
                    );
                    Ok(())
                }
            },
        }
    }
}

impl<S> std::fmt::Debug for Environment<S>
where
    S: Send + Sync + ?Sized + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("policy", &self.policy)
            .field("tasks", &self.tasks.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("sealed", &self.sealed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutorConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct Server {
        name: String,
        fail_create: bool,
        created: AtomicUsize,
        destroyed: AtomicUsize,
        restored: AtomicUsize,
    }

    impl Server {
        fn named(name: &str) -> Self {
            Self {
                name: name.to_string(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl ResourceTask<()> for Server {
        fn name(&self) -> &str {
            &self.name
        }

        async fn create(&self, _session: &()) -> anyhow::Result<()> {
            if self.fail_create {
                anyhow::bail!("quota exceeded");
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn destroy(&self, _session: &()) -> anyhow::Result<()> {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn restore(&self, _session: &()) -> anyhow::Result<()> {
            self.restored.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn environment(policy: EnvironmentPolicy) -> Environment<()> {
        let executor = Executor::new(
            ExecutorConfig::default()
                .with_poll_interval(Duration::from_millis(5))
                .with_timeout(Duration::from_secs(5)),
        );
        Environment::new("test-env", ProviderKind::Aws, policy, executor)
    }

    #[tokio::test]
    async fn test_create_and_destroy_run_every_task() {
        let mut env = environment(EnvironmentPolicy::propagating());
        let web = env.add_resource_task(Server::named("web")).unwrap();
        let db = env.add_resource_task(Server::named("db")).unwrap();
        assert_eq!(env.len(), 2);

        env.create(Arc::new(())).await.unwrap();
        env.destroy(Arc::new(())).await.unwrap();

        for server in [&web, &db] {
            assert_eq!(server.created.load(Ordering::SeqCst), 1);
            assert_eq!(server.destroyed.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_propagate_policy_returns_task_error() {
        let mut env = environment(EnvironmentPolicy::propagating());
        env.add_resource_task(Server {
            name: "broken".to_string(),
            fail_create: true,
            ..Default::default()
        })
        .unwrap();

        let err = env.create(Arc::new(())).await.unwrap_err();
        assert!(matches!(err, CloudError::TaskExecution { ref task, .. } if task == "broken"));
    }

    #[tokio::test]
    async fn test_log_policy_swallows_task_error() {
        let mut env = environment(EnvironmentPolicy {
            on_failure: FailurePolicy::LogAndContinue,
            restore: RestoreSupport::Unsupported,
        });
        let ok = env.add_resource_task(Server::named("ok")).unwrap();
        env.add_resource_task(Server {
            name: "broken".to_string(),
            fail_create: true,
            ..Default::default()
        })
        .unwrap();

        env.create(Arc::new(())).await.unwrap();
        assert_eq!(ok.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_restore_unsupported_is_noop() {
        let mut env = environment(EnvironmentPolicy {
            on_failure: FailurePolicy::LogAndContinue,
            restore: RestoreSupport::Unsupported,
        });
        let server = env.add_resource_task(Server::named("web")).unwrap();

        env.restore(Arc::new(())).await.unwrap();
        assert_eq!(server.restored.load(Ordering::SeqCst), 0);
        assert!(!env.is_sealed());
    }

    #[tokio::test]
    async fn test_restore_batch() {
        let mut env = environment(EnvironmentPolicy::propagating());
        let server = env.add_resource_task(Server::named("web")).unwrap();

        env.restore(Arc::new(())).await.unwrap();
        assert_eq!(server.restored.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_tasks_after_create() {
        let mut env = environment(EnvironmentPolicy::propagating());
        env.add_resource_task(Server::named("web")).unwrap();
        env.create(Arc::new(())).await.unwrap();

        let err = env.add_resource_task(Server::named("late")).unwrap_err();
        assert!(matches!(err, CloudError::EnvironmentSealed(name) if name == "test-env"));
        assert_eq!(env.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_environment_create_succeeds() {
        let mut env = environment(EnvironmentPolicy::propagating());
        env.create(Arc::new(())).await.unwrap();
        assert!(env.is_empty());
    }
}
