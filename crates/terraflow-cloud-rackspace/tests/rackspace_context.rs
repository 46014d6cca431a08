use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use terraflow_cloud::{
    AwsCredentials, CloudError, ExecutorConfig, Provider, ProviderKind, RackspaceCredentials,
    ResourceTask, RestoreSupport,
};
use terraflow_cloud_rackspace::{
    RackspaceConfig, RackspaceContext, RackspaceProvider, RackspaceSession,
};
use tokio_test::assert_ok;

struct Server {
    name: String,
    fail: bool,
    hang: bool,
    restored: AtomicUsize,
}

impl Server {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            hang: false,
            restored: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ResourceTask<RackspaceSession> for Server {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create(&self, session: &RackspaceSession) -> anyhow::Result<()> {
        let client = session.fetch_servers_client()?;
        assert_eq!(client.region(), "DFW");
        if self.hang {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.fail {
            anyhow::bail!("server {} went to ERROR", self.name);
        }
        Ok(())
    }

    async fn destroy(&self, _session: &RackspaceSession) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("server {} could not be deleted", self.name);
        }
        Ok(())
    }

    async fn restore(&self, _session: &RackspaceSession) -> anyhow::Result<()> {
        self.restored.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn context() -> RackspaceContext {
    let provider = RackspaceProvider::new(RackspaceConfig::default()).unwrap();
    let mut ctx = RackspaceContext::new(provider).with_executor_config(
        ExecutorConfig::default()
            .with_poll_interval(Duration::from_millis(10))
            .with_timeout(Duration::from_millis(200)),
    );
    assert_ok!(ctx.set_credentials(RackspaceCredentials::new("ops", "deploy", "key").into()));
    ctx
}

#[tokio::test]
async fn test_task_failures_are_swallowed() {
    let mut ctx = context();
    let env = ctx.create_environment("servers");
    env.add_resource_task(Server::new("ok")).unwrap();
    env.add_resource_task(Server {
        fail: true,
        ..Server::new("broken")
    })
    .unwrap();

    assert_ok!(ctx.create().await);
    assert_ok!(ctx.destroy().await);

    let session = ctx.session().unwrap();
    assert!(!session.fetch_servers_client().unwrap().is_authenticated());
}

#[tokio::test]
async fn test_timeout_is_swallowed() {
    let mut ctx = context();
    ctx.create_environment("servers")
        .add_resource_task(Server {
            hang: true,
            ..Server::new("stuck")
        })
        .unwrap();

    assert_ok!(ctx.create().await);
}

#[tokio::test]
async fn test_restore_is_noop() {
    let mut ctx = context();
    let server = ctx
        .create_environment("servers")
        .add_resource_task(Server::new("a"))
        .unwrap();

    assert_ok!(ctx.restore().await);
    assert_eq!(server.restored.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_environment_still_errors() {
    let mut ctx = context();
    let err = ctx.create().await.unwrap_err();
    assert!(matches!(
        err,
        CloudError::NoEnvironmentConfigured(ProviderKind::Rackspace)
    ));
}

#[test]
fn test_policy() {
    let provider = RackspaceProvider::default();
    assert_eq!(provider.kind(), ProviderKind::Rackspace);
    assert_eq!(provider.policy().restore, RestoreSupport::Unsupported);
}

#[test]
fn test_rejects_aws_credentials() {
    let mut ctx = context();
    let err = ctx
        .set_credentials(AwsCredentials::new("aws", "AKIA", "secret").into())
        .unwrap_err();
    assert!(matches!(
        err,
        CloudError::CredentialTypeMismatch {
            expected: ProviderKind::Rackspace,
            found: ProviderKind::Aws,
        }
    ));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = RackspaceConfig {
        request_timeout_secs: 0,
        ..Default::default()
    };
    assert!(RackspaceProvider::new(config).is_err());
}
