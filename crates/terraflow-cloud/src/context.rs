//! Provider contexts
//!
//! A [`Context`] is the top-level lifecycle entry point for one provider. It
//! owns the credentials, the provider session (which opens connection
//! handles lazily) and at most one [`Environment`]. Every lifecycle call
//! closes whatever connections were opened before it returns, whether the
//! environment succeeded, failed, or panicked, and the next call starts
//! from a fresh session.

use crate::credentials::{Credentials, ProviderKind};
use crate::environment::{Environment, EnvironmentPolicy};
use crate::error::{CloudError, Result};
use crate::executor::{Executor, ExecutorConfig};
use crate::task::Operation;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Connection state handed to resource tasks.
///
/// Sessions expose typed, lazily opening connection accessors to the tasks
/// of an environment.
pub trait Session: Send + Sync + 'static {
    /// Shut down every connection handle opened so far and clear the cache
    fn close_connections(&self);
}

/// One cloud provider's variant of the lifecycle
pub trait Provider: Send + Sync + 'static {
    type Session: Session;

    fn kind(&self) -> ProviderKind;

    /// How environments of this provider treat failures and restore
    fn policy(&self) -> EnvironmentPolicy;

    /// Build a session for `credentials`. No connection is opened yet.
    fn open_session(&self, credentials: &Credentials) -> Result<Self::Session>;
}

/// Lifecycle entry point for one provider
pub struct Context<P: Provider> {
    provider: P,
    executor_config: ExecutorConfig,
    credentials: Option<Credentials>,
    session: Option<Arc<P::Session>>,
    environment: Option<Environment<P::Session>>,
}

impl<P: Provider> Context<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            executor_config: ExecutorConfig::default(),
            credentials: None,
            session: None,
            environment: None,
        }
    }

    /// Executor settings for environments created after this call
    pub fn with_executor_config(mut self, config: ExecutorConfig) -> Self {
        self.executor_config = config;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    /// Create a fresh environment, replacing any previous one.
    pub fn create_environment(&mut self, name: impl Into<String>) -> &mut Environment<P::Session> {
        let environment = Environment::new(
            name,
            self.provider.kind(),
            self.provider.policy(),
            Executor::new(self.executor_config.clone()),
        );
        self.environment.insert(environment)
    }

    pub fn environment(&self) -> Option<&Environment<P::Session>> {
        self.environment.as_ref()
    }

    pub fn environment_mut(&mut self) -> Option<&mut Environment<P::Session>> {
        self.environment.as_mut()
    }

    /// Accept credentials for this provider only.
    ///
    /// Replacing credentials closes any connection opened with the old ones.
    pub fn set_credentials(&mut self, credentials: Credentials) -> Result<()> {
        let expected = self.provider.kind();
        let found = credentials.provider();
        if found != expected {
            tracing::error!("Credentials is not of type {}: got {}", expected, found);
            return Err(CloudError::CredentialTypeMismatch { expected, found });
        }

        if let Some(session) = self.session.take() {
            session.close_connections();
        }
        self.credentials = Some(credentials);
        Ok(())
    }

    pub fn fetch_credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// The provider session, built from the credentials on first use.
    pub fn session(&mut self) -> Result<Arc<P::Session>> {
        ensure_session(&self.provider, self.credentials.as_ref(), &mut self.session)
    }

    /// Create the whole environment, then close connections.
    pub async fn create(&mut self) -> Result<()> {
        self.run_lifecycle(Operation::Create).await
    }

    /// Destroy the whole environment, then close connections.
    pub async fn destroy(&mut self) -> Result<()> {
        self.run_lifecycle(Operation::Destroy).await
    }

    /// Restore the whole environment, then close connections.
    pub async fn restore(&mut self) -> Result<()> {
        self.run_lifecycle(Operation::Restore).await
    }

    async fn run_lifecycle(&mut self, operation: Operation) -> Result<()> {
        tracing::debug!(provider = %self.kind(), "Context {}()", operation);

        let outcome = AssertUnwindSafe(self.drive(operation)).catch_unwind().await;
        self.release_session();

        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    async fn drive(&mut self, operation: Operation) -> Result<()> {
        let kind = self.provider.kind();
        let Some(environment) = self.environment.as_mut() else {
            tracing::error!(provider = %kind, "No environment");
            return Err(CloudError::NoEnvironmentConfigured(kind));
        };
        let session = ensure_session(&self.provider, self.credentials.as_ref(), &mut self.session)?;

        let result = match operation {
            Operation::Create => environment.create(session).await,
            Operation::Destroy => environment.destroy(session).await,
            Operation::Restore => environment.restore(session).await,
        };

        result.map_err(|source| {
            let err = envelope(operation, kind, source);
            tracing::error!("{}: {:#}", err, err.root());
            err
        })
    }

    /// Close the session's connections and forget the session.
    ///
    /// Workers left behind by a timed-out batch still hold the old session.
    /// Anything they open afterwards is shut down when they drop it.
    fn release_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.close_connections();
        }
    }
}

fn ensure_session<P: Provider>(
    provider: &P,
    credentials: Option<&Credentials>,
    slot: &mut Option<Arc<P::Session>>,
) -> Result<Arc<P::Session>> {
    if let Some(session) = slot.as_ref() {
        return Ok(Arc::clone(session));
    }
    let credentials = credentials.ok_or(CloudError::CredentialsNotSet(provider.kind()))?;
    let session = Arc::new(provider.open_session(credentials)?);
    *slot = Some(Arc::clone(&session));
    Ok(session)
}

fn envelope(operation: Operation, provider: ProviderKind, source: CloudError) -> CloudError {
    let source = Box::new(source);
    match operation {
        Operation::Create => CloudError::EnvironmentCreationFailed { provider, source },
        Operation::Destroy => CloudError::EnvironmentDestructionFailed { provider, source },
        Operation::Restore => CloudError::EnvironmentRestorationFailed { provider, source },
    }
}
