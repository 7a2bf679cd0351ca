use crate::tasks::config::ControllerConfig;
use crate::tasks::store::JobStore;
use kube::{Resource, ResourceExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Invalid Job spec: {0}")]
    InvalidSpec(String),

    #[error("Missing object key: {0}")]
    MissingObjectKey(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Reconciliation cancelled")]
    Cancelled,
}

impl Error {
    /// Cancellation is an outcome of the triggering context, not of the Job.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Namespace and name of a namespaced object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of a namespaced resource, failing if either half is unset.
    pub fn from_resource<K: Resource>(resource: &K) -> Result<Self> {
        let namespace = resource
            .namespace()
            .ok_or(Error::MissingObjectKey(".metadata.namespace"))?;
        let name = resource
            .meta()
            .name
            .clone()
            .ok_or(Error::MissingObjectKey(".metadata.name"))?;
        Ok(Self { namespace, name })
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Shared state handed to every reconciliation pass
#[derive(Clone)]
pub struct Context {
    pub store: Arc<dyn JobStore>,
    pub config: Arc<ControllerConfig>,
    pub cancel: CancellationToken,
}

impl Context {
    pub fn new(
        store: Arc<dyn JobStore>,
        config: Arc<ControllerConfig>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            config,
            cancel,
        }
    }

    /// Run a store call, abandoning it as soon as the context is cancelled.
    pub async fn cancellable<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            result = call => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crds::{Job, JobSpec};
    use crate::tasks::store::MockJobStore;

    fn context(cancel: CancellationToken) -> Context {
        Context::new(
            Arc::new(MockJobStore::new()),
            Arc::new(ControllerConfig::default()),
            cancel,
        )
    }

    #[test]
    fn object_key_displays_namespace_and_name() {
        assert_eq!(ObjectKey::new("ns", "batch1").to_string(), "ns/batch1");
    }

    #[test]
    fn object_key_requires_namespace() {
        let job = Job::new("batch1", JobSpec::default());
        let err = ObjectKey::from_resource(&job).unwrap_err();
        assert!(matches!(err, Error::MissingObjectKey(".metadata.namespace")));
    }

    #[test]
    fn object_key_from_namespaced_resource() {
        let mut job = Job::new("batch1", JobSpec::default());
        job.metadata.namespace = Some("ns".to_string());
        assert_eq!(
            ObjectKey::from_resource(&job).unwrap(),
            ObjectKey::new("ns", "batch1")
        );
    }

    #[tokio::test]
    async fn cancellable_passes_result_through() {
        let ctx = context(CancellationToken::new());
        let value = ctx.cancellable(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn cancellable_aborts_pending_call() {
        let cancel = CancellationToken::new();
        let ctx = context(cancel.clone());
        cancel.cancel();

        let result: Result<()> = ctx.cancellable(std::future::pending()).await;
        assert!(result.unwrap_err().is_cancelled());
    }
}
