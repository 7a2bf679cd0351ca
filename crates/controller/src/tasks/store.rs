//! Access to the cluster's object store
//!
//! The reconciler only ever reads Jobs and creates StatefulSets. Both calls
//! sit behind `JobStore` so reconciliation can be exercised without a cluster.

use crate::crds::Job;
use crate::tasks::types::{Error, ObjectKey, Result};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::StatefulSet;
use kube::api::{Api, PostParams};
use kube::Client;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Result of a create call that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

/// Trait abstracting the Kubernetes operations used by the Job reconciler
#[cfg_attr(test, automock)]
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Get a Job by namespace and name; `None` when it does not exist
    async fn get_job(&self, key: &ObjectKey) -> Result<Option<Job>>;

    /// Create a StatefulSet, reporting an existing one instead of failing
    async fn create_stateful_set(&self, stateful_set: &StatefulSet) -> Result<CreateOutcome>;
}

/// Real Kubernetes client implementation
pub struct KubeJobStore {
    client: Client,
    field_manager: String,
}

impl KubeJobStore {
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }
}

#[async_trait]
impl JobStore for KubeJobStore {
    async fn get_job(&self, key: &ObjectKey) -> Result<Option<Job>> {
        let api: Api<Job> = Api::namespaced(self.client.clone(), &key.namespace);
        classify_get(key, api.get(&key.name).await)
    }

    async fn create_stateful_set(&self, stateful_set: &StatefulSet) -> Result<CreateOutcome> {
        let namespace = stateful_set
            .metadata
            .namespace
            .as_deref()
            .ok_or(Error::MissingObjectKey(".metadata.namespace"))?;
        let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
        let params = PostParams {
            field_manager: Some(self.field_manager.clone()),
            ..Default::default()
        };

        classify_create(api.create(&params, stateful_set).await)
    }
}

/// Map a Job read onto found / not found / error.
fn classify_get(key: &ObjectKey, res: kube::Result<Job>) -> Result<Option<Job>> {
    match res {
        Ok(job) => Ok(Some(job)),
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            debug!(job = %key, reason = %ae.message, "Job not found");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Map a StatefulSet create onto created / already exists / error.
///
/// 409 is also returned for write conflicts; only the reason tells them apart.
fn classify_create(res: kube::Result<StatefulSet>) -> Result<CreateOutcome> {
    match res {
        Ok(_) => Ok(CreateOutcome::Created),
        Err(kube::Error::Api(ae)) if ae.reason == "AlreadyExists" => {
            Ok(CreateOutcome::AlreadyExists)
        }
        Err(e) => Err(e.into()),
    }
}
