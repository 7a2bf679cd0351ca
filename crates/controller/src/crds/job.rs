//! `Job` Custom Resource Definition for replicated, volume-backed workloads

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Persistent volume requested by a `Job`
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct JobVolume {
    /// Volume name, used to derive the claim template and mount names
    pub name: String,

    /// Requested storage size as a Kubernetes quantity (e.g. "10Gi")
    pub storage: String,
}

/// `Job` CRD describing a replicated workload with persistent storage
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[kube(group = "jobs.abit2.com", version = "v1", kind = "Job")]
#[kube(namespaced)]
#[kube(printcolumn = r#"{"name":"Replicas","type":"integer","jsonPath":".spec.replicas"}"#)]
#[kube(printcolumn = r#"{"name":"Volume","type":"string","jsonPath":".spec.volume.name"}"#)]
#[kube(printcolumn = r#"{"name":"Storage","type":"string","jsonPath":".spec.volume.storage"}"#)]
#[kube(printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#)]
pub struct JobSpec {
    /// Number of pods in the backing StatefulSet
    #[serde(default)]
    pub replicas: i32,

    /// Volume mounted into every pod through a claim template.
    /// Required; a Job without one fails to build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<JobVolume>,
}
