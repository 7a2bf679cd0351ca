//! StatefulSet construction for `Job` resources
//!
//! Everything here is a pure function of the Job: no API calls, no clock,
//! no randomness. The same Job always produces the same StatefulSet.

use super::naming::ResourceNaming;
use super::quantity::parse_quantity;
use crate::crds::Job;
use crate::tasks::types::{Error, ObjectKey, Result};
use k8s_openapi::api::apps::v1::{StatefulSet, StatefulSetSpec};
use k8s_openapi::api::core::v1::{
    Container, PersistentVolumeClaim, PersistentVolumeClaimSpec, PodSpec, PodTemplateSpec,
    VolumeMount, VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta, OwnerReference};
use kube::Resource;
use std::collections::BTreeMap;

pub const APP_LABEL_KEY: &str = "app";
pub const APP_LABEL_VALUE: &str = "busybox";

pub const CONTAINER_NAME: &str = "busybox";
pub const CONTAINER_IMAGE: &str = "quay.io/prometheus/busybox:latest";
pub const CONTAINER_ARGS: [&str; 3] = ["/bin/sh", "-c", "echo Hello Kubernetes! && sleep 3600"];
pub const VOLUME_MOUNT_PATH: &str = "/tmp/mydata";

pub const SERVICE_NAME: &str = "service";
pub const POD_MANAGEMENT_POLICY: &str = "Parallel";
pub const VOLUME_ACCESS_MODE: &str = "ReadWriteOnce";
const STORAGE_RESOURCE: &str = "storage";

/// Parent side of an ownership relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerIdentity {
    pub api_version: String,
    pub kind: String,
    pub key: ObjectKey,
    pub uid: String,
}

/// Parent → child relation consumed by the cluster garbage collector.
///
/// Only identities are recorded; the child is never reached through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerLink {
    pub parent: OwnerIdentity,
    pub child: ObjectKey,
    pub controller: bool,
}

impl OwnerLink {
    /// Make `job` the controlling owner of `child`.
    ///
    /// Fails when the Job has no name, namespace or uid, or when the child
    /// lives in another namespace (the garbage collector ignores such links).
    pub fn controller_of(job: &Job, child: ObjectKey) -> Result<Self> {
        let key = ObjectKey::from_resource(job)
            .map_err(|e| Error::InvalidSpec(format!("owner Job has no identity: {e}")))?;
        let uid = job
            .meta()
            .uid
            .clone()
            .ok_or_else(|| Error::InvalidSpec(format!("owner Job {key} has no uid")))?;

        if key.namespace != child.namespace {
            return Err(Error::InvalidSpec(format!(
                "cross-namespace owner references are disallowed: owner {key}, object {child}"
            )));
        }

        Ok(Self {
            parent: OwnerIdentity {
                api_version: Job::api_version(&()).to_string(),
                kind: Job::kind(&()).to_string(),
                key,
                uid,
            },
            child,
            controller: true,
        })
    }

    pub fn to_owner_reference(&self) -> OwnerReference {
        OwnerReference {
            api_version: self.parent.api_version.clone(),
            kind: self.parent.kind.clone(),
            name: self.parent.key.name.clone(),
            uid: self.parent.uid.clone(),
            controller: Some(self.controller),
            block_owner_deletion: Some(true),
        }
    }
}

/// Build the StatefulSet backing `job`, owner reference included.
pub fn build_stateful_set(job: &Job) -> Result<StatefulSet> {
    let job_key = ObjectKey::from_resource(job)
        .map_err(|e| Error::InvalidSpec(format!("Job has no identity: {e}")))?;

    let volume = job
        .spec
        .volume
        .as_ref()
        .ok_or_else(|| Error::InvalidSpec(format!("Job {job_key} has no volume")))?;
    if volume.name.is_empty() {
        return Err(Error::InvalidSpec(format!(
            "Job {job_key} has a volume without a name"
        )));
    }
    let storage = parse_quantity(&volume.storage).map_err(|e| {
        Error::InvalidSpec(format!("Job {job_key} volume '{}': {e}", volume.name))
    })?;

    let key = ObjectKey::new(
        job_key.namespace.clone(),
        ResourceNaming::stateful_set_name(&job_key.name),
    );
    let owner = OwnerLink::controller_of(job, key.clone())?;
    let claim_name = ResourceNaming::volume_claim_name(&volume.name);

    let spec = StatefulSetSpec {
        replicas: Some(job.spec.replicas),
        selector: LabelSelector {
            match_labels: Some(app_labels()),
            ..Default::default()
        },
        template: pod_template(&claim_name),
        volume_claim_templates: Some(vec![volume_claim_template(&claim_name, &storage)]),
        pod_management_policy: Some(POD_MANAGEMENT_POLICY.to_string()),
        service_name: SERVICE_NAME.to_string(),
        ..Default::default()
    };

    Ok(StatefulSet {
        metadata: ObjectMeta {
            name: Some(key.name),
            namespace: Some(key.namespace),
            owner_references: Some(vec![owner.to_owner_reference()]),
            ..Default::default()
        },
        spec: Some(spec),
        status: None,
    })
}

fn app_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(APP_LABEL_KEY.to_string(), APP_LABEL_VALUE.to_string())])
}

fn pod_template(claim_name: &str) -> PodTemplateSpec {
    PodTemplateSpec {
        metadata: Some(ObjectMeta {
            labels: Some(app_labels()),
            ..Default::default()
        }),
        spec: Some(PodSpec {
            containers: vec![Container {
                name: CONTAINER_NAME.to_string(),
                image: Some(CONTAINER_IMAGE.to_string()),
                args: Some(CONTAINER_ARGS.iter().map(ToString::to_string).collect()),
                volume_mounts: Some(vec![VolumeMount {
                    name: claim_name.to_string(),
                    mount_path: VOLUME_MOUNT_PATH.to_string(),
                    read_only: Some(false),
                    ..Default::default()
                }]),
                ..Default::default()
            }],
            ..Default::default()
        }),
    }
}

fn volume_claim_template(claim_name: &str, storage: &Quantity) -> PersistentVolumeClaim {
    let resources = BTreeMap::from([(STORAGE_RESOURCE.to_string(), storage.clone())]);

    PersistentVolumeClaim {
        metadata: ObjectMeta {
            name: Some(claim_name.to_string()),
            ..Default::default()
        },
        spec: Some(PersistentVolumeClaimSpec {
            access_modes: Some(vec![VOLUME_ACCESS_MODE.to_string()]),
            resources: Some(VolumeResourceRequirements {
                limits: Some(resources.clone()),
                requests: Some(resources),
            }),
            ..Default::default()
        }),
        status: None,
    }
}
