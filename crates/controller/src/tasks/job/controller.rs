use super::resources::build_stateful_set;
use crate::crds::Job;
use crate::tasks::store::CreateOutcome;
use crate::tasks::types::{Context, ObjectKey, Result};
use kube::runtime::controller::Action;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// How a successful reconciliation pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No Job under this identity: deleted, or not visible yet
    JobNotFound,
    /// The StatefulSet was created by this pass
    Created,
    /// The StatefulSet was already there; nothing to do
    AlreadyExists,
}

/// Controller runtime entry point for a `Job`.
///
/// Only the identity of the triggering object is used; the Job is read
/// again from the store so the pass always acts on current state.
pub async fn reconcile_job(job: Arc<Job>, ctx: Arc<Context>) -> Result<Action> {
    let key = ObjectKey::from_resource(job.as_ref())?;
    reconcile_identity(&key, &ctx).await?;
    Ok(Action::await_change())
}

/// One reconciliation pass: fetch the Job, build its StatefulSet, create it
/// unless it already exists.
///
/// Holds no state between calls and may run concurrently for the same key;
/// duplicate creation is resolved by the store returning already-exists.
#[instrument(skip_all, fields(job = %key))]
pub async fn reconcile_identity(key: &ObjectKey, ctx: &Context) -> Result<ReconcileOutcome> {
    info!("Reconciling Job");

    let job = match ctx.cancellable(ctx.store.get_job(key)).await {
        Ok(Some(job)) => job,
        Ok(None) => {
            debug!("Job not found, nothing to reconcile");
            return Ok(ReconcileOutcome::JobNotFound);
        }
        Err(e) => {
            if !e.is_cancelled() {
                error!(error = %e, "Failed to get Job");
            }
            return Err(e);
        }
    };

    let stateful_set = build_stateful_set(&job).map_err(|e| {
        error!(error = %e, "Failed to build StatefulSet");
        e
    })?;

    let sts_name = stateful_set.metadata.name.as_deref().unwrap_or_default();
    info!(stateful_set = %sts_name, "Creating StatefulSet");

    match ctx
        .cancellable(ctx.store.create_stateful_set(&stateful_set))
        .await
    {
        Ok(CreateOutcome::Created) => {
            info!(stateful_set = %sts_name, "Created StatefulSet");
            Ok(ReconcileOutcome::Created)
        }
        Ok(CreateOutcome::AlreadyExists) => {
            debug!(stateful_set = %sts_name, "StatefulSet already exists");
            Ok(ReconcileOutcome::AlreadyExists)
        }
        Err(e) => {
            if !e.is_cancelled() {
                error!(stateful_set = %sts_name, error = %e, "Failed to create StatefulSet");
            }
            Err(e)
        }
    }
}
