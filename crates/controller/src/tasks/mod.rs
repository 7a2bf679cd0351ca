use crate::crds::Job;
use futures::StreamExt;
use k8s_openapi::api::apps::v1::StatefulSet;
use kube::runtime::controller::{Action, Controller};
use kube::runtime::watcher::Config;
use kube::{Api, Client, ResourceExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, Instrument};

pub mod config;
pub mod job;
pub mod store;
pub mod types;

// Re-export commonly used items
pub use config::ControllerConfig;
pub use job::reconcile_job;
pub use store::{JobStore, KubeJobStore};
pub use types::{Context, Error, Result};

/// Main entry point for the Job controller.
///
/// Watches `Job` resources and the StatefulSets they own, and runs until a
/// shutdown signal arrives. `cancel` aborts in-flight store calls.
#[instrument(skip_all, fields(namespace = config.namespace.as_deref().unwrap_or("*")))]
pub async fn run_task_controller(
    client: Client,
    config: Arc<ControllerConfig>,
    cancel: CancellationToken,
) -> Result<()> {
    if let Err(validation_error) = config.validate() {
        error!("Configuration validation failed: {}", validation_error);
        return Err(Error::ConfigError(validation_error.to_string()));
    }

    let store = Arc::new(KubeJobStore::new(
        client.clone(),
        config.field_manager.clone(),
    ));
    let context = Arc::new(Context::new(store, config.clone(), cancel));

    let (jobs_api, statefulsets_api): (Api<Job>, Api<StatefulSet>) = match &config.namespace {
        Some(namespace) => (
            Api::namespaced(client.clone(), namespace),
            Api::namespaced(client, namespace),
        ),
        None => (Api::all(client.clone()), Api::all(client)),
    };
    let watcher_config = Config::default().any_semantic();

    info!("Starting Job controller");

    Controller::new(jobs_api, watcher_config.clone())
        .owns(statefulsets_api, watcher_config)
        .shutdown_on_signal()
        .run(reconcile_job, error_policy, context)
        .for_each(|reconciliation_result| {
            let job_span = tracing::info_span!("job_reconciliation_result");
            async move {
                match reconciliation_result {
                    Ok((job, _action)) => {
                        debug!(job = %job, "Job reconciliation successful");
                    }
                    Err(reconciliation_err) => {
                        debug!(
                            error = %reconciliation_err,
                            "Job reconciliation did not complete"
                        );
                    }
                }
            }
            .instrument(job_span)
        })
        .await;

    info!("Job controller shutting down");
    Ok(())
}

/// Error policy for the Job controller.
///
/// Failed passes are retried after the configured interval; an invalid Job
/// keeps failing until its owner fixes it. Cancelled passes are not retried.
pub fn error_policy(job: Arc<Job>, err: &Error, ctx: Arc<Context>) -> Action {
    if err.is_cancelled() {
        debug!(job = %job.name_any(), "Job reconciliation cancelled");
        return Action::await_change();
    }

    error!(
        error = %err,
        job = %job.name_any(),
        namespace = ?job.namespace(),
        "Job reconciliation failed"
    );
    Action::requeue(ctx.config.error_requeue_interval())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crds::JobSpec;
    use crate::tasks::store::MockJobStore;
    use std::time::Duration;

    fn context(requeue_seconds: u64) -> Arc<Context> {
        let config = ControllerConfig {
            error_requeue_seconds: requeue_seconds,
            ..Default::default()
        };
        Arc::new(Context::new(
            Arc::new(MockJobStore::new()),
            Arc::new(config),
            CancellationToken::new(),
        ))
    }

    fn job() -> Arc<Job> {
        Arc::new(Job::new("batch1", JobSpec::default()))
    }

    #[test]
    fn failed_pass_is_requeued_after_configured_interval() {
        let action = error_policy(
            job(),
            &Error::InvalidSpec("bad storage".to_string()),
            context(45),
        );
        assert_eq!(action, Action::requeue(Duration::from_secs(45)));
    }

    #[test]
    fn cancelled_pass_is_not_requeued() {
        let action = error_policy(job(), &Error::Cancelled, context(30));
        assert_eq!(action, Action::await_change());
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_watching() {
        let kube_config = kube::Config::new("http://127.0.0.1:1".parse().unwrap());
        let client = Client::try_from(kube_config).unwrap();
        let config = ControllerConfig {
            error_requeue_seconds: 0,
            ..Default::default()
        };

        let err = run_task_controller(client, Arc::new(config), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
