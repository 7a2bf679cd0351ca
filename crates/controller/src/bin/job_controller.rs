/*
 * 5D Labs Kaam - Job Controller Service
 * Copyright (C) 2025 5D Labs
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published
 * by the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

//! Job Controller Service - Kubernetes Controller for the `Job` CRD
//!
//! This service:
//! - Watches `Job` custom resources and the StatefulSets they own
//! - Creates one StatefulSet per Job, owned by the Job
//! - Serves `/healthz` and `/readyz` for kubelet probes

use axum::{response::Json, routing::get, Router};
use clap::Parser;
use kaam_controller::tasks::config::{LogFormat, DEFAULT_CONFIG_PATH};
use kaam_controller::tasks::run_task_controller;
use kaam_controller::{ControllerConfig, Job};
use kube::CustomResourceExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Kubernetes controller that backs Job resources with StatefulSets
#[derive(Parser, Debug)]
#[command(name = "job-controller", version, about, long_about = None)]
struct Cli {
    /// Print the Job CRD manifest and exit
    #[arg(long)]
    crd: bool,

    /// Path to the controller configuration file
    #[arg(long, env = "CONTROLLER_CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Namespace to watch (overrides the configuration file)
    #[arg(long, env = "WATCH_NAMESPACE")]
    namespace: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.crd {
        print!("{}", serde_yaml::to_string(&Job::crd())?);
        return Ok(());
    }

    // Tracing needs the log format, so config errors are reported after init
    let loaded = ControllerConfig::from_mounted_file(&cli.config);
    let mut config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => ControllerConfig::default(),
    };
    if let Some(namespace) = cli.namespace {
        config.namespace = Some(namespace);
    }

    init_tracing(config.log_format);

    info!(
        "Starting Kaam Job Controller v{}",
        env!("CARGO_PKG_VERSION")
    );
    match loaded {
        Ok(_) => info!("Loaded controller configuration from {}", cli.config),
        Err(err) => warn!(
            "Failed to load configuration from {}: {}. Using defaults.",
            cli.config, err
        ),
    }

    let probe_addr = config.probe_addr()?;
    let config = Arc::new(config);

    let client = kube::Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let cancel = CancellationToken::new();

    let probe_handle = {
        let cancel = cancel.clone();
        let app = Router::new()
            .route("/healthz", get(health_check))
            .route("/readyz", get(readiness_check));
        let listener = tokio::net::TcpListener::bind(probe_addr).await?;
        info!("Health probe server listening on {}", probe_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(cancel.cancelled_owned())
                .await
            {
                error!("Health probe server error: {}", e);
            }
        })
    };

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            info!("Shutdown signal received, cancelling in-flight reconciliations");
            cancel.cancel();
        }
    });

    let result = run_task_controller(client, config, cancel.clone()).await;
    cancel.cancel();
    if let Err(e) = probe_handle.await {
        error!("Health probe task failed: {}", e);
    }

    result?;
    info!("Job controller stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,kaam_controller=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "job-controller",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness_check() -> Json<Value> {
    Json(json!({
        "status": "ready",
        "service": "job-controller",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
