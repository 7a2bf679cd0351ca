/*
 * 5D Labs Kaam - Kubernetes Controller for Job Resources
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

#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::doc_markdown)]

//! Job controller library
//!
//! Watches `Job` custom resources and makes sure each one is backed by a
//! `StatefulSet` derived from its spec, owned by the Job so that deleting
//! the Job garbage-collects the workload.

pub mod crds;
pub mod tasks;

// Re-export commonly used types
pub use crds::{Job, JobSpec, JobVolume};
pub use tasks::config::ControllerConfig;
pub use tasks::job::{build_stateful_set, reconcile_identity, reconcile_job, ReconcileOutcome};
pub use tasks::store::{CreateOutcome, JobStore, KubeJobStore};
pub use tasks::types::{Context, Error, ObjectKey, Result};
