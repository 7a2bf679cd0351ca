pub mod controller;
pub mod naming;
pub mod quantity;
pub mod resources;

pub use controller::{reconcile_identity, reconcile_job, ReconcileOutcome};
pub use resources::{build_stateful_set, OwnerLink};
