//! Clients for the external cluster control plane

pub mod deploy;
pub mod health;
pub mod lifecycle;

pub use deploy::ResourceDeployer;
pub use health::{HealthProbe, HealthVerifier, HttpProbe};
pub use lifecycle::ClusterManager;
