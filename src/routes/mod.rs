pub mod health;
pub mod metrics;
pub mod secret_santa;
