pub mod auth;
pub mod participant;
pub mod secret_santa;
