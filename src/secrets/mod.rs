//! Encrypted configuration files.
//!
//! Secrets files share the configuration schema but are encrypted at rest. The
//! cascade never parses them directly; it goes through a [`SecretStore`].

mod sops;
mod store;

pub use sops::SopsCli;
pub use store::SecretStore;

#[cfg(test)]
pub use store::MockSecretStore;
