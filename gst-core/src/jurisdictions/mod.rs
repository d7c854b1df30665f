//! GST state and union territory codes.
//!
//! A [`JurisdictionRegistry`] is built once at startup (usually with
//! [`JurisdictionRegistry::india`]) and passed by reference to whatever needs
//! to resolve a code. Tests can build registries from fixture tables instead.

mod india;
mod jurisdiction;
mod registry;

pub use india::INDIA;
pub use jurisdiction::Jurisdiction;
pub use registry::{JurisdictionRegistry, RegistryError};
