//! Infoblox-style WAPI client implementing the domain backend traits.
//!
//! Everything transport-level lives here: authentication, serialization and
//! the mapping of HTTP/WAPI failures onto
//! [`BackendError`](nextip_domain::backend::BackendError). The resolver and
//! provisioning layers only ever see the traits.

pub mod client;
pub mod types;

pub use client::WapiClient;
