//! Host-record lifecycle on top of the address resolver: build the record,
//! resolve every IPv4 binding that still needs an address, and persist it
//! through the backend store. The binary in `main.rs` drives a single
//! create from a JSON request file.

pub mod lifecycle;
pub mod request;

pub use lifecycle::{create_host, delete_host, fetch_host, update_host, ProvisionError};
pub use request::{Ipv4Spec, Ipv6Spec, ProvisionRequest};
