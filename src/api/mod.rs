//! Server API layer: transport seam, wire envelopes, typed resource client.

mod client;
mod transport;
mod types;

pub use client::ResourceClient;
pub use transport::{HttpTransport, Transport};
pub use types::{DeleteResponse, ListResponse, Pagination, SingleResponse};
