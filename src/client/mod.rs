//! Remote action client: typed calls to the scene backend.

mod actions;
pub mod http;
mod transport;
pub mod types;

pub use actions::{ActionResult, RemoteClient};
pub use http::HttpTransport;
pub use transport::{Endpoint, Transport};
pub use types::RemoteResult;
