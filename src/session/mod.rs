//! Session state: the data model, its observable store, and derived views.

mod store;
pub mod types;
pub mod view;

pub use store::SessionStore;
pub use types::*;
