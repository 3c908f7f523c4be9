//! Collaborator traits. Components receive these as `Arc<dyn ...>` at startup.

pub mod push;
pub mod store;

pub use push::PushSender;
pub use store::DocumentStore;
