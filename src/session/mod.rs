mod context;
pub mod store;

pub use context::{HomeView, SessionContext};
pub use store::{Session, SessionStore};
