pub mod client;
pub mod types;
pub mod utils;

pub use client::ApiClient;
pub use types::*;
