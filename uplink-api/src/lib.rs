mod api_url;
mod client;
mod error;
mod fallback;

pub mod domain;

pub use api_url::*;
pub use client::*;
pub use error::*;
pub use fallback::*;
