mod actor;
mod gateway;
mod mock;
mod service;
mod validate;

pub use actor::*;
pub use gateway::*;
pub use mock::*;
pub use service::*;
pub use validate::*;
