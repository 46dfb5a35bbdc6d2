mod employee;
mod meta;
mod payloads;
mod project;
mod update;

pub use employee::*;
pub use meta::*;
pub use payloads::*;
pub use project::*;
pub use update::*;
