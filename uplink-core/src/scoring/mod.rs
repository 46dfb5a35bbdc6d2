mod calculator;
mod numeric;

pub use calculator::*;
pub use numeric::*;
