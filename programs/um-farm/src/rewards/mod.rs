pub mod calculator;
pub mod fixed_point;

pub use calculator::*;
pub use fixed_point::*;
