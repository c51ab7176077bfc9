pub mod accounts;
pub use accounts::*;

pub mod token;
pub use token::*;
