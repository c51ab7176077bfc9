pub mod events;
pub use events::*;

pub mod farm_config;
pub use farm_config::*;

pub mod pool;
pub use pool::*;

pub mod position;
pub use position::*;
