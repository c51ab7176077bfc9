pub mod initialise_farm;
pub use initialise_farm::*;

pub mod add_pool;
pub use add_pool::*;

pub mod set_pool_weight;
pub use set_pool_weight::*;

pub mod set_reward_multiplier;
pub use set_reward_multiplier::*;

pub mod update_pool;
pub use update_pool::*;

pub mod deposit;
pub use deposit::*;

pub mod withdraw;
pub use withdraw::*;

pub mod emergency_withdraw;
pub use emergency_withdraw::*;

pub mod pending_reward;
pub use pending_reward::*;

pub mod execute_batch;
pub use execute_batch::*;
