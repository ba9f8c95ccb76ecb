//! Built-in chains, from most to least urgent:
//!
//! | Chain                  | Priority | Relevant when                         |
//! |------------------------|----------|---------------------------------------|
//! | [`WorldSurvivalChain`] | 100      | standing on a hazard                  |
//! | [`MobDefenseChain`]    | 65       | a mob is within the defense radius    |
//! | [`UnstuckChain`]       | 60       | repeated moves went nowhere           |
//! | [`FoodChain`]          | 55       | hungry and carrying food              |
//! | [`UserTaskChain`]      | 50       | a user task (or idle task) is queued  |

mod reactive;
mod user;

pub use reactive::{
    FoodChain, MobDefenseChain, UNSTUCK_WANDER_TICKS, UnstuckChain, WorldSurvivalChain,
};
pub use user::{FinishCallback, UserTaskChain};
