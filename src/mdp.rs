//! The Markov decision process over canonical board states: state-space
//! enumeration, empirical transition and reward statistics, the value
//! iteration solver, and the learning agent built from them.

pub mod agent;
pub mod rewards;
pub mod solver;
pub mod state_space;
pub mod transitions;

pub use agent::{
    AgentConfig, AgentSnapshot, MdpAgent, PolicyRecord, RewardRecord, TransitionRecord, ValueRecord,
};
pub use rewards::{RewardStat, RewardTable};
pub use solver::{solve, Policy, ValueTable, MAX_SWEEPS, RELATIVE_TOLERANCE};
pub use state_space::generate_states;
pub use transitions::{SuccessorWeights, TransitionTable};
