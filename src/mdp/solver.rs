//! Value iteration over the canonical state graph

use std::collections::HashMap;

use crate::tictactoe::Board;

use super::{rewards::RewardTable, transitions::TransitionTable};

/// Deterministic policy: the chosen action per state, `None` where no
/// action is available (terminal states).
pub type Policy = HashMap<Board, Option<usize>>;

/// State-value function
pub type ValueTable = HashMap<Board, f64>;

/// A state's value must move by more than this relative fraction to
/// count as changed.
pub const RELATIVE_TOLERANCE: f64 = 1e-3;

/// Hard cap on sweeps; exceeding it means the configuration (discount
/// factor, tolerance) cannot settle and is reported as an error rather
/// than returning a partially converged policy.
pub const MAX_SWEEPS: usize = 1000;

/// Run synchronous value iteration to a fixed point.
///
/// Sweeps the states in order, updating values in place. Per state, the
/// best action maximizes the weight-averaged successor value; ties keep
/// the lowest action index. The new value is the state's average observed
/// reward plus the discounted best payoff (zero when the state has no
/// actions). A sweep with no changes ends the iteration.
///
/// Returns the number of sweeps performed.
///
/// # Errors
///
/// Returns [`crate::Error::SolverNotConverged`] if no fixed point is
/// reached within [`MAX_SWEEPS`] sweeps.
pub fn solve(
    states: &[Board],
    values: &mut ValueTable,
    policy: &mut Policy,
    transitions: &TransitionTable,
    rewards: &RewardTable,
    discount_factor: f64,
) -> Result<usize, crate::Error> {
    for sweep in 1..=MAX_SWEEPS {
        let mut changes = 0usize;

        for state in states {
            let best = best_action(state, values, transitions);
            let payoff = best.map(|(_, payoff)| payoff).unwrap_or(0.0);
            let value = rewards.average(state) + discount_factor * payoff;

            let previous = values.get(state).copied().unwrap_or(0.0);
            if !relatively_close(previous, value) {
                policy.insert(*state, best.map(|(action, _)| action));
                values.insert(*state, value);
                changes += 1;
            }
        }

        if changes == 0 {
            return Ok(sweep);
        }
    }

    Err(crate::Error::SolverNotConverged { sweeps: MAX_SWEEPS })
}

/// The action with the highest expected successor value, with that value.
///
/// The expectation is the weighted average of successor values under the
/// recorded transition weights. Returns `None` when the state has no
/// recorded actions.
fn best_action(
    state: &Board,
    values: &ValueTable,
    transitions: &TransitionTable,
) -> Option<(usize, f64)> {
    let actions = transitions.actions(state)?;
    let mut best: Option<(usize, f64)> = None;

    for (&action, successors) in actions {
        let mut weighted = 0.0;
        let mut total = 0u64;
        for (next, &weight) in successors {
            weighted += f64::from(weight) * values.get(next).copied().unwrap_or(0.0);
            total += u64::from(weight);
        }
        if total == 0 {
            continue;
        }
        let payoff = weighted / total as f64;
        if best.is_none_or(|(_, incumbent)| payoff > incumbent) {
            best = Some((action, payoff));
        }
    }

    best
}

/// Relative closeness with no absolute floor: values within 0.1% of the
/// larger magnitude are considered unchanged.
fn relatively_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= RELATIVE_TOLERANCE * a.abs().max(b.abs())
}
