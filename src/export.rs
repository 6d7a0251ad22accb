//! CSV export of a learned policy and value table

use std::path::Path;

use serde::Serialize;

use crate::{mdp::MdpAgent, Result};

/// One exported row: a canonical state with its learned quantities
#[derive(Debug, Clone, Serialize)]
pub struct PolicyExportRecord {
    pub state: String,
    pub action: Option<usize>,
    pub value: f64,
    pub visits: u32,
    pub avg_reward: f64,
}

/// Collect the export rows for an agent, in state order.
pub fn policy_records(agent: &MdpAgent) -> Vec<PolicyExportRecord> {
    agent
        .states()
        .iter()
        .map(|state| PolicyExportRecord {
            state: state.encode(),
            action: agent.policy().get(state).copied().flatten(),
            value: agent.values().get(state).copied().unwrap_or(0.0),
            visits: agent.rewards().get(state).map(|s| s.visits).unwrap_or(0),
            avg_reward: agent.rewards().average(state),
        })
        .collect()
}

/// Write the agent's per-state policy, value, and reward statistics as
/// CSV.
///
/// # Errors
///
/// Returns an error if the file cannot be created or a row fails to
/// serialize.
pub fn export_policy_csv(agent: &MdpAgent, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in policy_records(agent) {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|source| crate::Error::Io {
        operation: format!("flush CSV export {}", path.display()),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::Player;

    #[test]
    fn test_records_cover_every_state() {
        let agent = MdpAgent::new(Player::X, Some(13));
        let records = policy_records(&agent);
        assert_eq!(records.len(), agent.states().len());

        // Fresh agent: all values zero, no visits
        assert!(records.iter().all(|r| r.value == 0.0 && r.visits == 0));

        // Non-terminal states carry an action, terminal states none
        let empty = records
            .iter()
            .find(|r| r.state == ".........")
            .expect("empty board row");
        assert!(empty.action.is_some());
    }

    #[test]
    fn test_csv_file_has_header_and_rows() {
        let agent = MdpAgent::new(Player::X, Some(13));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.csv");

        export_policy_csv(&agent, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "state,action,value,visits,avg_reward"
        );
        assert_eq!(lines.count(), agent.states().len());
    }
}
