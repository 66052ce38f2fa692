// Draw screen state: the team-count control and the last result.

use rand::Rng;
use tracing::debug;

use super::partition::{DrawError, DrawRules, Partitioner, TeamAssignment};
use super::share::ShareFormat;
use crate::roster::Participant;

/// Holds the team count and the most recent draw.
///
/// The team count follows the suggestion for the current confirmed total
/// until the user picks one explicitly. After that, roster changes leave it
/// alone until [`DrawSession::reset_override`].
#[derive(Debug, Clone)]
pub struct DrawSession {
    partitioner: Partitioner,
    team_count: usize,
    overridden: bool,
    last_result: Option<Vec<TeamAssignment>>,
}

impl DrawSession {
    pub fn new(rules: DrawRules) -> Self {
        let partitioner = Partitioner::new(rules);
        let rules = partitioner.rules();
        let team_count = rules.clamp_teams(rules.min_teams.max(1));
        DrawSession {
            partitioner,
            team_count,
            overridden: false,
            last_result: None,
        }
    }

    pub fn team_count(&self) -> usize {
        self.team_count
    }

    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    pub fn last_result(&self) -> Option<&[TeamAssignment]> {
        self.last_result.as_deref()
    }

    /// React to a new confirmed total. Returns the team count now in effect.
    pub fn on_eligible_count_changed(&mut self, eligible_count: usize) -> usize {
        if !self.overridden {
            let suggested = self.partitioner.suggest_team_count(eligible_count);
            self.team_count = self.partitioner.rules().clamp_teams(suggested);
            debug!(
                "{} confirmed, team count follows suggestion: {}",
                eligible_count, self.team_count
            );
        }
        self.team_count
    }

    /// Explicit user choice. Clamped into the configured bounds.
    pub fn set_team_count(&mut self, teams: usize) -> usize {
        self.team_count = self.partitioner.rules().clamp_teams(teams);
        self.overridden = true;
        self.team_count
    }

    /// Drop the user's choice and go back to the suggestion.
    pub fn reset_override(&mut self, eligible_count: usize) -> usize {
        self.overridden = false;
        self.on_eligible_count_changed(eligible_count)
    }

    /// Run a draw with the current team count. A successful draw replaces
    /// the previous one; a failed draw leaves no result.
    pub fn draw<R: Rng + ?Sized>(
        &mut self,
        eligible: &[Participant],
        rng: &mut R,
    ) -> Result<&[TeamAssignment], DrawError> {
        self.last_result = None;
        let teams = self.partitioner.draw_with(eligible, self.team_count, rng)?;
        Ok(self.last_result.insert(teams).as_slice())
    }

    pub fn clear(&mut self) {
        self.last_result = None;
    }

    /// Text for the share button, None before the first successful draw.
    pub fn share_text(&self, format: &ShareFormat) -> Option<String> {
        self.last_result.as_deref().map(|teams| format.render(teams))
    }
}

impl Default for DrawSession {
    fn default() -> Self {
        DrawSession::new(DrawRules::default())
    }
}
