// Team draw: splits confirmed players into balanced, randomized teams.
//
// Goalkeepers are dealt first, round-robin across the teams, then every
// other role is dealt round-robin from a second shuffled pool.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::roster::Participant;

pub const DEFAULT_MIN_TEAMS: usize = 2;
pub const DEFAULT_MAX_TEAMS: usize = 6;
pub const DEFAULT_MIN_PLAYERS_PER_TEAM: usize = 6;
/// Divisor used when suggesting a team count from the confirmed total.
pub const DEFAULT_PLAYERS_PER_TEAM_HINT: usize = 7;
pub const DEFAULT_TEAM_PREFIX: &str = "Team";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("not enough confirmed players for {teams} teams: need {required}, have {available}")]
    InsufficientPlayers {
        teams: usize,
        required: usize,
        available: usize,
    },

    #[error("invalid draw input: {0}")]
    InvalidInput(#[from] InvalidInput),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("team count must be at least 1")]
    NonPositiveTeamCount,

    #[error("participant id {id} appears more than once")]
    DuplicateId { id: String },

    #[error("team bounds {min}..={max} are invalid: need 1 <= min_teams <= max_teams")]
    InvalidTeamBounds { min: usize, max: usize },
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How the keeper and field pools share the team cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceMode {
    /// Both pools start dealing at the first team. Each pool is balanced on
    /// its own, so team totals can differ by two.
    #[default]
    IndependentPools,
    /// Field players continue from the team after the last keeper, so team
    /// totals differ by at most one.
    Interleaved,
}

impl BalanceMode {
    pub fn from_str_mode(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "independent" | "independent_pools" => Some(BalanceMode::IndependentPools),
            "interleaved" => Some(BalanceMode::Interleaved),
            _ => None,
        }
    }
}

/// One drawn team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAssignment {
    pub name: String,
    /// Keepers first, then field players, each in dealing order.
    pub members: Vec<Participant>,
}

impl TeamAssignment {
    pub fn keeper_count(&self) -> usize {
        self.members.iter().filter(|m| m.position.is_keeper()).count()
    }

    pub fn field_count(&self) -> usize {
        self.members.len() - self.keeper_count()
    }
}

/// Limits applied to every draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRules {
    pub min_teams: usize,
    pub max_teams: usize,
    pub min_players_per_team: usize,
    pub players_per_team_hint: usize,
    pub team_prefix: String,
    pub balance_mode: BalanceMode,
}

impl Default for DrawRules {
    fn default() -> Self {
        DrawRules {
            min_teams: DEFAULT_MIN_TEAMS,
            max_teams: DEFAULT_MAX_TEAMS,
            min_players_per_team: DEFAULT_MIN_PLAYERS_PER_TEAM,
            players_per_team_hint: DEFAULT_PLAYERS_PER_TEAM_HINT,
            team_prefix: DEFAULT_TEAM_PREFIX.to_string(),
            balance_mode: BalanceMode::IndependentPools,
        }
    }
}

impl DrawRules {
    /// Team bounds must satisfy `1 <= min_teams <= max_teams`. Checked
    /// before every draw.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if self.min_teams == 0 || self.max_teams < self.min_teams {
            return Err(InvalidInput::InvalidTeamBounds {
                min: self.min_teams,
                max: self.max_teams,
            });
        }
        Ok(())
    }

    /// Clamp a requested team count into `[min_teams, max_teams]`. Never
    /// panics; with inverted bounds `max_teams` wins.
    pub fn clamp_teams(&self, teams: usize) -> usize {
        teams.max(self.min_teams).min(self.max_teams)
    }
}

// ---------------------------------------------------------------------------
// Partitioner
// ---------------------------------------------------------------------------

/// Stateless draw engine configured by [`DrawRules`].
#[derive(Debug, Clone, Default)]
pub struct Partitioner {
    rules: DrawRules,
}

impl Partitioner {
    pub fn new(rules: DrawRules) -> Self {
        Partitioner { rules }
    }

    pub fn rules(&self) -> &DrawRules {
        &self.rules
    }

    /// Suggested team count for a confirmed total:
    /// `max(min_teams, eligible / players_per_team_hint)`. Not clamped to
    /// `max_teams`.
    pub fn suggest_team_count(&self, eligible_count: usize) -> usize {
        let hint = self.rules.players_per_team_hint.max(1);
        (eligible_count / hint).max(self.rules.min_teams)
    }

    /// Draw teams using the thread-local random source.
    pub fn draw(
        &self,
        eligible: &[Participant],
        number_of_teams: usize,
    ) -> Result<Vec<TeamAssignment>, DrawError> {
        self.draw_with(eligible, number_of_teams, &mut rand::thread_rng())
    }

    /// Draw teams with a caller-supplied random source. A seeded `rng`
    /// makes the result reproducible.
    pub fn draw_with<R: Rng + ?Sized>(
        &self,
        eligible: &[Participant],
        number_of_teams: usize,
        rng: &mut R,
    ) -> Result<Vec<TeamAssignment>, DrawError> {
        self.rules.validate()?;
        if number_of_teams == 0 {
            return Err(InvalidInput::NonPositiveTeamCount.into());
        }
        check_unique_ids(eligible)?;

        let teams = self.rules.clamp_teams(number_of_teams);
        if teams != number_of_teams {
            debug!("team count {} clamped to {}", number_of_teams, teams);
        }

        let required = teams * self.rules.min_players_per_team;
        if eligible.len() < required {
            info!(
                "draw rejected: {} teams need {} players, {} confirmed",
                teams,
                required,
                eligible.len()
            );
            return Err(DrawError::InsufficientPlayers {
                teams,
                required,
                available: eligible.len(),
            });
        }

        let (mut keepers, mut others) = split_pools(eligible);
        keepers.shuffle(rng);
        others.shuffle(rng);

        let mut result: Vec<TeamAssignment> = (0..teams)
            .map(|i| TeamAssignment {
                name: team_label(&self.rules.team_prefix, i),
                members: Vec::new(),
            })
            .collect();

        for (i, keeper) in keepers.iter().enumerate() {
            result[i % teams].members.push(keeper.clone());
        }

        let offset = match self.rules.balance_mode {
            BalanceMode::IndependentPools => 0,
            BalanceMode::Interleaved => keepers.len() % teams,
        };
        for (j, player) in others.iter().enumerate() {
            result[(offset + j) % teams].members.push(player.clone());
        }

        info!(
            "drew {} teams from {} players ({} keepers, {} field)",
            teams,
            eligible.len(),
            keepers.len(),
            others.len()
        );
        Ok(result)
    }
}

/// Split into (keepers, field players). Field players are ordered by
/// position sort order, keeping roster order within a position.
fn split_pools(eligible: &[Participant]) -> (Vec<Participant>, Vec<Participant>) {
    let (keepers, mut others): (Vec<Participant>, Vec<Participant>) = eligible
        .iter()
        .cloned()
        .partition(|p| p.position.is_keeper());
    others.sort_by_key(|p| p.position.sort_order());
    (keepers, others)
}

fn check_unique_ids(eligible: &[Participant]) -> Result<(), InvalidInput> {
    let mut seen = HashSet::with_capacity(eligible.len());
    for p in eligible {
        if !seen.insert(p.id.as_str()) {
            return Err(InvalidInput::DuplicateId { id: p.id.clone() });
        }
    }
    Ok(())
}

/// Label for the team at `index`: "Team A" .. "Team Z", then "Team AA",
/// "Team AB", and so on.
pub fn team_label(prefix: &str, index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    let suffix = String::from_utf8_lossy(&letters);
    if prefix.is_empty() {
        suffix.into_owned()
    } else {
        format!("{prefix} {suffix}")
    }
}

/// Random source for `--seed` style reproducible draws. ChaCha8 output is
/// stable across rand releases, unlike `StdRng`.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

// ---------------------------------------------------------------------------
// Default-rules entry points
// ---------------------------------------------------------------------------

/// `max(2, eligible_count / 7)`.
pub fn suggest_team_count(eligible_count: usize) -> usize {
    Partitioner::default().suggest_team_count(eligible_count)
}

/// Draw with default rules and unseeded randomness. Repeated calls on the
/// same input give different teams.
pub fn draw(
    eligible: &[Participant],
    number_of_teams: usize,
) -> Result<Vec<TeamAssignment>, DrawError> {
    Partitioner::default().draw(eligible, number_of_teams)
}
