// Team draw: partitioning, session state and share text.

pub mod partition;
pub mod session;
pub mod share;

pub use partition::{
    draw, seeded_rng, suggest_team_count, team_label, BalanceMode, DrawError, DrawRules, InvalidInput,
    Partitioner, TeamAssignment,
};
pub use session::DrawSession;
pub use share::{format_shareable_text, ShareFormat};
