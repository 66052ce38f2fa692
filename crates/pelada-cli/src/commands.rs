// Command implementations. Each returns the text to print on stdout.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use rand::Rng;
use tracing::info;

use pelada_core::config::Config;
use pelada_core::draw::{BalanceMode, DrawError, DrawSession};
use pelada_core::roster::Roster;

/// Options for the `draw` command.
#[derive(Debug, Clone, Default)]
pub struct DrawOptions {
    pub teams: Option<usize>,
    pub mode: Option<BalanceMode>,
    pub date: Option<NaiveDate>,
    pub json: bool,
}

/// Attendance, payment and rating summary.
pub fn status(roster: &Roster) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Confirmed: {}/{}\n",
        roster.confirmed_count(),
        roster.len()
    ));
    for (pos, n) in roster.position_counts() {
        out.push_str(&format!("  {:<5}{}\n", pos.display_str(), n));
    }

    let unpaid = roster.unpaid();
    if unpaid.is_empty() {
        out.push_str("Everyone has paid\n");
    } else {
        out.push_str(&format!("Unpaid ({}):\n", unpaid.len()));
        for p in unpaid {
            out.push_str(&format!("  {}\n", p.name));
        }
    }

    match roster.average_rating() {
        Some(avg) => out.push_str(&format!("Average rating: {avg:.1}\n")),
        None => out.push_str("Average rating: -\n"),
    }
    out
}

/// Suggested team count for the confirmed players.
pub fn suggest(config: &Config, roster: &Roster) -> String {
    let mut session = DrawSession::new(config.draw.clone());
    let confirmed = roster.confirmed_count();
    let teams = session.on_eligible_count_changed(confirmed);
    format!("{confirmed} confirmed -> {teams} teams\n")
}

/// Run a draw over the confirmed players and render it.
pub fn draw<R: Rng + ?Sized>(
    config: &Config,
    roster: &Roster,
    opts: &DrawOptions,
    rng: &mut R,
) -> anyhow::Result<String> {
    let mut rules = config.draw.clone();
    if let Some(mode) = opts.mode {
        rules.balance_mode = mode;
    }

    let eligible = roster.confirmed_participants();
    let mut session = DrawSession::new(rules);
    session.on_eligible_count_changed(eligible.len());
    if let Some(n) = opts.teams {
        session.set_team_count(n);
    }
    info!(
        "Drawing {} teams from {} confirmed players",
        session.team_count(),
        eligible.len()
    );

    match session.draw(&eligible, rng) {
        Ok(_) => {}
        Err(DrawError::InsufficientPlayers {
            teams,
            required,
            available,
        }) => bail!(
            "not enough confirmed players for {teams} teams: need at least {required}, \
             only {available} confirmed"
        ),
        Err(e) => return Err(e).context("draw failed"),
    }

    if opts.json {
        let teams = session.last_result().unwrap_or_default();
        let mut text = serde_json::to_string_pretty(teams).context("failed to encode teams")?;
        text.push('\n');
        return Ok(text);
    }

    let mut format = config.share_format();
    if let Some(date) = opts.date {
        format = format.with_date(date);
    }
    let mut text = session.share_text(&format).unwrap_or_default();
    text.push('\n');
    Ok(text)
}
