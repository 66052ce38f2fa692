// Roster CSV import/export.
//
// Columns: id,name,position,confirmed,paid,paid_on,rating. Only the first
// three are required; malformed rows are logged and skipped.

use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{PaymentStatus, Player, Position, Rating, Roster, RosterError};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Roster(#[from] RosterError),
}

// ---------------------------------------------------------------------------
// Raw CSV row
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Serialize)]
struct RawPlayerRow {
    id: String,
    name: String,
    position: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    confirmed: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    paid: bool,
    #[serde(default)]
    paid_on: Option<NaiveDate>,
    #[serde(default)]
    rating: Option<u8>,
}

/// Accept the spellings people actually type into the sheet.
fn lenient_bool<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(de)?;
    match s.trim().to_lowercase().as_str() {
        "" | "false" | "no" | "n" | "0" | "nao" | "não" => Ok(false),
        "true" | "yes" | "y" | "1" | "x" | "sim" | "s" => Ok(true),
        other => Err(serde::de::Error::custom(format!(
            "expected a yes/no value, got '{other}'"
        ))),
    }
}

fn player_from_row(raw: RawPlayerRow) -> Option<Player> {
    let id = raw.id.trim().to_string();
    let name = raw.name.trim().to_string();
    if id.is_empty() || name.is_empty() {
        warn!("skipping row with empty id or name");
        return None;
    }
    let Some(position) = Position::from_str_pos(&raw.position) else {
        warn!("skipping player '{}': unknown position '{}'", name, raw.position.trim());
        return None;
    };
    let rating = match raw.rating {
        Some(stars) => match Rating::new(stars) {
            Ok(r) => Some(r),
            Err(e) => {
                warn!("ignoring rating for '{}': {}", name, e);
                None
            }
        },
        None => None,
    };
    Some(Player {
        id,
        name,
        position,
        confirmed: raw.confirmed,
        payment: PaymentStatus {
            paid: raw.paid,
            paid_on: if raw.paid { raw.paid_on } else { None },
        },
        rating,
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a roster from any CSV reader.
pub fn load_roster_from_reader<R: Read>(rdr: R) -> Result<Roster, ImportError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawPlayerRow>() {
        match result {
            Ok(raw) => {
                if let Some(p) = player_from_row(raw) {
                    players.push(p);
                }
            }
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
            }
        }
    }
    Ok(Roster::from_players(players)?)
}

/// Load a roster CSV file from disk.
pub fn load_roster(path: &Path) -> Result<Roster, ImportError> {
    let file = std::fs::File::open(path).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let roster = load_roster_from_reader(file)?;
    info!(
        "Loaded {} players ({} confirmed) from {}",
        roster.len(),
        roster.confirmed_count(),
        path.display()
    );
    Ok(roster)
}

/// Write the roster back out in the same column layout.
pub fn write_roster<W: Write>(w: W, roster: &Roster) -> Result<(), ImportError> {
    let mut writer = csv::Writer::from_writer(w);
    for p in roster.players() {
        writer.serialize(RawPlayerRow {
            id: p.id.clone(),
            name: p.name.clone(),
            position: p.position.display_str().to_string(),
            confirmed: p.confirmed,
            paid: p.payment.paid,
            paid_on: p.payment.paid_on,
            rating: p.rating.map(|r| r.stars()),
        })?;
    }
    writer.flush().map_err(|e| ImportError::Io {
        path: "<writer>".into(),
        source: e,
    })?;
    Ok(())
}
