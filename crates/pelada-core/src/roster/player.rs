// Player records and the role categories used by the draw.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::RosterError;

/// Role category a player signs up under.
///
/// Only `Goalkeeper` is special-cased by the draw; every other variant is
/// pooled together as a field role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
    /// Plays anywhere. Sorted after every named field role.
    Utility,
}

impl Position {
    /// Every position, in display order.
    pub const ALL: [Position; 5] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
        Position::Utility,
    ];

    /// Parse a position string into a Position enum.
    ///
    /// Accepts the short codes, the English names, and the Portuguese
    /// abbreviations used on the group sheet:
    /// - "GK" / "GOL" / "GOLEIRO" -> Goalkeeper
    /// - "DEF" / "ZAG" / "ZAGUEIRO" -> Defender
    /// - "MID" / "MEI" / "MEIA" -> Midfielder
    /// - "FWD" / "ATA" / "ATACANTE" -> Forward
    /// - "UTIL" / "ANY" -> Utility
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GK" | "GOL" | "GOLEIRO" | "GOALKEEPER" => Some(Position::Goalkeeper),
            "DEF" | "ZAG" | "ZAGUEIRO" | "DEFENDER" => Some(Position::Defender),
            "MID" | "MEI" | "MEIA" | "MIDFIELDER" => Some(Position::Midfielder),
            "FWD" | "ATA" | "ATACANTE" | "FORWARD" => Some(Position::Forward),
            "UTIL" | "ANY" | "UTILITY" => Some(Position::Utility),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
            Position::Utility => "UTIL",
        }
    }

    /// Whether this position is balanced in the keeper pool.
    pub fn is_keeper(&self) -> bool {
        matches!(self, Position::Goalkeeper)
    }

    /// Order in which field roles are concatenated before shuffling.
    /// Goalkeeper sorts first but never reaches the field pool.
    pub fn sort_order(&self) -> u8 {
        match self {
            Position::Goalkeeper => 0,
            Position::Defender => 1,
            Position::Midfielder => 2,
            Position::Forward => 3,
            Position::Utility => 4,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Star rating given to a player, 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Result<Self, RosterError> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Ok(Rating(stars))
        } else {
            Err(RosterError::InvalidRating { stars })
        }
    }

    pub fn stars(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RosterError;

    fn try_from(stars: u8) -> Result<Self, Self::Error> {
        Rating::new(stars)
    }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> u8 {
        r.0
    }
}

/// Monthly fee state for a player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatus {
    pub paid: bool,
    /// Date the payment was recorded. None when unpaid or unknown.
    #[serde(default)]
    pub paid_on: Option<NaiveDate>,
}

/// A roster record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identifier, unique within a roster.
    pub id: String,
    pub name: String,
    pub position: Position,
    /// Attending the upcoming session.
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub payment: PaymentStatus,
    #[serde(default)]
    pub rating: Option<Rating>,
}

impl Player {
    /// Create an unconfirmed, unpaid, unrated player.
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: Position) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
            position,
            confirmed: false,
            payment: PaymentStatus::default(),
            rating: None,
        }
    }

    /// The slice of this record the draw works with.
    pub fn participant(&self) -> Participant {
        Participant {
            id: self.id.clone(),
            display_name: self.name.clone(),
            position: self.position,
        }
    }
}

/// A confirmed player as seen by the draw.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    /// Used for labels only, never for balancing.
    pub display_name: String,
    pub position: Position,
}

impl Participant {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, position: Position) -> Self {
        Participant {
            id: id.into(),
            display_name: display_name.into(),
            position,
        }
    }
}
