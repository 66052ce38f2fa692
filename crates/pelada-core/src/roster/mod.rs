// Roster management: players, attendance, payments and ratings.

pub mod import;
pub mod player;
pub mod store;

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub use player::{Participant, PaymentStatus, Player, Position, Rating};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("player not found: {id}")]
    PlayerNotFound { id: String },

    #[error("duplicate player id: {id}")]
    DuplicateId { id: String },

    #[error("rating must be between 1 and 5 stars, got {stars}")]
    InvalidRating { stars: u8 },
}

/// The group's full list of players, in sign-up order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    pub fn new() -> Self {
        Roster::default()
    }

    /// Build a roster from existing records. Ids must be unique.
    pub fn from_players(players: Vec<Player>) -> Result<Self, RosterError> {
        let mut seen = HashSet::new();
        for p in &players {
            if !seen.insert(p.id.as_str()) {
                return Err(RosterError::DuplicateId { id: p.id.clone() });
            }
        }
        Ok(Roster { players })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Player, RosterError> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RosterError::PlayerNotFound { id: id.to_string() })
    }

    pub fn add_player(&mut self, player: Player) -> Result<(), RosterError> {
        if self.get(&player.id).is_some() {
            return Err(RosterError::DuplicateId { id: player.id });
        }
        debug!("adding player {} ({})", player.name, player.position);
        self.players.push(player);
        Ok(())
    }

    /// Remove a player and return their record.
    pub fn remove_player(&mut self, id: &str) -> Result<Player, RosterError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RosterError::PlayerNotFound { id: id.to_string() })?;
        Ok(self.players.remove(idx))
    }

    // -- attendance --

    pub fn set_confirmed(&mut self, id: &str, confirmed: bool) -> Result<(), RosterError> {
        self.get_mut(id)?.confirmed = confirmed;
        Ok(())
    }

    /// Flip attendance and return the new value.
    pub fn toggle_confirmed(&mut self, id: &str) -> Result<bool, RosterError> {
        let player = self.get_mut(id)?;
        player.confirmed = !player.confirmed;
        Ok(player.confirmed)
    }

    /// Clear every confirmation, e.g. once a session has been played.
    pub fn reset_confirmations(&mut self) {
        for p in &mut self.players {
            p.confirmed = false;
        }
    }

    pub fn confirmed_count(&self) -> usize {
        self.players.iter().filter(|p| p.confirmed).count()
    }

    /// Confirmed players projected for the draw, in roster order.
    pub fn confirmed_participants(&self) -> Vec<Participant> {
        self.players
            .iter()
            .filter(|p| p.confirmed)
            .map(Player::participant)
            .collect()
    }

    /// Confirmed player counts per position, in display order. Positions
    /// with nobody confirmed are omitted.
    pub fn position_counts(&self) -> Vec<(Position, usize)> {
        Position::ALL
            .iter()
            .map(|&pos| {
                let n = self
                    .players
                    .iter()
                    .filter(|p| p.confirmed && p.position == pos)
                    .count();
                (pos, n)
            })
            .filter(|&(_, n)| n > 0)
            .collect()
    }

    // -- payments --

    pub fn mark_paid(&mut self, id: &str, on: NaiveDate) -> Result<(), RosterError> {
        let player = self.get_mut(id)?;
        player.payment = PaymentStatus {
            paid: true,
            paid_on: Some(on),
        };
        Ok(())
    }

    pub fn mark_unpaid(&mut self, id: &str) -> Result<(), RosterError> {
        self.get_mut(id)?.payment = PaymentStatus::default();
        Ok(())
    }

    /// Players who have not paid, in roster order.
    pub fn unpaid(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| !p.payment.paid).collect()
    }

    /// Start a new billing period.
    pub fn reset_payments(&mut self) {
        for p in &mut self.players {
            p.payment = PaymentStatus::default();
        }
    }

    // -- ratings --

    pub fn rate(&mut self, id: &str, stars: u8) -> Result<(), RosterError> {
        let rating = Rating::new(stars)?;
        self.get_mut(id)?.rating = Some(rating);
        Ok(())
    }

    /// Mean star rating over rated players, None if nobody is rated.
    pub fn average_rating(&self) -> Option<f64> {
        let rated: Vec<u8> = self
            .players
            .iter()
            .filter_map(|p| p.rating.map(|r| r.stars()))
            .collect();
        if rated.is_empty() {
            return None;
        }
        let sum: u32 = rated.iter().map(|&s| u32::from(s)).sum();
        Some(f64::from(sum) / rated.len() as f64)
    }
}
