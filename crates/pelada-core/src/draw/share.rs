// Plain-text rendering of a draw, for pasting into the group chat.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::partition::TeamAssignment;

pub const KEEPER_TAG: &str = "GK";
pub const FIELD_TAG: &str = "FIELD";
pub const DEFAULT_SIGNATURE: &str = "Drawn with Pelada Manager";

/// Options for [`ShareFormat::render`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareFormat {
    /// Optional first line, e.g. the group name.
    #[serde(default)]
    pub title: Option<String>,
    pub signature: String,
    /// Session date, printed next to the title.
    #[serde(skip)]
    pub date: Option<NaiveDate>,
}

impl Default for ShareFormat {
    fn default() -> Self {
        ShareFormat {
            title: None,
            signature: DEFAULT_SIGNATURE.to_string(),
            date: None,
        }
    }
}

impl ShareFormat {
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Render teams as:
    ///
    /// ```text
    /// *TEAM A*
    /// - Ana [GK]
    /// - Bea [FIELD]
    ///
    /// Drawn with Pelada Manager
    /// ```
    pub fn render(&self, teams: &[TeamAssignment]) -> String {
        let mut out = String::new();

        let heading = match (&self.title, self.date) {
            (Some(title), Some(date)) => Some(format!("{} - {}", title, date.format("%d/%m/%Y"))),
            (Some(title), None) => Some(title.clone()),
            (None, Some(date)) => Some(date.format("%d/%m/%Y").to_string()),
            (None, None) => None,
        };
        if let Some(h) = heading {
            out.push_str(&h);
            out.push_str("\n\n");
        }

        for team in teams {
            out.push_str(&format!("*{}*\n", team.name.to_uppercase()));
            for member in &team.members {
                let tag = if member.position.is_keeper() {
                    KEEPER_TAG
                } else {
                    FIELD_TAG
                };
                out.push_str(&format!("- {} [{}]\n", member.display_name, tag));
            }
            out.push('\n');
        }

        out.push_str(&self.signature);
        out
    }
}

/// Render with the default format.
pub fn format_shareable_text(teams: &[TeamAssignment]) -> String {
    ShareFormat::default().render(teams)
}
