// Integration tests for the pelada manager.
//
// These exercise the public API end-to-end: CSV roster import, the
// confirmed-player filter, the draw engine across many seeds and sizes,
// session state, share text, and the roster store feeding a draw session.

use std::collections::HashSet;
use std::path::Path;

use pelada_core::config::{parse_config, Config};
use pelada_core::draw::{
    draw, format_shareable_text, suggest_team_count, BalanceMode, DrawError, DrawRules,
    DrawSession, Partitioner, TeamAssignment,
};
use pelada_core::roster::import::load_roster;
use pelada_core::roster::store::RosterStore;
use pelada_core::roster::{Participant, Position};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ===========================================================================
// Test helpers
// ===========================================================================

/// Fixture directory path (relative to the package root, which is the cwd
/// for `cargo test`).
const FIXTURES: &str = "tests/fixtures";

fn fixture_roster() -> pelada_core::roster::Roster {
    load_roster(&Path::new(FIXTURES).join("roster.csv")).expect("fixture roster should load")
}

/// Synthetic roster with a mix of every field position.
fn participants(keepers: usize, field: usize) -> Vec<Participant> {
    let field_positions = [
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
        Position::Utility,
    ];
    let mut out: Vec<Participant> = (0..keepers)
        .map(|i| Participant::new(format!("gk{i}"), format!("Keeper {i}"), Position::Goalkeeper))
        .collect();
    out.extend((0..field).map(|i| {
        Participant::new(
            format!("f{i}"),
            format!("Field {i}"),
            field_positions[(i * 7) % field_positions.len()],
        )
    }));
    out
}

fn spread(values: impl Iterator<Item = usize>) -> usize {
    let v: Vec<usize> = values.collect();
    v.iter().max().copied().unwrap_or(0) - v.iter().min().copied().unwrap_or(0)
}

fn assert_every_participant_once(input: &[Participant], teams: &[TeamAssignment]) {
    let mut seen = HashSet::new();
    let mut total = 0;
    for team in teams {
        for m in &team.members {
            assert!(seen.insert(m.id.clone()), "{} assigned twice", m.id);
            total += 1;
        }
    }
    assert_eq!(total, input.len());
    let expected: HashSet<String> = input.iter().map(|p| p.id.clone()).collect();
    assert_eq!(seen, expected);
}

// ===========================================================================
// Draw properties
// ===========================================================================

#[test]
fn draw_preserves_participants_and_balances_pools() {
    let partitioner = Partitioner::default();
    for teams in 2usize..=6 {
        for keepers in 0..=8 {
            for extra in [0, 1, 5, 11] {
                let field = (teams * 6 + extra).saturating_sub(keepers);
                let input = participants(keepers, field);
                for seed in 0..5 {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let result = partitioner
                        .draw_with(&input, teams, &mut rng)
                        .expect("enough players for the draw");
                    assert_eq!(result.len(), teams);
                    assert_every_participant_once(&input, &result);
                    assert!(spread(result.iter().map(|t| t.keeper_count())) <= 1);
                    assert!(spread(result.iter().map(|t| t.field_count())) <= 1);
                    assert!(spread(result.iter().map(|t| t.members.len())) <= 2);
                }
            }
        }
    }
}

#[test]
fn interleaved_draw_keeps_totals_within_one() {
    let partitioner = Partitioner::new(DrawRules {
        balance_mode: BalanceMode::Interleaved,
        ..DrawRules::default()
    });
    for teams in 2..=6 {
        for keepers in 0..=7 {
            let input = participants(keepers, teams * 6 + 3);
            let mut rng = StdRng::seed_from_u64(teams as u64 * 31 + keepers as u64);
            let result = partitioner.draw_with(&input, teams, &mut rng).unwrap();
            assert_every_participant_once(&input, &result);
            assert!(spread(result.iter().map(|t| t.members.len())) <= 1);
            assert!(spread(result.iter().map(|t| t.keeper_count())) <= 1);
            assert!(spread(result.iter().map(|t| t.field_count())) <= 1);
        }
    }
}

#[test]
fn draw_below_capacity_always_fails() {
    for teams in 2..=6 {
        let needed = teams * 6;
        for n in [0, 1, needed / 2, needed - 1] {
            let input = participants(n.min(2), n - n.min(2));
            match draw(&input, teams) {
                Err(DrawError::InsufficientPlayers {
                    teams: t,
                    required,
                    available,
                }) => {
                    assert_eq!(t, teams);
                    assert_eq!(required, needed);
                    assert_eq!(available, n);
                }
                other => panic!("expected InsufficientPlayers, got {other:?}"),
            }
        }
    }
}

#[test]
fn unseeded_draws_vary() {
    // 30 field players across 3 teams; two identical draws in a row are
    // astronomically unlikely over ten attempts.
    let input = participants(0, 30);
    let first = draw(&input, 3).unwrap();
    let differs = (0..10).any(|_| draw(&input, 3).unwrap() != first);
    assert!(differs);
}

#[test]
fn chacha_seed_pins_identities() {
    let input = participants(3, 21);
    let a = Partitioner::default()
        .draw_with(&input, 3, &mut ChaCha8Rng::seed_from_u64(2026))
        .unwrap();
    let b = Partitioner::default()
        .draw_with(&input, 3, &mut ChaCha8Rng::seed_from_u64(2026))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn suggested_counts() {
    assert_eq!(suggest_team_count(0), 2);
    assert_eq!(suggest_team_count(13), 2);
    assert_eq!(suggest_team_count(14), 2);
    assert_eq!(suggest_team_count(21), 3);
}

// ===========================================================================
// Fixture roster end-to-end
// ===========================================================================

#[test]
fn fixture_roster_loads_with_attendance_and_payments() {
    let roster = fixture_roster();
    assert_eq!(roster.len(), 26);
    assert_eq!(roster.confirmed_count(), 24);
    assert_eq!(roster.unpaid().len(), 10);
    assert_eq!(
        roster.position_counts(),
        vec![
            (Position::Goalkeeper, 4),
            (Position::Defender, 5),
            (Position::Midfielder, 6),
            (Position::Forward, 6),
            (Position::Utility, 3),
        ]
    );
}

#[test]
fn fixture_draw_two_teams_splits_keepers_and_field_evenly() {
    let roster = fixture_roster();
    let eligible = roster.confirmed_participants();
    assert!(eligible.iter().all(|p| p.id != "25" && p.id != "26"));

    let mut rng = StdRng::seed_from_u64(7);
    let teams = Partitioner::default().draw_with(&eligible, 2, &mut rng).unwrap();
    assert_eq!(teams[0].name, "Team A");
    assert_eq!(teams[1].name, "Team B");
    for team in &teams {
        assert_eq!(team.keeper_count(), 2);
        assert_eq!(team.field_count(), 10);
    }
    assert_every_participant_once(&eligible, &teams);

    let text = format_shareable_text(&teams);
    assert!(text.contains("*TEAM A*"));
    assert!(text.contains("*TEAM B*"));
    assert_eq!(text.matches("[GK]").count(), 4);
    assert_eq!(text.matches("[FIELD]").count(), 20);
}

#[test]
fn fixture_three_teams_needs_eighteen_and_four_needs_twenty_four() {
    let eligible = fixture_roster().confirmed_participants();
    assert!(draw(&eligible, 3).is_ok());
    assert!(draw(&eligible, 4).is_ok());
    assert!(matches!(
        draw(&eligible, 5),
        Err(DrawError::InsufficientPlayers { teams: 5, required: 30, available: 24 })
    ));
}

// ===========================================================================
// Store -> session wiring
// ===========================================================================

#[tokio::test]
async fn store_updates_drive_session_suggestion() {
    let store = RosterStore::new(fixture_roster());
    let mut sub = store.subscribe();
    let mut session = DrawSession::default();

    let snap = sub.changed().await.unwrap();
    assert_eq!(session.on_eligible_count_changed(snap.confirmed_count()), 3);

    // Drop below 21 confirmed: suggestion falls back to 2.
    store
        .update(|r| {
            for id in ["21", "22", "23", "24"] {
                r.set_confirmed(id, false)?;
            }
            Ok(())
        })
        .unwrap();
    let snap = sub.changed().await.unwrap();
    assert_eq!(snap.confirmed_count(), 20);
    assert_eq!(session.on_eligible_count_changed(snap.confirmed_count()), 2);

    // User override survives further roster changes.
    session.set_team_count(3);
    store.update(|r| r.set_confirmed("25", true)).unwrap();
    let snap = sub.changed().await.unwrap();
    assert_eq!(session.on_eligible_count_changed(snap.confirmed_count()), 3);

    let mut rng = StdRng::seed_from_u64(11);
    let teams = session
        .draw(&snap.confirmed_participants(), &mut rng)
        .unwrap();
    assert_eq!(teams.len(), 3);

    // The draw never writes back to the roster.
    assert!(!sub.has_changed());
    assert_eq!(store.snapshot().confirmed_count(), 21);
}

#[test]
fn config_rules_flow_into_draw_and_share() {
    let config = parse_config(
        r#"
[draw]
max_teams = 3
min_players_per_team = 5
team_prefix = "Time"

[share]
title = "Pelada de Quinta"
signature = "bora!"
"#,
        Path::new("pelada.toml"),
    )
    .unwrap();
    assert_ne!(config, Config::default());

    let mut session = DrawSession::new(config.draw.clone());
    session.set_team_count(5);
    assert_eq!(session.team_count(), 3);

    let mut rng = StdRng::seed_from_u64(1);
    session.draw(&participants(3, 12), &mut rng).unwrap();
    let text = session.share_text(&config.share_format()).unwrap();
    assert!(text.starts_with("Pelada de Quinta\n\n*TIME A*"));
    assert!(text.contains("*TIME C*"));
    assert!(text.ends_with("bora!"));
}
