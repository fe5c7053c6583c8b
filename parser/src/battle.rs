use serde::Serialize;
use strum_macros::Display;

use crate::ReplayError;
use crate::json_scan::find_json_objects;
use crate::schema::{AnalysisMode, BattleMetadata, RandomResults, ReplayJson, TeamResults, classify};

/// Fallback map name when the metadata block carries none.
pub const UNKNOWN_MAP: &str = "Unknown map";

/// Battle outcome relative to the observing player's team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Winner team 0 means no decisive winner was recorded; anything else is
    /// a win or a loss depending on which side the observer was on.
    pub fn from_teams(winner_team: i64, player_team: i64) -> Self {
        if winner_team == player_team {
            Outcome::Win
        } else if winner_team != 0 {
            Outcome::Loss
        } else {
            Outcome::Draw
        }
    }
}

/// Normalized per-replay record for random battles (the observer's own line).
#[derive(Debug, Clone, Serialize)]
pub struct RandomBattleRecord {
    pub map_name: String,
    pub tank: String,
    pub damage: i64,
    pub kills: i64,
    pub assisted_damage: i64,
    pub survived: bool,
    pub outcome: Outcome,
}

/// One ally's line from a team battle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllyStats {
    pub name: String,
    pub tank: String,
    pub damage: i64,
    pub kills: i64,
    pub assisted_damage: i64,
}

/// Normalized per-replay record for team battles: every teammate on the
/// observer's side.
#[derive(Debug, Clone, Serialize)]
pub struct TeamBattleRecord {
    pub map_name: String,
    pub outcome: Outcome,
    pub allies: Vec<AllyStats>,
}

/// The human tank name is the final segment of the colon-delimited internal
/// vehicle type identifier, e.g. `"ussr:R04_T-34"` -> `"R04_T-34"`.
fn tank_name(vehicle_type: Option<&str>) -> String {
    let id = vehicle_type.unwrap_or("N/A");
    id.rsplit(':').next().unwrap_or(id).to_string()
}

/// Walks the scanned objects and keeps the first metadata and first
/// mode-matching results object.
fn classify_segment(data: &[u8], mode: AnalysisMode) -> (Option<BattleMetadata>, Option<ReplayJson>) {
    let mut metadata = None;
    let mut results = None;

    for value in find_json_objects(data) {
        match classify(&value, mode) {
            ReplayJson::Metadata(m) if metadata.is_none() => metadata = Some(m),
            found @ (ReplayJson::RandomResults(_) | ReplayJson::TeamResults(_))
                if results.is_none() =>
            {
                results = Some(found)
            }
            _ => {}
        }
        if metadata.is_some() && results.is_some() {
            break;
        }
    }

    (metadata, results)
}

fn map_name(metadata: &BattleMetadata) -> String {
    metadata
        .map_display_name
        .clone()
        .unwrap_or_else(|| UNKNOWN_MAP.to_string())
}

/// Extracts the observer's own stats from a random-battle data segment.
pub fn extract_random_battle(data: &[u8]) -> Result<RandomBattleRecord, ReplayError> {
    let (metadata, results) = classify_segment(data, AnalysisMode::Random);
    let metadata = metadata.ok_or(ReplayError::MissingMetadata)?;
    let Some(ReplayJson::RandomResults(results)) = results else {
        return Err(ReplayError::MissingResults);
    };
    build_random_record(&metadata, &results)
}

fn build_random_record(
    metadata: &BattleMetadata,
    results: &RandomResults,
) -> Result<RandomBattleRecord, ReplayError> {
    if metadata.player_name.is_empty() {
        return Err(ReplayError::MissingMetadata);
    }

    // The personal block never names the tank; the roster does.
    let tank = metadata
        .vehicles
        .iter()
        .find(|v| v.name == metadata.player_name)
        .map(|v| tank_name(v.vehicle_type.as_deref()))
        .ok_or_else(|| ReplayError::PlayerNotInRoster(metadata.player_name.clone()))?;

    let personal = results
        .personal
        .iter()
        .find(|entry| entry.damage_dealt.is_some())
        .ok_or(ReplayError::MissingPersonalStats)?;

    let outcome = match personal.team {
        Some(team) => Outcome::from_teams(results.winner_team, team),
        None => Outcome::Draw,
    };

    Ok(RandomBattleRecord {
        map_name: map_name(metadata),
        tank,
        damage: personal.damage_dealt.unwrap_or(0),
        kills: personal.kills,
        assisted_damage: personal.assisted_track + personal.assisted_radio,
        survived: personal.death_reason == -1,
        outcome,
    })
}

/// Extracts every teammate's stats from a team-battle data segment.
pub fn extract_team_battle(data: &[u8]) -> Result<TeamBattleRecord, ReplayError> {
    let (metadata, results) = classify_segment(data, AnalysisMode::Team);
    let metadata = metadata.ok_or(ReplayError::MissingMetadata)?;
    let Some(ReplayJson::TeamResults(results)) = results else {
        return Err(ReplayError::MissingResults);
    };
    build_team_record(&metadata, &results)
}

fn build_team_record(
    metadata: &BattleMetadata,
    results: &TeamResults,
) -> Result<TeamBattleRecord, ReplayError> {
    if metadata.player_name.is_empty() {
        return Err(ReplayError::MissingMetadata);
    }

    let player_team = metadata
        .vehicles
        .iter()
        .find(|v| v.name == metadata.player_name)
        .and_then(|v| v.team)
        .ok_or_else(|| ReplayError::PlayerNotInRoster(metadata.player_name.clone()))?;

    let outcome = Outcome::from_teams(results.winner_team, player_team);

    let mut allies: Vec<AllyStats> = results
        .entries
        .iter()
        .filter(|entry| entry.team == Some(player_team))
        .map(|entry| AllyStats {
            name: entry.name.clone(),
            tank: tank_name(entry.vehicle_type.as_deref()),
            damage: entry.damage_dealt,
            kills: entry.kills,
            assisted_damage: entry.assisted_track + entry.assisted_radio,
        })
        .collect();

    // The results rows sometimes carry missing or placeholder names; the
    // metadata roster is authoritative. Both mappings are assumed to list a
    // team's players in the same relative order, so rows are reconciled by
    // position within the team-filtered roster.
    let roster: Vec<_> = metadata
        .vehicles
        .iter()
        .filter(|v| v.team == Some(player_team))
        .collect();
    for (ally, meta) in allies.iter_mut().zip(&roster) {
        if !meta.name.is_empty() {
            ally.name = meta.name.clone();
        }
        ally.tank = tank_name(meta.vehicle_type.as_deref());
    }

    for ally in &mut allies {
        if ally.name.is_empty() {
            ally.name = format!("Player on {}", ally.tank);
        }
    }

    Ok(TeamBattleRecord {
        map_name: map_name(metadata),
        outcome,
        allies,
    })
}
