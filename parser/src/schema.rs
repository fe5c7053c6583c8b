use serde_json::{Map, Value};
use variantly::Variantly;

/// Which analysis the caller is running. Random battles carry their results
/// in a `personal`/`common` block; team battles carry per-player rows as
/// arrays under `vehicles`. Real results payloads can contain both sections,
/// so the mode decides which results shape the classifier probes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Random,
    Team,
}

/// A participant row from the metadata `vehicles` roster, in object order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleMeta {
    pub name: String,
    pub team: Option<i64>,
    pub vehicle_type: Option<String>,
}

/// Battle metadata: the observing player, the map, and the full roster.
#[derive(Debug, Clone, Default)]
pub struct BattleMetadata {
    pub player_name: String,
    pub map_display_name: Option<String>,
    pub vehicles: Vec<VehicleMeta>,
}

/// One entry of the random-battle `personal` block. Entries without a
/// `damageDealt` field (e.g. the avatar block) keep `damage_dealt: None`
/// and are passed over when looking for the observer's stats.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonalStats {
    pub team: Option<i64>,
    pub damage_dealt: Option<i64>,
    pub kills: i64,
    pub assisted_track: i64,
    pub assisted_radio: i64,
    pub death_reason: i64,
}

/// Random-battle results: personal stat blocks plus the match summary.
#[derive(Debug, Clone, Default)]
pub struct RandomResults {
    pub winner_team: i64,
    pub personal: Vec<PersonalStats>,
}

/// One row of the team-battle results mapping (first element of each
/// per-vehicle array).
#[derive(Debug, Clone, Default)]
pub struct PlayerEntry {
    pub name: String,
    pub team: Option<i64>,
    pub damage_dealt: i64,
    pub kills: i64,
    pub assisted_track: i64,
    pub assisted_radio: i64,
    pub vehicle_type: Option<String>,
}

/// Team-battle results: per-player rows in object order plus the winner.
#[derive(Debug, Clone, Default)]
pub struct TeamResults {
    pub winner_team: i64,
    pub entries: Vec<PlayerEntry>,
}

/// Classification of one JSON object recovered by the scanner.
#[derive(Debug, Clone, Variantly)]
pub enum ReplayJson {
    Metadata(BattleMetadata),
    RandomResults(RandomResults),
    TeamResults(TeamResults),
    /// Parsed fine but matches no shape we care about.
    Unrecognized,
}

/// Decides what a scanned JSON object is by probing its key set.
///
/// Metadata requires `playerName`, `mapDisplayName` and `vehicles`, with a
/// guard that the roster rows are plain objects without combat stats (the
/// results payload also carries a `vehicles` key). The results shape probed
/// depends on `mode`; anything else is `Unrecognized`.
pub fn classify(value: &Value, mode: AnalysisMode) -> ReplayJson {
    let Some(obj) = value.as_object() else {
        return ReplayJson::Unrecognized;
    };

    if is_metadata(obj) {
        return ReplayJson::Metadata(metadata_from(obj));
    }

    match mode {
        AnalysisMode::Random => {
            if obj.contains_key("personal") && obj.contains_key("common") {
                return ReplayJson::RandomResults(random_results_from(obj));
            }
        }
        AnalysisMode::Team => {
            if let Some(vehicles) = obj.get("vehicles").and_then(Value::as_object) {
                if first_row_has_damage(vehicles) {
                    return ReplayJson::TeamResults(team_results_from(obj, vehicles));
                }
            }
        }
    }

    ReplayJson::Unrecognized
}

fn is_metadata(obj: &Map<String, Value>) -> bool {
    if !(obj.contains_key("playerName") && obj.contains_key("mapDisplayName")) {
        return false;
    }
    let Some(vehicles) = obj.get("vehicles").and_then(Value::as_object) else {
        return false;
    };
    // Roster rows are flat objects; a first row that is an array or carries
    // damageDealt belongs to a results payload instead.
    match vehicles.values().next() {
        None => true,
        Some(Value::Object(row)) => !row.contains_key("damageDealt"),
        Some(_) => false,
    }
}

fn first_row_has_damage(vehicles: &Map<String, Value>) -> bool {
    vehicles
        .values()
        .next()
        .and_then(Value::as_array)
        .and_then(|rows| rows.first())
        .and_then(Value::as_object)
        .is_some_and(|row| row.contains_key("damageDealt"))
}

fn metadata_from(obj: &Map<String, Value>) -> BattleMetadata {
    let vehicles = obj
        .get("vehicles")
        .and_then(Value::as_object)
        .map(|rows| {
            rows.values()
                .filter_map(Value::as_object)
                .map(vehicle_meta_from)
                .collect()
        })
        .unwrap_or_default();

    BattleMetadata {
        player_name: field_str(obj, "playerName").unwrap_or_default().to_string(),
        map_display_name: field_str(obj, "mapDisplayName").map(str::to_string),
        vehicles,
    }
}

fn vehicle_meta_from(row: &Map<String, Value>) -> VehicleMeta {
    VehicleMeta {
        name: field_str(row, "name").unwrap_or_default().to_string(),
        team: field_i64(row, "team"),
        vehicle_type: field_str(row, "vehicleType").map(str::to_string),
    }
}

fn random_results_from(obj: &Map<String, Value>) -> RandomResults {
    let personal = obj
        .get("personal")
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .values()
                .filter_map(Value::as_object)
                .map(personal_stats_from)
                .collect()
        })
        .unwrap_or_default();

    RandomResults {
        winner_team: winner_team_from(obj),
        personal,
    }
}

fn personal_stats_from(entry: &Map<String, Value>) -> PersonalStats {
    PersonalStats {
        team: field_i64(entry, "team"),
        damage_dealt: field_i64(entry, "damageDealt"),
        kills: field_i64(entry, "kills").unwrap_or(0),
        assisted_track: field_i64(entry, "damageAssistedTrack").unwrap_or(0),
        assisted_radio: field_i64(entry, "damageAssistedRadio").unwrap_or(0),
        death_reason: field_i64(entry, "deathReason").unwrap_or(0),
    }
}

fn team_results_from(obj: &Map<String, Value>, vehicles: &Map<String, Value>) -> TeamResults {
    let entries = vehicles
        .values()
        .filter_map(Value::as_array)
        .filter_map(|rows| rows.first())
        .filter_map(Value::as_object)
        .map(player_entry_from)
        .collect();

    TeamResults {
        winner_team: winner_team_from(obj),
        entries,
    }
}

fn player_entry_from(row: &Map<String, Value>) -> PlayerEntry {
    PlayerEntry {
        name: field_str(row, "name").unwrap_or_default().to_string(),
        team: field_i64(row, "team"),
        damage_dealt: field_i64(row, "damageDealt").unwrap_or(0),
        kills: field_i64(row, "kills").unwrap_or(0),
        assisted_track: field_i64(row, "damageAssistedTrack").unwrap_or(0),
        assisted_radio: field_i64(row, "damageAssistedRadio").unwrap_or(0),
        vehicle_type: field_str(row, "vehicleType").map(str::to_string),
    }
}

fn winner_team_from(obj: &Map<String, Value>) -> i64 {
    obj.get("common")
        .and_then(Value::as_object)
        .and_then(|common| field_i64(common, "winnerTeam"))
        .unwrap_or(0)
}

/// Team ids and the winner id arrive as JSON numbers in most replays, but as
/// numeric strings in some variants. Both are accepted.
fn as_i64_lenient(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn field_i64(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    obj.get(key).and_then(as_i64_lenient)
}

fn field_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}
