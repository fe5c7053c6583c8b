use std::path::Path;

use tracing::{debug, warn};

use crate::battle::{extract_random_battle, extract_team_battle};
use crate::stats::{RandomBattleReport, TeamBattleReport};
use crate::{ReplayError, ReplayFile};

pub const REPLAY_EXTENSION: &str = "wotreplay";

/// Matches the replay extension case-insensitively (`.wotreplay`,
/// `.WOTREPLAY`, ...).
pub fn is_replay_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(REPLAY_EXTENSION))
        .unwrap_or(false)
}

fn read_segment(path: &Path) -> Result<Vec<u8>, ReplayError> {
    Ok(ReplayFile::from_file(path)?.into_data_segment())
}

/// Aggregates every replay in `folder` (non-recursive) into a random-battle
/// report. A file that fails to read or decode is logged and skipped; a
/// batch where every file fails yields an empty report, which the caller
/// must treat as its own error signal if it needs at least one parse.
pub fn process_random_folder(folder: &Path) -> Result<RandomBattleReport, ReplayError> {
    let mut report = RandomBattleReport::default();
    for_each_replay(folder, |name, path| {
        match read_segment(path).and_then(|segment| extract_random_battle(&segment)) {
            Ok(record) => {
                debug!(file = name, tank = %record.tank, outcome = %record.outcome, "parsed replay");
                report.add(&record);
            }
            Err(err) => warn!(file = name, %err, "skipping unparseable replay"),
        }
    })?;
    Ok(report)
}

/// Folder-level counterpart of [`process_random_folder`] for team battles.
pub fn process_team_folder(folder: &Path) -> Result<TeamBattleReport, ReplayError> {
    let mut report = TeamBattleReport::default();
    for_each_replay(folder, |name, path| {
        match read_segment(path).and_then(|segment| extract_team_battle(&segment)) {
            Ok(record) => {
                debug!(file = name, allies = record.allies.len(), "parsed replay");
                report.add(&record);
            }
            Err(err) => warn!(file = name, %err, "skipping unparseable replay"),
        }
    })?;
    Ok(report)
}

/// Aggregates an in-memory set of named replay blobs (e.g. staged uploads)
/// into a random-battle report. Same skip semantics as the folder driver.
pub fn process_random_set<'a, I>(files: I) -> RandomBattleReport
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut report = RandomBattleReport::default();
    for (name, bytes) in files {
        if !is_replay_file(name) {
            continue;
        }
        let segment = ReplayFile::from_bytes(bytes.to_vec()).into_data_segment();
        match extract_random_battle(&segment) {
            Ok(record) => report.add(&record),
            Err(err) => warn!(file = name, %err, "skipping unparseable replay"),
        }
    }
    report
}

/// In-memory counterpart of [`process_team_folder`].
pub fn process_team_set<'a, I>(files: I) -> TeamBattleReport
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut report = TeamBattleReport::default();
    for (name, bytes) in files {
        if !is_replay_file(name) {
            continue;
        }
        let segment = ReplayFile::from_bytes(bytes.to_vec()).into_data_segment();
        match extract_team_battle(&segment) {
            Ok(record) => report.add(&record),
            Err(err) => warn!(file = name, %err, "skipping unparseable replay"),
        }
    }
    report
}

/// Walks `folder` and invokes `f` for every entry with the replay
/// extension. Only listing the directory itself can fail; per-file errors
/// are the callback's business.
fn for_each_replay(
    folder: &Path,
    mut f: impl FnMut(&str, &Path),
) -> Result<(), ReplayError> {
    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !is_replay_file(name) {
            continue;
        }
        f(name, &entry.path());
    }
    Ok(())
}
