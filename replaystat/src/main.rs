use anyhow::{Context, bail};
use clap::{App, Arg, SubCommand};
use serde_json::Value;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

use wot_replays::batch::{is_replay_file, process_random_set, process_team_set};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let matches = App::new("replaystat")
        .about("Aggregate statistics from World of Tanks replay files")
        .arg(
            Arg::with_name("pretty")
                .long("pretty")
                .global(true)
                .help("Pretty-print the JSON report"),
        )
        .subcommand(
            SubCommand::with_name("random")
                .about("Per-tank and per-map stats for the observing player's random battles")
                .arg(
                    Arg::with_name("folder")
                        .required(true)
                        .help("Folder to search for .wotreplay files"),
                ),
        )
        .subcommand(
            SubCommand::with_name("team")
                .about("Per-player stats across a team's battles")
                .arg(
                    Arg::with_name("folder")
                        .required(true)
                        .help("Folder to search for .wotreplay files"),
                ),
        )
        .get_matches();

    let (report, pretty): (Value, bool) = match matches.subcommand() {
        ("random", Some(sub)) => {
            let folder = sub.value_of("folder").unwrap();
            let report = process_random_set(borrowed(&collect_replays(folder)?));
            if report.is_empty() {
                bail!("no parseable replays found in {}", folder);
            }
            (serde_json::to_value(&report)?, sub.is_present("pretty"))
        }
        ("team", Some(sub)) => {
            let folder = sub.value_of("folder").unwrap();
            let report = process_team_set(borrowed(&collect_replays(folder)?));
            if report.is_empty() {
                bail!("no parseable replays found in {}", folder);
            }
            (serde_json::to_value(&report)?, sub.is_present("pretty"))
        }
        _ => bail!("specify a subcommand: random or team (see --help)"),
    };

    let rendered = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{rendered}");

    Ok(())
}

/// Recursively collects every replay file under `folder` into memory.
/// Files that cannot be read are logged and skipped, matching the batch
/// driver's per-file skip semantics.
fn collect_replays(folder: &str) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
    let root = Path::new(folder);
    if !root.is_dir() {
        bail!("{} is not a directory", folder);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("failed to walk {folder}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !is_replay_file(name) {
            continue;
        }
        match std::fs::read(entry.path()) {
            Ok(bytes) => files.push((name.to_string(), bytes)),
            Err(err) => warn!(file = name, %err, "skipping unreadable replay"),
        }
    }
    Ok(files)
}

fn borrowed(files: &[(String, Vec<u8>)]) -> impl Iterator<Item = (&str, &[u8])> {
    files.iter().map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
}
