//! Rotation CLI
//!
//! Reads matches and the roster from a `FileStore` directory and prints
//! playtime, keeper counts, fairness warnings and candidate rankings.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rotation_core::api;
use rotation_core::engine::{keeper, playtime, recommender, validator};
use rotation_core::fairness;
use rotation_core::{
    Candidate, FileStore, KeeperCounts, KeeperScope, Match, MatchEdit, MatchId, MatchStore,
    Player, PlayerId, RankBasis, RosterStore, RotationConfig, TeamId,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rotation")]
#[command(about = "Fair playing time and keeper rotation for youth football", long_about = None)]
struct Cli {
    /// Store directory (roster.json + matches/)
    #[arg(long, global = true, default_value = ".")]
    store: PathBuf,

    /// Rotation config JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Print the raw JSON API response
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Minutes per player for one match
    Playtime {
        #[arg(long = "match")]
        match_id: String,
    },

    /// Season totals and fairness for a team
    Season {
        #[arg(long)]
        team: String,
    },

    /// Keeper quarters per player
    Keepers {
        #[arg(long = "match", conflicts_with = "team", required_unless_present = "team")]
        match_id: Option<String>,

        #[arg(long)]
        team: Option<String>,
    },

    /// Fairness warnings per quarter
    Validate {
        #[arg(long = "match")]
        match_id: String,
    },

    /// Ranked candidates for an open position
    Rank {
        #[arg(long = "match")]
        match_id: String,

        /// 1-based quarter
        #[arg(long)]
        quarter: u8,

        /// Position name (e.g. keeper, "left back")
        #[arg(long)]
        position: String,

        /// Use the team's other matches for all-time keeper counts
        #[arg(long, default_value = "false")]
        team_history: bool,
    },

    /// Apply one edit (JSON `MatchEdit`) and save the match
    Edit {
        #[arg(long = "match")]
        match_id: String,

        /// e.g. '{"op":"toggle_attendance","player":"p7"}'
        #[arg(long)]
        edit: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let config = match &cli.config {
        Some(path) => RotationConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RotationConfig::default(),
    };

    let mut store = FileStore::open(&cli.store)
        .with_context(|| format!("opening store {}", cli.store.display()))?;
    let roster = store.list_players().context("reading roster")?;
    log::debug!("Store {} has {} players", store.root().display(), roster.len());

    match cli.command {
        Commands::Playtime { match_id } => {
            let m = load(&store, &match_id)?;
            if cli.json {
                let request = json!({"match": m, "roster": roster});
                println!("{}", api::playtime_json(&request.to_string()));
            } else {
                print_playtime(&m, &roster);
            }
        }

        Commands::Season { team } => {
            let matches = store.list_matches_for_team(&TeamId::new(team))?;
            if cli.json {
                let request = json!({"matches": matches, "roster": roster});
                println!("{}", api::season_playtime_json(&request.to_string()));
            } else {
                print_season(&fairness::season_report(&matches, &roster));
            }
        }

        Commands::Keepers { match_id, team } => {
            let (matches, scope) = match (match_id, team) {
                (Some(id), _) => {
                    let m = load(&store, &id)?;
                    let scope = KeeperScope::Match(m.id.clone());
                    (vec![m], scope)
                }
                (None, Some(team)) => {
                    (store.list_matches_for_team(&TeamId::new(team))?, KeeperScope::Season)
                }
                (None, None) => bail!("either --match or --team is required"),
            };
            if cli.json {
                let request = json!({"matches": matches, "scope": scope});
                println!("{}", api::keeper_counts_json(&request.to_string()));
            } else {
                print_keepers(&keeper::count(&matches, &scope), &roster);
            }
        }

        Commands::Validate { match_id } => {
            let m = load(&store, &match_id)?;
            if cli.json {
                let request = json!({"match": m, "roster": roster, "config": config});
                println!("{}", api::validate_json(&request.to_string()));
            } else {
                let warnings = validator::validate(&m, &roster, &config.rules);
                if warnings.is_empty() {
                    println!("No warnings for match {}", m.id);
                }
                for (quarter, list) in validator::group_by_quarter(&warnings) {
                    println!("Q{}", quarter);
                    for w in list {
                        println!("  ⚠ {}", w.message);
                    }
                }
            }
        }

        Commands::Rank { match_id, quarter, position, team_history } => {
            let m = load(&store, &match_id)?;
            let history = if team_history {
                store.list_matches_for_team(&m.team_id)?
            } else {
                Vec::new()
            };
            if cli.json {
                let request = json!({
                    "match": m, "roster": roster, "history": history,
                    "quarter": quarter, "position": position,
                });
                println!("{}", api::rank_json(&request.to_string()));
            } else {
                let position = m.formation.parse_position(&position)?;
                let candidates = recommender::rank(&m, &roster, &history, quarter, position);
                print_candidates(&candidates);
            }
        }

        Commands::Edit { match_id, edit } => {
            let m = load(&store, &match_id)?;
            let edit: MatchEdit = serde_json::from_str(&edit).context("parsing --edit")?;
            let next = m.apply(&edit)?;
            store.save_match(&next)?;
            if cli.json {
                println!("{}", serde_json::to_string(&next)?);
            } else {
                println!("✅ Match {} updated", next.id);
            }
        }
    }

    Ok(())
}

fn load(store: &FileStore, id: &str) -> Result<Match> {
    store.load_match(&MatchId::new(id)).with_context(|| format!("loading match {id}"))
}

fn names(roster: &[Player]) -> BTreeMap<&PlayerId, &str> {
    roster.iter().map(|p| (&p.id, p.name.as_str())).collect()
}

fn print_playtime(m: &Match, roster: &[Player]) {
    let ledger = playtime::compute(m, roster);
    let names = names(roster);
    let (own, opponent) = m.score();
    println!("Match {} vs {} ({}) {}-{}", m.id, m.opponent, m.date, own, opponent);
    println!("{:<20} {:>8} {:>8} {:>8} {:>8}", "Player", "Regular", "Sub", "Bench", "Total");
    for (id, entry) in &ledger {
        let name = names.get(id).copied().unwrap_or(id.as_str());
        println!(
            "{:<20} {:>8.2} {:>8.2} {:>8.2} {:>8.2}",
            name, entry.regular, entry.substitute, entry.bench, entry.total
        );
    }
}

fn print_season(report: &fairness::SeasonReport) {
    println!("{} matches", report.matches);
    println!("{:<20} {:>7} {:>8} {:>8} {:>7}", "Player", "Played", "Total", "Avg", "Keeper");
    for line in &report.players {
        println!(
            "{:<20} {:>7} {:>8.2} {:>8.2} {:>7}",
            line.player.name,
            line.playtime.matches_played,
            line.playtime.total,
            line.playtime.average_per_match,
            line.keeper_quarters
        );
    }
    if let Some(gini) = report.minutes_gini {
        println!("Minutes Gini: {:.3}", gini);
    }
}

fn print_keepers(counts: &KeeperCounts, roster: &[Player]) {
    let names = names(roster);
    if counts.is_empty() {
        println!("No keepers recorded");
    }
    for (id, n) in counts {
        let name = names.get(id).copied().unwrap_or(id.as_str());
        println!("{:<20} {:>3}", name, n);
    }
}

fn print_candidates(candidates: &[Candidate]) {
    for (rank, c) in candidates.iter().enumerate() {
        let basis = match c.basis {
            RankBasis::Keeper { this_match, all_time } => {
                format!("keeper {}x this match, {}x all-time", this_match, all_time)
            }
            RankBasis::MinutesSoFar { minutes } => format!("{:.2} min so far", minutes),
            RankBasis::Alphabetical => String::new(),
        };
        println!("{:>2}. {:<20} {}", rank + 1, c.player.name, basis);
    }
}
