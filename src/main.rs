use analemma_chronos::location::LOCATIONS;
use analemma_chronos::noon;
use analemma_chronos::schedule::{self, CelestialBody, HOME_TZ};
use chrono::{Datelike, NaiveDate, Utc};
use clap::Parser;
use std::path::PathBuf;

/// Analemma Chronos - solar and lunar capture timetables
///
/// Estimates local solar noon for each site in the fixed capture registry
/// and builds monthly capture schedules around it.
///
/// Examples:
///   analemma
///   analemma --json
///   analemma --schedule sun --month 2026-02
///   analemma --schedule moon --data-dir data
///   analemma --next
#[derive(Parser)]
#[command(name = "analemma", version, about, long_about = None)]
struct Cli {
    /// Emit the noon estimates as JSON instead of text lines.
    #[arg(long)]
    json: bool,

    /// Generate monthly schedule files for a body ("sun" or "moon").
    #[arg(long, value_parser = parse_body)]
    schedule: Option<CelestialBody>,

    /// Month to generate or query (YYYY-MM). Defaults to the current month.
    #[arg(long, short = 'm')]
    month: Option<String>,

    /// Root directory for schedule data files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Show the capture pending in the current hour, if any.
    #[arg(long)]
    next: bool,
}

fn parse_body(s: &str) -> Result<CelestialBody, String> {
    match s.to_lowercase().as_str() {
        "sun" | "solar" => Ok(CelestialBody::Sun),
        "moon" | "lunar" => Ok(CelestialBody::Moon),
        _ => Err(format!("Unknown body '{}'. Use 'sun' or 'moon'.", s)),
    }
}

fn main() {
    let cli = Cli::parse();

    let (year, month) = parse_month(cli.month.as_deref());

    // ── Schedule generation ─────────────────────────────────────

    if let Some(body) = cli.schedule {
        generate_schedules(&cli, body, year, month);
        return;
    }

    // ── Pending capture query ───────────────────────────────────

    if cli.next {
        show_next(&cli, year, month);
        return;
    }

    // ── Noon estimates ──────────────────────────────────────────

    if cli.json {
        let reports: Vec<_> = LOCATIONS.iter().map(noon::report).collect();
        println!("{}", serde_json::to_string_pretty(&reports).unwrap());
        return;
    }

    for loc in &LOCATIONS {
        println!("{}", noon::noon_line(loc));
    }
}

fn parse_month(arg: Option<&str>) -> (i32, u32) {
    match arg {
        Some(m) => {
            let date = NaiveDate::parse_from_str(&format!("{}-01", m), "%Y-%m-%d").unwrap_or_else(|e| {
                eprintln!("Error: Invalid month '{}': {}", m, e);
                std::process::exit(1);
            });
            (date.year(), date.month())
        }
        None => {
            let today = Utc::now().with_timezone(&HOME_TZ).date_naive();
            (today.year(), today.month())
        }
    }
}

fn generate_schedules(cli: &Cli, body: CelestialBody, year: i32, month: u32) {
    eprintln!("  Generating {} schedules for {:04}-{:02}...", body, year, month);
    for loc in &LOCATIONS {
        let entries = schedule::month_schedule(loc, body, year, month);
        let path = schedule::save_month(&cli.data_dir, loc.id, body, year, month, &entries)
            .unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });
        eprintln!("  \u{2705} {} ({} entries)", path.display(), entries.len());
    }
}

fn show_next(cli: &Cli, year: i32, month: u32) {
    let entries = schedule::load_all(&cli.data_dir, year, month).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let now_home = Utc::now().with_timezone(&HOME_TZ).naive_local();
    match schedule::find_capture_this_hour(&entries, now_home) {
        Some(pending) => {
            println!(
                "{} capture at {}: {} local ({} home), in {}s",
                pending.entry.body,
                pending.entry.location_id,
                pending.entry.times.loc_time,
                pending.entry.times.home_time,
                pending.wait_seconds
            );
        }
        None => println!("No capture pending this hour."),
    }
}
