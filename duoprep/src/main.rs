//! duoprep - Two-participant daily practice tracker CLI
//!
//! Fetches snapshots from the remote row store, runs the stats engine, and
//! renders the head-to-head dashboard in the terminal.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use duoprep_core::notify::{latest_unseen, mark_seen, FileMarkerStore};
use duoprep_core::stats::{
    bucket_by_time_of_day, compute_metrics, daily_average, head_to_head,
    resolve_consistency_and_streak, select_motivational_message, BucketGranularity,
    ConsistencyResult, Metrics, TimeOfDayStats,
};
use duoprep_core::{
    ActivityEvent, Config, CumulativePair, DailyRollup, DayEntry, Participant, ProgressPoint,
    StoreClient,
};

#[derive(Parser, Debug)]
#[command(name = "duoprep")]
#[command(about = "Two-participant daily practice tracker")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the head-to-head dashboard
    Show {
        /// Export the computed stats as JSON instead of the terminal view
        #[arg(long)]
        json: bool,
    },
    /// Log a practice session
    Log {
        /// Participant slot (user1 or user2)
        #[arg(long)]
        user: Participant,

        /// Questions attempted
        #[arg(long)]
        completed: i64,

        /// Questions answered correctly
        #[arg(long)]
        correct: i64,

        /// When the practice happened (RFC 3339, default: now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        /// Access code for the slot, if one is configured
        #[arg(long)]
        code: Option<String>,
    },
    /// Poll the store and announce new activity
    Watch,
    /// Check store connectivity
    Health,
}

/// Everything one dashboard render needs, fetched in a single pass.
struct Snapshot {
    cumulative: CumulativePair,
    rollups: Vec<DailyRollup>,
    events: Vec<ActivityEvent>,
}

/// How many recent events feed the time-of-day views.
const EVENT_FETCH_LIMIT: usize = 500;

async fn fetch_snapshot(client: &StoreClient) -> Result<Snapshot> {
    let cumulative = client
        .fetch_cumulative()
        .await
        .context("failed to fetch cumulative stats")?;
    let rollups = client
        .fetch_daily_rollups()
        .await
        .context("failed to fetch daily rollups")?;
    let events = client
        .fetch_events(EVENT_FETCH_LIMIT)
        .await
        .context("failed to fetch activity events")?;
    Ok(Snapshot {
        cumulative,
        rollups,
        events,
    })
}

/// Per-participant derived figures.
struct ParticipantView {
    name: String,
    completed: i64,
    correct: i64,
    metrics: Metrics,
    consistency: ConsistencyResult,
    daily_average: i64,
}

struct Dashboard {
    one: ParticipantView,
    two: ParticipantView,
    leader: Participant,
    hourly: TimeOfDayStats,
    intervals: TimeOfDayStats,
    banner: String,
}

fn participant_view(
    config: &Config,
    snapshot: &Snapshot,
    participant: Participant,
) -> ParticipantView {
    let totals = snapshot.cumulative.totals_for(participant);
    let entries: Vec<DayEntry> = snapshot
        .rollups
        .iter()
        .map(|r| r.entry_for(participant))
        .collect();

    let name = if totals.name.is_empty() {
        config.display_name(participant)
    } else {
        totals.name.clone()
    };

    ParticipantView {
        name,
        completed: totals.completed,
        correct: totals.correct,
        metrics: compute_metrics(totals.completed, totals.correct),
        consistency: resolve_consistency_and_streak(&entries),
        daily_average: daily_average(&entries),
    }
}

fn build_dashboard(config: &Config, snapshot: &Snapshot) -> Dashboard {
    let one = participant_view(config, snapshot, Participant::One);
    let two = participant_view(config, snapshot, Participant::Two);
    let leader = head_to_head(&one.metrics, &two.metrics);

    // The race banner runs on today's progress toward the shared target;
    // yesterday's rollup is the "previous" snapshot for overtake detection.
    let today = duoprep_core::day::today_local();
    let progress = |participant: Participant, name: &str| {
        let current = snapshot
            .rollups
            .iter()
            .find(|r| r.date == today)
            .map(|r| r.entry_for(participant).completed)
            .unwrap_or(0);
        let previous = snapshot
            .rollups
            .iter()
            .filter(|r| r.date < today)
            .last()
            .map(|r| r.entry_for(participant).completed);
        ProgressPoint {
            name: name.to_string(),
            current,
            previous,
        }
    };
    let banner = select_motivational_message(
        &progress(Participant::One, &one.name),
        &progress(Participant::Two, &two.name),
        config.tracker.shared_target,
    );

    Dashboard {
        hourly: bucket_by_time_of_day(&snapshot.events, BucketGranularity::Hourly),
        intervals: bucket_by_time_of_day(&snapshot.events, BucketGranularity::ThreeHour),
        one,
        two,
        leader,
        banner,
    }
}

fn print_dashboard(dash: &Dashboard) {
    println!();
    println!("╭{}╮", "─".repeat(60));
    println!("│{:^60}│", "DUOPREP: HEAD TO HEAD");
    println!("╰{}╯", "─".repeat(60));
    println!();

    if dash.one.completed == 0 && dash.two.completed == 0 {
        println!("  No activity logged yet.");
        println!();
        return;
    }

    println!("LEADERBOARD");
    for view in [&dash.one, &dash.two] {
        println!(
            "   {:<12} {:>6} done   {:>6.2}% accuracy   {:>6} points",
            view.name, view.completed, view.metrics.accuracy, view.metrics.points
        );
    }
    let leader_name = match dash.leader {
        Participant::One => &dash.one.name,
        Participant::Two => &dash.two.name,
    };
    println!("   In front: {}", leader_name);
    println!();

    println!("CONSISTENCY");
    for view in [&dash.one, &dash.two] {
        println!(
            "   {:<12} {:>5.1}% consistent   streak {}   best {}   avg {}/day",
            view.name,
            view.consistency.consistency,
            view.consistency.streak,
            view.consistency.longest_streak,
            view.daily_average
        );
    }
    println!();

    println!("TIME OF DAY (3-hour intervals)");
    for bucket in dash.intervals.buckets.iter().filter(|b| b.total_questions > 0) {
        println!(
            "   {:<10} {:>5} questions   {:>5.1}% accuracy   {} sessions",
            bucket.label, bucket.total_questions, bucket.accuracy, bucket.session_count
        );
    }
    if let Some(peak) = &dash.intervals.peak {
        println!("   Sharpest window: {} ({:.1}%)", peak.label, peak.accuracy);
    }
    if let Some(low) = &dash.intervals.low {
        println!("   Weakest window:  {} ({:.1}%)", low.label, low.accuracy);
    }
    println!();

    println!("  {}", dash.banner);
    println!();
}

fn print_json(dash: &Dashboard) -> Result<()> {
    let leader = match dash.leader {
        Participant::One => &dash.one.name,
        Participant::Two => &dash.two.name,
    };
    let participant = |view: &ParticipantView| {
        serde_json::json!({
            "name": view.name,
            "completed": view.completed,
            "correct": view.correct,
            "metrics": view.metrics,
            "consistency": view.consistency,
            "daily_average": view.daily_average,
        })
    };
    let value = serde_json::json!({
        "user1": participant(&dash.one),
        "user2": participant(&dash.two),
        "leader": leader,
        "hourly": dash.hourly,
        "intervals": dash.intervals,
        "banner": dash.banner,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn run_show(config: &Config, client: &StoreClient, json: bool) -> Result<()> {
    let snapshot = fetch_snapshot(client).await?;
    let dash = build_dashboard(config, &snapshot);
    if json {
        print_json(&dash)?;
    } else {
        print_dashboard(&dash);
    }
    Ok(())
}

async fn run_log(
    config: &Config,
    client: &StoreClient,
    user: Participant,
    completed: i64,
    correct: i64,
    at: Option<DateTime<Utc>>,
    code: Option<String>,
) -> Result<()> {
    if !config
        .participants
        .verify_access_code(user, code.as_deref().unwrap_or(""))
    {
        anyhow::bail!("access code for {} is missing or wrong", user);
    }

    let occurred_at = at.unwrap_or_else(Utc::now);
    client
        .submit_activity_with_retry(user, completed, correct, occurred_at)
        .await
        .context("failed to submit activity")?;

    // Re-fetch so the line below reflects what the store accepted, not what
    // we think we wrote.
    let snapshot = fetch_snapshot(client).await?;
    let dash = build_dashboard(config, &snapshot);
    let name = match user {
        Participant::One => &dash.one.name,
        Participant::Two => &dash.two.name,
    };
    println!("Logged {} questions ({} correct) for {}.", completed, correct, name);
    println!("  {}", dash.banner);
    Ok(())
}

async fn run_watch(config: &Config, client: &StoreClient) -> Result<()> {
    let mut markers =
        FileMarkerStore::open(Config::marker_path()).context("failed to open marker store")?;
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(
        config.tracker.poll_interval_secs.max(1),
    ));

    println!(
        "Watching for new activity every {}s (ctrl-c to stop)...",
        config.tracker.poll_interval_secs
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                println!("Stopped.");
                return Ok(());
            }
        }

        let events = match client.fetch_events(EVENT_FETCH_LIMIT).await {
            Ok(events) => events,
            Err(e) => {
                // A failed poll is not fatal; the next tick retries.
                tracing::warn!(error = %e, "Poll failed");
                continue;
            }
        };

        if let Some(event) = latest_unseen(&events, &markers) {
            let name = config.display_name(event.participant);
            println!(
                "● {} logged {} questions ({} correct) at {}",
                name,
                event.completed,
                event.correct,
                event.occurred_at.format("%H:%M")
            );
            let id = event.id;
            mark_seen(&mut markers, id).context("failed to persist marker")?;
        }
    }
}

async fn run_health(client: &StoreClient) -> Result<()> {
    if client.health_check().await? {
        println!("Store reachable.");
        Ok(())
    } else {
        anyhow::bail!("store is not reachable")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = duoprep_core::logging::init(&config.logging).ok();

    let client = StoreClient::new(config.store.clone()).context("failed to create store client")?;

    match args.command {
        Command::Show { json } => run_show(&config, &client, json).await,
        Command::Log {
            user,
            completed,
            correct,
            at,
            code,
        } => run_log(&config, &client, user, completed, correct, at, code).await,
        Command::Watch => run_watch(&config, &client).await,
        Command::Health => run_health(&client).await,
    }
}
