use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use frontline_stats::api::LiveStatsClient;
use frontline_stats::dashboard::{
    build_squad_view, build_view_state, Badges, DashboardPoller, DashboardState, FactionView,
    MemberRow, ViewControls, ViewMode,
};
use frontline_stats::models::AggregatedSnapshot;

const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;
const NAME_COLUMN_WIDTH: usize = 24;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging. Warn by default so poller chatter stays off the
    // rendered scoreboard; failures still surface through the banner.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard=warn,frontline_stats=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse arguments
    let args: Vec<String> = env::args().collect();
    let proxy_url =
        parse_flag(&args, "--url", "-u").unwrap_or_else(|| DEFAULT_PROXY_URL.to_string());

    let mut controls = ViewControls::default();
    if args.iter().any(|a| a == "--squads" || a == "-s") {
        controls.view_mode = ViewMode::Tactical;
    }

    dotenvy::dotenv().ok();
    let poll_interval_secs = parse_flag(&args, "--interval", "-i")
        .or_else(|| env::var("POLL_INTERVAL_SECS").ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

    info!("Polling {} every {}s", proxy_url, poll_interval_secs);

    let client = LiveStatsClient::new(&proxy_url)?;
    let poller = Arc::new(DashboardPoller::new(client, poll_interval_secs));
    let state = poller.state();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller_handle = {
        let poller = Arc::clone(&poller);
        tokio::spawn(async move { poller.run(shutdown_rx).await })
    };

    // Redraw on the poll cadence, half a second behind the poller so a
    // fresh snapshot is usually in place before each frame.
    time::sleep(Duration::from_millis(500)).await;
    let mut redraw = time::interval(Duration::from_secs(poll_interval_secs));
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Enter forces a fetch outside the poll cadence.
    let mut input_lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = redraw.tick() => {
                let state = state.read().await;
                render(&state, &controls);
            }
            line = input_lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(_)) => {
                        poller.refresh_now().await;
                        let state = state.read().await;
                        render(&state, &controls);
                    }
                    _ => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                info!("Shutting down");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = poller_handle.await;

    Ok(())
}

/// Parse a `--flag value` argument, with its short form
fn parse_flag(args: &[String], long: &str, short: &str) -> Option<String> {
    for (i, arg) in args.iter().enumerate() {
        if arg == long || arg == short {
            if let Some(value) = args.get(i + 1) {
                return Some(value.clone());
            }
        }
    }
    None
}

fn render(state: &DashboardState, controls: &ViewControls) {
    // Clear screen between frames
    print!("\x1B[2J\x1B[H");

    if let Some(error) = &state.error {
        println!("! {}", error);
        if state.snapshot.is_some() {
            let stale_since = state
                .last_updated
                .map(|t| t.format("%H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "an earlier poll".to_string());
            println!("  Showing last data from {}", stale_since);
        }
        println!("  Press Enter to retry now");
        println!();
    }

    let Some(snapshot) = &state.snapshot else {
        if state.error.is_none() {
            println!("Waiting for first snapshot...");
        }
        return;
    };

    render_header(snapshot);

    // Map/score/time above still render; only the table is replaced
    if snapshot.stats.is_empty() {
        println!("No players on the server right now.");
        return;
    }

    match controls.view_mode {
        ViewMode::Tactical => render_squads(snapshot),
        ViewMode::Flat => render_table(snapshot, controls),
    }
}

fn render_header(snapshot: &AggregatedSnapshot) {
    let game = &snapshot.gamestate;
    println!(
        "{} | Allies {} : {} Axis | {} remaining | {} vs {} players",
        game.current_map.pretty_name(),
        game.allied_score,
        game.axis_score,
        game.time_remaining,
        game.num_allied_players,
        game.num_axis_players,
    );
    println!(
        "Updated {}",
        snapshot.meta.timestamp.format("%H:%M:%S UTC")
    );
    println!();
}

fn render_table(snapshot: &AggregatedSnapshot, controls: &ViewControls) {
    let view = build_view_state(snapshot, controls);

    println!(
        "Allies {} kills / {} combat / {} support   Axis {} kills / {} combat / {} support",
        view.allies.kills,
        view.allies.combat,
        view.allies.support,
        view.axis.kills,
        view.axis.combat,
        view.axis.support,
    );
    println!();

    println!(
        "{:<24} {:<10} {:>5} {:>5} {:>6} {:>6} {:>6} {:>6} {:>6} {:>8}  {}",
        "Player", "Team", "K", "D", "Combat", "Off", "Def", "Sup", "K/D", "Time", "Badges"
    );

    for row in &view.rows {
        println!(
            "{:<24} {:<10} {:>5} {:>5} {:>6} {:>6} {:>6} {:>6} {:>6.2} {:>8}  {}",
            truncate(&row.stat.player),
            row.team.as_str(),
            row.stat.kills,
            row.stat.deaths,
            row.stat.combat,
            row.stat.offense,
            row.stat.defense,
            row.stat.support,
            row.stat.kill_death_ratio,
            format_time(row.stat.time_seconds),
            badge_markers(&row.badges),
        );
    }
}

fn render_squads(snapshot: &AggregatedSnapshot) {
    let view = build_squad_view(snapshot);
    render_faction("ALLIES", &view.allies);
    println!();
    render_faction("AXIS", &view.axis);
}

fn render_faction(label: &str, faction: &FactionView) {
    println!("=== {} ===", label);

    if let Some(commander) = &faction.commander {
        println!("  Commander");
        println!("    {}", member_line(commander));
    }

    for squad in &faction.squads {
        println!("  Squad {} ({})", squad.name, squad.squad_type.as_str());
        for member in &squad.members {
            println!("    {}", member_line(member));
        }
    }

    if !faction.unassigned.is_empty() {
        println!("  Unassigned");
        for member in &faction.unassigned {
            println!("    {}", member_line(member));
        }
    }
}

fn member_line(row: &MemberRow) -> String {
    let role = row.member.role.as_deref().unwrap_or("-");
    match &row.stat {
        Some(stat) => format!(
            "{:<24} {:<14} {:>4}K {:>4}D {:>6} combat",
            truncate(&row.member.name),
            role,
            stat.kills,
            stat.deaths,
            stat.combat,
        ),
        None => format!(
            "{:<24} {:<14}   no stats yet",
            truncate(&row.member.name),
            role,
        ),
    }
}

fn badge_markers(badges: &Badges) -> String {
    let mut markers = String::new();
    if badges.top_killer {
        markers.push_str("[K]");
    }
    if badges.top_support {
        markers.push_str("[S]");
    }
    if badges.longest_life {
        markers.push_str("[L]");
    }
    markers
}

fn truncate(name: &str) -> String {
    name.chars().take(NAME_COLUMN_WIDTH).collect()
}

fn format_time(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h{:02}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
