use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use echoprep::config::Config;
use echoprep::profile::{Difficulty, MissionDraft, PlayerProgress};
use echoprep::progression::badge::BADGE_CATALOG;
use echoprep::progression::ledger::{NotificationSink, NullSink, ProgressionLedger, UnlockEvent};
use echoprep::session::quiz;
use echoprep::store::json_store::JsonStore;

#[derive(Parser)]
#[command(
    name = "echoprep",
    version,
    about = "Ultrasound physics exam prep trainer with XP progression"
)]
struct Cli {
    #[arg(short, long, help = "Player profile to use (defaults to config)")]
    player: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show rank, XP progress, currency, streak, and badges
    Status,
    /// List the badge catalog with unlock state
    Badges,
    /// Record a completed mission
    Record {
        #[arg(long, help = "Net session score (can be negative)")]
        score: i64,
        #[arg(long, help = "Correct answers in the session")]
        correct: u32,
        #[arg(long, help = "Total answers in the session")]
        total: u32,
        #[arg(long, default_value_t = 0, help = "Longest run of correct answers")]
        max_streak: u32,
        #[arg(long, help = "easy, medium, or hard (defaults to config)")]
        difficulty: Option<String>,
    },
    /// Mark a course topic complete
    Topic { topic_id: String },
    /// Spend currency from the profile balance
    Spend { amount: u64 },
}

/// Prints unlock toasts to stdout.
struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&mut self, event: &UnlockEvent) {
        match event {
            UnlockEvent::LevelUp { level, title } => {
                println!("Level up! You are now level {level} — {title}");
            }
            UnlockEvent::BadgeUnlocked(badge) => {
                println!("Badge unlocked: {} — {}", badge.name, badge.description);
            }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let player = cli.player.unwrap_or_else(|| config.player.clone());

    let store = JsonStore::new()?;
    let sink: Box<dyn NotificationSink> = if config.notifications {
        Box::new(ConsoleSink)
    } else {
        Box::new(NullSink)
    };
    let mut ledger = ProgressionLedger::open(player, Box::new(store), sink);

    match cli.command {
        Command::Status => print_status(&ledger),
        Command::Badges => print_badges(ledger.progress()),
        Command::Record {
            score,
            correct,
            total,
            max_streak,
            difficulty,
        } => {
            if correct > total {
                bail!("--correct cannot exceed --total");
            }
            let difficulty = match difficulty {
                Some(key) => match Difficulty::from_key(&key) {
                    Some(d) => d,
                    None => bail!("unknown difficulty: {key}"),
                },
                None => config.difficulty,
            };

            let draft = MissionDraft {
                score,
                difficulty,
                efficiency: quiz::efficiency(correct, total),
                max_streak,
            };

            ledger.update_daily_streak();
            ledger.apply_experience(score.max(0), "mission complete");
            ledger.record_mission(draft);
            print_status(&ledger);
        }
        Command::Topic { topic_id } => {
            ledger.complete_topic(&topic_id);
            println!(
                "Topics completed: {}",
                ledger.progress().completed_topic_ids.len()
            );
        }
        Command::Spend { amount } => {
            if ledger.spend_currency(amount) {
                println!("Spent {amount}. Balance: {}", ledger.progress().currency);
            } else {
                println!(
                    "Insufficient funds: balance {} < {amount}",
                    ledger.progress().currency
                );
            }
        }
    }

    Ok(())
}

fn print_status(ledger: &ProgressionLedger) {
    let progress = ledger.progress();
    let level = ledger.level();

    println!(
        "Level {} — {} ({:.0}% to level {})",
        level.current_level.level, level.current_level.title, level.progress, level.next_level.level
    );
    println!(
        "XP {} | Currency {} | Daily streak {}",
        progress.career_score, progress.currency, progress.current_streak_days
    );
    println!(
        "Missions {} | Topics {} | Badges {}/{}",
        progress.mission_history.len(),
        progress.completed_topic_ids.len(),
        progress.badges.len(),
        BADGE_CATALOG.len()
    );
}

fn print_badges(progress: &PlayerProgress) {
    for def in BADGE_CATALOG {
        let state = match progress.badges.iter().find(|b| b.id == def.id) {
            Some(badge) => match badge.unlocked_at {
                Some(at) => format!("unlocked {}", at.format("%Y-%m-%d")),
                None => "unlocked".to_string(),
            },
            None => "locked".to_string(),
        };
        println!("[{state}] {} — {}", def.name, def.description);
    }
}
