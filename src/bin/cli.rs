use std::io::BufRead;
use std::sync::Arc;

use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use daynote_store::analytics::{self, DEFAULT_RECENT_DAYS};
use daynote_store::autosave::{AutoSaveConfig, AutoSaveController};
use daynote_store::{engine, search, DateKey, NoteEnumeration, NoteReader, NoteStore, NoteWriter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, env = "DAYNOTE_DATA_DIR", default_value = "data")]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Print the note for a date (YYYY-MM-DD, default today).
    Get { date: Option<String> },
    /// Replace the note for a date.
    Set { date: String, text: String },
    /// Delete the note for a date.
    Del { date: String },
    /// Feed stdin lines to the editor as successive edits, auto-saving as they come.
    Edit {
        date: String,
        #[arg(long, default_value_t = 1000)]
        debounce_ms: u64,
    },
    /// Search all notes.
    Search { query: String },
    /// Show totals over all notes.
    Stats,
    /// List notes from the last N days.
    Recent {
        #[arg(default_value_t = DEFAULT_RECENT_DAYS)]
        days: u32,
    },
    /// List the days of a month that hold a note.
    Month { year: Option<i32>, month: Option<u32> },
}

fn resolve_date(date: Option<&str>) -> daynote_store::Result<DateKey> {
    match date {
        Some(d) => DateKey::parse_date(d),
        None => DateKey::from_date(&Local::now()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let store = engine::open(&cli.data_dir)?;

    match cli.command {
        Commands::Get { date } => {
            let key = resolve_date(date.as_deref())?;
            match store.get(&key).await {
                Some(body) => println!("{}", body),
                None => println!("(no note for {})", key),
            }
        }
        Commands::Set { date, text } => {
            let key = resolve_date(Some(&date))?;
            store.set(&key, &text).await?;
            println!("OK");
        }
        Commands::Del { date } => {
            let key = resolve_date(Some(&date))?;
            store.delete(&key).await?;
            println!("OK");
        }
        Commands::Edit { date, debounce_ms } => {
            let key = resolve_date(Some(&date))?;
            let config = AutoSaveConfig::with_delay(std::time::Duration::from_millis(debounce_ms));
            let autosave = AutoSaveController::new(store.clone() as Arc<dyn NoteStore>, config);

            let mut body = store.get(&key).await.unwrap_or_default();
            let lines = tokio::task::spawn_blocking(|| {
                std::io::stdin().lock().lines().collect::<std::io::Result<Vec<String>>>()
            })
            .await??;
            for line in lines {
                if !body.is_empty() {
                    body.push('\n');
                }
                body.push_str(&line);
                autosave.on_edit(key, body.clone());
            }
            autosave.close_session(&key).await?;
            println!("Saved {} chars for {}", body.chars().count(), key);
        }
        Commands::Search { query } => {
            let results = search::search(&query, &store.enumerate().await);
            if results.is_empty() {
                println!("No notes found for {:?}", query);
            }
            for result in results {
                let rendered: String = result
                    .segments()
                    .into_iter()
                    .map(|(text, hit)| if hit { format!("[{}]", text) } else { text })
                    .collect();
                println!("{}  ({} chars)\n    {}", result.key, result.source_char_count, rendered);
            }
        }
        Commands::Stats => {
            let summary = analytics::summarize(&store.enumerate().await);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Recent { days } => {
            let today = Local::now().date_naive();
            let notes = analytics::recent(&store.enumerate().await, today, days);
            println!("{}", serde_json::to_string_pretty(&notes)?);
        }
        Commands::Month { year, month } => {
            let today = Local::now().date_naive();
            let (year, month) = (year.unwrap_or(today.year()), month.unwrap_or(today.month()));
            let days = analytics::noted_days(&store.enumerate().await, year, month);
            println!("{}", serde_json::to_string(&days)?);
        }
    }

    Ok(())
}
