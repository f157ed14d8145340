use anyhow::{Context, Result};
use chrono::Utc;

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let now = Utc::now();
    let names = app.decks.list_decks().context("Failed to list decks")?;

    let mut summaries = Vec::new();
    for name in &names {
        let summary = app
            .decks
            .deck_summary(name, now)
            .with_context(|| format!("Failed to read deck '{}'", name))?;
        summaries.push(summary);
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        OutputFormat::Plain => {
            if summaries.is_empty() {
                println!("No decks in {}.", app.data_dir.display());
                println!("Create one with `deckstudy-cli new-deck <name>` or `import <file>`.");
                return Ok(());
            }

            let name_width = summaries.iter().map(|s| s.name.chars().count()).max().unwrap_or(4).clamp(4, 40);

            println!("{:<nw$} {:>6} {:>6} {:>6}", "Deck", "Cards", "New", "Due", nw = name_width);
            println!("{} {} {} {}",
                "\u{2500}".repeat(name_width),
                "\u{2500}".repeat(6),
                "\u{2500}".repeat(6),
                "\u{2500}".repeat(6));

            for summary in &summaries {
                let due = format!("{:>6}", summary.due_cards);
                let due = if summary.due_cards > 0 {
                    paint(&due, Color::GREEN, use_color)
                } else {
                    due
                };
                println!("{:<nw$} {:>6} {:>6} {}",
                    summary.name, summary.total_cards, summary.new_cards, due,
                    nw = name_width);
            }

            println!("\n{} decks total", summaries.len());
        }
    }

    Ok(())
}
