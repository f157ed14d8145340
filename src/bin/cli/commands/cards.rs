use anyhow::{Context, Result};
use chrono::Utc;

use deckstudy_lib::flashcards::{algorithm, Card, DeckStore};

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run(app: &App, deck_name: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let cards: Vec<Card> = match deck_name {
        Some(name) => {
            let name = app.find_deck(name)?;
            app.decks
                .load_deck(&name)
                .with_context(|| format!("Failed to load deck '{}'", name))?
                .cards
        }
        None => app.decks.list_all_cards().context("Failed to list cards")?,
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No cards.");
                return Ok(());
            }

            let now = Utc::now();
            // Numbers are only meaningful (for edit/rm-card) within one deck
            let numbered = deck_name.is_some();
            let number_width = if numbered { cards.len().to_string().len().max(2) + 1 } else { 0 };
            let front_width = 30;
            let back_width = 24;
            let deck_width = cards
                .iter()
                .filter_map(|c| c.deck_name.as_ref().map(|n| n.chars().count()))
                .max()
                .unwrap_or(4)
                .clamp(4, 20);

            if numbered {
                print!("{:>nw$} ", "#", nw = number_width);
            }
            println!("{:<fw$} {:<bw$} {:<dw$} {:<9} {:>8} {:>5}",
                "Front", "Back", "Deck", "Status", "Interval", "Ease",
                fw = front_width, bw = back_width, dw = deck_width);
            if numbered {
                print!("{} ", "\u{2500}".repeat(number_width));
            }
            println!("{} {} {} {} {} {}",
                "\u{2500}".repeat(front_width),
                "\u{2500}".repeat(back_width),
                "\u{2500}".repeat(deck_width),
                "\u{2500}".repeat(9),
                "\u{2500}".repeat(8),
                "\u{2500}".repeat(5));

            for (i, card) in cards.iter().enumerate() {
                if numbered {
                    print!("{:>nw$} ", i + 1, nw = number_width);
                }
                let status = format!("{:<9}", terminal::card_status(card, now));
                let status = match status.trim_end() {
                    "due" => terminal::paint(&status, Color::GREEN, use_color),
                    "new" => terminal::paint(&status, Color::BLUE, use_color),
                    _ => terminal::paint(&status, Color::DIM, use_color),
                };
                let interval = card
                    .interval_days
                    .map(|d| algorithm::format_delay(chrono::Duration::days(d as i64)))
                    .unwrap_or_else(|| "-".to_string());
                let ease = card
                    .ease_factor
                    .map(|e| format!("{:.2}", e))
                    .unwrap_or_else(|| "-".to_string());

                println!("{:<fw$} {:<bw$} {:<dw$} {} {:>8} {:>5}",
                    terminal::truncate(&card.front, front_width),
                    terminal::truncate(&card.back, back_width),
                    terminal::truncate(card.deck_name.as_deref().unwrap_or(""), deck_width),
                    status, interval, ease,
                    fw = front_width, bw = back_width, dw = deck_width);
            }

            println!("\n{} cards total", cards.len());
        }
    }

    Ok(())
}
