use std::path::Path;

use anyhow::{bail, Context, Result};

use deckstudy_lib::flashcards::DeckStore;

use crate::app::App;
use crate::OutputFormat;

pub fn run_new(app: &App, name: &str, format: &OutputFormat) -> Result<()> {
    let deck = app
        .decks
        .create_deck(name)
        .with_context(|| format!("Failed to create deck '{}'", name))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&deck)?);
        }
        OutputFormat::Plain => {
            println!("Created deck \"{}\"", deck.name);
        }
    }

    Ok(())
}

pub fn run_add(app: &App, deck_name: &str, front: String, back: String, format: &OutputFormat) -> Result<()> {
    let deck_name = app.find_deck(deck_name)?;
    let card = app
        .decks
        .add_card(&deck_name, front, back)
        .with_context(|| format!("Failed to add card to '{}'", deck_name))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        OutputFormat::Plain => {
            println!("Added to \"{}\": {}", deck_name, card.front);
        }
    }

    Ok(())
}

/// Edit card `number` (1-based, as listed by `cards <deck>`)
pub fn run_edit(
    app: &App,
    deck_name: &str,
    number: usize,
    front: Option<String>,
    back: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    if front.is_none() && back.is_none() {
        bail!("Nothing to change: pass --front and/or --back");
    }
    let deck_name = app.find_deck(deck_name)?;
    let index = card_index(number)?;

    let deck = app
        .decks
        .load_deck(&deck_name)
        .with_context(|| format!("Failed to load deck '{}'", deck_name))?;
    let Some(current) = deck.cards.get(index) else {
        bail!("Deck \"{}\" has no card #{}", deck_name, number);
    };
    let front = front.unwrap_or_else(|| current.front.clone());
    let back = back.unwrap_or_else(|| current.back.clone());

    let card = app
        .decks
        .update_card(&deck_name, index, front, back)
        .with_context(|| format!("Failed to edit card #{} in '{}'", number, deck_name))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        OutputFormat::Plain => {
            println!("Updated #{} in \"{}\": {} / {}", number, deck_name, card.front, card.back);
        }
    }

    Ok(())
}

pub fn run_remove_card(app: &App, deck_name: &str, number: usize, format: &OutputFormat) -> Result<()> {
    let deck_name = app.find_deck(deck_name)?;
    let card = app
        .decks
        .remove_card(&deck_name, card_index(number)?)
        .with_context(|| format!("Failed to remove card #{} from '{}'", number, deck_name))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        OutputFormat::Plain => {
            println!("Removed from \"{}\": {}", deck_name, card.front);
        }
    }

    Ok(())
}

fn card_index(number: usize) -> Result<usize> {
    match number.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("Card numbers start at 1"),
    }
}

pub fn run_import(app: &App, path: &Path, format: &OutputFormat) -> Result<()> {
    let name = app
        .decks
        .import_deck(path)
        .with_context(|| format!("Failed to import {}", path.display()))?;
    let summary = app.decks.deck_summary(&name, chrono::Utc::now())?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Plain => {
            println!("Imported \"{}\" ({} cards)", summary.name, summary.total_cards);
        }
    }

    Ok(())
}

pub fn run_delete(app: &App, deck_name: &str, confirmed: bool) -> Result<()> {
    let deck_name = app.find_deck(deck_name)?;
    if !confirmed {
        bail!("Refusing to delete \"{}\" without --yes", deck_name);
    }

    app.decks
        .delete_deck(&deck_name)
        .with_context(|| format!("Failed to delete deck '{}'", deck_name))?;
    println!("Deleted deck \"{}\"", deck_name);
    Ok(())
}
