mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "deckstudy-cli", about = "Study flashcard decks from the terminal", version)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding decks and stats (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List decks with new and due counts
    Decks,

    /// Create an empty deck
    NewDeck {
        /// Deck name
        name: String,
    },

    /// Add a card to a deck
    Add {
        /// Deck name (case-insensitive prefix match)
        deck: String,
        /// Question side
        front: String,
        /// Answer side
        back: String,
    },

    /// Change the text of a card, keeping its schedule
    Edit {
        /// Deck name (case-insensitive prefix match)
        deck: String,
        /// Card number as shown by `cards <deck>`
        number: usize,
        /// New question side
        #[arg(long)]
        front: Option<String>,
        /// New answer side
        #[arg(long)]
        back: Option<String>,
    },

    /// Remove a card from a deck
    RmCard {
        /// Deck name (case-insensitive prefix match)
        deck: String,
        /// Card number as shown by `cards <deck>`
        number: usize,
    },

    /// Import a JSON deck file
    Import {
        /// Path to the deck file; its file name becomes the deck name
        path: PathBuf,
    },

    /// Delete a deck and all its cards
    Delete {
        /// Deck name
        deck: String,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Browse cards of one deck, or of all decks
    Cards {
        /// Deck name (all decks when omitted)
        deck: Option<String>,
    },

    /// Study a deck
    Study {
        /// Deck name (case-insensitive prefix match)
        deck: String,
        /// New cards to introduce this session
        #[arg(long)]
        max_new: Option<usize>,
    },

    /// Show today's study totals
    Stats,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let app = app::App::new(cli.config.as_deref(), cli.data_dir)?;

    match cli.command {
        Command::Decks => {
            commands::decks::run(&app, &cli.format, use_color)?;
        }
        Command::NewDeck { name } => {
            commands::deck::run_new(&app, &name, &cli.format)?;
        }
        Command::Add { deck, front, back } => {
            commands::deck::run_add(&app, &deck, front, back, &cli.format)?;
        }
        Command::Edit { deck, number, front, back } => {
            commands::deck::run_edit(&app, &deck, number, front, back, &cli.format)?;
        }
        Command::RmCard { deck, number } => {
            commands::deck::run_remove_card(&app, &deck, number, &cli.format)?;
        }
        Command::Import { path } => {
            commands::deck::run_import(&app, &path, &cli.format)?;
        }
        Command::Delete { deck, yes } => {
            commands::deck::run_delete(&app, &deck, yes)?;
        }
        Command::Cards { deck } => {
            commands::cards::run(&app, deck.as_deref(), &cli.format, use_color)?;
        }
        Command::Study { deck, max_new } => {
            commands::study::run(&app, &deck, max_new, use_color)?;
        }
        Command::Stats => {
            commands::stats::run(&app, &cli.format)?;
        }
    }

    Ok(())
}
