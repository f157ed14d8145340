use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::Utc;

use deckstudy_lib::flashcards::algorithm::{format_delay, preview_delays};
use deckstudy_lib::flashcards::{Grade, SessionError, StudySession};

use crate::app::App;
use crate::render::terminal::{self, paint, Color};

pub fn run(app: &App, deck_name: &str, max_new: Option<usize>, use_color: bool) -> Result<()> {
    let deck_name = app.find_deck(deck_name)?;
    let mut session = StudySession::open(&app.decks, &deck_name, Utc::now(), app.max_new(max_new))
        .with_context(|| format!("Failed to start studying '{}'", deck_name))?
        .with_stats(&app.stats);

    let stdin = io::stdin();
    let mut input = stdin.lock();

    if session.is_finished() {
        println!("Nothing to study in \"{}\" right now.", deck_name);
        return Ok(());
    }

    'cards: while let Some(card) = session.current_card().cloned() {
        let remaining = session.remaining();
        println!();
        println!("{}", paint(
            &format!("{}  new {} \u{b7} review {} \u{b7} learning {}",
                deck_name, remaining.new, remaining.review, remaining.learning),
            Color::GRAY,
            use_color,
        ));
        println!("{}", terminal::render_face(&card.front, use_color));

        match prompt(&mut input, "\n[Enter] show answer, [q] quit: ")? {
            None => break,
            Some(line) if line.eq_ignore_ascii_case("q") => break,
            Some(_) => {}
        }

        println!("{}", paint("  \u{2500}\u{2500}\u{2500}", Color::DIM, use_color));
        println!("{}", terminal::render_face(&card.back, use_color));

        let delays = preview_delays(&card, Utc::now());
        let buttons = Grade::ALL
            .iter()
            .zip(delays.iter())
            .enumerate()
            .map(|(i, (grade, delay))| {
                let label = format!("{} {} ({})", i + 1, grade, format_delay(*delay));
                paint(&label, grade_color(*grade), use_color)
            })
            .collect::<Vec<_>>()
            .join("  ");
        println!("\n{}", buttons);

        loop {
            let line = match prompt(&mut input, "Grade: ")? {
                Some(line) => line,
                None => break 'cards,
            };
            if line.eq_ignore_ascii_case("q") {
                break 'cards;
            }

            let now = Utc::now();
            let result = match line.parse::<i32>().ok().and_then(Grade::from_rating) {
                Some(grade) => session.grade(grade, now),
                None => session.grade_token(&line, now),
            };

            match result {
                Ok(outcome) => {
                    let delay = outcome.result.next_review - now;
                    println!("{}", paint(
                        &format!("Next review in {}", format_delay(delay)),
                        Color::DIM,
                        use_color,
                    ));
                    break;
                }
                Err(SessionError::UnknownGrade(token)) => {
                    eprintln!("Unknown grade {:?}. Use 1-4 or Again, Hard, Good, Easy.", token);
                }
                Err(e @ SessionError::Persistence(_)) => {
                    // Progress is kept in memory; keep studying
                    eprintln!("{}", paint(&format!("Warning: {}", e), Color::YELLOW, use_color));
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    let elapsed = Utc::now() - session.started_at();
    println!();
    if session.is_finished() {
        println!("{}", paint("Deck finished for now.", Color::GREEN, use_color));
    }
    println!("Reviewed {} cards in {}m {:02}s.",
        session.cards_reviewed(),
        elapsed.num_minutes(),
        elapsed.num_seconds() % 60);

    Ok(())
}

fn grade_color(grade: Grade) -> &'static str {
    match grade {
        Grade::Again => Color::RED,
        Grade::Hard => Color::YELLOW,
        Grade::Good => Color::GREEN,
        Grade::Easy => Color::CYAN,
    }
}

/// Print a prompt and read one trimmed line; `None` at end of input
fn prompt(input: &mut impl BufRead, message: &str) -> Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
