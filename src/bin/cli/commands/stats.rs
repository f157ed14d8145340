use anyhow::Result;
use chrono::Local;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let stats = app.stats.load_today(Local::now().date_naive());

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "date": stats.date.to_string(),
                "totalCards": stats.total_cards,
                "totalStudyTimeSeconds": stats.total_study_time_seconds,
                "averageSecondsPerCard": stats.average_time_per_card().num_milliseconds() as f64 / 1000.0,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let total = stats.total_study_time();
            println!("Today ({})", stats.date);
            println!("  Cards reviewed: {}", stats.total_cards);
            println!("  Study time:     {}m {:02}s", total.num_minutes(), total.num_seconds() % 60);
            println!("  Per card:       {:.1}s",
                stats.average_time_per_card().num_milliseconds() as f64 / 1000.0);
        }
    }

    Ok(())
}
