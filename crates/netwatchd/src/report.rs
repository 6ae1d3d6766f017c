//! One-shot status command.

use netwatch_core::WatchConfig;
use netwatch_health::summary;
use netwatch_history::HistoryStore;

use crate::OutputFormat;

/// Print the history summary without starting the watchdog.
pub fn print_status(config: &WatchConfig, format: OutputFormat) -> anyhow::Result<()> {
    let history = HistoryStore::open(&config.history.path);
    let summary = summary(&history);

    match format {
        OutputFormat::Text => println!("{summary}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}
