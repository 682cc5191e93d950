use anyhow::{Context, Result};
use chrono::Local;

use edge_terminal::board::LeagueMode;
use edge_terminal::board_fetch::{load_daily_board, SourceConfig};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let league = std::env::args()
        .nth(1)
        .context("usage: board_dump <league> [date]")?;
    let date = std::env::args()
        .nth(2)
        .unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string());

    let mode = LeagueMode::from_slug(&league)
        .with_context(|| format!("unknown league {league:?}, expected nhl|nba|ncaab|soccer"))?;

    let cfg = SourceConfig::from_env();
    let board = load_daily_board(&cfg, mode, &date)?;
    print!("{}", board.render_text());
    Ok(())
}
