use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use edge_terminal::board::LeagueMode;
use edge_terminal::intake::parse_raw_games;
use edge_terminal::publish::{
    build_csv_payload, build_xlsx_payload, publish_win_prob, win_prob_filename, PayloadFormat,
    PublishConfig,
};

fn usage() -> ! {
    eprintln!("usage: intake <league> <date> <raw-data-file> [--xlsx] [--local <dir>]");
    eprintln!("  league: nhl | nba | ncaab | soccer");
    eprintln!("  date:   YYYY-MM-DD");
    eprintln!("  --xlsx  publish a spreadsheet instead of CSV");
    eprintln!("  --local write the payload to a directory instead of committing");
    std::process::exit(2);
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        usage();
    }

    let league = args[0].trim().to_string();
    let date = args[1].trim().to_string();
    let input = PathBuf::from(&args[2]);

    let mut format = PayloadFormat::Csv;
    let mut local_dir: Option<PathBuf> = None;
    let mut rest = args[3..].iter();
    while let Some(flag) = rest.next() {
        match flag.as_str() {
            "--xlsx" => format = PayloadFormat::Xlsx,
            "--local" => match rest.next() {
                Some(dir) => local_dir = Some(PathBuf::from(dir)),
                None => usage(),
            },
            _ => usage(),
        }
    }

    let mode = LeagueMode::from_slug(&league)
        .with_context(|| format!("unknown league {league:?}, expected nhl|nba|ncaab|soccer"))?;
    NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .with_context(|| format!("invalid date {date:?}, expected YYYY-MM-DD"))?;

    let raw = fs::read_to_string(&input)
        .with_context(|| format!("failed reading {}", input.display()))?;
    if raw.trim().is_empty() {
        return Err(anyhow::anyhow!("missing required raw data: {} is empty", input.display()));
    }

    let games = parse_raw_games(&raw)?;
    eprintln!("parsed {} games from {}", games.len(), input.display());

    if let Some(dir) = local_dir {
        let rows = edge_terminal::intake::build_win_prob_rows(&games, mode.slug(), &date);
        let payload = match format {
            PayloadFormat::Csv => build_csv_payload(&rows).into_bytes(),
            PayloadFormat::Xlsx => build_xlsx_payload(&rows)?,
        };
        let path = dir.join(win_prob_filename(mode.slug(), &date, format));
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed creating {}", dir.display()))?;
        fs::write(&path, payload)
            .with_context(|| format!("failed writing {}", path.display()))?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let cfg = PublishConfig::from_env()?;
    let filename = publish_win_prob(&cfg, mode.slug(), &date, &games, format)?;
    println!("Success: {filename} committed to GitHub.");
    Ok(())
}
