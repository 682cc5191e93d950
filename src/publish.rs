use std::env;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use rust_xlsxwriter::Workbook;
use serde::Deserialize;

use crate::board_fetch::SourceConfig;
use crate::csv_text::write_csv;
use crate::http_client::http_client;
use crate::intake::{build_win_prob_rows, IntakeGame, WIN_PROB_HEADERS};

/// Repo-relative directory the published files are committed under. The
/// board loader reads from subdirectories of the same tree.
const PUBLISH_DIR: &str = "docs/win";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Csv,
    Xlsx,
}

impl PayloadFormat {
    pub fn extension(self) -> &'static str {
        match self {
            PayloadFormat::Csv => "csv",
            PayloadFormat::Xlsx => "xlsx",
        }
    }
}

/// Credentials and target for the Contents API commit. The token is
/// required; the repository coordinates share `SourceConfig` defaults and
/// environment overrides with the board loader.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub source: SourceConfig,
    pub token: String,
}

impl PublishConfig {
    pub fn from_env() -> Result<Self> {
        let token = env::var("GITHUB_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .context("GITHUB_TOKEN is not set")?;
        Ok(Self {
            source: SourceConfig::from_env(),
            token,
        })
    }
}

pub fn win_prob_filename(league: &str, date: &str, format: PayloadFormat) -> String {
    format!("win_prob_{league}_{date}.{}", format.extension())
}

pub fn build_csv_payload(rows: &[Vec<String>]) -> String {
    write_csv(&WIN_PROB_HEADERS, rows)
}

pub fn build_xlsx_payload(rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, header) in WIN_PROB_HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .context("write workbook header")?;
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32 + 1, col_idx as u16, value)
                .context("write workbook cell")?;
        }
    }
    workbook.save_to_buffer().context("serialize workbook")
}

/// Parse games into rows, build the payload in the requested format and
/// commit it. Returns the committed filename.
pub fn publish_win_prob(
    cfg: &PublishConfig,
    league: &str,
    date: &str,
    games: &[IntakeGame],
    format: PayloadFormat,
) -> Result<String> {
    let rows = build_win_prob_rows(games, league, date);
    let payload = match format {
        PayloadFormat::Csv => build_csv_payload(&rows).into_bytes(),
        PayloadFormat::Xlsx => build_xlsx_payload(&rows)?,
    };

    let filename = win_prob_filename(league, date, format);
    commit_file(cfg, &filename, &payload)?;
    Ok(filename)
}

pub fn contents_url(cfg: &SourceConfig, filename: &str) -> String {
    format!(
        "https://api.github.com/repos/{}/{}/contents/{PUBLISH_DIR}/{filename}",
        cfg.owner, cfg.repo
    )
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// One atomic PUT to the Contents API. A non-2xx response surfaces the API
/// message (or a body snippet) in the error; nothing is retried.
pub fn commit_file(cfg: &PublishConfig, filename: &str, bytes: &[u8]) -> Result<()> {
    let url = contents_url(&cfg.source, filename);
    let body = serde_json::json!({
        "message": format!("Add {filename}"),
        "content": BASE64.encode(bytes),
        "branch": cfg.source.branch,
    });

    let client = http_client()?;
    let resp = client
        .put(&url)
        .header(AUTHORIZATION, format!("token {}", cfg.token))
        .header(ACCEPT, "application/vnd.github+json")
        .json(&body)
        .send()
        .context("contents api request failed")?;

    let status = resp.status();
    let text = resp.text().context("failed reading contents api response")?;
    if !status.is_success() {
        let detail = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .map(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| text.trim().chars().take(300).collect());
        return Err(anyhow::anyhow!("contents api {status}: {detail}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{build_csv_payload, contents_url, win_prob_filename, PayloadFormat};
    use crate::board_fetch::SourceConfig;
    use crate::csv_text::parse_records;
    use crate::intake::{build_win_prob_rows, parse_raw_games};

    #[test]
    fn filename_convention() {
        assert_eq!(
            win_prob_filename("nhl", "2026-01-10", PayloadFormat::Csv),
            "win_prob_nhl_2026-01-10.csv"
        );
        assert_eq!(
            win_prob_filename("nba", "2026-01-10", PayloadFormat::Xlsx),
            "win_prob_nba_2026-01-10.xlsx"
        );
    }

    #[test]
    fn contents_url_layout() {
        let cfg = SourceConfig {
            owner: "o".into(),
            repo: "r".into(),
            branch: "main".into(),
        };
        assert_eq!(
            contents_url(&cfg, "win_prob_nhl_2026-01-10.csv"),
            "https://api.github.com/repos/o/r/contents/docs/win/win_prob_nhl_2026-01-10.csv"
        );
    }

    #[test]
    fn csv_payload_round_trips_through_the_parser() {
        let games = parse_raw_games("7:05 PM\nSt. Louis, MO 0.61\nColorado 0.39\n")
            .expect("sample should parse");
        let rows = build_win_prob_rows(&games, "nhl", "2026-01-10");
        let csv = build_csv_payload(&rows);

        let parsed = parse_records(&csv);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].get("team"), "St. Louis, MO");
        assert_eq!(parsed[1].get("opponent"), "St. Louis, MO");
        assert_eq!(parsed[0].get("win_probability"), "0.61");
    }
}
