use std::env;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::board::{build_board, BoardInputs, DailyBoard, LeagueMode};
use crate::csv_text::parse_records;
use crate::http_client::http_client;

const DEFAULT_OWNER: &str = "Clownworldenjoyer76";
const DEFAULT_REPO: &str = "bet_tracker";
const DEFAULT_BRANCH: &str = "main";

/// Where the published CSV files live. Defaults point at the production
/// repository; each part can be overridden from the environment.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl SourceConfig {
    pub fn from_env() -> Self {
        Self {
            owner: env_or("EDGE_REPO_OWNER", DEFAULT_OWNER),
            repo: env_or("EDGE_REPO_NAME", DEFAULT_REPO),
            branch: env_or("EDGE_REPO_BRANCH", DEFAULT_BRANCH),
        }
    }

    pub fn raw_base(&self) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/{}",
            self.owner, self.repo, self.branch
        )
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// The two date stamps used in published filenames: older feeds join the
/// date parts with underscores, newer ones keep the hyphens.
pub fn date_stamps(date: &str) -> (String, String) {
    (date.replace('-', "_"), date.to_string())
}

/// Fetch one URL as text. Non-2xx is an error carrying a body snippet.
pub fn fetch_text(url: &str) -> Result<String> {
    let client = http_client()?;
    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("request failed for {url}"))?;
    let status = resp.status();
    let body = resp.text().context("failed reading response body")?;
    if !status.is_success() {
        let snippet: String = body.trim().chars().take(160).collect();
        return Err(anyhow::anyhow!("http {status} for {url}: {snippet}"));
    }
    Ok(body)
}

/// Try candidate URLs in order, keeping the first success with non-empty
/// content. Transport failures and non-2xx both mean "try the next form".
fn fetch_first_available(urls: &[String]) -> Option<String> {
    for url in urls {
        match fetch_text(url) {
            Ok(body) if !body.trim().is_empty() => return Some(body),
            _ => continue,
        }
    }
    None
}

fn candidate_urls(base: &str, paths: [String; 2]) -> Vec<String> {
    let [underscore, hyphen] = paths;
    let mut urls = vec![format!("{base}/{underscore}")];
    let hyphen_url = format!("{base}/{hyphen}");
    if !urls.contains(&hyphen_url) {
        urls.push(hyphen_url);
    }
    urls
}

/// Load and assemble the daily board for a league.
///
/// The moneyline feed is required; a missing file is a hard error with a
/// user-facing message. Totals, spreads and tip times degrade to blanks.
/// All four feeds are fetched concurrently.
pub fn load_daily_board(cfg: &SourceConfig, mode: LeagueMode, date: &str) -> Result<DailyBoard> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("invalid date {date:?}, expected YYYY-MM-DD"))?;

    let base = cfg.raw_base();
    let (us, hy) = date_stamps(date);

    let ml_urls = candidate_urls(&base, [mode.moneyline_path(&us), mode.moneyline_path(&hy)]);
    let totals_urls = candidate_urls(&base, [mode.totals_path(&us), mode.totals_path(&hy)]);
    let spreads_urls = candidate_urls(&base, [mode.spreads_path(&us), mode.spreads_path(&hy)]);
    let times_urls = candidate_urls(&base, [mode.times_path(&us), mode.times_path(&hy)]);

    let ((moneyline, totals), (spreads, times)) = rayon::join(
        || {
            rayon::join(
                || fetch_first_available(&ml_urls),
                || fetch_first_available(&totals_urls),
            )
        },
        || {
            rayon::join(
                || fetch_first_available(&spreads_urls),
                || fetch_first_available(&times_urls),
            )
        },
    );

    let Some(moneyline) = moneyline else {
        return Err(anyhow::anyhow!(
            "no {} moneyline file found for {date}",
            mode.label()
        ));
    };

    let inputs = BoardInputs {
        moneyline: parse_records(&moneyline),
        totals: totals.as_deref().map(parse_records).unwrap_or_default(),
        spreads: spreads.as_deref().map(parse_records).unwrap_or_default(),
        times: times.as_deref().map(parse_records).unwrap_or_default(),
    };

    Ok(build_board(mode, date, inputs))
}

#[cfg(test)]
mod tests {
    use super::{candidate_urls, date_stamps, SourceConfig};
    use crate::board::LeagueMode;

    #[test]
    fn date_stamp_forms() {
        let (us, hy) = date_stamps("2026-01-10");
        assert_eq!(us, "2026_01_10");
        assert_eq!(hy, "2026-01-10");
    }

    #[test]
    fn moneyline_url_layout() {
        let cfg = SourceConfig {
            owner: "o".into(),
            repo: "r".into(),
            branch: "main".into(),
        };
        let (us, _) = date_stamps("2026-01-10");
        let url = format!("{}/{}", cfg.raw_base(), LeagueMode::Nhl.moneyline_path(&us));
        assert_eq!(
            url,
            "https://raw.githubusercontent.com/o/r/main/docs/win/edge/edge_nhl_2026_01_10.csv"
        );
    }

    #[test]
    fn candidate_urls_dedup_identical_forms() {
        let urls = candidate_urls("https://x", ["a/b.csv".into(), "a/b.csv".into()]);
        assert_eq!(urls.len(), 1);
        let urls = candidate_urls("https://x", ["a/b_1.csv".into(), "a/b-1.csv".into()]);
        assert_eq!(urls.len(), 2);
    }
}
