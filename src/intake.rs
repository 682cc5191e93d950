use anyhow::Result;

/// One side of a pasted game block: team name with the W-L record suffix
/// stripped, and a win probability normalized to the 0..=1 range.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamProb {
    pub team: String,
    pub probability: f64,
}

/// One game block from the pasted text: a time line followed by two team
/// lines.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeGame {
    pub time: String,
    pub team_a: TeamProb,
    pub team_b: TeamProb,
}

pub const WIN_PROB_HEADERS: [&str; 6] =
    ["date", "time", "team", "opponent", "win_probability", "league"];

/// Parse pasted win-probability text into game blocks.
///
/// The expected shape per game is a time line (`2:00 PM`, `02:00 PM` or
/// `14:30`) followed by two team lines like `"Team Name (10-5) 61.5%"` or
/// `"Team Name 0.615"`. Blank lines are ignored. Structural problems are
/// hard errors quoting the offending line.
pub fn parse_raw_games(raw: &str) -> Result<Vec<IntakeGame>> {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() < 3 {
        return Err(anyhow::anyhow!(
            "raw data does not contain enough lines to form a game"
        ));
    }

    let mut games = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if !is_time_line(line) {
            return Err(anyhow::anyhow!("expected time on line {}: {line:?}", i + 1));
        }
        let time = line.to_string();
        i += 1;

        if i + 2 > lines.len() {
            return Err(anyhow::anyhow!("incomplete game block starting at time {time}"));
        }

        let team_a = parse_team_line(lines[i])?;
        let team_b = parse_team_line(lines[i + 1])?;
        i += 2;

        games.push(IntakeGame {
            time,
            team_a,
            team_b,
        });
    }

    Ok(games)
}

/// Expand parsed games to CSV rows, two per game with team/opponent
/// mirrored, in the `WIN_PROB_HEADERS` column order.
pub fn build_win_prob_rows(games: &[IntakeGame], league: &str, date: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(games.len() * 2);
    for game in games {
        rows.push(win_prob_row(date, &game.time, &game.team_a, &game.team_b, league));
        rows.push(win_prob_row(date, &game.time, &game.team_b, &game.team_a, league));
    }
    rows
}

fn win_prob_row(
    date: &str,
    time: &str,
    side: &TeamProb,
    other: &TeamProb,
    league: &str,
) -> Vec<String> {
    vec![
        date.to_string(),
        time.to_string(),
        side.team.clone(),
        other.team.clone(),
        format_probability(side.probability),
        league.to_string(),
    ]
}

fn format_probability(p: f64) -> String {
    // Keep short fractions readable instead of fixing the precision.
    let formatted = format!("{p}");
    if formatted.len() > 6 {
        format!("{p:.4}")
    } else {
        formatted
    }
}

/// `H:MM` with an optional case-insensitive ` AM`/`PM` suffix and nothing
/// else on the line.
fn is_time_line(line: &str) -> bool {
    let Some((hours, rest)) = line.split_once(':') else {
        return false;
    };
    if hours.is_empty() || hours.len() > 2 || !hours.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let minutes: String = rest.chars().take(2).collect();
    if minutes.len() != 2 || !minutes.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let suffix = &rest[minutes.len()..];
    if suffix.is_empty() {
        return true;
    }
    let suffix = suffix.strip_prefix(' ').unwrap_or(suffix);
    suffix.eq_ignore_ascii_case("AM") || suffix.eq_ignore_ascii_case("PM")
}

fn parse_team_line(line: &str) -> Result<TeamProb> {
    let Some(prob_raw) = line.split_whitespace().last() else {
        return Err(anyhow::anyhow!("empty team line"));
    };

    let probability = normalize_probability(prob_raw)?;
    if !(0.0..=1.0).contains(&probability) {
        return Err(anyhow::anyhow!("invalid win probability: {prob_raw:?}"));
    }

    let team_raw = line[..line.rfind(prob_raw).unwrap_or(0)].trim();
    let team = strip_record(team_raw);
    if team.is_empty() {
        return Err(anyhow::anyhow!(
            "could not parse team name from line: {line:?}"
        ));
    }

    Ok(TeamProb { team, probability })
}

/// Accept `61.5%`, `61.5` or `0.615`; values above 1 are percentages.
fn normalize_probability(raw: &str) -> Result<f64> {
    let cleaned = raw.replace('%', "");
    let value: f64 = cleaned
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid probability value: {raw:?}"))?;
    if !value.is_finite() {
        return Err(anyhow::anyhow!("invalid probability value: {raw:?}"));
    }
    Ok(if value > 1.0 { value / 100.0 } else { value })
}

/// Drop a trailing `(10-5)` style record from a team name.
fn strip_record(team: &str) -> String {
    let trimmed = team.trim_end();
    if let Some(open) = trimmed.rfind('(') {
        if trimmed.ends_with(')') {
            return trimmed[..open].trim_end().to_string();
        }
    }
    trimmed.trim_start().to_string()
}

#[cfg(test)]
mod tests {
    use super::{build_win_prob_rows, parse_raw_games, strip_record};

    const SAMPLE: &str = "7:05 PM\nBruins (30-10) 61.5%\nRangers (22-18) 38.5%\n";

    #[test]
    fn parses_one_game_block() {
        let games = parse_raw_games(SAMPLE).expect("sample should parse");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].time, "7:05 PM");
        assert_eq!(games[0].team_a.team, "Bruins");
        assert!((games[0].team_a.probability - 0.615).abs() < 1e-9);
        assert!((games[0].team_b.probability - 0.385).abs() < 1e-9);
    }

    #[test]
    fn percent_and_fraction_agree() {
        let pct = parse_raw_games("7:05 PM\nA 61.5%\nB 38.5%\n").expect("pct");
        let frac = parse_raw_games("7:05 PM\nA 0.615\nB 0.385\n").expect("frac");
        assert_eq!(pct[0].team_a.probability, frac[0].team_a.probability);
    }

    #[test]
    fn missing_time_line_is_an_error() {
        let err = parse_raw_games("Bruins 0.6\nRangers 0.4\nX 0.5\n").unwrap_err();
        assert!(err.to_string().contains("expected time on line 1"));
    }

    #[test]
    fn incomplete_block_is_an_error() {
        let err = parse_raw_games("7:05 PM\nA 0.6\nB 0.4\n8:00 PM\nC 0.5\n").unwrap_err();
        assert!(err.to_string().contains("incomplete game block"));
    }

    #[test]
    fn out_of_range_probability_is_an_error() {
        let err = parse_raw_games("7:05 PM\nA 250%\nB 0.4\n").unwrap_err();
        assert!(err.to_string().contains("invalid win probability"));
    }

    #[test]
    fn record_suffix_stripped() {
        assert_eq!(strip_record("Tampa Bay (10-5)"), "Tampa Bay");
        assert_eq!(strip_record("Tampa Bay"), "Tampa Bay");
        assert_eq!(strip_record("St. Louis (1-2) "), "St. Louis");
    }

    #[test]
    fn rows_mirror_team_and_opponent() {
        let games = parse_raw_games(SAMPLE).expect("sample should parse");
        let rows = build_win_prob_rows(&games, "nhl", "2026-01-10");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][2], "Bruins");
        assert_eq!(rows[0][3], "Rangers");
        assert_eq!(rows[1][2], "Rangers");
        assert_eq!(rows[1][3], "Bruins");
        assert_eq!(rows[0][4], "0.615");
        assert_eq!(rows[0][5], "nhl");
    }
}
