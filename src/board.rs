use std::collections::HashMap;

use crate::csv_text::Record;
use crate::grouping::{group_by_key, index_by_key, IndexPolicy};

pub const GAME_ID_COL: &str = "game_id";
pub const TIME_COL: &str = "time";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeagueMode {
    Nhl,
    Nba,
    Ncaab,
    Soccer,
}

impl LeagueMode {
    pub const ALL: [LeagueMode; 4] = [
        LeagueMode::Nhl,
        LeagueMode::Nba,
        LeagueMode::Ncaab,
        LeagueMode::Soccer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LeagueMode::Nhl => "NHL",
            LeagueMode::Nba => "NBA",
            LeagueMode::Ncaab => "NCAAB",
            LeagueMode::Soccer => "Soccer",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            LeagueMode::Nhl => "nhl",
            LeagueMode::Nba => "nba",
            LeagueMode::Ncaab => "ncaab",
            LeagueMode::Soccer => "soccer",
        }
    }

    pub fn from_slug(raw: &str) -> Option<Self> {
        let slug = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|mode| mode.slug() == slug)
    }

    pub fn next(self) -> Self {
        match self {
            LeagueMode::Nhl => LeagueMode::Nba,
            LeagueMode::Nba => LeagueMode::Ncaab,
            LeagueMode::Ncaab => LeagueMode::Soccer,
            LeagueMode::Soccer => LeagueMode::Nhl,
        }
    }

    /// Column set of this league's moneyline file.
    pub fn columns(self) -> &'static BoardColumns {
        match self {
            LeagueMode::Nhl | LeagueMode::Soccer => &GOALS_COLUMNS,
            LeagueMode::Nba | LeagueMode::Ncaab => &POINTS_COLUMNS,
        }
    }

    /// Moneyline market shape: the US leagues publish exactly two rows per
    /// game; soccer files mix bet types and carry the draw side, so rows
    /// are narrowed by the bet_type column instead of by cardinality.
    pub fn market_shape(self) -> MarketShape {
        match self {
            LeagueMode::Soccer => MarketShape::ThreeWay {
                discriminator: "bet_type",
                keep: "moneyline",
            },
            _ => MarketShape::TwoSided,
        }
    }

    /// Repo-relative path of the moneyline file for a date stamp.
    pub fn moneyline_path(self, stamp: &str) -> String {
        format!("docs/win/edge/edge_{}_{stamp}.csv", self.slug())
    }

    pub fn totals_path(self, stamp: &str) -> String {
        format!("docs/win/{0}/edge_{0}_totals_{stamp}.csv", self.slug())
    }

    pub fn spreads_path(self, stamp: &str) -> String {
        format!("docs/win/{0}/edge_{0}_spreads_{stamp}.csv", self.slug())
    }

    /// Manually normalized sportsbook dump; the only feed that carries tip
    /// times, so the board borrows its `time` column for ordering.
    pub fn times_path(self, stamp: &str) -> String {
        format!(
            "docs/win/manual/normalized/dk_{}_moneyline_{stamp}.csv",
            self.slug()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketShape {
    TwoSided,
    ThreeWay {
        discriminator: &'static str,
        keep: &'static str,
    },
}

#[derive(Debug)]
pub struct BoardColumns {
    pub team: &'static str,
    pub opponent: &'static str,
    pub win_probability: &'static str,
    pub projection: &'static str,
    pub projection_label: &'static str,
    pub acceptable_odds: &'static str,
}

static GOALS_COLUMNS: BoardColumns = BoardColumns {
    team: "team",
    opponent: "opponent",
    win_probability: "win_probability",
    projection: "goals",
    projection_label: "PROJ GOALS",
    acceptable_odds: "acceptable_american_odds",
};

static POINTS_COLUMNS: BoardColumns = BoardColumns {
    team: "team",
    opponent: "opponent",
    win_probability: "win_probability",
    projection: "points",
    projection_label: "PROJ PTS",
    acceptable_odds: "acceptable_american_odds",
};

/// One display row inside a game box.
#[derive(Debug, Clone, PartialEq)]
pub struct SideLine {
    pub team: String,
    pub win_probability: String,
    pub projection: String,
    pub acceptable_odds: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TotalsLine {
    pub side: String,
    pub market_total: String,
    pub acceptable_odds: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpreadLine {
    pub team: String,
    pub line: String,
    pub acceptable_odds: String,
}

#[derive(Debug, Clone)]
pub struct GameBox {
    pub game_id: String,
    pub header: String,
    pub tip_time: String,
    pub sides: Vec<SideLine>,
    pub totals: Option<TotalsLine>,
    pub spreads: Vec<SpreadLine>,
}

#[derive(Debug, Clone)]
pub struct DailyBoard {
    pub mode: LeagueMode,
    pub date: String,
    pub boxes: Vec<GameBox>,
}

/// Raw dataset texts for one board load, already split per feed. Missing
/// secondary feeds are empty vectors and render as blanks.
#[derive(Debug, Default)]
pub struct BoardInputs {
    pub moneyline: Vec<Record>,
    pub totals: Vec<Record>,
    pub spreads: Vec<Record>,
    pub times: Vec<Record>,
}

/// Assemble the per-game boxes for one league and date.
///
/// Moneyline rows are grouped by game id in file order, then reordered by
/// tip time when the times feed is present. Totals join first-row-wins,
/// spreads keep every row. Groups that do not satisfy the league's market
/// shape are dropped entirely.
pub fn build_board(mode: LeagueMode, date: &str, inputs: BoardInputs) -> DailyBoard {
    let columns = mode.columns();

    let times: HashMap<String, String> = {
        let indexed = index_by_key(inputs.times, GAME_ID_COL, IndexPolicy::FirstWins);
        indexed
            .into_iter()
            .filter_map(|(id, rows)| {
                let time = rows.first()?.get(TIME_COL).to_string();
                (!time.is_empty()).then_some((id, time))
            })
            .collect()
    };

    let mut grouped = group_by_key(inputs.moneyline, GAME_ID_COL);
    if !times.is_empty() {
        grouped.sort_by_time(&times);
    }

    let totals_by_game = index_by_key(inputs.totals, GAME_ID_COL, IndexPolicy::FirstWins);
    let spreads_by_game = index_by_key(inputs.spreads, GAME_ID_COL, IndexPolicy::KeepAll);

    let mut boxes = Vec::with_capacity(grouped.order.len());
    for game_id in &grouped.order {
        let rows = grouped.get(game_id);
        let Some(sides) = select_sides(rows, mode.market_shape(), columns) else {
            continue;
        };

        let first = &rows[0];
        let team = first.get(columns.team);
        let opponent = first.get(columns.opponent);
        let header = if !team.is_empty() && !opponent.is_empty() {
            format!("{team} at {opponent}")
        } else {
            format!("Game {game_id}")
        };

        let totals = totals_by_game
            .get(game_id)
            .and_then(|rows| rows.first())
            .map(|row| TotalsLine {
                side: row.get("side").to_string(),
                market_total: row.get("market_total").to_string(),
                acceptable_odds: row.get(columns.acceptable_odds).to_string(),
            });

        let spreads = spreads_by_game
            .get(game_id)
            .map(|rows| {
                rows.iter()
                    .map(|row| SpreadLine {
                        team: row.get(columns.team).to_string(),
                        line: row.get("spread").to_string(),
                        acceptable_odds: row.get(columns.acceptable_odds).to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        boxes.push(GameBox {
            game_id: game_id.clone(),
            header,
            tip_time: times.get(game_id).cloned().unwrap_or_default(),
            sides,
            totals,
            spreads,
        });
    }

    DailyBoard {
        mode,
        date: date.to_string(),
        boxes,
    }
}

/// Pick the display rows for one game under the league's market shape.
/// Returns `None` when the group cannot be rendered.
fn select_sides(
    rows: &[Record],
    shape: MarketShape,
    columns: &BoardColumns,
) -> Option<Vec<SideLine>> {
    match shape {
        MarketShape::TwoSided => {
            if rows.len() != 2 {
                return None;
            }
            let first = &rows[0];
            let opponent_name = first.get(columns.opponent);
            // The opponent row is the one whose team matches the first
            // row's opponent; fall back to plain file order.
            let opponent_row = rows
                .iter()
                .find(|r| !opponent_name.is_empty() && r.get(columns.team) == opponent_name)
                .unwrap_or(&rows[1]);
            Some(vec![
                side_line(first, columns),
                side_line(opponent_row, columns),
            ])
        }
        MarketShape::ThreeWay { discriminator, keep } => {
            let selected: Vec<SideLine> = rows
                .iter()
                .filter(|r| r.get(discriminator).eq_ignore_ascii_case(keep))
                .map(|r| side_line(r, columns))
                .collect();
            (!selected.is_empty()).then_some(selected)
        }
    }
}

fn side_line(row: &Record, columns: &BoardColumns) -> SideLine {
    SideLine {
        team: row.get(columns.team).to_string(),
        win_probability: format2(row.get(columns.win_probability)),
        projection: format2(row.get(columns.projection)),
        acceptable_odds: row.get(columns.acceptable_odds).to_string(),
    }
}

/// Two-decimal display form; blank when the value is not a finite number.
pub fn format2(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => format!("{v:.2}"),
        _ => String::new(),
    }
}

impl GameBox {
    /// Flat text lines for this box, shared by the TUI and the CLI dump.
    pub fn lines(&self, columns: &BoardColumns) -> Vec<String> {
        let mut out = Vec::with_capacity(4 + self.sides.len() + self.spreads.len());

        let title = if self.tip_time.is_empty() {
            self.header.clone()
        } else {
            format!("{} - {}", self.header, self.tip_time)
        };
        out.push(title);

        out.push(format!(
            "  {:<24} {:>8} {:>12} {:>12} {:>14}",
            "TEAM", "WIN%", columns.projection_label, "TAKE ML AT", "TAKE O/U AT"
        ));

        let over_under = self.totals.as_ref().map(|t| {
            let line = format!("{} {}", t.side, t.market_total);
            (line.trim().to_string(), t.acceptable_odds.clone())
        });

        for (i, side) in self.sides.iter().enumerate() {
            // The totals market spans the game: its line goes on the first
            // side row, its acceptable odds on the second.
            let ou_cell = match (&over_under, i) {
                (Some((line, _)), 0) => line.clone(),
                (Some((_, odds)), 1) => odds.clone(),
                _ => String::new(),
            };
            out.push(format!(
                "  {:<24} {:>8} {:>12} {:>12} {:>14}",
                side.team, side.win_probability, side.projection, side.acceptable_odds, ou_cell
            ));
        }

        for spread in &self.spreads {
            out.push(format!(
                "  {:<24} spread {:>6} take at {}",
                spread.team, spread.line, spread.acceptable_odds
            ));
        }

        out
    }
}

impl DailyBoard {
    pub fn render_text(&self) -> String {
        let columns = self.mode.columns();
        let mut out = String::new();
        out.push_str(&format!(
            "{} board for {} ({} games)\n",
            self.mode.label(),
            self.date,
            self.boxes.len()
        ));
        for game in &self.boxes {
            out.push('\n');
            for line in game.lines(columns) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{build_board, format2, BoardInputs, LeagueMode};
    use crate::csv_text::parse_records;

    #[test]
    fn two_sided_groups_with_other_cardinality_are_skipped() {
        let ml = parse_records(
            "game_id,team,opponent,win_probability,goals,acceptable_american_odds\n\
             g1,BOS,NYR,0.61,3.1,-140\n\
             g1,NYR,BOS,0.39,2.4,+155\n\
             g2,TOR,MTL,0.5,2.9,+100\n",
        );
        let board = build_board(
            LeagueMode::Nhl,
            "2026-01-10",
            BoardInputs {
                moneyline: ml,
                ..Default::default()
            },
        );
        assert_eq!(board.boxes.len(), 1);
        assert_eq!(board.boxes[0].header, "BOS at NYR");
        assert_eq!(board.boxes[0].sides[0].win_probability, "0.61");
        assert_eq!(board.boxes[0].sides[1].team, "NYR");
    }

    #[test]
    fn opponent_row_is_matched_by_name_not_position() {
        // Same game id twice but the file order flips team/opponent; the
        // second display row must be the one named by the first row.
        let ml = parse_records(
            "game_id,team,opponent,win_probability,goals,acceptable_american_odds\n\
             g1,BOS,NYR,0.61,3.1,-140\n\
             g1,NYR,BOS,0.39,2.4,+155\n",
        );
        let board = build_board(
            LeagueMode::Nhl,
            "2026-01-10",
            BoardInputs {
                moneyline: ml,
                ..Default::default()
            },
        );
        assert_eq!(board.boxes[0].sides[1].team, "NYR");
    }

    #[test]
    fn three_way_groups_filter_by_bet_type() {
        let ml = parse_records(
            "game_id,team,opponent,win_probability,goals,acceptable_american_odds,bet_type\n\
             g1,Arsenal,Chelsea,0.48,1.9,+110,moneyline\n\
             g1,Chelsea,Arsenal,0.27,1.1,+330,moneyline\n\
             g1,Draw,,0.25,,+290,draw\n",
        );
        let board = build_board(
            LeagueMode::Soccer,
            "2026-01-10",
            BoardInputs {
                moneyline: ml,
                ..Default::default()
            },
        );
        assert_eq!(board.boxes.len(), 1);
        assert_eq!(board.boxes[0].sides.len(), 2);
        assert!(board.boxes[0].sides.iter().all(|s| s.team != "Draw"));
    }

    #[test]
    fn format2_blanks_non_numeric() {
        assert_eq!(format2("0.615"), "0.62");
        assert_eq!(format2(""), "");
        assert_eq!(format2("n/a"), "");
    }
}
