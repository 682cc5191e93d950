use std::collections::VecDeque;

use chrono::{Local, NaiveDate};

use crate::board::{DailyBoard, LeagueMode};

/// Updates flowing from the provider thread back into the UI.
#[derive(Debug)]
pub enum Delta {
    BoardLoaded { generation: u64, board: DailyBoard },
    BoardFailed { generation: u64, message: String },
    Log(String),
}

/// Work requests flowing from the UI to the provider thread.
#[derive(Debug, Clone)]
pub enum ProviderCommand {
    LoadBoard {
        mode: LeagueMode,
        date: String,
        generation: u64,
    },
}

pub struct AppState {
    pub league_mode: LeagueMode,
    pub date: String,
    pub date_edit: Option<String>,
    pub board: Option<DailyBoard>,
    pub status: String,
    pub loading: bool,
    pub scroll: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    // Monotonic id of the most recent load request. Responses stamped with
    // an older id lost the race and are dropped, so a slow fetch can never
    // overwrite a newer selection.
    pub load_generation: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            league_mode: LeagueMode::Nhl,
            date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            date_edit: None,
            board: None,
            status: String::new(),
            loading: false,
            scroll: 0,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
            load_generation: 0,
        }
    }

    pub fn cycle_league_mode(&mut self) {
        self.league_mode = self.league_mode.next();
        self.scroll = 0;
    }

    /// Stamp a new load request; everything in flight becomes stale.
    pub fn begin_load(&mut self) -> u64 {
        self.load_generation += 1;
        self.loading = true;
        self.status.clear();
        self.load_generation
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn scroll_down(&mut self, max_scroll: usize) {
        self.scroll = (self.scroll + 1).min(max_scroll);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Flat text lines of the current board, one blank line between boxes.
    pub fn board_lines(&self) -> Vec<String> {
        let Some(board) = &self.board else {
            return Vec::new();
        };
        let columns = board.mode.columns();
        let mut lines = Vec::new();
        for game in &board.boxes {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.extend(game.lines(columns));
        }
        lines
    }

    // -- date editing --

    pub fn start_date_edit(&mut self) {
        self.date_edit = Some(self.date.clone());
    }

    pub fn date_edit_push(&mut self, c: char) {
        if let Some(buf) = &mut self.date_edit {
            if (c.is_ascii_digit() || c == '-') && buf.len() < 10 {
                buf.push(c);
            }
        }
    }

    pub fn date_edit_backspace(&mut self) {
        if let Some(buf) = &mut self.date_edit {
            buf.pop();
        }
    }

    pub fn cancel_date_edit(&mut self) {
        self.date_edit = None;
    }

    /// Accept the edited date if it is a real calendar date. Returns true
    /// when the date changed and a reload is needed.
    pub fn commit_date_edit(&mut self) -> bool {
        let Some(buf) = self.date_edit.take() else {
            return false;
        };
        if NaiveDate::parse_from_str(&buf, "%Y-%m-%d").is_err() {
            self.push_log(format!("[WARN] Invalid date {buf:?}, expected YYYY-MM-DD"));
            return false;
        }
        if buf == self.date {
            return false;
        }
        self.date = buf;
        self.scroll = 0;
        true
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::BoardLoaded { generation, board } => {
            if generation != state.load_generation {
                state.push_log("[INFO] Dropped stale board response");
                return;
            }
            state.loading = false;
            state.scroll = 0;
            state.status = if board.boxes.is_empty() {
                format!("No {} games found for this date.", board.mode.label())
            } else {
                String::new()
            };
            state.push_log(format!(
                "[INFO] Loaded {} {} games for {}",
                board.boxes.len(),
                board.mode.label(),
                board.date
            ));
            state.board = Some(board);
        }
        Delta::BoardFailed { generation, message } => {
            if generation != state.load_generation {
                state.push_log("[INFO] Dropped stale board failure");
                return;
            }
            state.loading = false;
            state.board = None;
            state.push_log(format!("[WARN] {message}"));
            state.status = message;
        }
        Delta::Log(message) => state.push_log(message),
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_delta, AppState, Delta};
    use crate::board::{DailyBoard, LeagueMode};

    fn empty_board(date: &str) -> DailyBoard {
        DailyBoard {
            mode: LeagueMode::Nhl,
            date: date.to_string(),
            boxes: Vec::new(),
        }
    }

    #[test]
    fn stale_board_responses_are_dropped() {
        let mut state = AppState::new();
        let first = state.begin_load();
        let second = state.begin_load();
        assert!(second > first);

        apply_delta(
            &mut state,
            Delta::BoardLoaded {
                generation: first,
                board: empty_board("2026-01-09"),
            },
        );
        assert!(state.board.is_none());
        assert!(state.loading);

        apply_delta(
            &mut state,
            Delta::BoardLoaded {
                generation: second,
                board: empty_board("2026-01-10"),
            },
        );
        assert!(!state.loading);
        assert_eq!(
            state.board.as_ref().map(|b| b.date.as_str()),
            Some("2026-01-10")
        );
    }

    #[test]
    fn empty_board_sets_status_message() {
        let mut state = AppState::new();
        let generation = state.begin_load();
        apply_delta(
            &mut state,
            Delta::BoardLoaded {
                generation,
                board: empty_board("2026-01-10"),
            },
        );
        assert_eq!(state.status, "No NHL games found for this date.");
    }

    #[test]
    fn date_edit_rejects_bad_dates() {
        let mut state = AppState::new();
        state.start_date_edit();
        state.date_edit = Some("2026-13-99".to_string());
        assert!(!state.commit_date_edit());

        state.date_edit = Some("2026-01-10".to_string());
        state.commit_date_edit();
        assert_eq!(state.date, "2026-01-10");
    }

    #[test]
    fn log_is_bounded() {
        let mut state = AppState::new();
        for i in 0..250 {
            state.push_log(format!("line {i}"));
        }
        assert_eq!(state.logs.len(), 200);
        assert_eq!(state.logs.front().map(String::as_str), Some("line 50"));
    }
}
