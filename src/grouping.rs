use std::collections::HashMap;

use crate::csv_text::Record;

/// Records bucketed by a key field, preserving first-seen key order and
/// input order within each bucket.
#[derive(Debug, Clone, Default)]
pub struct GroupedRows {
    pub order: Vec<String>,
    pub by_key: HashMap<String, Vec<Record>>,
}

impl GroupedRows {
    pub fn get(&self, key: &str) -> &[Record] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Stable reorder of the group keys by time of day. `times` maps key to
    /// a display time (`H:MM AM/PM`); keys without a parseable time sort as
    /// minute 0, i.e. earliest.
    pub fn sort_by_time(&mut self, times: &HashMap<String, String>) {
        self.order.sort_by_key(|key| {
            times
                .get(key)
                .map(|t| time_to_minutes(t))
                .unwrap_or_default()
        });
    }
}

/// Group records by `key`, excluding records whose key value is empty.
pub fn group_by_key(records: Vec<Record>, key: &str) -> GroupedRows {
    let mut grouped = GroupedRows::default();
    for record in records {
        let id = record.get(key).to_string();
        if id.is_empty() {
            continue;
        }
        if !grouped.by_key.contains_key(&id) {
            grouped.order.push(id.clone());
        }
        grouped.by_key.entry(id).or_default().push(record);
    }
    grouped
}

/// How a secondary dataset index treats repeated keys. Both semantics exist
/// in the feeds: totals files carry one row per game (first wins), spread
/// files carry one row per side (keep all).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPolicy {
    FirstWins,
    KeepAll,
}

/// Index records by `key` under the given policy, excluding empty keys.
pub fn index_by_key(records: Vec<Record>, key: &str, policy: IndexPolicy) -> HashMap<String, Vec<Record>> {
    let mut index: HashMap<String, Vec<Record>> = HashMap::new();
    for record in records {
        let id = record.get(key).to_string();
        if id.is_empty() {
            continue;
        }
        let bucket = index.entry(id).or_default();
        if policy == IndexPolicy::FirstWins && !bucket.is_empty() {
            continue;
        }
        bucket.push(record);
    }
    index
}

/// Convert a `H:MM AM/PM` display time to minutes since midnight.
///
/// 12 AM maps to 0, 12 PM stays at noon, other PM hours shift by 12.
/// Anything that does not match the shape (including 24-hour times with no
/// meridiem) is 0 so unknown tip times sort first.
pub fn time_to_minutes(raw: &str) -> u32 {
    let trimmed = raw.trim();
    let Some((hour_part, rest)) = trimmed.split_once(':') else {
        return 0;
    };
    let Ok(mut hour) = hour_part.trim().parse::<u32>() else {
        return 0;
    };

    let minute_digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let Ok(minute) = minute_digits.parse::<u32>() else {
        return 0;
    };

    let meridiem = rest[minute_digits.len()..].trim().to_ascii_uppercase();
    match meridiem.as_str() {
        "PM" if hour != 12 => hour += 12,
        "AM" if hour == 12 => hour = 0,
        "AM" | "PM" => {}
        _ => return 0,
    }

    hour * 60 + minute
}

#[cfg(test)]
mod tests {
    use super::{group_by_key, index_by_key, time_to_minutes, GroupedRows, IndexPolicy};
    use crate::csv_text::parse_records;
    use std::collections::HashMap;

    fn sample() -> Vec<crate::csv_text::Record> {
        parse_records("game_id,team\ng2,A\ng1,B\ng2,C\n,ignored")
    }

    #[test]
    fn first_seen_key_order() {
        let grouped = group_by_key(sample(), "game_id");
        assert_eq!(grouped.order, vec!["g2", "g1"]);
        assert_eq!(grouped.get("g2").len(), 2);
        assert_eq!(grouped.get("g2")[0].get("team"), "A");
        assert_eq!(grouped.get("g2")[1].get("team"), "C");
    }

    #[test]
    fn empty_keys_excluded() {
        let grouped = group_by_key(sample(), "game_id");
        assert_eq!(grouped.by_key.len(), 2);
    }

    #[test]
    fn first_wins_vs_keep_all() {
        let first = index_by_key(sample(), "game_id", IndexPolicy::FirstWins);
        assert_eq!(first["g2"].len(), 1);
        assert_eq!(first["g2"][0].get("team"), "A");

        let all = index_by_key(sample(), "game_id", IndexPolicy::KeepAll);
        assert_eq!(all["g2"].len(), 2);
    }

    #[test]
    fn time_conversion() {
        assert_eq!(time_to_minutes("1:00 PM"), 780);
        assert_eq!(time_to_minutes("12:00 AM"), 0);
        assert_eq!(time_to_minutes("12:30 PM"), 750);
        assert_eq!(time_to_minutes("7:05 pm"), 1145);
        assert_eq!(time_to_minutes("2:00PM"), 840);
        assert_eq!(time_to_minutes("14:30"), 0);
        assert_eq!(time_to_minutes("garbage"), 0);
        assert_eq!(time_to_minutes(""), 0);
    }

    #[test]
    fn sort_by_time_is_stable_for_missing_times() {
        let mut grouped = GroupedRows::default();
        grouped.order = vec!["late".into(), "unknown_a".into(), "early".into(), "unknown_b".into()];
        let mut times = HashMap::new();
        times.insert("late".to_string(), "9:30 PM".to_string());
        times.insert("early".to_string(), "12:05 PM".to_string());

        grouped.sort_by_time(&times);
        assert_eq!(grouped.order, vec!["unknown_a", "unknown_b", "early", "late"]);
    }
}
