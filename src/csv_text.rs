use std::collections::HashMap;

/// One parsed CSV data row, keyed by header name. Values are trimmed; a
/// lookup for a header the row did not carry yields `""`.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }
}

impl FromIterator<(String, String)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Record {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Split raw CSV text into rows of untrimmed fields.
///
/// Character scan with a quoted-field state: a doubled quote inside quotes
/// emits one literal quote, an unpaired quote toggles the state, commas and
/// newlines are structural only outside quotes. CRLF and lone CR are
/// normalized to LF before scanning. An unterminated quote is closed
/// implicitly at end of input and the accumulated text is kept.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = normalized.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                row.push(std::mem::take(&mut field));
            }
            '\n' if !in_quotes => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    // Flush a trailing field/row when the input does not end in a newline.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/// Parse CSV text into header-keyed records.
///
/// The first row is the header (BOM stripped from its first cell, every
/// cell trimmed). Data rows consisting of a single empty field are skipped
/// as blank lines. Fields beyond the header count are ignored; missing
/// fields resolve to the empty string.
pub fn parse_records(text: &str) -> Vec<Record> {
    let rows = parse_rows(text);
    let Some((header_row, data_rows)) = rows.split_first() else {
        return Vec::new();
    };

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 {
                h.strip_prefix('\u{feff}').unwrap_or(h)
            } else {
                h.as_str()
            };
            h.trim().to_string()
        })
        .collect();

    let mut records = Vec::with_capacity(data_rows.len());
    for values in data_rows {
        if values.len() == 1 && values[0].trim().is_empty() {
            continue;
        }
        let record = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = values.get(i).map(String::as_str).unwrap_or("");
                (header.clone(), value.trim().to_string())
            })
            .collect();
        records.push(record);
    }

    records
}

/// Serialize rows to CSV text with LF line endings. Fields containing a
/// comma or a quote are wrapped in quotes with internal quotes doubled, so
/// the output round-trips through `parse_records`.
pub fn write_csv(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|h| escape_field(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        lines.push(
            row.iter()
                .map(|f| escape_field(f))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
