use chrono::{NaiveDateTime, Timelike};

use crate::markets::LiveEventData;

pub fn format_odds(odds: i32) -> String {
    if odds > 0 {
        format!("+{odds}")
    } else {
        odds.to_string()
    }
}

pub fn format_line(line: f64) -> String {
    let text = if line.fract() == 0.0 {
        format!("{}", line.abs() as i64)
    } else {
        format!("{:.1}", line.abs())
    };
    if line > 0.0 {
        format!("+{text}")
    } else if line < 0.0 {
        format!("-{text}")
    } else {
        text
    }
}

/// Six-pack cell text. Totals read "O 47.5" / "U 47.5" by side.
pub fn format_six_pack_cell(column: &str, side: usize, line: Option<f64>, odds: i32) -> String {
    let odds = format_odds(odds);
    match line {
        Some(line) if column.to_ascii_lowercase().contains("total") => {
            let prefix = if side == 0 { "O" } else { "U" };
            format!("{prefix} {} {odds}", format_line(line).trim_start_matches('+'))
        }
        Some(line) => format!("{} {odds}", format_line(line)),
        None => odds,
    }
}

/// "12:05 - Q3"; hockey counts periods, baseball shows no period.
pub fn game_clock(sport: &str, live: &LiveEventData) -> String {
    let mut out = format!("{}:{:02}", live.clock_minutes, live.clock_seconds);
    let sport = sport.to_ascii_lowercase();
    if sport != "baseball" {
        let prefix = if sport.contains("hockey") { "P" } else { "Q" };
        out.push_str(&format!(" - {prefix}{}", live.period));
    }
    out
}

pub fn parse_start_time(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ];
    let cleaned = raw.trim().trim_end_matches('Z');
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(cleaned, fmt).ok())
}

/// "7PM 10.19.26" on the hour, "7:30PM 10.19.26" otherwise.
pub fn kickoff_label(raw: &str) -> String {
    let Some(dt) = parse_start_time(raw) else {
        return if raw.trim().is_empty() {
            "TBD".to_string()
        } else {
            raw.trim().to_string()
        };
    };
    let fmt = if dt.minute() == 0 {
        "%-I%p %m.%d.%y"
    } else {
        "%-I:%M%p %m.%d.%y"
    };
    dt.format(fmt).to_string()
}

/// Falls back to initials for multi-word names, or the first three letters.
pub fn abbreviate_team(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let abbr: String = if words.len() > 1 {
        words
            .iter()
            .filter_map(|w| w.chars().find(|c| c.is_ascii_alphanumeric()))
            .take(3)
            .collect()
    } else {
        name.chars()
            .filter(|c| c.is_ascii_alphabetic())
            .take(3)
            .collect()
    };
    if abbr.is_empty() {
        "TBD".to_string()
    } else {
        abbr.to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::{format_line, parse_start_time};

    #[test]
    fn whole_lines_drop_the_decimal() {
        assert_eq!(format_line(3.0), "+3");
        assert_eq!(format_line(-1.5), "-1.5");
        assert_eq!(format_line(0.0), "0");
    }

    #[test]
    fn start_time_accepts_zulu_suffix() {
        assert!(parse_start_time("2026-10-19T19:30:00Z").is_some());
        assert!(parse_start_time("not a time").is_none());
    }
}
