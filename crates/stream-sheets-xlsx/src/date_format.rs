//! Rendering dates with Excel number format codes

use chrono::NaiveDateTime;

use crate::styles::is_elapsed_marker;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Year(usize),
    /// `m` run that is not yet known to be a month or minutes
    MonthOrMinute(usize),
    Month(usize),
    Minute(usize),
    Day(usize),
    Hour(usize),
    Second(usize),
    AmPm,
    ElapsedHours,
    ElapsedMinutes,
    ElapsedSeconds,
}

/// A parsed Excel date/time format code (`yyyy-mm-dd h:mm AM/PM`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcelDateFormat {
    tokens: Vec<Token>,
    twelve_hour: bool,
}

impl ExcelDateFormat {
    /// Parse the first section of a format code
    pub fn parse(code: &str) -> Self {
        let mut tokens = Vec::new();
        let chars: Vec<char> = code.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                ';' => break,
                '"' => {
                    let literal: String =
                        chars[i + 1..].iter().take_while(|&&c| c != '"').collect();
                    i += literal.chars().count() + 2;
                    push_literal(&mut tokens, &literal);
                    continue;
                }
                '\\' => {
                    if let Some(&escaped) = chars.get(i + 1) {
                        push_literal(&mut tokens, &escaped.to_string());
                    }
                    i += 2;
                    continue;
                }
                // Padding and fill characters have no fixed width to render
                '_' | '*' => {
                    i += 2;
                    continue;
                }
                '[' => {
                    let section: String =
                        chars[i + 1..].iter().take_while(|&&c| c != ']').collect();
                    i += section.chars().count() + 2;
                    if is_elapsed_marker(&section) {
                        let unit = section.chars().next().map(|c| c.to_ascii_lowercase());
                        tokens.push(match unit {
                            Some('h') => Token::ElapsedHours,
                            Some('m') => Token::ElapsedMinutes,
                            _ => Token::ElapsedSeconds,
                        });
                    }
                    continue;
                }
                _ => {}
            }

            if starts_with_ignore_case(&chars[i..], "AM/PM") {
                tokens.push(Token::AmPm);
                i += 5;
                continue;
            }
            if starts_with_ignore_case(&chars[i..], "A/P") {
                tokens.push(Token::AmPm);
                i += 3;
                continue;
            }

            let lower = c.to_ascii_lowercase();
            if matches!(lower, 'y' | 'm' | 'd' | 'h' | 's') {
                let run = chars[i..]
                    .iter()
                    .take_while(|c| c.to_ascii_lowercase() == lower)
                    .count();
                i += run;
                tokens.push(match lower {
                    'y' => Token::Year(run),
                    'm' => Token::MonthOrMinute(run),
                    'd' => Token::Day(run),
                    'h' => Token::Hour(run),
                    _ => Token::Second(run),
                });
                // Fractions of seconds are not rendered
                if lower == 's' && chars.get(i) == Some(&'.') {
                    i += 1;
                    while chars.get(i) == Some(&'0') {
                        i += 1;
                    }
                }
                continue;
            }

            push_literal(&mut tokens, &c.to_string());
            i += 1;
        }

        resolve_minutes(&mut tokens);
        let twelve_hour = tokens.contains(&Token::AmPm);
        Self {
            tokens,
            twelve_hour,
        }
    }

    /// Equivalent `chrono` strftime pattern.
    ///
    /// Elapsed time markers become plain hours, minutes and seconds.
    pub fn to_strftime(&self) -> String {
        let mut pattern = String::new();
        for token in &self.tokens {
            match token {
                Token::ElapsedHours if self.twelve_hour => pattern.push_str("%I"),
                Token::ElapsedHours => pattern.push_str("%H"),
                Token::ElapsedMinutes => pattern.push_str("%M"),
                Token::ElapsedSeconds => pattern.push_str("%S"),
                other => pattern.push_str(&self.strftime_of(other)),
            }
        }
        pattern
    }

    /// Render `value`, whose Excel serial number is `serial`
    pub fn format(&self, value: &NaiveDateTime, serial: f64) -> String {
        let mut pattern = String::new();
        for token in &self.tokens {
            match token {
                Token::ElapsedHours => push_escaped(&mut pattern, &elapsed(serial, 24.0)),
                Token::ElapsedMinutes => push_escaped(&mut pattern, &elapsed(serial, 1440.0)),
                Token::ElapsedSeconds => push_escaped(&mut pattern, &elapsed(serial, 86_400.0)),
                other => pattern.push_str(&self.strftime_of(other)),
            }
        }
        value.format(&pattern).to_string()
    }

    fn strftime_of(&self, token: &Token) -> String {
        let pattern = match token {
            Token::Literal(text) => {
                let mut escaped = String::new();
                push_escaped(&mut escaped, text);
                return escaped;
            }
            Token::Year(n) if *n <= 2 => "%y",
            Token::Year(_) => "%Y",
            Token::Month(1) | Token::MonthOrMinute(1) => "%-m",
            Token::Month(2) | Token::MonthOrMinute(2) => "%m",
            Token::Month(3) | Token::MonthOrMinute(3) => "%b",
            Token::Month(_) | Token::MonthOrMinute(_) => "%B",
            Token::Minute(1) => "%-M",
            Token::Minute(_) => "%M",
            Token::Day(1) => "%-d",
            Token::Day(2) => "%d",
            Token::Day(3) => "%a",
            Token::Day(_) => "%A",
            Token::Hour(1) if self.twelve_hour => "%-I",
            Token::Hour(_) if self.twelve_hour => "%I",
            Token::Hour(1) => "%-H",
            Token::Hour(_) => "%H",
            Token::Second(1) => "%-S",
            Token::Second(_) => "%S",
            Token::AmPm => "%p",
            Token::ElapsedHours | Token::ElapsedMinutes | Token::ElapsedSeconds => "",
        };
        pattern.to_string()
    }
}

/// Render `value` with an Excel format code
pub fn format_excel_date(code: &str, value: &NaiveDateTime, serial: f64) -> String {
    ExcelDateFormat::parse(code).format(value, serial)
}

/// `m` and `mm` are minutes right after hours or right before seconds
fn resolve_minutes(tokens: &mut [Token]) {
    let is_time_part = |t: &Token| !matches!(t, Token::Literal(_) | Token::AmPm);
    for i in 0..tokens.len() {
        let run = match tokens[i] {
            Token::MonthOrMinute(run) => run,
            _ => continue,
        };
        let previous = tokens[..i].iter().rev().find(|t| is_time_part(*t));
        let next = tokens[i + 1..].iter().find(|t| is_time_part(*t));
        let after_hours = matches!(previous, Some(Token::Hour(_) | Token::ElapsedHours));
        let before_seconds = matches!(next, Some(Token::Second(_) | Token::ElapsedSeconds));

        tokens[i] = if run <= 2 && (after_hours || before_seconds) {
            Token::Minute(run)
        } else {
            Token::Month(run)
        };
    }
}

fn starts_with_ignore_case(chars: &[char], pattern: &str) -> bool {
    let mut rest = chars.iter();
    pattern
        .chars()
        .all(|p| matches!(rest.next(), Some(c) if c.eq_ignore_ascii_case(&p)))
}

fn push_literal(tokens: &mut Vec<Token>, text: &str) {
    if let Some(Token::Literal(previous)) = tokens.last_mut() {
        previous.push_str(text);
    } else {
        tokens.push(Token::Literal(text.to_string()));
    }
}

/// Append text to a strftime pattern, escaping `%`
fn push_escaped(pattern: &mut String, text: &str) {
    for c in text.chars() {
        if c == '%' {
            pattern.push_str("%%");
        } else {
            pattern.push(c);
        }
    }
}

fn elapsed(serial: f64, units_per_day: f64) -> String {
    format!("{}", (serial * units_per_day).floor() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 5, 9)
            .unwrap()
            .and_hms_opt(16, 7, 21)
            .unwrap()
    }

    fn strftime(code: &str) -> String {
        ExcelDateFormat::parse(code).to_strftime()
    }

    #[test]
    fn test_to_strftime() {
        assert_eq!(strftime("yyyy-mm-dd"), "%Y-%m-%d");
        assert_eq!(strftime("m/d/yy h:mm"), "%-m/%-d/%y %-H:%M");
        assert_eq!(strftime("h:mm:ss AM/PM"), "%-I:%M:%S %p");
        assert_eq!(strftime("dddd, mmmm d"), "%A, %B %-d");
        assert_eq!(strftime("mm:ss.0"), "%M:%S");
        assert_eq!(strftime("[$-409]d-mmm-yy;@"), "%-d-%b-%y");
        assert_eq!(strftime("yyyy\"年\"m\"月\""), "%Y年%-m月");
        assert_eq!(strftime("0%"), "0%%");
    }

    #[test]
    fn test_format() {
        let value = datetime();
        assert_eq!(format_excel_date("yyyy-mm-dd", &value, 42499.67), "2016-05-09");
        assert_eq!(format_excel_date("mm-dd-yy", &value, 42499.67), "05-09-16");
        assert_eq!(
            format_excel_date("d-mmm-yy h:mm AM/PM", &value, 42499.67),
            "9-May-16 4:07 PM"
        );
        assert_eq!(format_excel_date("hh:mm:ss", &value, 42499.67), "16:07:21");
    }

    #[test]
    fn test_elapsed_hours() {
        let value = NaiveDate::from_ymd_opt(1899, 12, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(format_excel_date("[h]:mm:ss", &value, 1.5), "36:00:00");
    }
}
