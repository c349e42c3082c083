//! Date helper functions

use anyhow::{anyhow, Result};
use chrono::{DateTime, Locale, Utc};
use chrono_tz::Tz;

use crate::config::SiteConfig;

/// Formats publication timestamps for display in the site's locale and timezone
#[derive(Debug, Clone)]
pub struct DateFormatter {
    locale: Locale,
    timezone: Tz,
    date_format: String,
    datetime_format: String,
}

impl DateFormatter {
    /// Create a formatter from date-fns style patterns
    pub fn new(locale: Locale, timezone: Tz, date_pattern: &str, datetime_pattern: &str) -> Self {
        Self {
            locale,
            timezone,
            date_format: date_fns_to_chrono_format(date_pattern),
            datetime_format: date_fns_to_chrono_format(datetime_pattern),
        }
    }

    /// Build the formatter described by the site configuration
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let locale = locale_for(&config.language)
            .ok_or_else(|| anyhow!("Unsupported language: {}", config.language))?;
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|e| anyhow!("Invalid timezone {:?}: {}", config.timezone, e))?;

        Ok(Self::new(
            locale,
            timezone,
            &config.date_format,
            &config.datetime_format,
        ))
    }

    /// Format a publication date (e.g. "25 mar 2021")
    pub fn date(&self, date: &DateTime<Utc>) -> String {
        date.with_timezone(&self.timezone)
            .format_localized(&self.date_format, self.locale)
            .to_string()
    }

    /// Format a date with time (e.g. "25 mar 2021, às 16:25")
    pub fn datetime(&self, date: &DateTime<Utc>) -> String {
        date.with_timezone(&self.timezone)
            .format_localized(&self.datetime_format, self.locale)
            .to_string()
    }
}

/// Turns a publication timestamp into display text
pub trait FormatDate {
    fn format_date(&self, date: &DateTime<Utc>) -> String;
}

impl FormatDate for DateFormatter {
    fn format_date(&self, date: &DateTime<Utc>) -> String {
        self.date(date)
    }
}

/// Map a BCP 47 language tag to a chrono locale
pub fn locale_for(language: &str) -> Option<Locale> {
    match language.replace('_', "-").to_ascii_lowercase().as_str() {
        "pt-br" | "pt" => Some(Locale::pt_BR),
        "pt-pt" => Some(Locale::pt_PT),
        "en-us" | "en" => Some(Locale::en_US),
        "en-gb" => Some(Locale::en_GB),
        "es-es" | "es" => Some(Locale::es_ES),
        "fr-fr" | "fr" => Some(Locale::fr_FR),
        "de-de" | "de" => Some(Locale::de_DE),
        _ => None,
    }
}

/// Parse a CMS timestamp such as `2021-03-25T19:25:28+0000`
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Convert a date-fns format pattern to a chrono format string
///
/// Text between single quotes is copied literally and `''` stands for a
/// single quote. `kk` (hour 1-24) maps to `%H`.
fn date_fns_to_chrono_format(pattern: &str) -> String {
    // Longest tokens first so `MMM` wins over `MM`
    const TOKENS: [(&str, &str); 20] = [
        ("yyyy", "%Y"),
        ("yy", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("M", "%-m"),
        ("dd", "%d"),
        ("d", "%-d"),
        ("EEEE", "%A"),
        ("EEE", "%a"),
        ("HH", "%H"),
        ("H", "%-H"),
        ("kk", "%H"),
        ("hh", "%I"),
        ("h", "%-I"),
        ("mm", "%M"),
        ("m", "%-M"),
        ("ss", "%S"),
        ("s", "%-S"),
        ("a", "%p"),
    ];

    let mut result = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;

    while let Some(c) = rest.chars().next() {
        if c == '\'' {
            let body = &rest[1..];
            if let Some(after) = body.strip_prefix('\'') {
                result.push('\'');
                rest = after;
                continue;
            }

            let mut literal = String::new();
            let mut consumed = body.len();
            let mut chars = body.char_indices().peekable();
            while let Some((i, ch)) = chars.next() {
                if ch == '\'' {
                    if matches!(chars.peek(), Some((_, '\''))) {
                        literal.push('\'');
                        chars.next();
                        continue;
                    }
                    consumed = i + 1;
                    break;
                }
                literal.push(ch);
            }

            push_literal(&mut result, &literal);
            rest = &body[consumed..];
            continue;
        }

        if let Some((token, strftime)) = TOKENS.iter().find(|(token, _)| rest.starts_with(token)) {
            result.push_str(strftime);
            rest = &rest[token.len()..];
            continue;
        }

        let mut buf = [0u8; 4];
        push_literal(&mut result, c.encode_utf8(&mut buf));
        rest = &rest[c.len_utf8()..];
    }

    result
}

fn push_literal(out: &mut String, literal: &str) {
    for c in literal.chars() {
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
    }
}
