use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::tle::error::TleError;
use crate::tle::types::TleElements;

const LINE_LENGTH: usize = 69;

/// Parse an unnamed element set.
pub fn parse(line1: &str, line2: &str) -> Result<TleElements, TleError> {
    parse_with_name(None, line1, line2)
}

/// Parse an element set, attaching the optional title line.
pub fn parse_with_name(
    name: Option<String>,
    line1: &str,
    line2: &str,
) -> Result<TleElements, TleError> {
    let line1 = validate_line(line1, '1')?;
    let line2 = validate_line(line2, '2')?;

    let norad_id = column(line1, 3, 7).trim().to_string();
    let norad_id_2 = column(line2, 3, 7).trim();
    if norad_id.is_empty() {
        return Err(TleError::malformed("line 1: missing catalog number"));
    }
    if norad_id != norad_id_2 {
        return Err(TleError::malformed(format!(
            "catalog number mismatch: {} vs {}",
            norad_id, norad_id_2
        )));
    }

    let classification = column(line1, 8, 8).chars().next().unwrap_or('U');
    let international_designator = column(line1, 10, 17).trim().to_string();

    let epoch_year: u32 = parse_number(column(line1, 19, 20), "epoch year")?;
    let epoch_day: f64 = parse_number(column(line1, 21, 32), "epoch day")?;
    let epoch = decode_epoch(epoch_year, epoch_day)?;

    let mean_motion_dot: f64 = parse_number(column(line1, 34, 43), "mean motion derivative")?;
    let mean_motion_ddot = parse_assumed_decimal(column(line1, 45, 52), "mean motion second derivative")?;
    let bstar = parse_assumed_decimal(column(line1, 54, 61), "B* drag term")?;
    let element_set_number = parse_optional_count(column(line1, 65, 68), "element set number")?;

    let inclination_deg: f64 = parse_number(column(line2, 9, 16), "inclination")?;
    let right_ascension_deg: f64 = parse_number(column(line2, 18, 25), "right ascension")?;
    let eccentricity = parse_implied_fraction(column(line2, 27, 33), "eccentricity")?;
    let argument_of_perigee_deg: f64 = parse_number(column(line2, 35, 42), "argument of perigee")?;
    let mean_anomaly_deg: f64 = parse_number(column(line2, 44, 51), "mean anomaly")?;
    let mean_motion: f64 = parse_number(column(line2, 53, 63), "mean motion")?;
    let revolution_number = parse_optional_count(column(line2, 64, 68), "revolution number")?;

    if !(0.0..1.0).contains(&eccentricity) {
        return Err(TleError::malformed(format!(
            "eccentricity {} outside [0, 1)",
            eccentricity
        )));
    }
    if mean_motion <= 0.0 || !mean_motion.is_finite() {
        return Err(TleError::malformed(format!(
            "mean motion {} must be positive",
            mean_motion
        )));
    }
    if !(0.0..=180.0).contains(&inclination_deg) {
        return Err(TleError::malformed(format!(
            "inclination {} outside [0, 180]",
            inclination_deg
        )));
    }

    Ok(TleElements {
        name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        norad_id,
        classification,
        international_designator,
        epoch,
        mean_motion_dot,
        mean_motion_ddot,
        bstar,
        element_set_number,
        inclination_deg,
        right_ascension_deg,
        eccentricity,
        argument_of_perigee_deg,
        mean_anomaly_deg,
        mean_motion,
        revolution_number,
        line1: line1.to_string(),
        line2: line2.to_string(),
    })
}

/// One element set located in a text file, borrowed from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TleRecord<'a> {
    pub name: Option<&'a str>,
    pub line1: &'a str,
    pub line2: &'a str,
    /// 1-based line number of `line1` in the source text
    pub line_number: usize,
}

impl TleRecord<'_> {
    pub fn parse(&self) -> Result<TleElements, TleError> {
        parse_with_name(self.name.map(str::to_string), self.line1, self.line2)
    }
}

/// Locate every element set in `content`. A title line directly before a
/// line 1 names that record (a leading `0 ` is dropped); a line 1 without a
/// following line 2 and any other stray text are skipped.
pub fn read_records(content: &str) -> Vec<TleRecord<'_>> {
    let mut records = Vec::new();
    let mut title: Option<&str> = None;
    let mut pending: Option<(usize, &str)> = None;

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("1 ") {
            pending = Some((index + 1, line));
        } else if line.starts_with("2 ") {
            if let Some((line_number, line1)) = pending.take() {
                records.push(TleRecord {
                    name: title.take(),
                    line1,
                    line2: line,
                    line_number,
                });
            }
            title = None;
        } else {
            let name = line.strip_prefix("0 ").unwrap_or(line).trim();
            title = Some(name);
            pending = None;
        }
    }

    records
}

/// Modulo-10 checksum over the first 68 columns: digits count their value,
/// minus signs count one, everything else zero.
pub fn checksum(line: &str) -> u32 {
    line.chars()
        .take(LINE_LENGTH - 1)
        .map(|c| match c {
            '0'..='9' => c as u32 - '0' as u32,
            '-' => 1,
            _ => 0,
        })
        .sum::<u32>()
        % 10
}

fn validate_line(line: &str, number: char) -> Result<&str, TleError> {
    let line = line.trim_end();
    if !line.is_ascii() {
        return Err(TleError::malformed(format!(
            "line {}: non-ASCII characters",
            number
        )));
    }
    if line.len() != LINE_LENGTH {
        return Err(TleError::malformed(format!(
            "line {}: expected {} columns, found {}",
            number,
            LINE_LENGTH,
            line.len()
        )));
    }
    if !line.starts_with(number) || line.as_bytes()[1] != b' ' {
        return Err(TleError::malformed(format!(
            "line {}: bad line number",
            number
        )));
    }

    let expected = line[LINE_LENGTH - 1..]
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| TleError::malformed(format!("line {}: missing checksum digit", number)))?;
    let actual = checksum(line);
    if expected != actual {
        return Err(TleError::malformed(format!(
            "line {}: checksum mismatch (expected {}, computed {})",
            number, expected, actual
        )));
    }

    Ok(line)
}

/// Fixed-width column slice, 1-indexed and inclusive as in the format
/// documentation. Lines are validated ASCII and full length beforehand.
fn column(line: &str, start: usize, end: usize) -> &str {
    &line[start - 1..end]
}

fn parse_number<T: std::str::FromStr>(field: &str, what: &str) -> Result<T, TleError> {
    let trimmed = field.trim();
    if trimmed.is_empty() || trimmed.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(TleError::malformed(format!(
            "{}: not numeric: {:?}",
            what, field
        )));
    }
    trimmed
        .parse()
        .map_err(|_| TleError::malformed(format!("{}: not numeric: {:?}", what, field)))
}

fn parse_optional_count(field: &str, what: &str) -> Result<u32, TleError> {
    if field.trim().is_empty() {
        Ok(0)
    } else {
        parse_number(field, what)
    }
}

/// Fields like eccentricity carry an implied leading "0.".
fn parse_implied_fraction(field: &str, what: &str) -> Result<f64, TleError> {
    let digits = field.trim();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(TleError::malformed(format!(
            "{}: not numeric: {:?}",
            what, field
        )));
    }
    parse_number(&format!("0.{}", digits), what)
}

/// Decode the compact exponent notation, e.g. ` 10000-3` => 0.10000e-3.
fn parse_assumed_decimal(field: &str, what: &str) -> Result<f64, TleError> {
    let s = field.trim();
    if s.is_empty() {
        return Ok(0.0);
    }

    let (sign, body) = match s.as_bytes()[0] {
        b'-' => (-1.0, &s[1..]),
        b'+' => (1.0, &s[1..]),
        _ => (1.0, s),
    };

    let split = body
        .rfind(['-', '+'])
        .ok_or_else(|| TleError::malformed(format!("{}: missing exponent: {:?}", what, field)))?;
    let (mantissa, exponent) = body.split_at(split);

    let mantissa = parse_implied_fraction(mantissa, what)?;
    let exponent: i32 = parse_number(exponent, what)?;

    Ok(sign * mantissa * 10f64.powi(exponent))
}

/// Two-digit years below 57 belong to the 2000s.
fn decode_epoch(year: u32, day_of_year: f64) -> Result<DateTime<Utc>, TleError> {
    let year = if year < 57 { 2000 + year } else { 1900 + year } as i32;
    if !(1.0..367.0).contains(&day_of_year) {
        return Err(TleError::malformed(format!(
            "epoch day {} out of range",
            day_of_year
        )));
    }

    let start_of_year = Utc
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| TleError::malformed(format!("invalid epoch year {}", year)))?;
    let offset_ns = ((day_of_year - 1.0) * 86_400e9).round() as i64;

    Ok(start_of_year + Duration::nanoseconds(offset_ns))
}
