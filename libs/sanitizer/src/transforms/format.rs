//! Formatting transforms: truncation, masking, number and date formatting.
//! All of them map element-wise over arrays.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use serde_json::Value;

use super::{arg, as_number, map_scalars, map_strings};

const DEFAULT_LIMIT_END: &str = "...";
const DEFAULT_MASK_CHAR: char = '*';
const DEFAULT_DATE_FORMAT: &str = "Y-m-d";

const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
];

/// `limit:length[,end]` keeps the first `length` characters and appends
/// `end` (default `...`) when something was cut off.
pub fn limit(value: Value, args: &[String]) -> Value {
    let Some(length) = arg(args, 0).and_then(|raw| raw.parse::<usize>().ok()) else {
        return value;
    };
    let end = arg(args, 1).unwrap_or(DEFAULT_LIMIT_END);

    map_strings(value, &|s: &str| {
        if s.chars().count() <= length {
            return s.to_string();
        }
        let kept: String = s.chars().take(length).collect();
        format!("{}{}", kept.trim_end(), end)
    })
}

/// `mask[:char[,index[,length]]]` replaces a run of characters with `char`.
///
/// A negative `index` counts from the end of the string. Without `length`
/// the mask extends to the end.
pub fn mask(value: Value, args: &[String]) -> Value {
    let mask_char = arg(args, 0)
        .and_then(|raw| raw.chars().next())
        .unwrap_or(DEFAULT_MASK_CHAR);
    let index = arg(args, 1)
        .and_then(|raw| raw.parse::<i64>().ok())
        .unwrap_or(0);
    let length = arg(args, 2).and_then(|raw| raw.parse::<usize>().ok());

    map_strings(value, &|s: &str| {
        let total = s.chars().count();
        let start = if index < 0 {
            total.saturating_sub(index.unsigned_abs() as usize)
        } else {
            index as usize
        };
        if start >= total {
            return s.to_string();
        }
        let end = length.map_or(total, |len| start.saturating_add(len).min(total));

        s.chars()
            .enumerate()
            .map(|(pos, c)| if pos >= start && pos < end { mask_char } else { c })
            .collect()
    })
}

/// `number_format[:decimals[,dec_point[,thousands_sep]]]`.
///
/// Numbers and numeric strings become a formatted string. Rounding is half
/// away from zero on the shortest decimal form of the number, so `1.005`
/// rounds to `1.01` as written. Because `,` separates arguments, an explicit
/// empty `thousands_sep` disables grouping while an absent one defaults to `,`.
pub fn number_format(value: Value, args: &[String]) -> Value {
    let decimals = arg(args, 0)
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(0)
        .min(16);
    let dec_point = arg(args, 1).unwrap_or(".");
    let thousands_sep = arg(args, 2).unwrap_or(",");

    map_scalars(value, &|scalar: &Value| {
        let number = as_number(scalar)?;
        Some(Value::String(format_number(
            number,
            decimals,
            dec_point,
            thousands_sep,
        )))
    })
}

fn format_number(number: f64, decimals: usize, dec_point: &str, thousands_sep: &str) -> String {
    let (int_part, frac_part) = round_decimal(number.abs(), decimals);

    let mut grouped =
        String::with_capacity(int_part.len() + int_part.len() / 3 * thousands_sep.len());
    for (idx, digit) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push_str(thousands_sep);
        }
        grouped.push(digit);
    }

    let is_zero = int_part.chars().chain(frac_part.chars()).all(|c| c == '0');
    let mut out = String::new();
    if number < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&grouped);
    if decimals > 0 {
        out.push_str(dec_point);
        out.push_str(&frac_part);
    }
    out
}

/// Splits a finite, non-negative `number` into integer and fractional digits,
/// rounded to `decimals` places.
///
/// Works on the decimal digits of the shortest round-tripping representation,
/// so no scaling multiplication can overflow or pick up binary error.
fn round_decimal(number: f64, decimals: usize) -> (String, String) {
    let repr = number.to_string();
    let (int_digits, frac_digits) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    if frac_digits.len() <= decimals {
        return (int_digits.to_string(), format!("{frac_digits:0<decimals$}"));
    }

    let mut digits: Vec<u8> = int_digits
        .bytes()
        .chain(frac_digits.bytes().take(decimals))
        .collect();
    if frac_digits.as_bytes()[decimals] >= b'5' {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - decimals;
    let int_part = digits[..split].iter().map(|&b| char::from(b)).collect();
    let frac_part = digits[split..].iter().map(|&b| char::from(b)).collect();
    (int_part, frac_part)
}

/// `date[:format]` parses a date or datetime and re-emits it with a PHP-style
/// format string (default `Y-m-d`).
///
/// Arguments are re-joined with `", "`, so a format such as `F j, Y`
/// survives the argument split. Unparseable input passes through.
pub fn date(value: Value, args: &[String]) -> Value {
    let format = if args.is_empty() {
        DEFAULT_DATE_FORMAT.to_string()
    } else {
        args.join(", ")
    };

    map_scalars(value, &|scalar: &Value| {
        let parsed = parse_datetime(scalar)?;
        Some(Value::String(format_php(&parsed, &format)))
    })
}

fn parse_datetime(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|utc| utc.fixed_offset()),
        Value::String(s) => parse_datetime_str(s.trim()),
        _ => None,
    }
}

fn parse_datetime_str(input: &str) -> Option<DateTime<FixedOffset>> {
    if input.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(input) {
        return Some(parsed);
    }

    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DATE_INPUT_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Renders `dt` using PHP `date()` format characters. A backslash escapes the
/// following character; unknown characters are copied verbatim.
pub fn format_php(dt: &DateTime<FixedOffset>, format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            'd' => out.push_str(&format!("{:02}", dt.day())),
            'D' => out.push_str(&dt.format("%a").to_string()),
            'j' => out.push_str(&dt.day().to_string()),
            'l' => out.push_str(&dt.format("%A").to_string()),
            'N' => out.push_str(&dt.weekday().number_from_monday().to_string()),
            'S' => out.push_str(ordinal_suffix(dt.day())),
            'w' => out.push_str(&dt.weekday().num_days_from_sunday().to_string()),
            'z' => out.push_str(&dt.ordinal0().to_string()),
            'W' => out.push_str(&format!("{:02}", dt.iso_week().week())),
            'F' => out.push_str(&dt.format("%B").to_string()),
            'm' => out.push_str(&format!("{:02}", dt.month())),
            'M' => out.push_str(&dt.format("%b").to_string()),
            'n' => out.push_str(&dt.month().to_string()),
            't' => out.push_str(&days_in_month(dt.year(), dt.month()).to_string()),
            'L' => out.push(if is_leap_year(dt.year()) { '1' } else { '0' }),
            'Y' => out.push_str(&dt.year().to_string()),
            'y' => out.push_str(&format!("{:02}", dt.year().rem_euclid(100))),
            'a' => out.push_str(if dt.hour() < 12 { "am" } else { "pm" }),
            'A' => out.push_str(if dt.hour() < 12 { "AM" } else { "PM" }),
            'g' => out.push_str(&dt.hour12().1.to_string()),
            'G' => out.push_str(&dt.hour().to_string()),
            'h' => out.push_str(&format!("{:02}", dt.hour12().1)),
            'H' => out.push_str(&format!("{:02}", dt.hour())),
            'i' => out.push_str(&format!("{:02}", dt.minute())),
            's' => out.push_str(&format!("{:02}", dt.second())),
            'u' => out.push_str(&format!("{:06}", dt.timestamp_subsec_micros())),
            'v' => out.push_str(&format!("{:03}", dt.timestamp_subsec_millis())),
            'O' => out.push_str(&dt.format("%z").to_string()),
            'P' => out.push_str(&dt.format("%:z").to_string()),
            'c' => out.push_str(&format_php(dt, "Y-m-d\\TH:i:sP")),
            'r' => out.push_str(&format_php(dt, "D, d M Y H:i:s O")),
            'U' => out.push_str(&dt.timestamp().to_string()),
            other => out.push(other),
        }
    }

    out
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_limit() {
        assert_eq!(limit(json!("Hello world"), &args(&["5"])), json!("Hello..."));
        assert_eq!(
            limit(json!("Hello world"), &args(&["6", " [more]"])),
            json!("Hello [more]")
        );
        assert_eq!(limit(json!("Hi"), &args(&["5"])), json!("Hi"));
        assert_eq!(limit(json!("Hello"), &args(&["3", ""])), json!("Hel"));
    }

    #[test]
    fn test_limit_without_length_passes_through() {
        assert_eq!(limit(json!("Hello world"), &[]), json!("Hello world"));
        assert_eq!(limit(json!("Hello world"), &args(&["many"])), json!("Hello world"));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask(json!("secret"), &[]), json!("******"));
        assert_eq!(
            mask(json!("4111111111111111"), &args(&["#", "0", "12"])),
            json!("############1111")
        );
        assert_eq!(
            mask(json!("john@example.com"), &args(&["*", "-11"])),
            json!("john@***********")
        );
        assert_eq!(mask(json!("abc"), &args(&["*", "5"])), json!("abc"));
    }

    #[test]
    fn test_number_format() {
        assert_eq!(number_format(json!(1234567.891), &args(&["2"])), json!("1,234,567.89"));
        assert_eq!(number_format(json!("1234.5"), &[]), json!("1,235"));
        assert_eq!(number_format(json!(-1234.567), &args(&["3"])), json!("-1,234.567"));
        assert_eq!(
            number_format(json!(1234.5), &args(&["2", ",", "."])),
            json!("1.234,50")
        );
        assert_eq!(number_format(json!(1234.5), &args(&["1", ".", ""])), json!("1234.5"));
        assert_eq!(number_format(json!(999), &[]), json!("999"));
        assert_eq!(number_format(json!("n/a"), &args(&["2"])), json!("n/a"));
    }

    #[test]
    fn test_number_format_rounds_decimal_form() {
        assert_eq!(number_format(json!(1.005), &args(&["2"])), json!("1.01"));
        assert_eq!(number_format(json!(2.5), &[]), json!("3"));
        assert_eq!(number_format(json!(-2.5), &[]), json!("-3"));
        assert_eq!(number_format(json!(9.995), &args(&["2"])), json!("10.00"));
        assert_eq!(number_format(json!(999999.5), &[]), json!("1,000,000"));
        assert_eq!(number_format(json!(-0.004), &args(&["2"])), json!("0.00"));
        assert_eq!(number_format(json!(0.1), &args(&["3"])), json!("0.100"));
    }

    #[test]
    fn test_number_format_huge_values() {
        let formatted = number_format(json!(1e300), &args(&["16", ".", ""]));
        let expected = format!("1{}.{}", "0".repeat(300), "0".repeat(16));
        assert_eq!(formatted, json!(expected));

        let grouped = number_format(json!(-1.5e20), &[]);
        assert_eq!(grouped, json!("-150,000,000,000,000,000,000"));
    }

    #[test]
    fn test_number_format_array() {
        assert_eq!(number_format(json!([1000, "x"]), &[]), json!(["1,000", "x"]));
    }

    #[test]
    fn test_date_reformat() {
        assert_eq!(date(json!("2024-03-05"), &args(&["m/d/Y"])), json!("03/05/2024"));
        assert_eq!(date(json!("03/05/2024"), &[]), json!("2024-03-05"));
        assert_eq!(
            date(json!("2024-03-05 14:07:09"), &args(&["D, jS F Y g:i A"])),
            json!("Tue, 5th March 2024 2:07 PM")
        );
        assert_eq!(
            date(json!("2024-03-05T14:07:09+02:00"), &args(&["H:i P"])),
            json!("14:07 +02:00")
        );
    }

    #[test]
    fn test_date_format_with_comma_and_escape() {
        assert_eq!(date(json!("2024-02-01"), &args(&["F j", "Y"])), json!("February 1, 2024"));
        assert_eq!(date(json!("2024-02-01"), &args(&["\\Y\\e\\a\\r: Y"])), json!("Year: 2024"));
        assert_eq!(date(json!("2024-02-01"), &args(&["t L"])), json!("29 1"));
    }

    #[test]
    fn test_date_from_timestamp() {
        assert_eq!(date(json!(0), &args(&["Y-m-d H:i:s"])), json!("1970-01-01 00:00:00"));
    }

    #[test]
    fn test_date_composite_formats() {
        let stamp = json!("2024-03-05T14:07:09+02:00");
        assert_eq!(date(stamp.clone(), &args(&["c"])), json!("2024-03-05T14:07:09+02:00"));
        assert_eq!(date(stamp.clone(), &args(&["r"])), json!("Tue, 05 Mar 2024 14:07:09 +0200"));
        assert_eq!(date(stamp, &args(&["U"])), json!("1709640429"));
    }

    #[test]
    fn test_date_extreme_timestamps() {
        let every_char = "d D j l N S w z W F m M n t L Y y a A g G h H i s u v O P c r U";
        for timestamp in [400_000_000_000i64, -100_000_000_000, 8_000_000_000_000] {
            let formatted = date(json!(timestamp), &args(&[every_char]));
            assert!(formatted.is_string(), "{timestamp} gave {formatted}");

            let rfc = date(json!(timestamp), &args(&["r"]));
            let year = date(json!(timestamp), &args(&["Y"]));
            let year = year.as_str().unwrap().to_string();
            assert!(rfc.as_str().unwrap().contains(&year), "{rfc} lacks {year}");
            assert_eq!(date(json!(timestamp), &args(&["U"])), json!(timestamp.to_string()));
        }

        assert_eq!(date(json!(400_000_000_000i64), &args(&["Y"])), json!("14645"));
    }

    #[test]
    fn test_date_timestamp_out_of_range_passes_through() {
        assert_eq!(date(json!(i64::MAX), &args(&["r"])), json!(i64::MAX));
    }

    #[test]
    fn test_date_malformed_passes_through() {
        assert_eq!(date(json!("not a date"), &[]), json!("not a date"));
        assert_eq!(date(json!(""), &[]), json!(""));
        assert_eq!(date(json!(true), &[]), json!(true));
    }

    #[test]
    fn test_ordinal_suffix() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(12), "th");
        assert_eq!(ordinal_suffix(22), "nd");
        assert_eq!(ordinal_suffix(23), "rd");
        assert_eq!(ordinal_suffix(31), "st");
    }
}
