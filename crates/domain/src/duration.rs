use thiserror::Error;

const MAX_DURATION_MINUTES: i64 = 24 * 60;

#[derive(Error, Debug, PartialEq)]
#[error("Invalid duration: `{0}`")]
pub struct InvalidDuration(pub String);

/// Formats minutes as a human readable duration, e.g. `1 hour, 15 minutes`
pub fn format_duration(minutes: i64) -> String {
    let hours = minutes / 60;
    let minutes = minutes % 60;

    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("{} {}", n, unit)
        } else {
            format!("{} {}s", n, unit)
        }
    };

    match (hours, minutes) {
        (0, m) => plural(m, "minute"),
        (h, 0) => plural(h, "hour"),
        (h, m) => format!("{}, {}", plural(h, "hour"), plural(m, "minute")),
    }
}

/// Parses durations such as `75 minutes`, `1 hour, 15 minutes`, `1.5 hours` or `90min`
/// into minutes.
pub fn parse_duration(duration: &str) -> Result<i64, InvalidDuration> {
    let invalid = || InvalidDuration(duration.to_string());

    // Separate glued numbers and units like `90min`
    let mut spaced = String::with_capacity(duration.len() + 4);
    let mut prev_is_digit = false;
    for c in duration.to_lowercase().chars() {
        if c.is_alphabetic() && prev_is_digit {
            spaced.push(' ');
        }
        prev_is_digit = c.is_ascii_digit() || c == '.';
        spaced.push(if c == ',' { ' ' } else { c });
    }

    let mut total_minutes = 0.0;
    let mut pending_amount: Option<f64> = None;
    for token in spaced.split_whitespace() {
        if let Ok(amount) = token.parse::<f64>() {
            if pending_amount.is_some() || amount < 0.0 {
                return Err(invalid());
            }
            pending_amount = Some(amount);
            continue;
        }
        let factor = match token {
            "h" | "hr" | "hrs" | "hour" | "hours" => 60.0,
            "m" | "min" | "mins" | "minute" | "minutes" => 1.0,
            "and" => continue,
            _ => return Err(invalid()),
        };
        let amount = pending_amount.take().ok_or_else(invalid)?;
        total_minutes += amount * factor;
    }

    // A bare number is read as minutes
    if let Some(amount) = pending_amount {
        total_minutes += amount;
    }

    let total_minutes = total_minutes.round() as i64;
    if total_minutes <= 0 || total_minutes > MAX_DURATION_MINUTES {
        return Err(invalid());
    }
    Ok(total_minutes)
}
