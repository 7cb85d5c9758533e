// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Call duration codec.
//!
//! Operators type call lengths as `"M:SS"` (`"7:30"`); upstream stores whole
//! seconds. Every conversion between the two forms goes through this module.
//!
//! Accepted display form: 1-4 minute digits, a colon (optionally surrounded by
//! whitespace), then 0-59 seconds written with one or two digits. The whole
//! string is trimmed first. Raw non-negative numbers are taken as seconds and
//! floored.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde_json::Value;

static DISPLAY_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,4})\s*:\s*([0-5]?[0-9])$").expect("display form pattern is valid")
});

/// A call length in whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallDuration {
    seconds: u64,
}

/// The input did not match the `"M:SS"` display form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("call duration must look like M:SS with seconds below 60")]
pub struct InvalidDuration;

impl CallDuration {
    pub const ZERO: CallDuration = CallDuration { seconds: 0 };

    pub fn from_seconds(seconds: u64) -> Self {
        Self { seconds }
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Accepts a raw number of seconds. Negative and non-finite values are rejected.
    pub fn from_number(value: f64) -> Result<Self, InvalidDuration> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self::from_seconds(value.floor() as u64))
        } else {
            Err(InvalidDuration)
        }
    }

    /// Accepts either a JSON number of seconds or a display-form string.
    pub fn from_json(value: &Value) -> Result<Self, InvalidDuration> {
        match value {
            Value::Number(n) => n.as_f64().ok_or(InvalidDuration).and_then(Self::from_number),
            Value::String(s) => s.parse(),
            _ => Err(InvalidDuration),
        }
    }
}

impl FromStr for CallDuration {
    type Err = InvalidDuration;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = DISPLAY_FORM.captures(s.trim()).ok_or(InvalidDuration)?;
        let minutes: u64 = captures[1].parse().map_err(|_| InvalidDuration)?;
        let seconds: u64 = captures[2].parse().map_err(|_| InvalidDuration)?;
        Ok(Self::from_seconds(minutes * 60 + seconds))
    }
}

impl fmt::Display for CallDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.seconds / 60, self.seconds % 60)
    }
}

/// Display form to seconds. `None` for anything that is not `"M:SS"`.
pub fn parse(display: &str) -> Option<u64> {
    display.parse::<CallDuration>().ok().map(|d| d.seconds())
}

/// Seconds to `"M:SS"`.
pub fn format(seconds: u64) -> String {
    CallDuration::from_seconds(seconds).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_operator_examples() {
        assert_eq!(parse("7:30"), Some(450));
        assert_eq!(parse("0:00"), Some(0));
        assert_eq!(parse("5:15"), Some(315));
        assert_eq!(parse("12:5"), Some(725));
        assert_eq!(parse("9999:59"), Some(9999 * 60 + 59));
    }

    #[test]
    fn tolerates_surrounding_and_inner_whitespace() {
        assert_eq!(parse("  7:30 "), Some(450));
        assert_eq!(parse("7 : 30"), Some(450));
        assert_eq!(parse("\t1:05\n"), Some(65));
    }

    #[test]
    fn rejects_malformed_display_forms() {
        for input in [
            "7:60", "-1:00", "730", "", "   ", "a:10", "7:3a", "10000:00", "7:300", ":30", "7:",
            "1:2:3", "7.5:00",
        ] {
            assert_eq!(parse(input), None, "{input:?} should be rejected");
        }
    }

    #[test]
    fn accepts_raw_seconds_from_json() {
        assert_eq!(CallDuration::from_json(&json!(450)).unwrap().seconds(), 450);
        assert_eq!(CallDuration::from_json(&json!(12.9)).unwrap().seconds(), 12);
        assert_eq!(CallDuration::from_json(&json!(0)).unwrap().seconds(), 0);
        assert!(CallDuration::from_json(&json!(-1)).is_err());
        assert!(CallDuration::from_json(&json!(null)).is_err());
        assert!(CallDuration::from_json(&json!(true)).is_err());
        assert_eq!(CallDuration::from_json(&json!("7:30")).unwrap().seconds(), 450);
    }

    #[test]
    fn formats_with_padded_seconds() {
        assert_eq!(format(0), "0:00");
        assert_eq!(format(315), "5:15");
        assert_eq!(format(65), "1:05");
        assert_eq!(format(3600), "60:00");
    }

    #[test]
    fn display_form_round_trip_is_stable() {
        for minutes in [0u64, 1, 7, 59, 120, 9999] {
            for seconds in 0u64..60 {
                for display in [format!("{minutes}:{seconds}"), format!("{minutes}:{seconds:02}")] {
                    let first = parse(&display).expect("valid display form");
                    assert_eq!(parse(&format(first)), Some(first), "{display}");
                }
            }
        }
    }
}
