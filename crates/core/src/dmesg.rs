//! Rewrite Android kernel-log timestamps into human-readable datetimes.
//!
//! `adb shell dmesg` stamps lines with seconds-since-boot. Combining the
//! device's current wall-clock time with its uptime gives the boot instant,
//! after which each line's relative stamp can be rewritten absolutely.

use std::env;
use std::fs;

use chrono::{Duration, NaiveDateTime};
use regex::Regex;
use thiserror::Error;

use crate::invoke::{adb_device_args, adb_path, InvokeError, ToolInvoker};

/// Test fakes for the three adb invocations (uptime, date, dmesg).
pub const FAKE_UPTIME_ENV: &str = "LMTOOL_FAKE_UPTIME";
pub const FAKE_DATE_ENV: &str = "LMTOOL_FAKE_DATE";
pub const FAKE_DMESG_ENV: &str = "LMTOOL_FAKE_DMESG";

/// Format requested from the device and used for rewritten stamps.
const DEVICE_DATE_FORMAT: &str = "%Y:%m:%d:%H:%M:%S";
const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum DmesgError {
    #[error("unable to interpret device uptime output {0:?}")]
    BadUptime(String),
    #[error("unable to interpret device date output {0:?}")]
    BadDate(String),
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

/// `<pri>[  123.456789] message` and the bare `[  123.456789] message` form
/// some devices emit.
fn dmesg_line_regexes() -> &'static [Regex; 2] {
    static RES: std::sync::OnceLock<[Regex; 2]> = std::sync::OnceLock::new();
    RES.get_or_init(|| {
        [
            Regex::new(r"^<\d+>\[\s*(?P<secs>\d+)\.(?P<frac>\d+)\](?P<line>.*)$").unwrap(),
            Regex::new(r"^\[\s*(?P<secs>\d+)\.(?P<frac>\d+)\](?P<line>.*)$").unwrap(),
        ]
    })
}

/// The device's boot instant, derived from its wall clock and uptime.
#[derive(Debug, Clone, Copy)]
pub struct BootClock {
    boot: NaiveDateTime,
}

impl BootClock {
    /// Build from raw device output: the first line of `cat /proc/uptime`
    /// and the output of `date '+%Y:%m:%d:%H:%M:%S'`.
    pub fn from_device_output(uptime: &str, date: &str) -> Result<Self, DmesgError> {
        let uptime_field = uptime
            .split_whitespace()
            .next()
            .ok_or_else(|| DmesgError::BadUptime(uptime.to_string()))?;
        let uptime_secs = parse_fractional_secs(uptime_field)
            .ok_or_else(|| DmesgError::BadUptime(uptime.to_string()))?;

        let date_line = date.trim();
        let now = NaiveDateTime::parse_from_str(date_line, DEVICE_DATE_FORMAT)
            .map_err(|_| DmesgError::BadDate(date.to_string()))?;

        Ok(Self { boot: now - uptime_secs })
    }

    /// Rewrite one dmesg line. Returns `None` for lines that carry no
    /// recognizable timestamp.
    pub fn rewrite_line(&self, line: &str) -> Option<String> {
        let caps = dmesg_line_regexes().iter().find_map(|re| re.captures(line))?;
        let secs: i64 = caps["secs"].parse().ok()?;
        let micros = frac_to_micros(&caps["frac"]);
        let stamp = self.boot + Duration::seconds(secs) + Duration::microseconds(micros);
        Some(format!("[{}]{}", stamp.format(OUTPUT_FORMAT), &caps["line"]))
    }
}

/// Parse `"123.456"` into a chrono duration.
fn parse_fractional_secs(field: &str) -> Option<Duration> {
    let (secs, frac) = match field.split_once('.') {
        Some((s, f)) => (s, f),
        None => (field, "0"),
    };
    let secs: i64 = secs.parse().ok()?;
    if !frac.chars().all(|c| c.is_ascii_digit()) || frac.is_empty() {
        return None;
    }
    Some(Duration::seconds(secs) + Duration::microseconds(frac_to_micros(frac)))
}

/// Interpret a fractional-seconds field as microseconds, whatever its
/// printed precision.
fn frac_to_micros(frac: &str) -> i64 {
    let mut digits: String = frac.chars().take(6).collect();
    while digits.len() < 6 {
        digits.push('0');
    }
    digits.parse().unwrap_or(0)
}

fn adb_output(invoker: &ToolInvoker, shell_cmd: &[&str]) -> Result<String, InvokeError> {
    let adb = adb_path();
    let mut args = adb_device_args();
    args.push("shell".to_string());
    args.extend(shell_cmd.iter().map(|s| s.to_string()));
    invoker.run(adb.as_os_str(), args)
}

fn fake_or_adb(
    invoker: &ToolInvoker,
    fake_env: &str,
    shell_cmd: &[&str],
) -> Result<String, DmesgError> {
    if let Some(fake) = env::var_os(fake_env) {
        return fs::read_to_string(&fake).map_err(|source| {
            DmesgError::Invoke(InvokeError::Io { tool: format!("{fake_env} fake"), source })
        });
    }
    Ok(adb_output(invoker, shell_cmd)?)
}

/// Full pipeline: query the device, then rewrite every dmesg line.
///
/// Unmatched lines are passed through unchanged after a warning, matching
/// the tolerant-parser contract of the other tools.
pub fn rewritten_dmesg(invoker: &ToolInvoker) -> Result<Vec<String>, DmesgError> {
    let uptime = fake_or_adb(invoker, FAKE_UPTIME_ENV, &["cat", "/proc/uptime"])?;
    let date = fake_or_adb(invoker, FAKE_DATE_ENV, &["date", "'+%Y:%m:%d:%H:%M:%S'"])?;
    let clock = BootClock::from_device_output(&uptime, &date)?;

    let dmesg = fake_or_adb(invoker, FAKE_DMESG_ENV, &["dmesg"])?;
    let mut out = Vec::new();
    for line in dmesg.lines() {
        if line.is_empty() {
            continue;
        }
        match clock.rewrite_line(line) {
            Some(rewritten) => out.push(rewritten),
            None => {
                tracing::warn!("unmatched dmesg line: {}", line);
                out.push(line.to_string());
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> BootClock {
        // Device reports 2026-03-01 12:00:00 with an uptime of 100.5s, so
        // boot was at 11:58:19.5.
        BootClock::from_device_output("100.5 350.2\n", "2026:03:01:12:00:00\n").expect("clock")
    }

    #[test]
    fn rewrites_priority_prefixed_line() {
        let line = "<6>[  100.500000] usb 1-1: new device";
        let out = clock().rewrite_line(line).expect("should match");
        assert_eq!(out, "[2026-03-01 12:00:00] usb 1-1: new device");
    }

    #[test]
    fn rewrites_bare_timestamp_line() {
        let line = "[    0.000000] Booting Linux";
        let out = clock().rewrite_line(line).expect("should match");
        assert_eq!(out, "[2026-03-01 11:58:19] Booting Linux");
    }

    #[test]
    fn unstamped_line_is_not_matched() {
        assert!(clock().rewrite_line("no timestamp here").is_none());
    }

    #[test]
    fn bad_device_date_is_an_error() {
        let err = BootClock::from_device_output("100.0", "gibberish").unwrap_err();
        assert!(matches!(err, DmesgError::BadDate(_)));
    }

    #[test]
    fn bad_uptime_is_an_error() {
        let err =
            BootClock::from_device_output("", "2026:03:01:12:00:00").unwrap_err();
        assert!(matches!(err, DmesgError::BadUptime(_)));
    }
}
