//! Duration flags: `500ms`, `10s`, `2m`, `1h`, or a bare number of seconds.

use std::time::Duration;

pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let (num, unit_ms) = if let Some(v) = s.strip_suffix("ms") {
        (v, 1u64)
    } else if let Some(v) = s.strip_suffix('s') {
        (v, 1_000)
    } else if let Some(v) = s.strip_suffix('m') {
        (v, 60_000)
    } else if let Some(v) = s.strip_suffix('h') {
        (v, 3_600_000)
    } else {
        (s, 1_000)
    };
    let num = num.trim();
    let invalid = || format!("invalid duration {:?} (expected e.g. 500ms, 10s, 2m, 1h)", s);

    if let Ok(n) = num.parse::<u64>() {
        return n
            .checked_mul(unit_ms)
            .map(Duration::from_millis)
            .ok_or_else(invalid);
    }
    let value: f64 = num.parse().map_err(|_| invalid())?;
    Duration::try_from_secs_f64(value * unit_ms as f64 / 1_000.0).map_err(|_| invalid())
}
