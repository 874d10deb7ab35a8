//! Extraction of progress records from the `obabel --minimize` log.
//!
//! The minimiser writes its log to standard error. Two constructs matter:
//!
//! ```text
//! STEPS = 2500            <- declared once, followed by a blank line
//!
//! STEP n     E(n)       E(n-1)
//! ------------------------------------
//!     0      42.120      ----
//!    10      30.512     31.002
//! ```
//!
//! Both scanners take the whole accumulated buffer and re-scan it from the
//! start. Only complete lines are considered (a line must be preceded and
//! terminated by `\n`), so a record split across two stderr chunks is picked up
//! once its second half arrives.

const STEPS_MARKER: &str = "\nSTEPS = ";

/// One `<step> <energy> <previous energy>` row of the minimiser log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    pub step: u32,
    pub energy: f64,
    pub last_energy: f64,
}

/// Returns the first `STEPS = <n>` declaration in `buffer`.
///
/// The declaration must sit on its own line and be followed by an empty line;
/// a number that is still being streamed (no blank line yet) is not reported.
pub fn extract_max_steps(buffer: &str) -> Option<u32> {
    let mut rest = buffer;
    while let Some(pos) = rest.find(STEPS_MARKER) {
        let after = &rest[pos + STEPS_MARKER.len()..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0
            && after[digits..].starts_with("\n\n")
            && let Ok(steps) = after[..digits].parse()
        {
            return Some(steps);
        }
        rest = &rest[pos + 1..];
    }
    None
}

/// Returns the last complete step record in `buffer`, if any.
pub fn extract_latest_step(buffer: &str) -> Option<StepRecord> {
    let start = buffer.find('\n')?;
    let end = buffer.rfind('\n')?;
    if end <= start {
        return None;
    }
    buffer[start + 1..end].rsplit('\n').find_map(parse_step_line)
}

fn parse_step_line(line: &str) -> Option<StepRecord> {
    let mut fields = line.trim_end_matches('\r').split_ascii_whitespace();
    let (step, energy, last_energy) = (fields.next()?, fields.next()?, fields.next()?);
    if fields.next().is_some() || !step.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // An all-digit step only fails to parse on overflow; the row still counts.
    Some(StepRecord {
        step: step.parse().unwrap_or(u32::MAX),
        energy: parse_energy(energy)?,
        last_energy: parse_energy(last_energy)?,
    })
}

// A field of sign/digit/period characters that is not a number (the `----`
// placeholder on the first row) reads as zero.
fn parse_energy(field: &str) -> Option<f64> {
    if !field.bytes().all(|b| b.is_ascii_digit() || b == b'-' || b == b'.') {
        return None;
    }
    Some(field.parse().unwrap_or(0.0))
}
