//! Accept/reject decision for a finished `obabel` process.
//!
//! `obabel` frequently exits with status 0 after converting nothing, so the
//! exit status alone cannot be trusted. The classifier checks the standard-error
//! text for the tool's failure sentinels first, and only then looks at how the
//! process terminated.

/// Printed when no input record could be converted.
pub const NO_CONVERSIONS: &str = "0 molecules converted";
/// Printed when the `-i` format is unknown or missing.
pub const UNREADABLE_FORMAT: &str = "obabel: cannot read input format!";

/// Standard-error texts that carry no information beyond "it worked".
const BENIGN_MESSAGES: [&str; 2] = ["1 molecule converted\n", "1 conversion succeeded"];

/// How the child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The process exited on its own, whatever its exit code.
    Normal { code: i32 },
    /// The process was killed by a signal or crashed.
    Abnormal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoConversions,
    UnreadableFormat,
    AbnormalExit,
    LaunchFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(Vec<u8>),
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    /// The captured standard output when accepted, empty bytes otherwise.
    pub fn into_output(self) -> Vec<u8> {
        match self {
            Outcome::Accepted(output) => output,
            Outcome::Rejected(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub outcome: Outcome,
    /// Standard-error text worth surfacing, independent of the outcome.
    pub diagnostic: Option<String>,
}

impl Verdict {
    /// Verdict for a process that could not be started or failed while running.
    pub fn launch_failure(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Rejected(Rejection::LaunchFailed),
            diagnostic: Some(message.into()),
        }
    }
}

pub fn classify(termination: Termination, stderr: &str, stdout: Vec<u8>) -> Verdict {
    let outcome = match rejection_reason(termination, stderr) {
        Some(rejection) => Outcome::Rejected(rejection),
        None => Outcome::Accepted(stdout),
    };
    Verdict {
        outcome,
        diagnostic: diagnostic(stderr),
    }
}

pub fn rejection_reason(termination: Termination, stderr: &str) -> Option<Rejection> {
    if contains_word(stderr, NO_CONVERSIONS) {
        Some(Rejection::NoConversions)
    } else if stderr.contains(UNREADABLE_FORMAT) {
        Some(Rejection::UnreadableFormat)
    } else if termination == Termination::Abnormal {
        Some(Rejection::AbnormalExit)
    } else {
        None
    }
}

/// Returns `stderr` unless it is empty or exactly one of the benign messages.
pub fn diagnostic(stderr: &str) -> Option<String> {
    if stderr.is_empty() || BENIGN_MESSAGES.contains(&stderr) {
        None
    } else {
        Some(stderr.to_string())
    }
}

// `needle` must not be glued to a word character on either side, so
// "10 molecules converted" does not count as a failure.
fn contains_word(haystack: &str, needle: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    haystack.match_indices(needle).any(|(pos, _)| {
        let before = haystack[..pos].chars().next_back();
        let after = haystack[pos + needle.len()..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    })
}
