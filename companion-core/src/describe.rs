//! Structured metadata embedded in task descriptions.
//!
//! Observed description shape, one field per line:
//!
//! ```text
//! 🏥 with Dr. Smith
//! 📍 Clinic
//! Follow-up
//! ```
//!
//! Render layers should not re-parse free text; this extracts the companion
//! ("with X") and location ("📍 ...") lines once.

use regex::Regex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionMeta {
    /// Who the visit/appointment is with.
    pub companion: Option<String>,
    /// Location line, marker stripped.
    pub location: Option<String>,
}

/// Pull companion and location out of a description. Total: anything that
/// doesn't match simply yields `None` fields.
pub fn parse_description(description: &str) -> DescriptionMeta {
    DescriptionMeta {
        companion: capture(r"(?im)\bwith\s+([^\n]+)", description),
        location: capture(r"(?m)^\s*📍\s*(\S[^\n]*)", description),
    }
}

fn capture(pattern: &str, text: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    let m = re.captures(text)?;
    Some(m.get(1)?.as_str().trim().to_string())
}
