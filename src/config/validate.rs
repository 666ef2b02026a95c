//! Configuration validation with unknown field detection.

use serde_json::{Map, Value};

/// Known top-level config field names.
const KNOWN_TOP_LEVEL: &[&str] = &["window", "agent", "logging"];

/// Known fields for each section. Nested as section.field.
const KNOWN_WINDOW: &[&str] = &["size"];
const KNOWN_AGENT: &[&str] = &["system_prompt"];
const KNOWN_LOGGING: &[&str] = &["format", "level", "file"];

const KNOWN_LOG_FORMATS: &[&str] = &["pretty", "component", "json"];

/// A validation diagnostic.
#[derive(Debug)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub path: String,
    pub message: String,
}

#[derive(Debug, PartialEq)]
pub enum DiagnosticLevel {
    Ok,
    Warn,
    Error,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            DiagnosticLevel::Ok => "[OK]",
            DiagnosticLevel::Warn => "[WARN]",
            DiagnosticLevel::Error => "[ERROR]",
        };
        if self.path.is_empty() {
            write!(f, "{} {}", prefix, self.message)
        } else {
            write!(f, "{} {}: {}", prefix, self.path, self.message)
        }
    }
}

/// Simple Levenshtein distance for "did you mean?" suggestions.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Suggest the closest known field name (if distance <= 3).
pub fn suggest_field(unknown: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .map(|k| (k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(k, _)| format!("did you mean '{}'?", k))
}

/// Report every key of `obj` that is not in `known`. Returns true if any
/// unknown key was found.
fn check_fields(
    obj: &Map<String, Value>,
    known: &[&str],
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let mut has_unknown = false;
    for key in obj.keys() {
        if known.contains(&key.as_str()) {
            continue;
        }
        has_unknown = true;
        let msg = match suggest_field(key, known) {
            Some(suggestion) => format!("Unknown field '{}', {}", key, suggestion),
            None => format!("Unknown field '{}'", key),
        };
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        diagnostics.push(Diagnostic::new(DiagnosticLevel::Error, path, msg));
    }
    has_unknown
}

/// Validate a raw JSON config value against known field names.
pub fn validate_config(raw: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match raw.as_object() {
        Some(o) => o,
        None => {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                "",
                "Config must be a JSON object",
            ));
            return diagnostics;
        }
    };

    diagnostics.push(Diagnostic::new(DiagnosticLevel::Ok, "", "Valid JSON"));

    let mut has_unknown = check_fields(obj, KNOWN_TOP_LEVEL, "", &mut diagnostics);
    for (section, known) in [
        ("window", KNOWN_WINDOW),
        ("agent", KNOWN_AGENT),
        ("logging", KNOWN_LOGGING),
    ] {
        match obj.get(section) {
            Some(Value::Object(fields)) => {
                has_unknown |= check_fields(fields, known, section, &mut diagnostics);
            }
            Some(_) => diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                section,
                "Section must be a JSON object",
            )),
            None => {}
        }
    }

    if !has_unknown {
        diagnostics.push(Diagnostic::new(
            DiagnosticLevel::Ok,
            "",
            "All fields recognized",
        ));
    }

    // Value checks
    if let Some(size) = obj.get("window").and_then(|w| w.get("size")) {
        match size.as_u64() {
            Some(0) => diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Warn,
                "window.size",
                "Zero keeps only the most recent safe message",
            )),
            Some(_) => {}
            None => diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                "window.size",
                "Must be a non-negative integer",
            )),
        }
    }

    if let Some(format) = obj.get("logging").and_then(|l| l.get("format")) {
        let valid = format
            .as_str()
            .is_some_and(|f| KNOWN_LOG_FORMATS.contains(&f));
        if !valid {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                "logging.format",
                format!("Must be one of {}", KNOWN_LOG_FORMATS.join(", ")),
            ));
        }
    }

    if let Some(prompt) = obj.get("agent").and_then(|a| a.get("system_prompt")) {
        if prompt.as_str().is_some_and(|p| p.trim().is_empty()) {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Warn,
                "agent.system_prompt",
                "Empty, conversations will start without a system turn",
            ));
        }
    }

    diagnostics
}
