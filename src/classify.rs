//! Maps raw engine error text to a small stable set of user-facing
//! categories. The tables are ordered and first-match-wins; reordering them
//! changes observable behavior.

use crate::session::EvalMode;

const MAX_MESSAGE_LEN: usize = 50;

/// Native engine rules: substrings of the host's own error vocabulary.
const NATIVE_RULES: &[(&[&str], &str)] = &[
    (&["Unexpected token"], "Syntax error"),
    (&["is not defined"], "Undefined variable or function"),
    // Covers both "property" and "properties" spellings.
    (&["Cannot read propert"], "Invalid property access"),
    (&["is not a function"], "Not a function"),
    (&["Maximum call stack size exceeded"], "Infinite recursion detected"),
    (&["Division by zero"], "Division by zero"),
];

/// Script runtime rules: error-kind prefixes, with the two compound
/// `TypeError` rows ahead of the generic one.
const SCRIPT_RULES: &[(&[&str], &str)] = &[
    (&["SyntaxError"], "Syntax error"),
    (&["NameError"], "Undefined variable or function"),
    (&["TypeError", "not callable"], "Not a function"),
    (&["TypeError", "can't multiply"], "Type mismatch in operation"),
    (&["TypeError"], "Type error"),
    (&["ValueError"], "Invalid value"),
    (&["ZeroDivisionError"], "Division by zero"),
    (&["IndexError"], "Index out of range"),
    (&["AttributeError"], "Invalid attribute"),
    (&["UnboundLocalError"], "Variable used before assignment"),
    (&["IndentationError"], "Indentation error"),
    (&["RecursionError"], "Maximum recursion depth exceeded"),
];

/// Classifies a raw error message into a short user-facing one. Every result
/// is at most 53 characters (50 plus an ellipsis).
pub fn classify(raw: &str, mode: EvalMode) -> String {
    let rules = match mode {
        EvalMode::Native => NATIVE_RULES,
        EvalMode::Script => SCRIPT_RULES,
    };

    for (needles, short) in rules {
        if needles.iter().all(|needle| raw.contains(needle)) {
            return (*short).to_string();
        }
    }

    if mode == EvalMode::Script {
        if let Some(message) = extract_kind_message(raw) {
            return truncate(message);
        }
    }

    truncate(raw)
}

/// Pulls the message portion out of an `<ErrorKind>: <message>` shaped string.
fn extract_kind_message(raw: &str) -> Option<&str> {
    let (kind, message) = raw.split_once(": ")?;
    if kind.is_empty() || !kind.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(message)
}

fn truncate(message: &str) -> String {
    if message.chars().count() <= MAX_MESSAGE_LEN {
        message.to_string()
    } else {
        let cut: String = message.chars().take(MAX_MESSAGE_LEN).collect();
        format!("{}...", cut)
    }
}
