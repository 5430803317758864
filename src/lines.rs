use crate::classify::classify;
use crate::error::EngineError;
use crate::native;
use crate::parser;
use crate::script::ScriptRuntime;
use crate::session::EvalMode;
use crate::value::{LineRecord, Value};
use std::collections::HashMap;

/// The line processor: comment stripping, blank detection, assignment
/// classification, and per-line dispatch to an engine. Both engines see the
/// same pre-processing, so their grammars stay aligned.

/// Everything from the first `//` to the end of the line is discarded,
/// including inside string literals.
pub fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Splits `identifier = rhs` on the first `=`, provided the line starts with
/// an identifier and the `=` is not part of `==`. Returns `None` for
/// expression lines.
pub fn split_assignment(text: &str) -> Option<(&str, &str)> {
    let mut iter = text.char_indices();
    let (_, first) = iter.next()?;
    if !first.is_alphabetic() && first != '_' {
        return None;
    }

    let mut name_end = text.len();
    for (idx, c) in iter {
        if !c.is_alphanumeric() && c != '_' {
            name_end = idx;
            break;
        }
    }

    let rest = text[name_end..].trim_start();
    let mut rest_chars = rest.chars();
    if rest_chars.next() != Some('=') || rest_chars.next() == Some('=') {
        return None;
    }

    let eq_idx = text.len() - rest.len();
    Some((&text[..name_end], &text[eq_idx + 1..]))
}

/// Batch evaluation with the native engine: a fresh variable store per call,
/// `last` starting at 0. Output length always equals input length.
pub fn evaluate_native<S: AsRef<str>>(lines: &[S]) -> Vec<LineRecord> {
    let mut variables: HashMap<String, Value> = HashMap::new();
    let mut last = Value::Float(0.0);
    let mut records = Vec::with_capacity(lines.len());

    for line in lines {
        let text = strip_comment(line.as_ref()).trim();
        if text.is_empty() {
            records.push(LineRecord::Blank);
            continue;
        }

        let (target, expr_text) = match split_assignment(text) {
            Some((name, rhs)) => (Some(name), rhs.trim()),
            None => (None, text),
        };

        match eval_native_line(expr_text, &variables, &last) {
            Ok(value) => {
                if let Some(name) = target {
                    variables.insert(name.to_string(), value.clone());
                }
                last = value.clone();
                records.push(LineRecord::Value(value));
            }
            // A failed line leaves the store and `last` untouched.
            Err(err) => records.push(LineRecord::Error(classify(&err.message, EvalMode::Native))),
        }
    }

    records
}

/// One native line: parse, bind the store plus the implicit `last` (shadowed
/// by a user variable of that name), evaluate.
fn eval_native_line(
    text: &str,
    variables: &HashMap<String, Value>,
    last: &Value,
) -> Result<Value, EngineError> {
    let ast = parser::parse_source(text)?;
    let mut bindings = variables.clone();
    bindings
        .entry("last".to_string())
        .or_insert_with(|| last.clone());
    native::eval(&ast, &bindings)
}

/// Batch evaluation against a script runtime. Lines are awaited strictly in
/// order; the runtime owns the store and the `last` global.
pub async fn evaluate_script<S: AsRef<str>>(
    runtime: &ScriptRuntime,
    lines: &[S],
) -> Vec<LineRecord> {
    let mut records = Vec::with_capacity(lines.len());

    for line in lines {
        let text = strip_comment(line.as_ref()).trim();
        if text.is_empty() {
            records.push(LineRecord::Blank);
            continue;
        }

        let result = match split_assignment(text) {
            Some((name, rhs)) => runtime.eval_assignment(name, rhs.trim()).await,
            None => runtime.eval_expression(text).await,
        };

        match result {
            Ok(value) => records.push(LineRecord::Value(value)),
            Err(err) => records.push(LineRecord::Error(classify(&err.message, EvalMode::Script))),
        }
    }

    records
}
