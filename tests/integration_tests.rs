// Integration tests for the native-mode line processor.
//
// Each case feeds an ordered notepad into `evaluate_native` and checks the
// full record sequence, so positional alignment is asserted everywhere.

use linecalc::{evaluate_native, LineRecord, Value};

fn num(n: f64) -> LineRecord {
    LineRecord::Value(Value::Float(n))
}

fn text(s: &str) -> LineRecord {
    LineRecord::Value(Value::Str(s.to_string()))
}

fn boolean(b: bool) -> LineRecord {
    LineRecord::Value(Value::Bool(b))
}

fn err(msg: &str) -> LineRecord {
    LineRecord::Error(msg.to_string())
}

fn check(name: &str, input: &[&str], expected: &[LineRecord]) {
    let records = evaluate_native(input);
    assert_eq!(
        records.len(),
        input.len(),
        "case '{}': output length must equal input length",
        name
    );
    assert_eq!(records, expected, "case '{}': input {:?}", name, input);
}

#[test]
fn blank_and_whitespace_lines() {
    check("empty input", &[], &[]);
    check("single blank", &[""], &[LineRecord::Blank]);
    check(
        "whitespace only",
        &["   ", "\t"],
        &[LineRecord::Blank, LineRecord::Blank],
    );
    check(
        "blank between expressions",
        &["1 + 1", "", "2 + 2"],
        &[num(2.0), LineRecord::Blank, num(4.0)],
    );
}

#[test]
fn comments_are_stripped() {
    check("whole-line comment", &["// just a note"], &[LineRecord::Blank]);
    check("trailing comment", &["5 + 5 // ten"], &[num(10.0)]);
    check(
        "comment after assignment",
        &["x = 2 // two", "x * 3"],
        &[num(2.0), num(6.0)],
    );
    // The marker is honored even inside string literals, leaving an
    // unterminated string behind.
    check("comment inside string", &["\"a//b\""], &[err("Unterminated string")]);
}

#[test]
fn arithmetic_and_precedence() {
    check("addition", &["3 + 4"], &[num(7.0)]);
    check("precedence", &["2 + 3 * 4"], &[num(14.0)]);
    check("grouping", &["(2 + 3) * 4"], &[num(20.0)]);
    check("caret exponent", &["2^3"], &[num(8.0)]);
    check("double-star exponent", &["2**3"], &[num(8.0)]);
    check("exponent right assoc", &["2^3^2"], &[num(512.0)]);
    check("exponent binds over unary", &["-2^2"], &[num(-4.0)]);
    check("negative exponent", &["2^-1"], &[num(0.5)]);
    check("modulo", &["7 % 3"], &[num(1.0)]);
    check("float literals", &["1.5 * 2"], &[num(3.0)]);
}

#[test]
fn division_by_zero_is_infinity() {
    // IEEE semantics: this engine never raises a division error.
    check("one over zero", &["1/0"], &[num(f64::INFINITY)]);
    check("negative over zero", &["-1/0"], &[num(f64::NEG_INFINITY)]);

    let records = evaluate_native(&["0/0"]);
    match &records[0] {
        LineRecord::Value(Value::Float(f)) => assert!(f.is_nan()),
        other => panic!("expected NaN record, got {:?}", other),
    }
    assert_eq!(records[0].to_string(), "NaN");
    assert_eq!(evaluate_native(&["1/0"])[0].to_string(), "Infinity");
}

#[test]
fn variables_persist_within_a_batch() {
    check("assign then use", &["x = 5", "x + 3"], &[num(5.0), num(8.0)]);
    check(
        "reassignment",
        &["x = 1", "x = x + 1", "x"],
        &[num(1.0), num(2.0), num(2.0)],
    );
    check(
        "several variables",
        &["a = 2", "b = 3", "a * b"],
        &[num(2.0), num(3.0), num(6.0)],
    );
}

#[test]
fn store_is_fresh_per_batch() {
    check("assign in first batch", &["x = 5"], &[num(5.0)]);
    check(
        "second batch does not see it",
        &["x + 1"],
        &[err("Undefined variable or function")],
    );
}

#[test]
fn last_result_chaining() {
    check("last after expression", &["3 + 4", "last * 2"], &[num(7.0), num(14.0)]);
    check("last after assignment", &["x = 6", "last / 2"], &[num(6.0), num(3.0)]);
    check("initial last is zero", &["last"], &[num(0.0)]);
    check(
        "blank lines leave last alone",
        &["3 + 4", "", "last"],
        &[num(7.0), LineRecord::Blank, num(7.0)],
    );
    check(
        "failed lines leave last alone",
        &["3 + 4", "nope + 1", "last"],
        &[num(7.0), err("Undefined variable or function"), num(7.0)],
    );
    check(
        "user variable shadows last",
        &["3 + 4", "last = 100", "last"],
        &[num(7.0), num(100.0), num(100.0)],
    );
}

#[test]
fn string_values_round_trip() {
    check(
        "string variable stays a string",
        &["s = \"ab\"", "s + \"c\""],
        &[text("ab"), text("abc")],
    );
    check("single quotes", &["'hi'"], &[text("hi")]);
    check("number concatenation", &["\"a\" + 1"], &[text("a1")]);
    check(
        "string in later arithmetic",
        &["s = \"ab\"", "s + \"c\"", "last + \"!\""],
        &[text("ab"), text("abc"), text("abc!")],
    );
}

#[test]
fn builtin_functions() {
    check("abs", &["abs(-5)"], &[num(5.0)]);
    check("sqrt", &["sqrt(16)"], &[num(4.0)]);
    check("log is base ten", &["log(100)"], &[num(2.0)]);
    check("ln is natural", &["ln(1)"], &[num(0.0)]);
    check("exp at zero", &["exp(0)"], &[num(1.0)]);
    check("sin at zero", &["sin(0)"], &[num(0.0)]);
    check("nested call", &["sqrt(abs(-16))"], &[num(4.0)]);
    check("call with expression argument", &["x = 9", "sqrt(x)"], &[num(9.0), num(3.0)]);
}

#[test]
fn comparisons() {
    check("less than", &["2 < 3"], &[boolean(true)]);
    check("equality", &["2 + 2 == 4"], &[boolean(true)]);
    check("inequality", &["1 != 1"], &[boolean(false)]);
    check("string equality", &["\"a\" == \"a\""], &[boolean(true)]);
}

#[test]
fn error_classification() {
    check(
        "undefined variable",
        &["y + 1"],
        &[err("Undefined variable or function")],
    );
    check(
        "undefined function",
        &["frobnicate(1)"],
        &[err("Undefined variable or function")],
    );
    check(
        "variable is not callable",
        &["x = 5", "x(2)"],
        &[num(5.0), err("Not a function")],
    );
    check("unbalanced paren", &["1 + )"], &[err("Syntax error")]);
    check("bad token", &["1 @ 2"], &[err("Syntax error")]);
    // Raw messages without a table entry pass through truncated.
    check("dangling operator", &["1 +"], &[err("Unexpected end of input")]);
}

#[test]
fn error_messages_stay_short() {
    let failing = [
        "1 + )",
        "1 +",
        "y + 1",
        "frobnicate(1)",
        "\"unterminated",
        "1 @ 2",
    ];
    for line in failing {
        let records = evaluate_native(&[line]);
        match &records[0] {
            LineRecord::Error(msg) => assert!(
                msg.chars().count() <= 53,
                "message too long for {:?}: {:?}",
                line,
                msg
            ),
            other => panic!("expected error for {:?}, got {:?}", line, other),
        }
    }
}

#[test]
fn records_render_like_the_host() {
    assert_eq!(evaluate_native(&["8.0"])[0].to_string(), "8");
    assert_eq!(evaluate_native(&["0.5"])[0].to_string(), "0.5");
    assert_eq!(evaluate_native(&["2 < 3"])[0].to_string(), "true");
    assert_eq!(evaluate_native(&["[1, 2]"])[0].to_string(), "1,2");
    assert_eq!(evaluate_native(&[""])[0].to_string(), "");
}
