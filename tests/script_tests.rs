// Session and script-runtime tests: mode switching, memoized initialization,
// persistent namespace, and the python-equivalent engine's semantics.

use linecalc::{EvalMode, LineRecord, Session, Value};
use std::sync::Arc;

fn int(n: i64) -> LineRecord {
    LineRecord::Value(Value::Int(n))
}

fn float(n: f64) -> LineRecord {
    LineRecord::Value(Value::Float(n))
}

fn text(s: &str) -> LineRecord {
    LineRecord::Value(Value::Str(s.to_string()))
}

fn err(msg: &str) -> LineRecord {
    LineRecord::Error(msg.to_string())
}

async fn script_session() -> Session {
    let session = Session::new();
    session
        .set_mode(EvalMode::SCRIPT_TOKEN)
        .await
        .expect("script mode should initialize");
    session
}

async fn eval(session: &Session, input: &[&str]) -> Vec<LineRecord> {
    let records = session.evaluate(input).await.expect("evaluation runs");
    assert_eq!(records.len(), input.len(), "output must align with input");
    records
}

#[tokio::test]
async fn mode_tokens_are_exact() {
    let session = Session::new();
    assert_eq!(session.mode(), "javascript-equivalent");

    session.set_mode("python-equivalent").await.unwrap();
    assert_eq!(session.mode(), "python-equivalent");

    session.set_mode("javascript-equivalent").await.unwrap();
    assert_eq!(session.mode(), "javascript-equivalent");
}

#[tokio::test]
async fn invalid_mode_token_is_rejected() {
    let session = Session::new();
    let result = session.set_mode("perl-equivalent").await;
    assert!(result.is_err());
    // A rejected switch leaves the mode untouched.
    assert_eq!(session.mode(), "javascript-equivalent");
    assert!(session.runtime_handle().is_none());
}

#[tokio::test]
async fn concurrent_switches_initialize_once() {
    let session = Session::new();
    let (first, second) = tokio::join!(
        session.set_mode(EvalMode::SCRIPT_TOKEN),
        session.set_mode(EvalMode::SCRIPT_TOKEN),
    );
    first.unwrap();
    second.unwrap();

    let a = session.ensure_runtime().await.unwrap();
    let b = session.ensure_runtime().await.unwrap();
    assert!(Arc::ptr_eq(&a, &b), "runtime handle must be memoized");
}

#[tokio::test]
async fn runtime_survives_switching_back_and_forth() {
    let session = script_session().await;
    eval(&session, &["x = 41"]).await;

    session.set_mode(EvalMode::NATIVE_TOKEN).await.unwrap();
    session.set_mode(EvalMode::SCRIPT_TOKEN).await.unwrap();

    assert_eq!(eval(&session, &["x + 1"]).await, vec![int(42)]);
}

#[tokio::test]
async fn namespace_persists_across_batches() {
    let session = script_session().await;
    assert_eq!(eval(&session, &["x = 5"]).await, vec![int(5)]);
    assert_eq!(eval(&session, &["x + 3"]).await, vec![int(8)]);
}

#[tokio::test]
async fn integer_arithmetic_stays_integral() {
    let session = script_session().await;
    assert_eq!(
        eval(&session, &["2 + 3", "2 * 3", "7 % 3", "2^10"]).await,
        vec![int(5), int(6), int(1), int(1024)]
    );
}

#[tokio::test]
async fn true_division_produces_floats() {
    let session = script_session().await;
    assert_eq!(eval(&session, &["1/2"]).await, vec![float(0.5)]);
    // Integral quotients normalize back to integers.
    assert_eq!(eval(&session, &["10/5"]).await, vec![int(2)]);
}

#[tokio::test]
async fn division_by_zero_is_an_error() {
    let session = script_session().await;
    assert_eq!(eval(&session, &["1/0"]).await, vec![err("Division by zero")]);
    assert_eq!(eval(&session, &["1 % 0"]).await, vec![err("Division by zero")]);
    assert_eq!(eval(&session, &["1.0/0"]).await, vec![err("Division by zero")]);
}

#[tokio::test]
async fn results_are_normalized() {
    let session = script_session().await;
    // Rounded to at most ten fractional digits.
    assert_eq!(eval(&session, &["0.1 + 0.2"]).await, vec![float(0.3)]);
    // Integral floats come back as integers.
    assert_eq!(eval(&session, &["2.0 * 2"]).await, vec![int(4)]);
    // Booleans and lists render through the runtime's own conversion.
    assert_eq!(eval(&session, &["2 < 3"]).await, vec![text("True")]);
    assert_eq!(eval(&session, &["[1, 2] + [3]"]).await, vec![text("[1, 2, 3]")]);
}

#[tokio::test]
async fn last_chaining_in_the_runtime() {
    let session = script_session().await;
    assert_eq!(
        eval(&session, &["3 + 4", "last * 2"]).await,
        vec![int(7), int(14)]
    );

    // The runtime's own `last` global mirrors the newest success.
    let runtime = session.runtime_handle().unwrap();
    assert_eq!(runtime.global("last"), Some(Value::Int(14)));

    // Failed lines do not advance it.
    assert_eq!(
        eval(&session, &["2 + 2", "1/0", "last"]).await,
        vec![int(4), err("Division by zero"), int(4)]
    );
}

#[tokio::test]
async fn string_values_round_trip() {
    let session = script_session().await;
    assert_eq!(
        eval(&session, &["s = \"ab\"", "s + \"c\""]).await,
        vec![text("ab"), text("abc")]
    );
    assert_eq!(eval(&session, &["'ab' * 3"]).await, vec![text("ababab")]);
}

#[tokio::test]
async fn script_error_vocabulary_is_classified() {
    let session = script_session().await;
    assert_eq!(
        eval(&session, &["y + 1"]).await,
        vec![err("Undefined variable or function")]
    );
    assert_eq!(eval(&session, &["sqrt(-1)"]).await, vec![err("Invalid value")]);
    assert_eq!(eval(&session, &["'a' - 1"]).await, vec![err("Type error")]);
    assert_eq!(
        eval(&session, &["'ab' * 1.5"]).await,
        vec![err("Type mismatch in operation")]
    );
    assert_eq!(
        eval(&session, &["n = 3", "n(2)"]).await,
        vec![int(3), err("Not a function")]
    );
    assert_eq!(eval(&session, &["1 + )"]).await, vec![err("Syntax error")]);
}

#[tokio::test]
async fn math_members_are_unqualified_runtime_flavor() {
    let session = script_session().await;
    // `log` is natural here and `ln` does not exist — deliberately different
    // from the native engine's table.
    assert_eq!(eval(&session, &["log10(100)"]).await, vec![int(2)]);
    assert_eq!(
        eval(&session, &["ln(1)"]).await,
        vec![err("Undefined variable or function")]
    );
    assert_eq!(eval(&session, &["floor(2.7)"]).await, vec![int(2)]);
    assert_eq!(eval(&session, &["abs(-5)"]).await, vec![int(5)]);
}

#[tokio::test]
async fn blank_lines_and_comments_in_script_mode() {
    let session = script_session().await;
    assert_eq!(
        eval(&session, &["", "1 + 1 // two", "// note"]).await,
        vec![LineRecord::Blank, int(2), LineRecord::Blank]
    );
}

#[tokio::test]
async fn error_messages_stay_short_in_script_mode() {
    let session = script_session().await;
    let failing = ["1/0", "y + 1", "'a' - 1", "1 + )", "sqrt(-1)", "'ab' * 1.5"];
    for line in failing {
        let records = eval(&session, &[line]).await;
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
