use crate::export;
use crate::lexer::Lexer;
use crate::native;
use crate::parser::Parser;
use crate::session::Session;
use crate::value::Value;
use anyhow::Result;
use std::collections::HashMap;

/// Batch notepad evaluation: reads the source as ordered lines, evaluates
/// them in one session batch, and prints one record per line. With `output`,
/// the rendered records are also saved as `<output>.txt`.
pub async fn run(source: &str, mode: &str, output: Option<&str>) -> Result<()> {
    let session = Session::new();
    session.set_mode(mode).await?;

    let input: Vec<&str> = source.lines().collect();
    let records = session.evaluate(&input).await?;

    let mut rendered = String::new();
    for record in &records {
        let line = record.to_string();
        println!("{}", line);
        rendered.push_str(&line);
        rendered.push('\n');
    }

    if let Some(filename) = output {
        let path = export::save_as_file(&rendered, filename, None)?;
        eprintln!("Saved results to {}", path.display());
    }

    Ok(())
}

/// Evaluates a single expression with the native engine, reporting failures
/// as span diagnostics against the given text.
pub fn run_expression(source: &str) {
    // Lexical analysis
    let mut lexer = Lexer::new(source.to_string());
    let tokens = match lexer.scan_tokens() {
        Ok(tokens) => tokens,
        Err(error) => {
            error.report(source, None);
            return;
        }
    };

    // Parsing
    let mut parser = Parser::new(tokens);
    let expr = match parser.parse_expression() {
        Ok(expr) => expr,
        Err(error) => {
            error.report(source, None);
            return;
        }
    };

    // Evaluation
    let mut bindings = HashMap::new();
    bindings.insert("last".to_string(), Value::Float(0.0));
    match native::eval(&expr, &bindings) {
        Ok(value) => println!("{}", value),
        Err(error) => error.report(source, None),
    }
}
