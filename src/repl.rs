use crate::session::Session;
use anyhow::Result;
use std::io::{self, Write};

/// Interactive notepad: each entered line is appended to the pad and the
/// whole pad is re-evaluated, printing the newest record. This mirrors the
/// batch contract — native mode gets a fresh store per entry, script mode
/// replays into its persistent namespace.

pub async fn start(mode: &str) -> Result<()> {
    println!("linecalc v0.1.0 — notepad calculator");
    println!("Type 'exit' to quit, ':mode <token>' to switch engines");
    println!();

    let session = Session::new();
    session.set_mode(mode).await?;

    let mut pad: Vec<String> = Vec::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim_end_matches(['\n', '\r']);
                if line.trim() == "exit" || line.trim() == "quit" {
                    println!("Goodbye!");
                    break;
                }

                if line.trim() == ":mode" {
                    println!("mode: {}", session.mode());
                    continue;
                }
                if let Some(token) = line.trim().strip_prefix(":mode ") {
                    match session.set_mode(token.trim()).await {
                        Ok(()) => println!("mode: {}", session.mode()),
                        Err(error) => eprintln!("Error: {}", error),
                    }
                    continue;
                }

                pad.push(line.to_string());
                let records = session.evaluate(&pad).await?;
                if let Some(record) = records.last() {
                    println!("{}", record);
                }
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }

    Ok(())
}
