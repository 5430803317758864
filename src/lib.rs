// linecalc — Notepad Calculator Library
//
// Evaluates a "notepad": an ordered sequence of text lines, each a variable
// assignment or a standalone expression, with a running variable store and a
// `last` result usable as an implicit operand. Two engines sit behind one
// grammar — a native float evaluator and a persistent script runtime — with
// per-engine error classification into short stable messages.

// Public modules
pub mod ast;
pub mod classify;
pub mod error;
pub mod export;
pub mod lexer;
pub mod lines;
pub mod native;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod script;
pub mod session;
pub mod value;

// Re-export commonly used items
pub use ast::{BinaryOp, Expr, UnaryOp};
pub use classify::classify;
pub use error::{EngineError, ErrorKind, ExportError, SessionError, Span};
pub use export::save_as_file;
pub use lexer::{Lexer, Token, TokenType};
pub use lines::{evaluate_native, evaluate_script, split_assignment, strip_comment};
pub use parser::{parse_source, Parser};
pub use script::ScriptRuntime;
pub use session::{EvalMode, Session};
pub use value::{LineRecord, Value};

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;
