use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LexError,
    ParseError,
    EvalError,
}

/// Raw engine failure for a single line. `message` carries the engine's own
/// error vocabulary (host-style for the native engine, `Kind: detail` for the
/// script runtime); the classifier consumes it verbatim.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct EngineError {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
}

impl EngineError {
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn lex_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::LexError, span, message)
    }

    pub fn parse_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::ParseError, span, message)
    }

    pub fn eval_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::EvalError, span, message)
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<pad>");

        let color = match self.kind {
            ErrorKind::LexError => Color::Red,
            ErrorKind::ParseError => Color::Yellow,
            ErrorKind::EvalError => Color::Magenta,
        };

        let kind_str = match self.kind {
            ErrorKind::LexError => "Lexical Error",
            ErrorKind::ParseError => "Parse Error",
            ErrorKind::EvalError => "Evaluation Error",
        };

        Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(format!("{}: {}", kind_str.fg(color), self.message))
            .with_label(
                Label::new((filename, self.span.start..self.span.end))
                    .with_message(&self.message)
                    .with_color(color),
            )
            .finish()
            .print((filename, Source::from(source)))
            .ok();
    }
}

/// Failures of the session surface itself, as opposed to per-line records.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid mode '{0}': expected \"javascript-equivalent\" or \"python-equivalent\"")]
    InvalidMode(String),
    #[error("script runtime failed to initialize: {0}")]
    RuntimeInit(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("content is required and must be a non-empty string")]
    MissingContent,
    #[error("filename is required and must be a non-empty string")]
    MissingFilename,
    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),
}
