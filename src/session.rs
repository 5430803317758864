use crate::error::SessionError;
use crate::lines;
use crate::script::ScriptRuntime;
use crate::value::LineRecord;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    Native,
    Script,
}

impl EvalMode {
    pub const NATIVE_TOKEN: &'static str = "javascript-equivalent";
    pub const SCRIPT_TOKEN: &'static str = "python-equivalent";

    pub fn token(self) -> &'static str {
        match self {
            EvalMode::Native => Self::NATIVE_TOKEN,
            EvalMode::Script => Self::SCRIPT_TOKEN,
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            Self::NATIVE_TOKEN => Some(EvalMode::Native),
            Self::SCRIPT_TOKEN => Some(EvalMode::Script),
            _ => None,
        }
    }
}

/// Caller-owned evaluation context: the mode flag plus the memoized script
/// runtime handle. Replaces what would otherwise be process-wide globals.
///
/// The runtime cell initializes at most once per session; concurrent mode
/// switches during startup await the same in-flight initialization. Once
/// created, the runtime (and its namespace) lives as long as the session and
/// is reused when switching back into script mode.
pub struct Session {
    mode: Mutex<EvalMode>,
    runtime: OnceCell<Arc<ScriptRuntime>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            mode: Mutex::new(EvalMode::Native),
            runtime: OnceCell::new(),
        }
    }

    /// Current mode token (pure read).
    pub fn mode(&self) -> &'static str {
        self.mode.lock().token()
    }

    /// Switches engines. Accepts exactly the two mode tokens; switching into
    /// script mode initializes the runtime first and only flips the flag on
    /// success, so an initialization failure surfaces here and never as
    /// per-line records.
    pub async fn set_mode(&self, token: &str) -> Result<(), SessionError> {
        let mode =
            EvalMode::from_token(token).ok_or_else(|| SessionError::InvalidMode(token.to_string()))?;

        if mode == EvalMode::Script {
            self.ensure_runtime().await?;
        }

        *self.mode.lock() = mode;
        debug!(mode = token, "evaluation mode selected");
        Ok(())
    }

    /// Initializes the script runtime if needed and returns the shared
    /// handle. Repeated and concurrent calls all observe the same instance.
    pub async fn ensure_runtime(&self) -> Result<Arc<ScriptRuntime>, SessionError> {
        let runtime = self
            .runtime
            .get_or_try_init(|| async { ScriptRuntime::initialize().await.map(Arc::new) })
            .await?;
        Ok(runtime.clone())
    }

    /// The memoized runtime handle, if initialization has happened.
    pub fn runtime_handle(&self) -> Option<Arc<ScriptRuntime>> {
        self.runtime.get().cloned()
    }

    /// Evaluates a notepad: one record per input line, in order. Script-mode
    /// lines are awaited sequentially, never concurrently. The only possible
    /// error is an unavailable runtime, which `set_mode` rules out before
    /// script mode can be selected.
    pub async fn evaluate<S: AsRef<str>>(
        &self,
        input: &[S],
    ) -> Result<Vec<LineRecord>, SessionError> {
        let mode = *self.mode.lock();
        match mode {
            EvalMode::Native => Ok(lines::evaluate_native(input)),
            EvalMode::Script => {
                let runtime = self.ensure_runtime().await?;
                Ok(lines::evaluate_script(&runtime, input).await)
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
