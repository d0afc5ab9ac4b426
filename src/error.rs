/// Broad category of an [`AppError`].
///
/// The kind decides the process exit code; the message carries the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid settings (histogram range, tau grid, simulation parameters).
    Config,
    /// File could not be opened, read or written.
    Io,
    /// A measurement line whose leading token is not an integer.
    DataFormat,
    /// The decay model was asked for `tau <= 0` (or a non-finite tau).
    DegenerateModel,
    /// Terminal setup or drawing failed.
    Terminal,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config | ErrorKind::Io => 2,
            ErrorKind::DataFormat => 3,
            ErrorKind::DegenerateModel => 4,
            ErrorKind::Terminal => 5,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    /// Malformed measurement line (1-based `line`).
    pub fn data_format(line: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataFormat, format!("line {line}: {}", message.into()))
    }

    pub fn degenerate_model(tau: f64) -> Self {
        Self::new(
            ErrorKind::DegenerateModel,
            format!("Decay model requires a finite tau > 0, got tau={tau}."),
        )
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Terminal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
