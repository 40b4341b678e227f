use std::fmt;

#[derive(Debug)]
pub enum ProtocolError {
    /// The channel closed before the named phase finished.
    UnexpectedEof { phase: &'static str },
    InvalidJson { line: String, reason: String },
    UnexpectedSignal { expected: &'static str, found: String },
    MissingField { field: &'static str },
    NoBoundaries,
    Io(std::io::Error),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof { phase } => {
                write!(f, "message channel closed during {phase}")
            }
            Self::InvalidJson { line, reason } => {
                write!(f, "invalid message {line:?}: {reason}")
            }
            Self::UnexpectedSignal { expected, found } => {
                write!(f, "expected {expected}, got signal {found:?}")
            }
            Self::MissingField { field } => write!(f, "message is missing field '{field}'"),
            Self::NoBoundaries => write!(f, "no boundary objects received during init"),
            Self::Io(err) => write!(f, "transport i/o failure: {err}"),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ProtocolError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
