use std::{error::Error, fmt, io};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingErrorKind {
    /// The raw socket could not be opened, usually for lack of privilege.
    SocketCreate,
    Send,
    Receive,
    /// A host name did not resolve to an IPv4 address.
    Resolve,
    InvalidConfig,
    /// Any other socket failure.
    Io,
}

impl fmt::Display for PingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PingErrorKind::SocketCreate => "socket create",
            PingErrorKind::Send => "send",
            PingErrorKind::Receive => "receive",
            PingErrorKind::Resolve => "resolve",
            PingErrorKind::InvalidConfig => "invalid config",
            PingErrorKind::Io => "io",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct PingError {
    pub kind: PingErrorKind,
    pub message: String,
    source: Option<io::Error>,
}

pub type PingResult<T> = std::result::Result<T, PingError>;

impl PingError {
    pub(crate) fn new(kind: PingErrorKind, message: impl Into<String>) -> Self {
        PingError {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn io(kind: PingErrorKind, message: impl Into<String>, source: io::Error) -> Self {
        PingError {
            kind,
            message: message.into(),
            source: Some(source),
        }
    }
}

impl fmt::Display for PingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "PingError ({})", self.kind)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl Error for PingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn Error + 'static))
    }
}

impl From<io::Error> for PingError {
    fn from(error: io::Error) -> PingError {
        PingError::io(PingErrorKind::Io, String::new(), error)
    }
}
