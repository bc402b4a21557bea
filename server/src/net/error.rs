use std::io;

pub type SessionResult<T> = Result<T, SessionError>;

/// Terminal session failures. `Protocol` errors carry a wire code that is
/// reported to the client before closing; the remaining variants close the
/// connection silently.
#[derive(Debug, Eq, PartialEq)]
pub enum SessionError {
    Protocol(ProtocolError),
    CollisionBudget,
    Transport(io::ErrorKind),
}

/// Protocol violations with a client-visible error code.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProtocolError {
    LoginFailed,
    SyntaxError,
    LogicError,
    KeyOutOfRange,
}

impl From<ProtocolError> for SessionError {
    #[inline]
    fn from(error: ProtocolError) -> Self {
        SessionError::Protocol(error)
    }
}

impl From<io::Error> for SessionError {
    #[inline]
    fn from(io_error: io::Error) -> Self {
        SessionError::Transport(io_error.kind())
    }
}
