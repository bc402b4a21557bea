use crate::auth::KEYS;
use crate::net::error::{ProtocolError, SessionResult};
use crate::robot::Position;
use std::str;

/// Two byte sequence terminating every message in both directions.
pub const DELIMITER: &[u8] = b"\x07\x08";

/// Client state announcement granting it an extended read timeout.
pub const RECHARGING: &[u8] = b"RECHARGING";
/// The only message allowed to follow `RECHARGING`.
pub const FULL_POWER: &[u8] = b"FULL POWER";

/// Complete server-side command vocabulary.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Command {
    Login,
    Password,
    Move,
    TurnLeft,
    TurnRight,
    GetMessage,
    Logout,
    KeyRequest,
    Ok,
    LoginFailed,
    SyntaxError,
    LogicError,
    KeyOutOfRange,
}

impl Command {
    /// Exact wire rendering of the command, delimiter included.
    #[inline]
    pub fn wire(self) -> &'static [u8] {
        match self {
            Command::Login => b"100 LOGIN\x07\x08",
            Command::Password => b"101 PASSWORD\x07\x08",
            Command::Move => b"102 MOVE\x07\x08",
            Command::TurnLeft => b"103 TURN LEFT\x07\x08",
            Command::TurnRight => b"104 TURN RIGHT\x07\x08",
            Command::GetMessage => b"105 GET MESSAGE\x07\x08",
            Command::Logout => b"106 LOGOUT\x07\x08",
            Command::KeyRequest => b"107 KEY REQUEST\x07\x08",
            Command::Ok => b"200 OK\x07\x08",
            Command::LoginFailed => b"300 LOGIN FAILED\x07\x08",
            Command::SyntaxError => b"301 SYNTAX ERROR\x07\x08",
            Command::LogicError => b"302 LOGIC ERROR\x07\x08",
            Command::KeyOutOfRange => b"303 KEY OUT OF RANGE\x07\x08",
        }
    }
}

impl From<ProtocolError> for Command {
    #[inline]
    fn from(error: ProtocolError) -> Self {
        match error {
            ProtocolError::LoginFailed => Command::LoginFailed,
            ProtocolError::SyntaxError => Command::SyntaxError,
            ProtocolError::LogicError => Command::LogicError,
            ProtocolError::KeyOutOfRange => Command::KeyOutOfRange,
        }
    }
}

/// Response shape awaited from the client. Yields the phase specific ceiling
/// on the buffered message length (delimiter included) that the framed
/// reader uses to reject oversized traffic before the delimiter arrives.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Expected {
    Username,
    KeyId,
    Confirmation,
    Coords,
    FullPower,
    Message,
}

impl Expected {
    /// Maximum length of a legal response of this shape, delimiter included.
    #[inline]
    pub fn cap(self) -> usize {
        match self {
            Expected::Username => 20,
            Expected::KeyId => 5,
            Expected::Confirmation => 7,
            Expected::Coords => 12,
            Expected::FullPower => 12,
            Expected::Message => 100,
        }
    }
}

/// Parses an `OK <x> <y>` coordinate response. Tokens are separated by single
/// spaces and the coordinates are signed decimal integers.
pub fn parse_position(frame: &[u8]) -> SessionResult<Position> {
    let text = text_frame(frame)?;
    let tokens: Vec<&str> = text.split(' ').collect();

    if tokens.len() != 3 || tokens[0] != "OK" {
        return Err(ProtocolError::SyntaxError.into());
    }

    let x: i32 = tokens[1].parse().map_err(|_| ProtocolError::SyntaxError)?;
    let y: i32 = tokens[2].parse().map_err(|_| ProtocolError::SyntaxError)?;

    Ok(Position { x, y })
}

/// Parses the key-id response. Shape failures are syntax errors, while
/// well-formed values outside the key table (negatives included) are
/// classified as out of range.
pub fn parse_key_id(frame: &[u8]) -> SessionResult<usize> {
    let text = text_frame(frame)?;

    if text.is_empty() || text.len() > 3 {
        return Err(ProtocolError::SyntaxError.into());
    }

    let digits = text.strip_prefix('-').unwrap_or(text);

    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ProtocolError::SyntaxError.into());
    }

    let key_id: i32 = text.parse().map_err(|_| ProtocolError::SyntaxError)?;

    if key_id < 0 || key_id as usize >= KEYS.len() {
        return Err(ProtocolError::KeyOutOfRange.into());
    }

    Ok(key_id as usize)
}

/// Parses the client confirmation hash: at most five ASCII digits.
pub fn parse_confirmation(frame: &[u8]) -> SessionResult<u32> {
    let text = text_frame(frame)?;

    if text.is_empty() || text.len() > 5 || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ProtocolError::SyntaxError.into());
    }

    text.parse().map_err(|_| ProtocolError::SyntaxError.into())
}

#[inline]
fn text_frame(frame: &[u8]) -> SessionResult<&str> {
    str::from_utf8(frame).map_err(|_| ProtocolError::SyntaxError.into())
}
