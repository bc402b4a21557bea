use crate::net::channel::Transport;
use crate::net::codec::{self, Command, Expected};
use crate::net::error::{ProtocolError, SessionResult};
use crate::robot::Robot;
use lumen::logging;

/// Maximum username length in bytes.
pub const USERNAME_MAX: usize = 18;

/// Shared secret key table addressed by the client supplied key-id. Each row
/// is a `(server, client)` pair.
pub const KEYS: [(u16, u16); 5] = [
    (23019, 32037),
    (32037, 29295),
    (18789, 13603),
    (16443, 29533),
    (18189, 21952),
];

/// Hash of the received username bytes, reduced to the unsigned 16 bit
/// range. The username is never decoded, multi byte characters hash as their
/// raw bytes.
pub fn username_hash(username: &[u8]) -> u16 {
    let sum: u32 = username.iter().map(|&byte| u32::from(byte)).sum();

    ((sum * 1000) % 65536) as u16
}

/// Offsets the username hash by a key table entry, mod 65536.
pub fn keyed_hash(hash: u16, key: u16) -> u16 {
    ((u32::from(hash) + u32::from(key)) % 65536) as u16
}

impl<T: Transport> Robot<T> {
    /// Runs the mutual authentication handshake: username, key request,
    /// server hash, client confirmation.
    pub(crate) fn authenticate(&mut self) -> SessionResult<()> {
        let username = self.channel.recv(Expected::Username)?;

        if username.len() > USERNAME_MAX {
            return Err(ProtocolError::SyntaxError.into());
        }

        self.channel.send(Command::KeyRequest)?;

        let frame = self.channel.recv(Expected::KeyId)?;
        let key_id = codec::parse_key_id(&frame)?;

        let (server_key, client_key) = KEYS[key_id];
        let hash = username_hash(&username);

        self.channel.send_hash(keyed_hash(hash, server_key))?;

        let frame = self.channel.recv(Expected::Confirmation)?;
        let confirmation = codec::parse_confirmation(&frame)?;

        if confirmation != u32::from(keyed_hash(hash, client_key)) {
            return Err(ProtocolError::LoginFailed.into());
        }

        logging::info!(self.log, "robot authenticated";
                       "context" => "authenticate",
                       "username" => %String::from_utf8_lossy(&username),
                       "key_id" => key_id);

        self.channel.send(Command::Ok)
    }
}
