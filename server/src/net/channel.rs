use crate::net::codec::{self, Command, Expected};
use crate::net::error::{ProtocolError, SessionError, SessionResult};
use lumen::logging;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::mem;
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

// Bounded read size off the transport
const READ_CHUNK: usize = 512;

/// Read timeout applied during normal request/response traffic.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);
/// Read timeout applied while the client recharges.
pub const RECHARGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Byte oriented full duplex connection with an adjustable read timeout.
pub trait Transport: Read + Write {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;
    fn shutdown(&mut self) -> io::Result<()>;
}

impl Transport for TcpStream {
    #[inline]
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        TcpStream::set_read_timeout(self, Some(timeout))
    }

    #[inline]
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

impl<'a, T: Transport> Transport for &'a mut T {
    #[inline]
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        (**self).set_read_timeout(timeout)
    }

    #[inline]
    fn shutdown(&mut self) -> io::Result<()> {
        (**self).shutdown()
    }
}

/// Represents the framed communication channel with a single robot. Every
/// message in both directions is terminated by the two byte delimiter; reads
/// are reassembled from the transport and split back into whole frames.
pub struct Channel<T: Transport> {
    transport: T,

    // Framing state
    queue: VecDeque<Vec<u8>>,
    remainder: Vec<u8>,
    last_response: Vec<u8>,

    // Log
    log: logging::Logger,
}

impl<T: Transport> Channel<T> {
    #[inline]
    pub fn new(transport: T, log: logging::Logger) -> Channel<T> {
        Channel {
            transport,
            queue: VecDeque::new(),
            remainder: Vec::new(),
            last_response: Vec::new(),
            log,
        }
    }

    /// Applies the normal request/response read timeout to the transport.
    #[inline]
    pub fn reset_read_timeout(&mut self) -> SessionResult<()> {
        self.transport.set_read_timeout(READ_TIMEOUT).map_err(Into::into)
    }

    /// Shuts the underlying transport down. Failures are ignored, the
    /// session is over either way.
    #[inline]
    pub fn close(&mut self) {
        logging::debug!(self.log, "closing channel"; "context" => "close");

        drop(self.transport.shutdown());
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Channel<T> {
    /// Writes a command to the transport.
    pub fn send(&mut self, command: Command) -> SessionResult<()> {
        logging::trace!(self.log, "sending command"; "context" => "send", "command" => ?command);

        self.transport.write_all(command.wire()).map_err(Into::into)
    }

    /// Writes the server confirmation hash as its decimal rendering.
    pub fn send_hash(&mut self, hash: u16) -> SessionResult<()> {
        logging::trace!(self.log, "sending server hash"; "context" => "send", "hash" => hash);

        let mut message = hash.to_string().into_bytes();
        message.extend_from_slice(codec::DELIMITER);

        self.transport.write_all(&message).map_err(Into::into)
    }

    /// Best effort delivery of a terminal error code before the channel
    /// closes. Write failures are ignored.
    pub fn send_error(&mut self, error: ProtocolError) {
        logging::debug!(self.log, "reporting protocol error";
                        "context" => "send",
                        "error" => ?error);

        drop(self.transport.write_all(Command::from(error).wire()));
    }
}

impl<T: Transport> Channel<T> {
    /// Returns the next response of the given shape, delimiter excluded.
    pub fn recv(&mut self, expected: Expected) -> SessionResult<Vec<u8>> {
        self.recv_capped(Some(expected.cap()))
    }

    /// Returns the next response framed by the delimiter. `cap` is the
    /// ceiling on the buffered message length (delimiter included): a
    /// message reaching it with no delimiter in sight is rejected without
    /// waiting for the rest. `None` removes the ceiling.
    ///
    /// `RECHARGING`/`FULL POWER` exchanges are filtered out here, with the
    /// read timeout extended for the duration of the recharge and restored
    /// before the pending response is fetched.
    pub fn recv_capped(&mut self, cap: Option<usize>) -> SessionResult<Vec<u8>> {
        loop {
            let candidate = self.next_frame(cap)?;

            if self.last_response == codec::RECHARGING && candidate != codec::FULL_POWER {
                return Err(ProtocolError::LogicError.into());
            }

            if candidate == codec::RECHARGING {
                logging::debug!(self.log, "robot recharging"; "context" => "recv");

                self.last_response = candidate;
                self.transport.set_read_timeout(RECHARGE_TIMEOUT)?;

                let resumed = self.next_frame(Some(Expected::FullPower.cap()))?;

                if resumed != codec::FULL_POWER {
                    return Err(ProtocolError::LogicError.into());
                }

                logging::debug!(self.log, "robot back at full power"; "context" => "recv");

                self.last_response = resumed;
                self.transport.set_read_timeout(READ_TIMEOUT)?;

                continue;
            }

            logging::trace!(self.log, "response received";
                            "context" => "recv",
                            "length" => candidate.len());

            self.last_response = candidate.clone();

            return Ok(candidate);
        }
    }

    /// Produces the next delimited frame, either off the queue or by reading
    /// from the transport until the delimiter shows up.
    fn next_frame(&mut self, cap: Option<usize>) -> SessionResult<Vec<u8>> {
        if let Some(frame) = self.queue.pop_front() {
            return Ok(frame);
        }

        let mut buffer = mem::replace(&mut self.remainder, Vec::new());

        while !contains_delimiter(&buffer) {
            if let Some(cap) = cap {
                if buffer.len() >= cap {
                    return Err(ProtocolError::SyntaxError.into());
                }
            }

            let mut chunk = [0u8; READ_CHUNK];
            let count = self.transport.read(&mut chunk)?;

            if count == 0 {
                return Err(SessionError::Transport(io::ErrorKind::UnexpectedEof));
            }

            buffer.extend_from_slice(&chunk[..count]);
        }

        self.split_frames(&buffer);

        Ok(self.queue.pop_front().expect("Split must produce at least one frame"))
    }

    /// Splits the buffer on every delimiter occurrence. The trailing element
    /// (possibly empty) becomes the new remainder, the rest land on the
    /// queue.
    fn split_frames(&mut self, buffer: &[u8]) {
        let mut rest = buffer;

        while let Some(index) = find_delimiter(rest) {
            self.queue.push_back(rest[..index].to_vec());
            rest = &rest[index + codec::DELIMITER.len()..];
        }

        self.remainder = rest.to_vec();
    }
}

#[inline]
fn find_delimiter(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(codec::DELIMITER.len())
        .position(|window| window == codec::DELIMITER)
}

#[inline]
fn contains_delimiter(buffer: &[u8]) -> bool {
    find_delimiter(buffer).is_some()
}
