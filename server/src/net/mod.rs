//! Framed transport layer between the server and the robot clients.

pub mod channel;
pub mod codec;
pub mod error;

#[cfg(test)]
pub(crate) mod testing {
    use crate::net::channel::Transport;
    use std::cmp::min;
    use std::io::{self, Read, Write};
    use std::time::Duration;

    /// Scripted in-memory transport. Serves the inbound bytes in `chunk`
    /// sized pieces and records everything written. Reading past the end of
    /// the script behaves like an expired read timeout unless the transport
    /// was constructed closed, in which case it reads as end of stream.
    pub struct MockTransport {
        inbound: Vec<u8>,
        cursor: usize,
        chunk: usize,
        eof: bool,
        pub outbound: Vec<u8>,
        pub timeouts: Vec<Duration>,
        pub shutdowns: usize,
    }

    impl MockTransport {
        pub fn new(inbound: &[u8]) -> MockTransport {
            MockTransport::chunked(inbound, 512)
        }

        pub fn chunked(inbound: &[u8], chunk: usize) -> MockTransport {
            MockTransport {
                inbound: inbound.to_vec(),
                cursor: 0,
                chunk,
                eof: false,
                outbound: Vec::new(),
                timeouts: Vec::new(),
                shutdowns: 0,
            }
        }

        /// Transport whose peer has already hung up.
        pub fn closed() -> MockTransport {
            let mut transport = MockTransport::new(b"");
            transport.eof = true;
            transport
        }

        /// Appends further scripted bytes to the inbound stream.
        pub fn extend_inbound(&mut self, bytes: &[u8]) {
            self.inbound.extend_from_slice(bytes);
        }
    }

    impl Read for MockTransport {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.cursor == self.inbound.len() {
                if self.eof {
                    return Ok(0);
                }

                return Err(io::ErrorKind::WouldBlock.into());
            }

            let count = min(min(self.chunk, buf.len()), self.inbound.len() - self.cursor);
            buf[..count].copy_from_slice(&self.inbound[self.cursor..self.cursor + count]);
            self.cursor += count;

            Ok(count)
        }
    }

    impl Write for MockTransport {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.outbound.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for MockTransport {
        fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
            self.timeouts.push(timeout);
            Ok(())
        }

        fn shutdown(&mut self) -> io::Result<()> {
            self.shutdowns += 1;
            Ok(())
        }
    }
}
