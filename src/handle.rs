// Framed message exchange over an ordered byte stream
use crate::error::SessionError;
use crate::frame::Frame;
use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;
use tracing::debug;

pub struct Handle<S = TcpStream> {
    stream: S,
}

impl Handle<TcpStream> {
    pub fn connect(addr: SocketAddr, timeout: Duration) -> Result<Handle, SessionError> {
        let socket = TcpStream::connect_timeout(&addr, timeout)?;
        socket.set_nodelay(true)?;

        Ok(Handle::new(socket))
    }

    pub fn set_read_timeout(&self, timeout: Duration) -> Result<(), SessionError> {
        self.stream.set_read_timeout(Some(timeout))?;
        Ok(())
    }
}

impl<S: Read + Write> Handle<S> {
    pub fn new(stream: S) -> Handle<S> {
        Handle { stream }
    }

    // EOF before the last byte is a lost connection, as is a timeout
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SessionError> {
        let mut filled = 0;

        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(SessionError::ConnectionLost(io::Error::new(
                        ErrorKind::UnexpectedEof,
                        format!("stream closed after {} of {} bytes", filled, buf.len()),
                    )))
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(SessionError::ConnectionLost(e)),
            }
        }

        Ok(())
    }

    // Ok(None) when the bytes do not decode
    pub fn read_frame<F: Frame>(&mut self) -> Result<Option<F>, SessionError> {
        let mut buf = vec![0u8; F::SIZE];
        self.read_exact(&mut buf)?;

        match F::decode(&buf) {
            Ok(frame) => Ok(Some(frame)),
            Err(e) => {
                debug!("discarding malformed frame: {}", e);
                Ok(None)
            }
        }
    }

    pub fn send_frame<F: Frame>(&mut self, frame: &F) -> Result<(), SessionError> {
        self.stream.write_all(&frame.encode())?;
        self.stream.flush()?;

        Ok(())
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

// Test stream: reads from a script, collects writes
#[cfg(test)]
pub(crate) mod mock {
    use std::io::{self, Cursor, Read, Write};

    pub struct Duplex {
        input: Cursor<Vec<u8>>,
        pub output: Vec<u8>,
    }

    impl Duplex {
        pub fn new(input: Vec<u8>) -> Duplex {
            Duplex {
                input: Cursor::new(input),
                output: Vec::new(),
            }
        }
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            // One byte at a time to exercise reassembly
            let n = buf.len().min(1);
            self.input.read(&mut buf[..n])
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
