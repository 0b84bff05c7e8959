use std::fs::File;
use std::io::{self, Cursor, Empty, Read};
use std::net::{Shutdown, TcpStream};

/// A single-use, closable response body stream.
///
/// This is the whole contract the materializer needs from the transport:
/// something to read the (possibly compressed) body from, and a way to
/// release it afterwards. `close` defaults to a no-op for sources that
/// release themselves on drop.
///
/// ```text
/// ┌──────────────┬───────────────────────────────────────────┐
/// │ Type         │ close()                                   │
/// ├──────────────┼───────────────────────────────────────────┤
/// │ Cursor<T>    │ no-op                                     │
/// │ &[u8]        │ no-op                                     │
/// │ Empty        │ no-op                                     │
/// │ File         │ no-op (descriptor released on drop)       │
/// │ TcpStream    │ shutdown(Both)                            │
/// │ Box<B>       │ delegates                                 │
/// │ &mut B       │ delegates                                 │
/// └──────────────┴───────────────────────────────────────────┘
/// ```
pub trait Body: Read {
    /// Release the stream. Called at most once by the materializer.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if releasing the stream fails.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: AsRef<[u8]>> Body for Cursor<T> {}

impl Body for &[u8] {}

impl Body for Empty {}

impl Body for File {}

impl Body for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            // The peer already closed; nothing left to release.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

impl<B: Body + ?Sized> Body for Box<B> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<B: Body + ?Sized> Body for &mut B {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}
