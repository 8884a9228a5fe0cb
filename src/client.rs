use crate::{Result, TkvsError};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};

/// A client for one request/response exchange with a [`TkvsServer`].
///
/// The protocol is one-shot: the server closes the connection after its
/// reply, so a client is good for exactly one [`request`] call.
///
/// [`TkvsServer`]: crate::TkvsServer
/// [`request`]: TkvsClient::request
pub struct TkvsClient {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl TkvsClient {
    /// establishes a socket connection to the server at `addr`
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let tcp_reader = TcpStream::connect(addr)?;
        let tcp_writer = tcp_reader.try_clone()?;

        Ok(TkvsClient {
            reader: BufReader::new(tcp_reader),
            writer: BufWriter::new(tcp_writer),
        })
    }

    /// sends `batch` (statements separated by `;`, without the trailing `|`)
    /// and returns the reply line without its newline
    pub fn request(mut self, batch: &str) -> Result<String> {
        self.writer.write_all(batch.as_bytes())?;
        self.writer.write_all(b"|")?;
        self.writer.flush()?;

        let mut reply = String::new();
        self.reader.read_line(&mut reply)?;
        if reply.is_empty() {
            return Err(TkvsError::StringErr(
                "server closed the connection without a reply".to_string(),
            ));
        }
        Ok(reply.trim_end_matches('\n').to_string())
    }
}
