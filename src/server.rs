use crate::store::Stores;
use crate::thread_pool::ThreadPool;
use crate::{executor, protocol, snapshot, Result};
use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// A TCP server over the typed stores.
///
/// It accepts connections on a listening socket and hands each one to a
/// [`ThreadPool`] worker. A connection carries exactly one request: the
/// worker reads up to the `|` terminator, parses and executes the batch
/// synchronously, writes the framed reply, and closes the socket.
///
/// # Example
/// Create a server with empty stores and a four-thread pool:
/// ```rust
/// use std::sync::Arc;
/// use tkvs::thread_pool::{SharedQueueThreadPool, ThreadPool};
/// use tkvs::{Stores, TkvsServer};
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let stores = Arc::new(Stores::new());
/// let pool = SharedQueueThreadPool::new(4)?;
/// let server = TkvsServer::new(stores, pool);
/// // server.run("127.0.0.1:1234")?;
/// # Ok(())
/// # }
/// ```
pub struct TkvsServer<P: ThreadPool> {
    /// the shared store aggregate
    stores: Arc<Stores>,
    /// a pool of threads servicing one connection per job
    pool: P,
}

impl<P: ThreadPool> TkvsServer<P> {
    /// creates a server over the given stores and worker pool
    pub fn new(stores: Arc<Stores>, pool: P) -> Self {
        TkvsServer { stores, pool }
    }

    /// binds `addr` and serves connections until the process exits
    ///
    /// # Errors
    /// returns an error if the listening socket could not be bound
    pub fn run<A: ToSocketAddrs>(self, addr: A) -> Result<()> {
        let listener = TcpListener::bind(addr)?;
        info!("listening on {}", listener.local_addr()?);
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let stores = Arc::clone(&self.stores);
                    self.pool.spawn(move || {
                        if let Err(e) = serve(&stores, stream) {
                            error!("error serving client: {}", e);
                        }
                    });
                }
                Err(e) => error!("connection failed: {}", e),
            }
        }
        Ok(())
    }
}

/// services one connection: read the request, run it, write the reply
fn serve(stores: &Stores, stream: TcpStream) -> Result<()> {
    let peer = stream.peer_addr()?;
    let mut reader = BufReader::new(&stream);
    let mut writer = BufWriter::new(&stream);

    let request = protocol::read_request(&mut reader)?;
    debug!("request from {}: {}", peer, request);

    let outcome = executor::run_request(stores, &request);
    let reply = protocol::frame_reply(&outcome);
    writer.write_all(reply.as_bytes())?;
    writer.flush()?;
    debug!("replied to {}: {}", peer, reply.trim_end());
    Ok(())
}

/// starts the periodic snapshot dumper on its own thread
///
/// Ticks are scheduled against fixed deadlines: a dump that outlives the
/// interval makes the next tick fire immediately instead of drifting. Dump
/// failures are logged and never stop the schedule.
pub fn spawn_dump_schedule(
    stores: Arc<Stores>,
    path: PathBuf,
    period: Duration,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut deadline = Instant::now() + period;
        loop {
            let now = Instant::now();
            if now < deadline {
                thread::sleep(deadline - now);
            }
            if let Err(e) = snapshot::dump(&stores, &path) {
                error!("snapshot dump failed: {}", e);
            }
            deadline += period;
        }
    })
}
