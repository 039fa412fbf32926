use super::service::AppService;
use crate::work::WorkLoop;
use may::coroutine::JoinHandle;
use may_minihttp::HttpServerWithHeaders;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// The HTTP front end for an [`AppService`].
///
/// `start` binds the listener and hands the work loop to the returned
/// [`ServerHandle`], which ties both lifetimes together: stopping or joining
/// the handle also drains and joins the loop, so callers never coordinate
/// the two shutdowns by hand.
pub struct HttpServer(pub AppService);

/// Handle to a running server and the work loop behind it.
pub struct ServerHandle {
    addr: SocketAddr,
    server: JoinHandle<()>,
    work_loop: WorkLoop,
}

impl ServerHandle {
    /// The bound listen address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to accept connections.
    ///
    /// Polls the listen address until a TCP connect succeeds. Useful in
    /// tests to avoid racing the first request against server startup.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the server is not accepting within one second.
    pub fn wait_ready(&self) -> io::Result<()> {
        let deadline = Instant::now() + Duration::from_secs(1);
        while Instant::now() < deadline {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(10));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop serving and drain the work loop.
    ///
    /// Cancels the server coroutine, which drops the per-connection service
    /// clones and their [`WorkQueue`](crate::work::WorkQueue) handles; the
    /// loop then runs any still-queued workloads and exits. Blocks until
    /// both are gone.
    pub fn stop(self) {
        // SAFETY: cancel() is marked unsafe by the may runtime. The handle
        // is valid (we hold it) and cancellation is the intended shutdown
        // path for the accept loop.
        unsafe {
            self.server.coroutine().cancel();
        }
        let _ = self.server.join();
        self.work_loop.shutdown();
        info!("Server stopped");
    }

    /// Block until the server coroutine exits, then drain the work loop.
    ///
    /// The server runs indefinitely unless stopped externally or an error
    /// occurs.
    ///
    /// # Errors
    ///
    /// Returns an error if the server coroutine panicked. The work loop is
    /// drained either way.
    pub fn join(self) -> std::thread::Result<()> {
        let result = self.server.join();
        self.work_loop.shutdown();
        result
    }
}

impl HttpServer {
    /// Bind `addr` and start serving, taking ownership of the work loop the
    /// service submits to.
    ///
    /// Uses 32 max headers to handle modern API gateway/proxy traffic.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the port cannot be
    /// bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A, work_loop: WorkLoop) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let server = HttpServerWithHeaders::<_, 32>(self.0).start(addr)?;
        Ok(ServerHandle {
            addr,
            server,
            work_loop,
        })
    }
}
