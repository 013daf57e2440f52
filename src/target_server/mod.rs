pub mod response;
pub mod routes;

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::time::sleep;

use crate::config::ServerConfig;

const MAX_REQUEST_BYTES: usize = 1024;

/// Static HTTP server with an explicit listen backlog, the counterpart of the probe.
pub struct TargetServer {
    listener: TcpListener,
    root: Arc<PathBuf>,
    accept_delay: Duration,
}

impl TargetServer {
    /// Binds `addr` and starts listening with room for `backlog` pending connections.
    /// Must be called from within a tokio runtime.
    pub fn bind(
        addr: SocketAddr,
        backlog: u32,
        root: PathBuf,
        accept_delay: Duration,
    ) -> io::Result<Self> {
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(backlog)?;

        Ok(TargetServer {
            listener,
            root: Arc::new(root),
            accept_delay,
        })
    }

    pub fn from_config(config: &ServerConfig) -> io::Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
        Self::bind(
            addr,
            config.backlog,
            config.root.clone(),
            config.accept_delay(),
        )
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop, one tokio task per connection. Runs until the process stops.
    pub async fn serve(self) {
        match self.local_addr() {
            Ok(addr) => log::info!("Ready to serve on {addr}, root {}", self.root.display()),
            Err(e) => log::warn!("Serving on an unknown address: {e}"),
        }

        loop {
            if !self.accept_delay.is_zero() {
                sleep(self.accept_delay).await;
            }

            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    log::warn!("Accept failed: {e}");
                    continue;
                }
            };
            log::debug!("Accepted connection from {peer}");

            let root = Arc::clone(&self.root);
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, &root).await {
                    log::warn!("Connection from {peer} failed: {e}");
                }
            });
        }
    }
}

async fn handle_connection(mut stream: TcpStream, root: &Path) -> io::Result<()> {
    let mut buf = [0u8; MAX_REQUEST_BYTES];
    let read = stream.read(&mut buf).await?;
    let request = String::from_utf8_lossy(&buf[..read]);

    let response = routes::respond(&request, root).await;
    log::debug!(
        "{} -> {} {}",
        request.lines().next().unwrap_or_default(),
        response.status,
        response.reason
    );

    stream.write_all(&response.to_bytes()).await?;
    stream.shutdown().await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn start(root: PathBuf) -> SocketAddr {
        let server = TargetServer::bind(
            "127.0.0.1:0".parse().expect("socket addr"),
            4,
            root,
            Duration::ZERO,
        )
        .expect("bind");
        let addr = server.local_addr().expect("local addr");
        tokio::spawn(server.serve());
        addr
    }

    async fn raw_request(addr: SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.expect("connect");
        stream
            .write_all(request.as_bytes())
            .await
            .expect("write request");
        let mut response = String::new();
        stream
            .read_to_string(&mut response)
            .await
            .expect("read response");
        response
    }

    #[tokio::test]
    async fn answers_root_with_ok() {
        let addr = start(std::env::temp_dir()).await;
        let response = raw_request(addr, "GET / HTTP/1.1\r\nHost: test\r\n\r\n").await;

        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with(r#"{"message":"Ok!"}"#));
    }

    #[tokio::test]
    async fn forbids_python_sources() {
        let addr = start(std::env::temp_dir()).await;
        let response = raw_request(addr, "GET /server.py HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 403 Forbidden\r\n"));
    }

    #[tokio::test]
    async fn reqwest_reads_the_status_line() {
        let addr = start(std::env::temp_dir()).await;
        let response = reqwest::get(format!("http://{addr}/missing.txt"))
            .await
            .expect("server answers");
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn from_config_uses_the_configured_port() {
        let probe_port = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind")
            .local_addr()
            .expect("local addr")
            .port();
        let config = ServerConfig {
            port: probe_port,
            ..ServerConfig::default()
        };

        let server = TargetServer::from_config(&config).expect("bind configured port");
        assert_eq!(server.local_addr().expect("local addr").port(), probe_port);
    }
}
