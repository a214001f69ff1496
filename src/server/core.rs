use log::{error, info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

use crate::client::{Session, handle_client};
use crate::error::FtpServerError;
use crate::error::handlers::handle_error;
use crate::server::config::ServerConfig;
use crate::transfer::ListingProvider;

/// Accepts control connections and runs one task per client.
pub struct Server<L> {
    listener: TcpListener,
    working_dir: PathBuf,
    listing: Arc<L>,
}

impl<L: ListingProvider> Server<L> {
    /// Binds the control listener described by `config`.
    pub async fn bind(config: &ServerConfig, listing: L) -> Result<Self, FtpServerError> {
        let working_dir = config.initial_working_dir()?;
        Self::bind_addr(&config.control_socket(), working_dir, listing).await
    }

    /// Binds `addr` directly; sessions start in `working_dir`.
    pub async fn bind_addr(
        addr: &str,
        working_dir: PathBuf,
        listing: L,
    ) -> Result<Self, FtpServerError> {
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => {
                info!("Server bound to {}", addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", addr, e);
                return Err(e.into());
            }
        };

        if !working_dir.is_dir() {
            warn!("Working directory {} does not exist", working_dir.display());
        } else {
            info!("Working directory: {}", working_dir.display());
        }

        Ok(Self {
            listener,
            working_dir,
            listing: Arc::new(listing),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn start(&self) {
        match self.local_addr() {
            Ok(addr) => info!("Starting FTP server on {}", addr),
            Err(e) => warn!("Starting FTP server on unknown address: {}", e),
        }

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let session = Session::new(self.working_dir.clone());
                    let listing = Arc::clone(&self.listing);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        serve_client(stream, addr, session, listing).await;
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

async fn serve_client<L: ListingProvider>(
    stream: TcpStream,
    client_addr: SocketAddr,
    session: Session,
    listing: Arc<L>,
) {
    info!("Client connected: {}", client_addr);
    if let Err(e) = handle_client(stream, client_addr, session, listing.as_ref()).await {
        handle_error(&FtpServerError::from(e));
    }
    info!("Client {} disconnected", client_addr);
}
