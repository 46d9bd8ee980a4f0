use crate::binding::ListenerBinding;
use crate::error::ServeError;
use crate::handler::Responder;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::TcpKeepalive;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

pub struct Listener {
    binding: ListenerBinding,
    responder: Responder,
}

pub struct BoundListener {
    address: String,
    listener: TcpListener,
    responder: Responder,
}

impl Listener {
    pub fn new(binding: ListenerBinding, responder: Responder) -> Self {
        Self { binding, responder }
    }

    pub async fn bind(self) -> Result<BoundListener, ServeError> {
        let address = self.binding.address();
        let listener = TcpListener::bind(address.as_str())
            .await
            .map_err(|source| ServeError::Bind {
                address: address.clone(),
                source,
            })?;
        let bound = BoundListener {
            address,
            listener,
            responder: self.responder,
        };
        match bound.local_addr() {
            Ok(local) => info!("Listening on {} ({:?} rule)", local, self.binding.rule),
            Err(_) => info!("Listening on {} ({:?} rule)", bound.address, self.binding.rule),
        }

        Ok(bound)
    }

    pub async fn run(self) -> Result<(), ServeError> {
        self.bind().await?.serve().await;
        Ok(())
    }
}

impl BoundListener {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn serve(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer_addr)) => {
                    debug!("New connection on {} from {}", self.address, peer_addr);
                    let responder = self.responder.clone();

                    tokio::spawn(async move {
                        handle_connection(stream, peer_addr, responder).await;
                    });
                }
                Err(source) => {
                    let e = ServeError::Accept {
                        address: self.address.clone(),
                        source,
                    };
                    error!("{}", e);
                }
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, responder: Responder) {
    if let Err(e) = configure_stream(&stream) {
        debug!("Could not tune socket from {}: {}", peer_addr, e);
    }

    let io = TokioIo::new(stream);
    let service = service_fn(move |req| {
        let responder = responder.clone();
        async move { Ok::<_, Infallible>(responder.respond(req).await) }
    });

    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
        error!("Error serving connection from {}: {}", peer_addr, e);
    }
}

fn configure_stream(stream: &TcpStream) -> std::io::Result<()> {
    let sock_ref = socket2::SockRef::from(stream);

    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(30))
        .with_interval(Duration::from_secs(10));

    sock_ref.set_tcp_keepalive(&keepalive)?;
    stream.set_nodelay(true)?;

    Ok(())
}
