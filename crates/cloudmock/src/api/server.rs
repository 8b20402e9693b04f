//! HTTP server for the emulated API.

use crate::api::types::{collect_body, error_response, MockRequest};
use crate::state::CloudMock;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Listener serving a [`CloudMock`], one task per connection.
pub struct MockServer {
    listener: TcpListener,
    mock: Arc<CloudMock>,
}

impl MockServer {
    /// Bind the listener. Port 0 picks an ephemeral port; see
    /// [`MockServer::local_addr`].
    pub async fn bind(addr: SocketAddr, mock: Arc<CloudMock>) -> Result<Self, anyhow::Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, mock })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        info!(
            "OpenStack API emulator listening on http://{}",
            self.listener.local_addr()?
        );

        loop {
            let (stream, _) = self.listener.accept().await?;
            let io = TokioIo::new(stream);
            let mock = Arc::clone(&self.mock);

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let mock = Arc::clone(&mock);
                    async move { route_request(req, mock).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Emulator connection error: {}", e);
                }
            });
        }
    }
}

/// Collect the body, then hand the request to the synchronous dispatcher.
///
/// A fatal handler error aborts the process: the emulator stops rather than
/// answer with data it knows to be wrong.
async fn route_request(
    req: Request<Incoming>,
    mock: Arc<CloudMock>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(|s| s.to_string());

    debug!("Emulator: {} {}", method, path);

    let body = match collect_body(req).await {
        Ok(b) => b,
        Err(e) => {
            debug!("{} {}: {}", method, path, e);
            return Ok(error_response(StatusCode::BAD_REQUEST, &e));
        }
    };

    let request = MockRequest {
        method,
        path,
        query,
        body,
    };

    match mock.handle(&request) {
        Ok(response) => Ok(response.into_hyper()),
        Err(fatal) => {
            error!(
                method = %request.method,
                path = %request.path,
                "Unrecoverable emulator error, aborting: {}", fatal
            );
            std::process::abort();
        }
    }
}
