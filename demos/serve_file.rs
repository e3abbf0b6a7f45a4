//! Streams a file to every client that connects.
//!
//! Run with `cargo run --example serve_file -- <path>`, then fetch
//! `http://127.0.0.1:8080/` with curl.

use http::{HeaderValue, header};
use stream_response::{ResponseWriter, StreamResponse};
use tokio::fs::File;
use tokio::net::TcpListener;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let path = std::env::args().nth(1).unwrap_or_else(|| "README.md".to_string());

    info!(port = 8080, "start listening");
    let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };

    loop {
        let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };

        let path = path.clone();
        tokio::spawn(async move {
            let file = match File::open(&path).await {
                Ok(file) => file,
                Err(e) => {
                    error!(cause = %e, path = %path, "can't open source file");
                    return;
                }
            };

            let response = StreamResponse::builder()
                .header(header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"))
                .source(file)
                .build();

            let mut response = match response {
                Ok(response) => response,
                Err(e) => {
                    error!(cause = %e, "can't build response");
                    return;
                }
            };

            let mut writer = ResponseWriter::new(tcp_stream);
            match response.send(&mut writer).await {
                Ok(copied) => {
                    info!(bytes = copied, "finished streaming, connection shutdown");
                }
                Err(e) => {
                    error!(cause = %e, "send response error, connection shutdown");
                }
            }
        });
    }
}
