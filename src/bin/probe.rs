use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;

#[path = "../ports.rs"]
mod ports;
use ports::CDN_PORTS;

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let mut ports: Vec<String> = args.collect();
    if ports.is_empty() {
        ports = CDN_PORTS.iter().map(|p| p.to_string()).collect();
    }

    let mut tasks = vec![];

    for port in ports {
        let host = host.clone();
        let task = tokio::spawn(async move {
            let outcome = time::timeout(Duration::from_secs(5), probe(&host, &port)).await;
            match outcome {
                Ok(Ok((status, body))) => println!("{} -> {} {:?}", port, status, body),
                Ok(Err(e)) => println!("{} -> error: {}", port, e),
                Err(_) => println!("{} -> timed out", port),
            }
        });
        tasks.push(task);
    }

    for task in tasks {
        if let Err(e) = task.await {
            println!("task failed: {}", e);
        }
    }
}

async fn probe(host: &str, port: &str) -> std::io::Result<(String, String)> {
    let mut stream = TcpStream::connect(format!("{}:{}", host, port)).await?;
    let request = format!(
        "GET / HTTP/1.1\r\nHost: {}:{}\r\nConnection: close\r\n\r\n",
        host, port
    );
    stream.write_all(request.as_bytes()).await?;

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    let raw = String::from_utf8_lossy(&buf);

    let status = raw.lines().next().unwrap_or_default().to_string();
    let body = raw
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();
    Ok((status, body))
}
