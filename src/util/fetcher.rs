use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::{data::models::FeedSnapshot, error::FeedError, util::parser};

const MAX_FEED_BYTES: usize = 5_000_000;

pub fn client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("Mozilla/5.0 feedtrans")
        .build()
}

/// Fetches and parses the feed. Anything but a 200 is a failure for the run.
pub async fn snapshot(client: &Client, url: &str) -> Result<FeedSnapshot, FeedError> {
    let content = fetch(client, url).await?;
    parser::parse(&content)
}

async fn fetch(client: &Client, url: &str) -> Result<String, FeedError> {
    debug!("Fetching feed from {}", url);
    let response = client.get(url).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FeedError::Status(status));
    }

    let bytes = response.bytes().await?;
    if bytes.len() > MAX_FEED_BYTES {
        return Err(FeedError::TooLarge(bytes.len()));
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
    };

    use super::*;
    use crate::util::parser::tests::SAMPLE_FEED;

    /// Answers every connection with `status` and `body`; returns the base URL
    /// and the raw requests received.
    pub(crate) async fn serve(
        status: &'static str,
        body: &'static str,
    ) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let request = read_request(&mut socket).await;
                seen.lock().unwrap().push(request);
                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}"), requests)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            data.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&data);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.trim()
                            .eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    #[tokio::test]
    async fn non_ok_status_is_a_failure() {
        let (base, requests) = serve("404 Not Found", "").await;

        let result = snapshot(&client().unwrap(), &format!("{base}/feed")).await;

        assert!(matches!(
            result,
            Err(FeedError::Status(code)) if code == StatusCode::NOT_FOUND
        ));
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ok_status_yields_snapshot() {
        let (base, _) = serve("200 OK", SAMPLE_FEED).await;

        let snapshot = snapshot(&client().unwrap(), &format!("{base}/feed"))
            .await
            .unwrap();

        assert_eq!(snapshot.count(), 2);
    }
}
