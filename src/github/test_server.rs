// Canned HTTP/1.1 server for client tests.
// Serves a fixed list of responses, one per connection, and records each request line.

use std::sync::{Arc, Mutex};

use reqwest::Client;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::client::GitHubClient;

/// A local server bound to a random port.
pub struct TestServer {
    listener: TcpListener,
    pub base_url: String,
}

impl TestServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        Self { listener, base_url }
    }

    /// A client pointed at this server, ignoring any proxy settings in the environment.
    pub fn client(&self) -> GitHubClient {
        GitHubClient::with_builder("TESTTOKEN", &self.base_url, Client::builder().no_proxy())
            .unwrap()
    }

    /// Answer the next `responses.len()` connections in order.
    ///
    /// Returns the request lines seen so far, e.g. `GET /user/repos?... HTTP/1.1`.
    pub fn serve(self, responses: Vec<String>) -> Arc<Mutex<Vec<String>>> {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        tokio::spawn(async move {
            for response in responses {
                let Ok((mut socket, _)) = self.listener.accept().await else {
                    return;
                };

                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                let request_line = String::from_utf8_lossy(&head)
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .to_string();
                seen.lock().unwrap().push(request_line);

                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        requests
    }
}

/// Build a complete HTTP/1.1 response that closes the connection.
pub fn http_response(status: &str, headers: &[(&str, String)], body: &str) -> String {
    let mut response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for (name, value) in headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str("\r\n");
    response.push_str(body);
    response
}

/// JSON for one repository in the list endpoints' shape.
pub fn repo_json(name: &str) -> String {
    format!(
        r#"{{"id":1,"name":"{name}","full_name":"octocat/{name}","owner":{{"id":2,"login":"octocat"}},"description":null,"stargazers_count":3,"html_url":"https://github.com/octocat/{name}","default_branch":"main","pushed_at":null,"created_at":"2020-01-01T00:00:00Z","updated_at":"2020-01-02T00:00:00Z"}}"#
    )
}
