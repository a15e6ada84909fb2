use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::club::model::{Customer, NewPurchase, PurchaseEdit, ServerMessage};

#[derive(Debug, Error)]
pub enum ClubError {
    #[error("invalid API base URL '{0}' (expected http:// or https://)")]
    InvalidBaseUrl(String),
    #[error("could not reach the customer service: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("purchase {0} not found")]
    PurchaseNotFound(u64),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("unexpected response from the customer service: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub enum LookupOutcome {
    Found(Customer),
    NotFound { phone: String },
}

pub fn normalize_base_url(raw: &str) -> Result<String, ClubError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());
    if has_host {
        Ok(trimmed.to_string())
    } else {
        Err(ClubError::InvalidBaseUrl(raw.to_string()))
    }
}

#[derive(Clone, Debug)]
pub struct ClubClient {
    http: Client,
    base_url: String,
}

impl ClubClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClubError> {
        let base_url = normalize_base_url(base_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClubError::Transport)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn lookup(&self, phone: &str) -> Result<LookupOutcome, ClubError> {
        let url = self.url(&format!("/customers/{}", phone));
        debug!(%url, "looking up customer");
        let response = self.http.get(&url).send().await.map_err(ClubError::Transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(LookupOutcome::NotFound {
                phone: phone.to_string(),
            });
        }
        read_customer(response).await.map(LookupOutcome::Found)
    }

    pub async fn add_purchase(
        &self,
        phone: &str,
        purchase: &NewPurchase,
    ) -> Result<Customer, ClubError> {
        let url = self.url(&format!("/customers/{}/purchase", phone));
        debug!(%url, amount = purchase.amount, "recording purchase");
        let response = self
            .http
            .post(&url)
            .json(purchase)
            .send()
            .await
            .map_err(ClubError::Transport)?;
        read_customer(response).await
    }

    pub async fn edit_purchase(&self, id: u64, edit: &PurchaseEdit) -> Result<Customer, ClubError> {
        let url = self.url(&format!("/purchases/{}", id));
        debug!(%url, amount = edit.amount, "editing purchase");
        let response = self
            .http
            .put(&url)
            .json(edit)
            .send()
            .await
            .map_err(ClubError::Transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClubError::PurchaseNotFound(id));
        }
        read_customer(response).await
    }

    pub async fn delete_purchase(&self, id: u64) -> Result<Customer, ClubError> {
        let url = self.url(&format!("/purchases/{}", id));
        debug!(%url, "deleting purchase");
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(ClubError::Transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClubError::PurchaseNotFound(id));
        }
        read_customer(response).await
    }
}

async fn read_customer(response: Response) -> Result<Customer, ClubError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ServerMessage>(&body)
            .map(|m| m.message)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                } else {
                    body.trim().to_string()
                }
            });
        warn!(status = status.as_u16(), %message, "customer service rejected request");
        return Err(ClubError::Server {
            status: status.as_u16(),
            message,
        });
    }
    response.json::<Customer>().await.map_err(ClubError::Decode)
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    use super::*;

    const CUSTOMER: &str = r#"{"phone":"09123456789","name":"Sara","totalValue":400.0,
        "totalProfit":40.0,"numPurchases":1,"numOverThresh":1,
        "purchases":[{"id":7,"date":"2025-06-01","phone":"09123456789","amount":400.0,"profit":40.0}]}"#;

    async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn client(base: &str) -> ClubClient {
        ClubClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://localhost:4000/").unwrap(),
            "http://localhost:4000"
        );
        assert!(normalize_base_url("localhost:4000").is_err());
        assert!(normalize_base_url("https://").is_err());
    }

    #[tokio::test]
    async fn test_lookup_found() {
        let (base, server) = serve_once("200 OK", CUSTOMER).await;
        let outcome = client(&base).lookup("09123456789").await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("GET /customers/09123456789 "));
        match outcome {
            LookupOutcome::Found(customer) => {
                assert_eq!(customer.name, "Sara");
                assert_eq!(customer.purchases[0].id, 7);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_not_found_routes_to_new_customer() {
        let (base, server) = serve_once("404 Not Found", r#"{"message":"Customer not found."}"#).await;
        let outcome = client(&base).lookup("09000000000").await.unwrap();
        server.await.unwrap();
        assert_eq!(
            outcome,
            LookupOutcome::NotFound {
                phone: "09000000000".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_lookup_server_failure_is_error() {
        let (base, server) = serve_once("500 Internal Server Error", "").await;
        let err = client(&base).lookup("09123456789").await.unwrap_err();
        server.await.unwrap();
        match err {
            ClubError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_purchase_posts_json_body() {
        let (base, server) = serve_once("200 OK", CUSTOMER).await;
        let purchase = NewPurchase {
            amount: 400.0,
            profit: 40.0,
            name: Some("Sara".to_string()),
        };
        let customer = client(&base)
            .add_purchase("09123456789", &purchase)
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("POST /customers/09123456789/purchase "));
        assert!(request.contains(r#""name":"Sara""#));
        assert_eq!(customer.num_over_thresh, 1);
    }

    #[tokio::test]
    async fn test_add_purchase_surfaces_server_message() {
        let (base, server) =
            serve_once("400 Bad Request", r#"{"message":"Name required for new customer."}"#).await;
        let purchase = NewPurchase {
            amount: 10.0,
            profit: 1.0,
            name: None,
        };
        let err = client(&base)
            .add_purchase("09123456789", &purchase)
            .await
            .unwrap_err();
        server.await.unwrap();
        assert_eq!(
            err.to_string(),
            "server error (400): Name required for new customer."
        );
    }

    #[tokio::test]
    async fn test_edit_purchase_uses_put() {
        let (base, server) = serve_once("200 OK", CUSTOMER).await;
        let edit = PurchaseEdit {
            amount: 400.0,
            profit: 40.0,
        };
        client(&base).edit_purchase(7, &edit).await.unwrap();
        let request = server.await.unwrap();
        assert!(request.starts_with("PUT /purchases/7 "));
        assert!(request.contains(r#""amount":400.0"#));
    }

    #[tokio::test]
    async fn test_delete_missing_purchase() {
        let (base, server) = serve_once("404 Not Found", r#"{"message":"Purchase not found."}"#).await;
        let err = client(&base).delete_purchase(99).await.unwrap_err();
        let request = server.await.unwrap();
        assert!(request.starts_with("DELETE /purchases/99 "));
        assert!(matches!(err, ClubError::PurchaseNotFound(99)));
    }
}
