// src/integrations/mail.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Mensagem pronta para o provedor (HTML já com o pixel de rastreamento)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    // O provedor respondeu, mas recusou a mensagem
    #[error("{0}")]
    Rejected(String),

    #[error("falha de comunicação com o provedor: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait MailProvider: Send + Sync {
    /// Entrega a mensagem e devolve o ID atribuído pelo provedor.
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailError>;
}

// ---
// Resend (API REST)
// ---

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct ResendAccepted {
    id: String,
}

#[derive(Deserialize)]
struct ResendFailure {
    message: Option<String>,
}

#[derive(Clone)]
pub struct ResendClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ResendClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl MailProvider for ResendClient {
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailError> {
        let body = ResendRequest {
            from: &email.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let reason = response
                .json::<ResendFailure>()
                .await
                .ok()
                .and_then(|f| f.message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(MailError::Rejected(reason));
        }

        let accepted = response.json::<ResendAccepted>().await?;
        tracing::debug!(provider_id = %accepted.id, "E-mail aceito pelo Resend");
        Ok(accepted.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> OutboundEmail {
        OutboundEmail {
            from: "CRM System <noreply@yourapp.com>".into(),
            to: "anna@kund.se".into(),
            subject: "Hej".into(),
            html: "<p>Hej Anna</p>".into(),
        }
    }

    #[tokio::test]
    async fn accepted_message_returns_the_provider_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/emails")
            .match_header("authorization", "Bearer re_test")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "to": ["anna@kund.se"],
                "subject": "Hej",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"49a3999c-0ce1-4ea6-ab68-afcd6dc2e794"}"#)
            .create_async()
            .await;

        let client = ResendClient::new(server.url(), "re_test");
        let id = client.send(&email()).await.unwrap();

        assert_eq!(id, "49a3999c-0ce1-4ea6-ab68-afcd6dc2e794");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejection_carries_the_provider_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/emails")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"statusCode":422,"name":"validation_error","message":"Invalid `to` field."}"#)
            .create_async()
            .await;

        let client = ResendClient::new(server.url(), "re_test");
        let err = client.send(&email()).await.unwrap_err();

        assert!(matches!(err, MailError::Rejected(ref m) if m == "Invalid `to` field."));
    }

    #[tokio::test]
    async fn rejection_without_body_falls_back_to_the_status() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/emails").with_status(503).create_async().await;

        let client = ResendClient::new(format!("{}/", server.url()), "re_test");
        let err = client.send(&email()).await.unwrap_err();

        assert_eq!(err.to_string(), "HTTP 503");
    }
}
