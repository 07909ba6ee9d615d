//! HTTP client side of the [`Broker`] interface.
//!
//! Used by worker instances. The register and retrieve calls are broker-side
//! waits, so the client applies no request timeout: an instance with nothing
//! pending blocks until the broker has data for it.

use super::protocol::*;
use super::{Broker, Registration, Token};
use crate::error::{Error, Result};
use async_trait::async_trait;

pub struct HttpBroker {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpBroker {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl Broker for HttpBroker {
    async fn register(&self) -> Result<Registration> {
        let response = self
            .http_client
            .get(self.url(ENDPOINT_REGISTER))
            .send()
            .await
            .map_err(|e| Error::Registration(format!("broker unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Registration(format!(
                "registration rejected: {}",
                response.status()
            )));
        }

        let body: RegisterResponse = response
            .json()
            .await
            .map_err(|e| Error::Registration(format!("bad register response: {}", e)))?;

        Ok(Registration {
            token: body.token,
            peers: body.peers,
        })
    }

    async fn unregister(&self, token: &Token) -> Result<()> {
        let response = self
            .http_client
            .delete(self.url(ENDPOINT_UNREGISTER))
            .query(&[("src", &token.0)])
            .send()
            .await
            .map_err(|e| Error::Transport(format!("unregister failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "unregister rejected: {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn post(&self, dst: &Token, payload: String) -> Result<()> {
        let response = self
            .http_client
            .post(self.url(ENDPOINT_MESSAGES))
            .query(&[("dst", &dst.0)])
            .json(&MessageBody { payload })
            .send()
            .await
            .map_err(|e| Error::Transport(format!("post failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "post rejected: {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn retrieve(&self, own: &Token) -> Result<String> {
        // Blocks broker-side until the mailbox is non-empty.
        let response = self
            .http_client
            .get(self.url(ENDPOINT_MESSAGES))
            .query(&[("src", &own.0)])
            .send()
            .await
            .map_err(|e| Error::Transport(format!("retrieve failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "retrieve rejected: {}",
                response.status()
            )));
        }

        let body: MessageBody = response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("bad message body: {}", e)))?;
        Ok(body.payload)
    }
}
