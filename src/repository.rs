//! Repository pattern for the provider's "list messages" call.
//!
//! [`MessageRepository`] is the seam the pager is written against, so it can be
//! driven by an in-memory or mock implementation in tests.
//! [`TwilioMessageRepo`] is the production implementation backed by the
//! Twilio REST API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{Credentials, TwilioConfig};
use crate::error::{ExportError, Result};
use crate::models::{ListQuery, SmsRecord};

/// Largest page the provider serves in one HTTP response
pub const MAX_PROVIDER_PAGE_SIZE: usize = 1000;

const API_VERSION: &str = "2010-04-01";
const QUERY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Source of time-ordered SMS records.
///
/// Implementations return at most `query.limit` records with
/// `sent_after <= sent_at < sent_before`, newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Fetch one page of records for `query`
    async fn list_messages(&self, query: &ListQuery) -> Result<Vec<SmsRecord>>;
}

/// Twilio `Messages` resource client
pub struct TwilioMessageRepo {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl TwilioMessageRepo {
    /// Build a client for the account in `credentials`
    pub fn new(credentials: Credentials, config: &TwilioConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("sms-history-export/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{API_VERSION}/Accounts/{}/Messages.json",
            self.base_url, self.credentials.account_sid
        )
    }

    async fn fetch_page(&self, request: RequestBuilder) -> Result<MessagePage> {
        let response = request
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<ApiErrorBody>(&body).ok();
            let code = parsed.as_ref().and_then(|b| b.code);
            let message = parsed.and_then(|b| b.message).unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            });
            warn!(status = status.as_u16(), ?code, %message, "Provider rejected list request");
            return Err(ExportError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str::<MessagePage>(&body)?)
    }
}

#[async_trait]
impl MessageRepository for TwilioMessageRepo {
    /// Collects up to `query.limit` records, following `next_page_uri`
    /// across provider pages the way the SDK's `list(limit=...)` does.
    async fn list_messages(&self, query: &ListQuery) -> Result<Vec<SmsRecord>> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }

        let page_size = query.limit.min(MAX_PROVIDER_PAGE_SIZE);
        let params = [
            ("DateSent>", query.sent_after.format(QUERY_DATE_FORMAT).to_string()),
            ("DateSent<", query.sent_before.format(QUERY_DATE_FORMAT).to_string()),
            ("PageSize", page_size.to_string()),
        ];
        debug!(
            sent_after = %params[0].1,
            sent_before = %params[1].1,
            limit = query.limit,
            "Listing messages"
        );

        let mut records = Vec::with_capacity(page_size);
        let mut page = self
            .fetch_page(self.client.get(self.messages_url()).query(&params))
            .await?;

        loop {
            let MessagePage { messages, next_page_uri } = page;
            for message in messages {
                if records.len() >= query.limit {
                    break;
                }
                if let Some(record) = message.into_record()? {
                    records.push(record);
                }
            }

            if records.len() >= query.limit {
                break;
            }

            match next_page_uri.filter(|uri| !uri.is_empty()) {
                Some(uri) => {
                    debug!(%uri, collected = records.len(), "Following next page");
                    let url = format!("{}{uri}", self.base_url);
                    page = self.fetch_page(self.client.get(url)).await?;
                }
                None => break,
            }
        }

        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct MessagePage {
    #[serde(default)]
    messages: Vec<WireMessage>,
    #[serde(default)]
    next_page_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    sid: String,
    date_sent: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

impl WireMessage {
    /// `None` for messages that have not been sent yet
    fn into_record(self) -> Result<Option<SmsRecord>> {
        let Some(date_sent) = self.date_sent else {
            warn!(sid = %self.sid, "Skipping message without date_sent");
            return Ok(None);
        };

        let sent_at = DateTime::parse_from_rfc2822(&date_sent)
            .map_err(|e| ExportError::InvalidDate(format!("{date_sent} ({e})")))?
            .with_timezone(&Utc);

        Ok(Some(SmsRecord {
            sid: self.sid,
            sent_at,
            from: self.from.unwrap_or_default(),
            to: self.to.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wire_message_parses_rfc2822() {
        let wire = WireMessage {
            sid: "SM1".to_string(),
            date_sent: Some("Sat, 01 Jun 2024 12:30:00 +0000".to_string()),
            from: Some("+15550001111".to_string()),
            to: Some("+15552223333".to_string()),
            body: None,
        };

        let record = wire.into_record().unwrap().unwrap();
        assert_eq!(record.sent_at, Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap());
        assert_eq!(record.body, "");
    }

    #[test]
    fn test_wire_message_without_date_is_skipped() {
        let wire = WireMessage {
            sid: "SM2".to_string(),
            date_sent: None,
            from: None,
            to: None,
            body: Some("queued".to_string()),
        };

        assert!(wire.into_record().unwrap().is_none());
    }

    #[test]
    fn test_wire_message_bad_date_is_error() {
        let wire = WireMessage {
            sid: "SM3".to_string(),
            date_sent: Some("yesterday".to_string()),
            from: None,
            to: None,
            body: None,
        };

        assert!(matches!(wire.into_record(), Err(ExportError::InvalidDate(_))));
    }
}
