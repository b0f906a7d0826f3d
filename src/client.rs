//! Thin REST client for the appointment store.
//!
//! One HTTP round trip per operation, no retries, no caching: callers are
//! expected to re-fetch after every mutation and render whatever the store
//! answers, conflicts included.

use crate::http::{
    AvailabilityResponse, BlockDayRequest, CreateAppointmentRequest, DayBlocksResponse,
    PurgeResponse, SlotRequest, UpdateAppointmentRequest, ADMIN_PASSWORD_HEADER,
};
use crate::types::{Appointment, AppointmentStatus, DayBlock, DaySnapshot};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
});

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response ({status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => format!("HTTP {status}"),
    };
    Err(match status.as_u16() {
        409 => ClientError::Conflict(message),
        404 => ClientError::NotFound(message),
        400 => ClientError::Validation(message),
        code => ClientError::Api {
            status: code,
            message,
        },
    })
}

#[derive(Debug, Clone)]
pub struct AgendaClient {
    base_url: String,
    admin_password: Option<String>,
    http: Client,
}

impl AgendaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            admin_password: None,
            http: HTTP_CLIENT.clone(),
        }
    }

    /// Admin operations send the password header; without it the store
    /// answers 401.
    pub fn with_admin_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = Some(password.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.admin_password {
            Some(password) => builder.header(ADMIN_PASSWORD_HEADER, password.as_str()),
            None => builder,
        }
    }

    pub async fn list_day(&self, date: NaiveDate) -> Result<DaySnapshot, ClientError> {
        let response = self
            .http
            .get(self.url("/appointments"))
            .query(&[("date", date.to_string())])
            .send()
            .await?;
        decode(response).await
    }

    pub async fn list_all(
        &self,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<Appointment>, ClientError> {
        let mut request = self.http.get(self.url("/appointments"));
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }
        let snapshot: DaySnapshot = decode(request.send().await?).await?;
        Ok(snapshot.items)
    }

    pub async fn availability(
        &self,
        date: NaiveDate,
    ) -> Result<AvailabilityResponse, ClientError> {
        let response = self
            .http
            .get(self.url("/availability"))
            .query(&[("date", date.to_string())])
            .send()
            .await?;
        decode(response).await
    }

    pub async fn create(
        &self,
        request: &CreateAppointmentRequest,
    ) -> Result<Appointment, ClientError> {
        let response = self
            .http
            .post(self.url("/appointments"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, ClientError> {
        self.patch(
            id,
            &UpdateAppointmentRequest {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Moves an appointment, resetting it to scheduled; the store rejects
    /// occupied targets and blocked days.
    pub async fn reschedule(
        &self,
        id: Uuid,
        date: NaiveDate,
        time: &str,
    ) -> Result<Appointment, ClientError> {
        self.patch(
            id,
            &UpdateAppointmentRequest {
                date: Some(date.to_string()),
                time: Some(time.to_string()),
                status: Some(AppointmentStatus::Scheduled),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn patch(
        &self,
        id: Uuid,
        request: &UpdateAppointmentRequest,
    ) -> Result<Appointment, ClientError> {
        let builder = self.http.patch(self.url(&format!("/appointments/{id}")));
        let response = self.authorized(builder).json(request).send().await?;
        decode(response).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        let builder = self.http.delete(self.url(&format!("/appointments/{id}")));
        let response = self.authorized(builder).send().await?;
        decode::<serde_json::Value>(response).await?;
        Ok(())
    }

    pub async fn delete_canceled(&self) -> Result<usize, ClientError> {
        let builder = self
            .http
            .delete(self.url("/appointments"))
            .query(&[("status", "canceled")]);
        let response = self.authorized(builder).send().await?;
        let purged: PurgeResponse = decode(response).await?;
        Ok(purged.removed)
    }

    pub async fn block_slot(&self, date: NaiveDate, time: &str) -> Result<(), ClientError> {
        self.slot_action("/slots/block", date, time).await
    }

    pub async fn unblock_slot(&self, date: NaiveDate, time: &str) -> Result<(), ClientError> {
        self.slot_action("/slots/unblock", date, time).await
    }

    async fn slot_action(
        &self,
        path: &str,
        date: NaiveDate,
        time: &str,
    ) -> Result<(), ClientError> {
        let builder = self.http.post(self.url(path));
        let response = self
            .authorized(builder)
            .json(&SlotRequest {
                date: date.to_string(),
                time: time.to_string(),
            })
            .send()
            .await?;
        decode::<serde_json::Value>(response).await?;
        Ok(())
    }

    pub async fn day_blocks(&self) -> Result<Vec<DayBlock>, ClientError> {
        let response = self.http.get(self.url("/day-blocks")).send().await?;
        let blocks: DayBlocksResponse = decode(response).await?;
        Ok(blocks.items)
    }

    pub async fn block_day(
        &self,
        date: NaiveDate,
        reason: Option<&str>,
    ) -> Result<DayBlock, ClientError> {
        let builder = self.http.post(self.url("/day-blocks"));
        let response = self
            .authorized(builder)
            .json(&BlockDayRequest {
                date: date.to_string(),
                reason: reason.map(str::to_string),
            })
            .send()
            .await?;
        decode(response).await
    }

    pub async fn unblock_day(&self, date: NaiveDate) -> Result<(), ClientError> {
        let builder = self.http.delete(self.url(&format!("/day-blocks/{date}")));
        let response = self.authorized(builder).send().await?;
        decode::<serde_json::Value>(response).await?;
        Ok(())
    }
}
