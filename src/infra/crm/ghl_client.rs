use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};

use crate::domain::models::crm::{
    CalendarsResponse, ContactEnvelope, ContactSearchResponse, CreateAppointmentRequest,
    CreateContactRequest, EventsResponse, GhlAppointment, GhlCalendar, GhlContact, GhlEvent,
};
use crate::domain::models::settings::GhlCredentials;
use crate::domain::ports::CrmApi;
use crate::error::CrmError;

// GHL versions its endpoint groups separately.
const CALENDARS_API_VERSION: &str = "2021-04-15";
const CONTACTS_API_VERSION: &str = "2021-07-28";

pub struct GhlClient {
    client: Client,
    base_url: String,
}

impl GhlClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn check(res: Response) -> Result<Response, CrmError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::TOO_MANY_REQUESTS => CrmError::RateLimited,
            StatusCode::NOT_FOUND => CrmError::NotFound(body),
            _ => CrmError::Api { status: status.as_u16(), message: body },
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(res: Response) -> Result<T, CrmError> {
        res.json::<T>().await.map_err(|e| CrmError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CrmApi for GhlClient {
    async fn list_calendars(&self, creds: &GhlCredentials) -> Result<Vec<GhlCalendar>, CrmError> {
        let res = self
            .client
            .get(format!("{}/calendars/", self.base_url))
            .bearer_auth(&creds.api_key)
            .header("Version", CALENDARS_API_VERSION)
            .query(&[("locationId", creds.location_id.as_str())])
            .send()
            .await?;

        let body: CalendarsResponse = Self::decode(Self::check(res).await?).await?;
        Ok(body.calendars)
    }

    async fn get_calendar(
        &self,
        creds: &GhlCredentials,
        calendar_id: &str,
    ) -> Result<GhlCalendar, CrmError> {
        let res = self
            .client
            .get(format!("{}/calendars/{}", self.base_url, calendar_id))
            .bearer_auth(&creds.api_key)
            .header("Version", CALENDARS_API_VERSION)
            .send()
            .await?;

        Self::decode(Self::check(res).await?).await
    }

    async fn list_events(
        &self,
        creds: &GhlCredentials,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<GhlEvent>, CrmError> {
        let res = self
            .client
            .get(format!("{}/calendars/events", self.base_url))
            .bearer_auth(&creds.api_key)
            .header("Version", CALENDARS_API_VERSION)
            .query(&[
                ("locationId", creds.location_id.as_str()),
                ("calendarId", calendar_id),
                ("startTime", &start.timestamp_millis().to_string()),
                ("endTime", &end.timestamp_millis().to_string()),
            ])
            .send()
            .await?;

        let body: EventsResponse = Self::decode(Self::check(res).await?).await?;
        Ok(body.events)
    }

    async fn search_contact_by_email(
        &self,
        creds: &GhlCredentials,
        email: &str,
    ) -> Result<Vec<GhlContact>, CrmError> {
        let res = self
            .client
            .get(format!("{}/contacts/", self.base_url))
            .bearer_auth(&creds.api_key)
            .header("Version", CONTACTS_API_VERSION)
            .query(&[
                ("locationId", creds.location_id.as_str()),
                ("query", email),
            ])
            .send()
            .await?;

        let body: ContactSearchResponse = Self::decode(Self::check(res).await?).await?;
        Ok(body.contacts)
    }

    async fn create_contact(
        &self,
        creds: &GhlCredentials,
        req: &CreateContactRequest,
    ) -> Result<GhlContact, CrmError> {
        let res = self
            .client
            .post(format!("{}/contacts/", self.base_url))
            .bearer_auth(&creds.api_key)
            .header("Version", CONTACTS_API_VERSION)
            .json(req)
            .send()
            .await?;

        let body: ContactEnvelope = Self::decode(Self::check(res).await?).await?;
        Ok(body.contact)
    }

    async fn create_appointment(
        &self,
        creds: &GhlCredentials,
        req: &CreateAppointmentRequest,
    ) -> Result<GhlAppointment, CrmError> {
        let res = self
            .client
            .post(format!("{}/calendars/events/appointments", self.base_url))
            .bearer_auth(&creds.api_key)
            .header("Version", CALENDARS_API_VERSION)
            .json(req)
            .send()
            .await?;

        Self::decode(Self::check(res).await?).await
    }
}
