//! REST
//!
//! Client of the catalog service. Records that cannot be converted into domain entities are
//! skipped, so a single broken document does not make a whole page unusable.

use chrono::{DateTime, Utc};
use gloo_net::http::{Request, Response};
use lifto_domain as domain;
use lifto_web_app::Settings;
use log::{debug, warn};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error>;
}

#[derive(Clone, Copy, Default)]
pub struct GlooNetSendRequest;

impl SendRequest for GlooNetSendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error> {
        request.send().await
    }
}

#[derive(Clone)]
pub struct REST<S: SendRequest> {
    sender: S,
    base_url: String,
    token: Option<domain::AuthToken>,
}

impl REST<GlooNetSendRequest> {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_sender(GlooNetSendRequest, base_url)
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.catalog_url.clone())
    }
}

impl<S: SendRequest> REST<S> {
    pub fn with_sender(sender: S, base_url: impl Into<String>) -> Self {
        Self {
            sender,
            base_url: base_url.into(),
            token: None,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: domain::AuthToken) -> Self {
        self.token = Some(token);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    async fn fetch<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, domain::ReadError>
    where
        T: DeserializeOwned,
    {
        let abort = AbortOnDrop::new();
        let mut builder = Request::get(&self.url(path))
            .query(query.iter().map(|(key, value)| (*key, value.as_str())))
            .abort_signal(abort.signal().as_ref());
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", &format!("Bearer {}", token.expose()));
        }
        let request = builder
            .build()
            .map_err(|err| domain::ReadError::Other(Box::new(err)))?;

        let response = match self.sender.send_request(request).await {
            Ok(response) => response,
            Err(err) => {
                debug!("request to {path} failed: {err}");
                return Err(domain::StorageError::NoConnection.into());
            }
        };

        if !response.ok() {
            return Err(server_error(response).await.into());
        }

        response
            .json::<T>()
            .await
            .map_err(|err| domain::ReadError::Other(Box::new(err)))
    }
}

impl<S: SendRequest> domain::CatalogRepository for REST<S> {
    async fn read_muscle_groups(&self) -> Result<Vec<domain::MuscleGroup>, domain::ReadError> {
        let body: MuscleGroups = self.fetch("muscle", &[]).await?;
        Ok(valid_records::<MuscleGroup, _>(body.muscles, "muscle group"))
    }

    async fn read_exercises(
        &self,
        page: domain::Page,
    ) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let body: Exercises = self
            .fetch("exercise", &[("p", page.number().to_string())])
            .await?;
        Ok(valid_records::<Exercise, _>(body.exercises, "exercise"))
    }
}

async fn server_error(response: Response) -> domain::StorageError {
    let status = response.status();
    if status == 401 || status == 403 {
        return domain::StorageError::NoSession;
    }
    let fallback = format!("{status} {}", response.status_text());
    match response.json::<ErrorBody>().await {
        Ok(body) => domain::StorageError::Server {
            code: body.error,
            message: body.message,
        },
        Err(_) => domain::StorageError::Server {
            code: status.to_string(),
            message: fallback,
        },
    }
}

/// Cancels the underlying fetch when the request future is dropped before completion.
struct AbortOnDrop(Option<web_sys::AbortController>);

impl AbortOnDrop {
    fn new() -> Self {
        Self(web_sys::AbortController::new().ok())
    }

    fn signal(&self) -> Option<web_sys::AbortSignal> {
        self.0.as_ref().map(web_sys::AbortController::signal)
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if let Some(controller) = &self.0 {
            controller.abort();
        }
    }
}

fn valid_records<W, D>(records: Vec<serde_json::Value>, entity: &str) -> Vec<D>
where
    W: DeserializeOwned,
    D: TryFrom<W, Error = InvalidRecord>,
{
    records
        .into_iter()
        .filter_map(|record| {
            let id = record
                .get("_id")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("?")
                .to_string();
            match serde_json::from_value::<W>(record)
                .map_err(InvalidRecord::from)
                .and_then(D::try_from)
            {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("skipping invalid {entity} {id}: {err}");
                    None
                }
            }
        })
        .collect()
}

#[derive(thiserror::Error, Debug)]
pub enum InvalidRecord {
    #[error(transparent)]
    Format(#[from] serde_json::Error),
    #[error(transparent)]
    Name(#[from] domain::NameError),
    #[error(transparent)]
    Difficulty(#[from] domain::DifficultyError),
    #[error("Difficulty must be in the range 1 to 5 ({0})")]
    DifficultyOverflow(i64),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

#[derive(Deserialize)]
struct MuscleGroups {
    muscles: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct Exercises {
    exercises: Vec<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MuscleGroup {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

impl TryFrom<MuscleGroup> for domain::MuscleGroup {
    type Error = InvalidRecord;

    fn try_from(value: MuscleGroup) -> Result<Self, Self::Error> {
        Ok(domain::MuscleGroup {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
        })
    }
}

/// Reference to a muscle group, which is either the plain id or the populated document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum MuscleRef {
    Id(String),
    Populated(MuscleGroup),
}

impl MuscleRef {
    fn into_id(self) -> String {
        match self {
            MuscleRef::Id(id) => id,
            MuscleRef::Populated(muscle_group) => muscle_group.id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub muscle: MuscleRef,
    pub difficulty: i64,
    pub image: String,
    #[serde(default)]
    pub created_at: Option<String>,
    pub created_by: String,
}

impl TryFrom<Exercise> for domain::Exercise {
    type Error = InvalidRecord;

    fn try_from(value: Exercise) -> Result<Self, Self::Error> {
        let difficulty = u8::try_from(value.difficulty)
            .map_err(|_| InvalidRecord::DifficultyOverflow(value.difficulty))?;
        Ok(domain::Exercise {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            muscle_group: value.muscle.into_id().into(),
            difficulty: domain::Difficulty::new(difficulty)?,
            image: value.image,
            created_at: value.created_at.as_deref().and_then(parse_created_at),
            created_by: value.created_by.into(),
        })
    }
}

/// Accepts ISO 8601 as well as the output of JavaScript's `Date.prototype.toString`, e.g.
/// `Thu Oct 16 2026 10:00:00 GMT+0000 (Coordinated Universal Time)`.
fn parse_created_at(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Some(date_time.with_timezone(&Utc));
    }
    let without_zone_name = value.split(" (").next().unwrap_or(value);
    match DateTime::parse_from_str(without_zone_name, "%a %b %d %Y %H:%M:%S GMT%z") {
        Ok(date_time) => Some(date_time.with_timezone(&Utc)),
        Err(err) => {
            debug!("ignoring creation time {value:?}: {err}");
            None
        }
    }
}
