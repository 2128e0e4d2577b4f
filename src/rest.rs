//! HTTP implementation of the backend traits.
//!
//! Data goes through the PostgREST endpoints under `/rest/v1`, auth through
//! the GoTrue endpoints under `/auth/v1`. Every request carries the project's
//! anon key; data and session requests also carry the user's access token.

use crate::backend::{Backend, BackendError, HabitStore};
use crate::config::BackendConfig;
use crate::heatmap::date_key;
use crate::models::{
    ArchiveUpdate, AuthResponse, CompletionDate, CompletionHabitId, Habit, HabitStats, NewHabit,
    Session, User,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct Endpoint {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl Endpoint {
    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = method.as_str(), url = url.as_str(), "backend request");
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(&self.anon_key))
    }
}

#[derive(Debug, Clone)]
pub struct RestBackend {
    endpoint: Endpoint,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            endpoint: Endpoint {
                client,
                base_url: config.url.trim_end_matches('/').to_string(),
                anon_key: config.anon_key.clone(),
            },
        })
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<Session, BackendError> {
        let response = self
            .endpoint
            .request(Method::POST, &format!("/auth/v1/token?grant_type={grant_type}"), None)
            .json(&body)
            .send()
            .await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponse, BackendError> {
        let response = self
            .endpoint
            .request(Method::POST, "/auth/v1/signup", None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body: Value = check(response).await?.json().await?;
        parse_sign_up(body)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>, BackendError> {
        let response = self
            .endpoint
            .request(Method::GET, "/auth/v1/user", Some(access_token))
            .send()
            .await?;
        match check(response).await {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(err) if err.is_unauthorized() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let response = self
            .endpoint
            .request(Method::POST, "/auth/v1/logout", Some(access_token))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn exchange_code_for_session(&self, code: &str) -> Result<Session, BackendError> {
        self.token_grant("pkce", json!({ "auth_code": code })).await
    }

    fn store(&self, access_token: &str) -> Arc<dyn HabitStore> {
        Arc::new(RestStore {
            endpoint: self.endpoint.clone(),
            access_token: access_token.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RestStore {
    endpoint: Endpoint,
    access_token: String,
}

impl RestStore {
    fn table(&self, method: Method, table: &str) -> RequestBuilder {
        self.endpoint
            .request(method, &format!("/rest/v1/{table}"), Some(&self.access_token))
    }

    async fn rpc(&self, name: &str, args: Value) -> Result<Value, BackendError> {
        let response = self
            .endpoint
            .request(Method::POST, &format!("/rest/v1/rpc/{name}"), Some(&self.access_token))
            .json(&args)
            .send()
            .await?;
        let bytes = check(response).await?.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl HabitStore for RestStore {
    async fn list_habits(&self, archived: bool) -> Result<Vec<Habit>, BackendError> {
        let response = self
            .table(Method::GET, "habits")
            .query(&[
                ("select", "*".to_string()),
                ("is_archived", format!("eq.{archived}")),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn insert_habit(&self, habit: &NewHabit) -> Result<(), BackendError> {
        let response = self
            .table(Method::POST, "habits")
            .header("Prefer", "return=minimal")
            .json(habit)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn update_archival(&self, habit_id: &str, update: &ArchiveUpdate) -> Result<(), BackendError> {
        let response = self
            .table(Method::PATCH, "habits")
            .query(&[("id", format!("eq.{habit_id}"))])
            .json(update)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn delete_habit(&self, habit_id: &str) -> Result<(), BackendError> {
        let response = self
            .table(Method::DELETE, "habits")
            .query(&[("id", format!("eq.{habit_id}"))])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn completion_dates_since(
        &self,
        habit_id: &str,
        cutoff: NaiveDate,
    ) -> Result<Vec<NaiveDate>, BackendError> {
        let response = self
            .table(Method::GET, "habit_completions")
            .query(&[
                ("select", "date".to_string()),
                ("habit_id", format!("eq.{habit_id}")),
                ("date", format!("gte.{}", date_key(cutoff))),
                ("order", "date.asc".to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<CompletionDate> = check(response).await?.json().await?;
        Ok(rows.into_iter().map(|row| row.date).collect())
    }

    async fn habits_completed_on(&self, date: NaiveDate) -> Result<Vec<String>, BackendError> {
        let response = self
            .table(Method::GET, "habit_completions")
            .query(&[
                ("select", "habit_id".to_string()),
                ("date", format!("eq.{}", date_key(date))),
            ])
            .send()
            .await?;
        let rows: Vec<CompletionHabitId> = check(response).await?.json().await?;
        Ok(rows.into_iter().map(|row| row.habit_id).collect())
    }

    async fn delete_completion(&self, habit_id: &str, date: NaiveDate) -> Result<(), BackendError> {
        let response = self
            .table(Method::DELETE, "habit_completions")
            .query(&[
                ("habit_id", format!("eq.{habit_id}")),
                ("date", format!("eq.{}", date_key(date))),
            ])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn current_streak(&self, habit_id: &str) -> Result<u32, BackendError> {
        let value = self.rpc("get_current_streak", json!({ "habit_id": habit_id })).await?;
        if value.is_null() {
            return Ok(0);
        }
        Ok(serde_json::from_value(value)?)
    }

    async fn habit_stats(&self, habit_id: &str) -> Result<HabitStats, BackendError> {
        let value = self.rpc("get_habit_stats", json!({ "habit_id": habit_id })).await?;
        parse_stats(value)
    }

    async fn complete_habit(&self, habit_id: &str) -> Result<(), BackendError> {
        self.rpc("complete_habit", json!({ "habit_id": habit_id })).await?;
        Ok(())
    }

    async fn evolve_habit(&self, habit_id: &str, new_description: &str) -> Result<(), BackendError> {
        self.rpc(
            "evolve_habit",
            json!({ "habit_id": habit_id, "new_description": new_description }),
        )
        .await?;
        Ok(())
    }
}

async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(BackendError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = parsed.as_ref().and_then(|value| {
        ["message", "msg", "error_description", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
    });

    match field {
        Some(message) => message.to_string(),
        None if body.trim().is_empty() => "no response body".to_string(),
        None => body.chars().take(200).collect(),
    }
}

/// GoTrue answers sign-up with a session when auto-confirm is on and with a
/// bare user when an email confirmation is still pending.
fn parse_sign_up(body: Value) -> Result<AuthResponse, BackendError> {
    if body.get("access_token").is_some() {
        let session: Session = serde_json::from_value(body)?;
        return Ok(AuthResponse {
            user: session.user.clone(),
            session: Some(session),
        });
    }

    if let Some(user) = body.get("user").filter(|user| !user.is_null()) {
        return Ok(AuthResponse {
            user: Some(serde_json::from_value(user.clone())?),
            session: None,
        });
    }

    if body.get("id").is_some() {
        return Ok(AuthResponse {
            user: Some(serde_json::from_value(body)?),
            session: None,
        });
    }

    Ok(AuthResponse::default())
}

/// Table functions come back as a single-row array, scalar functions as an object.
fn parse_stats(value: Value) -> Result<HabitStats, BackendError> {
    let row = match value {
        Value::Array(rows) => rows.into_iter().next().unwrap_or(Value::Null),
        other => other,
    };
    if row.is_null() {
        return Ok(HabitStats::default());
    }
    Ok(serde_json::from_value(row)?)
}
