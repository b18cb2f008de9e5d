//! Supabase auth (GoTrue) and `articles` table (PostgREST) over HTTP

use std::cell::RefCell;

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::article::{Article, NewArticle};
use crate::backend::chrome;
use crate::config::Config;
use crate::error::{AuthError, StoreError};
use crate::gateway::ArticleStore;
use crate::observer::{Listeners, Subscription};
use crate::session::{AuthBackend, AuthChange, AuthEvent, OAuthProvider, Session, User};
use crate::storage::{SessionStore, StorageData};

const ARTICLES_TABLE: &str = "articles";

pub struct SupabaseClient<K> {
    http: Client,
    base: String,
    anon_key: String,
    store: K,
    current: RefCell<Option<Session>>,
    listeners: Listeners<AuthChange>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self, now_secs: i64) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self
                .expires_at
                .or_else(|| self.expires_in.map(|secs| now_secs + secs)),
            user: self.user,
        }
    }
}

/// Error bodies differ between GoTrue and PostgREST; take whichever message
/// is present.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.msg).or(b.error_description).or(b.error))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("request failed with status {status}"))
}

async fn read_error(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error_message(status, &body)
}

/// Authorize URL a browser tab is sent to for OAuth sign-in.
pub fn oauth_authorize_url(
    base: &str,
    provider: OAuthProvider,
    redirect_to: Option<&str>,
) -> Result<Url, AuthError> {
    let mut url = Url::parse(&format!("{}/auth/v1/authorize", base.trim_end_matches('/')))
        .map_err(|e| AuthError::rejected(format!("invalid auth URL: {e}")))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("provider", provider.as_str());
        if let Some(redirect) = redirect_to {
            query.append_pair("redirect_to", redirect);
        }
    }
    Ok(url)
}

impl<K: SessionStore> SupabaseClient<K> {
    pub fn new(config: &Config, store: K) -> Self {
        SupabaseClient {
            http: Client::new(),
            base: config.api_base().to_string(),
            anon_key: config.supabase_anon_key.clone(),
            store,
            current: RefCell::new(None),
            listeners: Listeners::new(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base, path)
    }

    async fn set_session(&self, session: Option<Session>, event: AuthEvent) {
        *self.current.borrow_mut() = session.clone();
        if let Err(e) = self.store.save(&StorageData::new(session.clone())).await {
            log::warn!("Failed to persist session: {}", e);
        }
        self.listeners.notify(&AuthChange { event, session });
    }

    async fn post_credentials(
        &self,
        url: String,
        email: &str,
        password: &str,
    ) -> Result<serde_json::Value, AuthError> {
        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&Credentials { email, password })
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Rejected(read_error(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::rejected(format!("invalid auth response: {e}")))
    }
}

impl<K: SessionStore> AuthBackend for SupabaseClient<K> {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        if let Some(session) = self.current.borrow().clone() {
            return Ok(Some(session));
        }
        let stored = self
            .store
            .load()
            .await
            .map_err(|e| AuthError::rejected(e.to_string()))?;
        let session = stored.live_session(Utc::now().timestamp());
        *self.current.borrow_mut() = session.clone();
        Ok(session)
    }

    fn on_auth_state_change(&self, listener: impl Fn(&AuthChange) + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        log::debug!("Signing in {}", email);
        let body = self
            .post_credentials(self.auth_url("token?grant_type=password"), email, password)
            .await?;
        let token: TokenResponse = serde_json::from_value(body)
            .map_err(|e| AuthError::rejected(format!("invalid token response: {e}")))?;
        let session = token.into_session(Utc::now().timestamp());
        self.set_session(Some(session.clone()), AuthEvent::SignedIn)
            .await;
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError> {
        log::debug!("Signing up {}", email);
        let body = self
            .post_credentials(self.auth_url("signup"), email, password)
            .await?;

        // Without auto-confirm the response is the bare user record.
        if body.get("access_token").is_none() {
            return Ok(None);
        }
        let token: TokenResponse = serde_json::from_value(body)
            .map_err(|e| AuthError::rejected(format!("invalid sign-up response: {e}")))?;
        let session = token.into_session(Utc::now().timestamp());
        self.set_session(Some(session.clone()), AuthEvent::SignedIn)
            .await;
        Ok(Some(session))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self.current.borrow().as_ref().map(|s| s.access_token.clone());
        if let Some(token) = token {
            let response = self
                .http
                .post(self.auth_url("logout"))
                .header("apikey", &self.anon_key)
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .send()
                .await
                .map_err(|e| AuthError::Network(e.to_string()))?;

            let status = response.status();
            // An already-invalid token still signs the user out locally.
            if !status.is_success()
                && status != StatusCode::UNAUTHORIZED
                && status != StatusCode::NOT_FOUND
            {
                return Err(AuthError::Rejected(read_error(response).await));
            }
        }
        self.set_session(None, AuthEvent::SignedOut).await;
        Ok(())
    }

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: Option<&str>,
    ) -> Result<(), AuthError> {
        let url = oauth_authorize_url(&self.base, provider, redirect_to)?;
        log::debug!("Opening {} sign-in", provider.as_str());
        chrome::open_tab(url.as_str())
            .await
            .map_err(AuthError::Rejected)
    }
}

impl<K> ArticleStore for SupabaseClient<K> {
    async fn insert_articles(
        &self,
        access_token: &str,
        rows: &[NewArticle],
    ) -> Result<Vec<Article>, StoreError> {
        let response = self
            .http
            .post(format!("{}/rest/v1/{}", self.base, ARTICLES_TABLE))
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .await
            .map_err(|e| StoreError::new(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::new(read_error(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::new(format!("invalid insert response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::session::testing::session_for;
    use crate::storage::MemorySessionStore;

    fn config() -> Config {
        Config {
            supabase_url: "https://abc.supabase.co/".to_string(),
            supabase_anon_key: "anon".to_string(),
            metadata_endpoint: crate::config::DEFAULT_METADATA_ENDPOINT.to_string(),
            web_app_url: crate::config::DEFAULT_WEB_APP_URL.to_string(),
        }
    }

    #[test]
    fn test_error_message_variants() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(
            error_message(status, r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(
            error_message(status, r#"{"code":"42501","message":"new row violates row-level security policy"}"#),
            "new row violates row-level security policy"
        );
        assert_eq!(error_message(status, r#"{"msg":"User already registered"}"#), "User already registered");
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>"),
            "request failed with status 502 Bad Gateway"
        );
    }

    #[test]
    fn test_token_response_into_session() {
        let token: TokenResponse = serde_json::from_str(
            r#"{
                "access_token": "jwt",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "r",
                "user": {"id": "u1", "email": "u1@example.com", "aud": "authenticated"}
            }"#,
        )
        .unwrap();

        let session = token.into_session(1_000);

        assert_eq!(session.expires_at, Some(4_600));
        assert_eq!(session.user.id, "u1");
        assert_eq!(session.refresh_token.as_deref(), Some("r"));
    }

    #[test]
    fn test_oauth_authorize_url() {
        let url = oauth_authorize_url(
            "https://abc.supabase.co/",
            OAuthProvider::Google,
            Some("https://ext.example/cb"),
        )
        .unwrap();

        assert_eq!(url.path(), "/auth/v1/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("provider".to_string(), "google".to_string()),
                ("redirect_to".to_string(), "https://ext.example/cb".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_get_session_reads_store_once() {
        let store = MemorySessionStore::default();
        store
            .save(&StorageData::new(Some(session_for("u1"))))
            .await
            .unwrap();
        let client = SupabaseClient::new(&config(), store);

        let session = client.get_session().await.unwrap();

        assert_eq!(session.map(|s| s.user.id), Some("u1".to_string()));
        assert!(client.current.borrow().is_some());
    }

    #[tokio::test]
    async fn test_sign_out_without_session_clears_and_notifies() {
        let client = SupabaseClient::new(&config(), MemorySessionStore::default());
        let events = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let events = events.clone();
            client.on_auth_state_change(move |change| events.borrow_mut().push(change.event))
        };

        client.sign_out().await.unwrap();

        assert_eq!(*events.borrow(), vec![AuthEvent::SignedOut]);
        assert_eq!(client.get_session().await.unwrap(), None);
    }
}
