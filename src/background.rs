//! Runtime messages handled by the extension's service worker

use serde::{Deserialize, Serialize};

use crate::article::ArticleDraft;
use crate::gateway::{ArticleStore, PersistenceGateway};
use crate::session::AuthBackend;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BackgroundMessage {
    SaveArticle { article: ArticleDraft },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageResponse {
    pub fn ok() -> Self {
        MessageResponse {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        MessageResponse {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Save through the same gateway as the popup, under the persisted session.
pub async fn handle_message<A, S>(
    auth: &A,
    gateway: &PersistenceGateway<S>,
    message: BackgroundMessage,
) -> MessageResponse
where
    A: AuthBackend,
    S: ArticleStore,
{
    match message {
        BackgroundMessage::SaveArticle { article } => {
            let session = match auth.get_session().await {
                Ok(session) => session,
                Err(e) => return MessageResponse::failure(e.to_string()),
            };
            match gateway.save_articles(session.as_ref(), vec![article]).await {
                Ok(_) => MessageResponse::ok(),
                Err(e) => {
                    if e.is_validation() {
                        log::debug!("saveArticle rejected: {}", e);
                    } else {
                        log::warn!("saveArticle failed: {}", e);
                    }
                    MessageResponse::failure(e.user_message())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::gateway::testing::FakeStore;
    use crate::session::testing::{FakeAuth, session_for};

    fn message(json: &str) -> BackgroundMessage {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_save_article() {
        let msg = message(
            r#"{"action":"saveArticle","article":{"url":"https://example.com","title":"Ex","tags":["a"]}}"#,
        );
        let BackgroundMessage::SaveArticle { article } = msg;
        assert_eq!(article.url, "https://example.com");
        assert_eq!(article.tags, vec!["a".to_string()]);
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(serde_json::from_str::<BackgroundMessage>(r#"{"action":"deleteEverything"}"#).is_err());
    }

    #[test]
    fn test_response_serialization() {
        assert_eq!(
            serde_json::to_value(MessageResponse::ok()).unwrap(),
            serde_json::json!({"success": true})
        );
        assert_eq!(
            serde_json::to_value(MessageResponse::failure("nope")).unwrap(),
            serde_json::json!({"success": false, "error": "nope"})
        );
    }

    #[tokio::test]
    async fn test_save_with_session() {
        let auth = FakeAuth::default();
        *auth.stored.borrow_mut() = Some(session_for("u1"));
        let store = Rc::new(FakeStore::default());
        let gateway = PersistenceGateway::new(store.clone());

        let response = handle_message(
            &auth,
            &gateway,
            message(r#"{"action":"saveArticle","article":{"url":"https://example.com"}}"#),
        )
        .await;

        assert_eq!(response, MessageResponse::ok());
        assert_eq!(store.rows.borrow()[0].user_id, "u1");
    }

    #[tokio::test]
    async fn test_save_without_session() {
        let auth = FakeAuth::default();
        let store = Rc::new(FakeStore::default());
        let gateway = PersistenceGateway::new(store.clone());

        let response = handle_message(
            &auth,
            &gateway,
            message(r#"{"action":"saveArticle","article":{"url":"https://example.com"}}"#),
        )
        .await;

        assert_eq!(
            response,
            MessageResponse::failure("You must be logged in to save articles")
        );
        assert_eq!(store.requests.get(), 0);
    }
}
