//! Persistence gateway: the only path from drafts to stored articles

use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::article::{Article, ArticleDraft, NewArticle};
use crate::error::{AppError, StoreError};
use crate::session::Session;

/// The remote `articles` table.
#[allow(async_fn_in_trait)]
pub trait ArticleStore {
    /// Insert all rows in one request, returning the stored records.
    async fn insert_articles(
        &self,
        access_token: &str,
        rows: &[NewArticle],
    ) -> Result<Vec<Article>, StoreError>;
}

pub struct PersistenceGateway<S> {
    store: Rc<S>,
    clock: fn() -> DateTime<Utc>,
}

impl<S: ArticleStore> PersistenceGateway<S> {
    pub fn new(store: Rc<S>) -> Self {
        PersistenceGateway {
            store,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Stamp drafts with the session's user and the current time, then
    /// insert them as one batch.
    ///
    /// Fails with `NotAuthenticated` or `Validation` before any request is
    /// made. The batch is all-or-nothing from the caller's point of view.
    pub async fn save_articles(
        &self,
        session: Option<&Session>,
        drafts: Vec<ArticleDraft>,
    ) -> Result<Vec<Article>, AppError> {
        let session = session.ok_or(AppError::NotAuthenticated)?;

        for draft in &drafts {
            draft.validate()?;
        }
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let now = (self.clock)();
        let rows: Vec<NewArticle> = drafts
            .into_iter()
            .map(|mut draft| {
                draft.url = draft.url.trim().to_string();
                NewArticle::from_draft(draft, &session.user.id, now)
            })
            .collect();

        log::debug!("Saving {} article(s) for {}", rows.len(), session.user.id);

        self.store
            .insert_articles(&session.access_token, &rows)
            .await
            .map_err(|e| {
                log::error!("Insert into articles failed: {}", e);
                AppError::Persistence(e)
            })
    }
}

impl<S> Clone for PersistenceGateway<S> {
    fn clone(&self) -> Self {
        PersistenceGateway {
            store: Rc::clone(&self.store),
            clock: self.clock,
        }
    }
}

impl<S> PartialEq for PersistenceGateway<S> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }
}
