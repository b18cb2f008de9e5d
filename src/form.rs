//! Article form state machine
//!
//! `Closed -> Open -> Submitting -> Saved -> Closed`, or back to `Open` with
//! an error when the save fails. Field values survive a failed submit.

use crate::article::{Article, ArticleDraft, validate_url};
use crate::error::{AppError, MetadataError, ValidationError};
use crate::metadata::{LinkPreview, MetadataOutcome};
use crate::tags::TagInput;

/// How long the success message stays up before the form closes.
pub const SUCCESS_CLOSE_DELAY_MS: u32 = 1500;

pub const SAVED_MESSAGE: &str = "Article saved successfully!";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleFields {
    pub url: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub site_name: String,
    pub publisher: String,
    pub tags: TagInput,
}

impl ArticleFields {
    /// Missing optional values become empty strings.
    pub fn from_draft(draft: &ArticleDraft) -> ArticleFields {
        ArticleFields {
            url: draft.url.clone(),
            title: draft.title.clone(),
            description: draft.description.clone().unwrap_or_default(),
            image_url: draft.image_url.clone().unwrap_or_default(),
            site_name: draft.site_name.clone().unwrap_or_default(),
            publisher: draft.publisher.clone().unwrap_or_default(),
            tags: TagInput::from_tags(&draft.tags),
        }
    }

    pub fn to_draft(&self) -> ArticleDraft {
        ArticleDraft {
            url: self.url.trim().to_string(),
            title: self.title.trim().to_string(),
            description: non_empty(&self.description),
            tags: self.tags.tags().to_vec(),
            image_url: non_empty(&self.image_url),
            site_name: non_empty(&self.site_name),
            publisher: non_empty(&self.publisher),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Url,
    Title,
    Description,
    ImageUrl,
    SiteName,
    Publisher,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum FormState {
    #[default]
    Closed,
    Open {
        error: Option<String>,
    },
    Submitting,
    Saved {
        message: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleForm {
    state: FormState,
    fields: ArticleFields,
    fetching_metadata: bool,
    metadata_error: Option<String>,
}

impl ArticleForm {
    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn fields(&self) -> &ArticleFields {
        &self.fields
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, FormState::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, FormState::Submitting)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FormState::Open { error } => error.as_deref(),
            _ => None,
        }
    }

    pub fn is_fetching_metadata(&self) -> bool {
        self.fetching_metadata
    }

    pub fn metadata_error(&self) -> Option<&str> {
        self.metadata_error.as_deref()
    }

    /// Open prefilled from `draft`, or blank.
    pub fn open(&mut self, draft: Option<&ArticleDraft>) {
        self.fields = draft.map(ArticleFields::from_draft).unwrap_or_default();
        self.state = FormState::Open { error: None };
        self.fetching_metadata = false;
        self.metadata_error = None;
    }

    /// Cancel or dismiss. The draft is discarded.
    pub fn close(&mut self) {
        *self = ArticleForm::default();
    }

    /// Close once the success message has been shown. No-op if the form was
    /// reopened or closed in the meantime.
    pub fn close_after_success(&mut self) {
        if matches!(self.state, FormState::Saved { .. }) {
            self.close();
        }
    }

    fn editable(&self) -> bool {
        matches!(self.state, FormState::Open { .. })
    }

    pub fn set_field(&mut self, field: Field, value: &str) {
        if !self.editable() {
            return;
        }
        let slot = match field {
            Field::Url => &mut self.fields.url,
            Field::Title => &mut self.fields.title,
            Field::Description => &mut self.fields.description,
            Field::ImageUrl => &mut self.fields.image_url,
            Field::SiteName => &mut self.fields.site_name,
            Field::Publisher => &mut self.fields.publisher,
        };
        *slot = value.to_string();
    }

    pub fn set_tags_text(&mut self, text: &str) {
        if self.editable() {
            self.fields.tags.set_text(text);
        }
    }

    pub fn remove_tag(&mut self, tag: &str) {
        if self.editable() {
            self.fields.tags.remove(tag);
        }
    }

    /// Inline hint for a URL that is present but malformed.
    pub fn url_hint(&self) -> Option<ValidationError> {
        if self.fields.url.trim().is_empty() {
            return None;
        }
        validate_url(&self.fields.url).err()
    }

    /// Validate and move to `Submitting`.
    ///
    /// `None` while the form is not open for editing. A validation failure
    /// keeps the form open with the error shown.
    pub fn begin_submit(&mut self) -> Option<Result<ArticleDraft, ValidationError>> {
        if !self.editable() {
            return None;
        }
        let draft = self.fields.to_draft();
        if let Err(err) = draft.validate() {
            self.state = FormState::Open {
                error: Some(err.to_string()),
            };
            return Some(Err(err));
        }
        self.state = FormState::Submitting;
        Some(Ok(draft))
    }

    pub fn finish_submit(&mut self, result: &Result<Vec<Article>, AppError>) {
        if !self.is_submitting() {
            return;
        }
        self.state = match result {
            Ok(_) => FormState::Saved {
                message: SAVED_MESSAGE.to_string(),
            },
            Err(err) => FormState::Open {
                error: Some(err.user_message()),
            },
        };
    }

    /// The URL to look up, if the form is open, the URL is valid and no
    /// lookup is already running.
    pub fn begin_metadata_fetch(&mut self) -> Option<String> {
        if !self.editable() || self.fetching_metadata {
            return None;
        }
        let url = self.fields.url.trim().to_string();
        if let Err(err) = validate_url(&url) {
            self.metadata_error = Some(err.to_string());
            return None;
        }
        self.fetching_metadata = true;
        self.metadata_error = None;
        Some(url)
    }

    pub fn finish_metadata_fetch(&mut self, result: Result<LinkPreview, MetadataError>) {
        self.fetching_metadata = false;
        if !self.editable() {
            return;
        }
        match result {
            Ok(preview) => {
                if preview.apply_to(&mut self.fields) == MetadataOutcome::Blocked {
                    log::info!("Metadata lookup was blocked by {}", self.fields.url);
                }
            }
            Err(err) => {
                log::warn!("Metadata fetch failed: {}", err);
                self.metadata_error = Some(AppError::MetadataFetch(err).user_message());
            }
        }
    }
}
