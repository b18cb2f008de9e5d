//! Tag input: free text and chips kept in lockstep

/// Split comma-separated text into trimmed, non-empty, de-duplicated tags,
/// keeping first-seen order.
pub fn parse_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// The tag field of the article form.
///
/// `text` is what the user typed; `tags` is always `parse_tags(&text)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagInput {
    text: String,
    tags: Vec<String>,
}

impl TagInput {
    pub fn from_tags(tags: &[String]) -> TagInput {
        TagInput::from_text(&tags.join(", "))
    }

    pub fn from_text(text: &str) -> TagInput {
        TagInput {
            text: text.to_string(),
            tags: parse_tags(text),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn set_text(&mut self, text: &str) {
        *self = TagInput::from_text(text);
    }

    /// Remove a chip. Returns false if no such tag exists.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        if self.tags.len() == before {
            return false;
        }
        self.text = self.tags.join(", ");
        true
    }
}
