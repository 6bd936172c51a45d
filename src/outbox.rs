// Outbox parsing: reads an exported `outbox.json` and turns its media
// attachments into (filename, alt text) pairs, keeping archive order.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// An attachment to migrate. `filename` is the last path segment of the
/// archived media URL and `alt_text` is the archived description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub alt_text: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Outbox {
    #[serde(default)]
    pub ordered_items: Vec<Activity>,
}

#[derive(Deserialize, Debug)]
pub struct Activity {
    #[serde(default)]
    pub object: Option<ActivityObject>,
}

/// Announces reference the boosted post by URL instead of embedding it.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ActivityObject {
    Post(Post),
    Reference(String),
}

#[derive(Deserialize, Debug)]
pub struct Post {
    #[serde(default)]
    pub attachment: Option<Vec<MediaDescriptor>>,
}

#[derive(Deserialize, Debug)]
pub struct MediaDescriptor {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Outbox {
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("Parsing outbox {}", path.display()))
    }

    pub fn parse(data: &str) -> Result<Self> {
        let outbox = serde_json::from_str(data)?;
        Ok(outbox)
    }

    /// All attachments of all posts, in the order they appear.
    pub fn attachments(&self) -> Vec<Attachment> {
        self.ordered_items
            .iter()
            .filter_map(|item| match &item.object {
                Some(ActivityObject::Post(post)) => post.attachment.as_deref(),
                _ => None,
            })
            .flatten()
            .map(|media| Attachment {
                filename: filename_from_url(&media.url).to_string(),
                alt_text: media.name.clone().unwrap_or_default(),
            })
            .collect()
    }
}

/// Everything after the last `/`, or the whole string when there is none.
pub fn filename_from_url(url: &str) -> &str {
    match url.rfind('/') {
        Some(idx) => &url[idx + 1..],
        None => url,
    }
}

/// "1 attachment" / "3 attachments".
pub fn attachment_count_label(count: usize) -> String {
    let unit = if count == 1 { "attachment" } else { "attachments" };
    format!("{} {}", count, unit)
}
