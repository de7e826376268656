//! Per-slide annotations fetched from the backend.
//!
//! The wire format maps page numbers (as strings) to either a bare string, the legacy
//! format, or a `{title, summary}` record. Summaries are produced per topic, so several
//! consecutive slides usually share one summary; [`AnnotationMap::related_slides`] groups them.

use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};

/// One slide's annotation as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SlideAnnotation {
    Text(String),
    Record {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        summary: Option<String>,
    },
}

impl SlideAnnotation {
    fn summary(&self) -> Option<&str> {
        match self {
            SlideAnnotation::Record {
                summary: Some(summary),
                ..
            } if !summary.trim().is_empty() => Some(summary.as_str()),
            _ => None,
        }
    }
}

/// Which of the two wire formats a map uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationFormat {
    /// Every entry is a plain string
    Legacy,
    /// At least one entry is a `{title, summary}` record
    Structured,
}

/// What the slide panel shows for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideText {
    pub title: Option<String>,
    pub body: String,
}

/// Page number to annotation, ordered numerically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationMap {
    entries: BTreeMap<u32, SlideAnnotation>,
}

impl AnnotationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from wire entries, ignoring keys that are not page numbers.
    pub fn from_entries(raw: HashMap<String, SlideAnnotation>) -> Self {
        let mut entries = BTreeMap::new();
        for (key, annotation) in raw {
            match key.trim().parse::<u32>() {
                Ok(page) if page > 0 => {
                    entries.insert(page, annotation);
                }
                _ => log::warn!("ignoring annotation with non-page key {:?}", key),
            }
        }
        Self { entries }
    }

    pub fn insert(&mut self, page: u32, annotation: SlideAnnotation) {
        self.entries.insert(page, annotation);
    }

    pub fn get(&self, page: u32) -> Option<&SlideAnnotation> {
        self.entries.get(&page)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn format(&self) -> AnnotationFormat {
        if self
            .entries
            .values()
            .all(|annotation| matches!(annotation, SlideAnnotation::Text(_)))
        {
            AnnotationFormat::Legacy
        } else {
            AnnotationFormat::Structured
        }
    }

    /// Blank legacy text counts as missing.
    pub fn slide_text(&self, page: u32) -> SlideText {
        match self.entries.get(&page) {
            Some(SlideAnnotation::Text(text)) if !text.trim().is_empty() => SlideText {
                title: None,
                body: text.clone(),
            },
            Some(annotation @ SlideAnnotation::Record { title, .. }) => SlideText {
                title: title.clone().filter(|t| !t.trim().is_empty()),
                body: annotation
                    .summary()
                    .map(str::to_string)
                    .unwrap_or_else(|| no_summary(page)),
            },
            Some(SlideAnnotation::Text(_)) | None => SlideText {
                title: None,
                body: match self.format() {
                    AnnotationFormat::Legacy => format!("No text available for slide {}", page),
                    AnnotationFormat::Structured => no_summary(page),
                },
            },
        }
    }

    /// Pages sharing this page's summary, ascending. A page without a summary is its own group.
    pub fn related_slides(&self, page: u32) -> Vec<u32> {
        let Some(summary) = self.entries.get(&page).and_then(SlideAnnotation::summary) else {
            return vec![page];
        };
        self.entries
            .iter()
            .filter(|(_, annotation)| annotation.summary() == Some(summary))
            .map(|(&p, _)| p)
            .collect()
    }

    pub fn set_title(&mut self, page: u32, title: impl Into<String>) {
        let title = Some(title.into());
        match self.entries.remove(&page) {
            Some(SlideAnnotation::Record { summary, .. }) => {
                self.entries
                    .insert(page, SlideAnnotation::Record { title, summary });
            }
            Some(SlideAnnotation::Text(text)) => {
                self.entries.insert(
                    page,
                    SlideAnnotation::Record {
                        title,
                        summary: Some(text),
                    },
                );
            }
            None => {
                self.entries.insert(
                    page,
                    SlideAnnotation::Record {
                        title,
                        summary: None,
                    },
                );
            }
        }
    }

    pub fn set_summary(&mut self, page: u32, summary: impl Into<String>) {
        let summary = Some(summary.into());
        let title = match self.entries.remove(&page) {
            Some(SlideAnnotation::Record { title, .. }) => title,
            _ => None,
        };
        self.entries
            .insert(page, SlideAnnotation::Record { title, summary });
    }
}

impl<'de> Deserialize<'de> for AnnotationMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        HashMap::<String, SlideAnnotation>::deserialize(deserializer).map(Self::from_entries)
    }
}

fn no_summary(page: u32) -> String {
    format!("No summary available for slide {}", page)
}
