use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::debug;

use crate::error::ContentError;
use crate::filter::{apply_filters, FilterOptions};

static PASSAGE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/passages");

/// Names of the built-in passage collections, in cycling order
pub const SOURCE_NAMES: &[&str] = &["quotes", "code"];

pub const DEFAULT_SOURCE: &str = "quotes";

/// Text handed to a race, plus where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub text: String,
    pub source_url: Option<String>,
    pub author: Option<String>,
}

/// Anything that can supply text to type
pub trait ContentSource {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn get_content(&self) -> Result<Content, ContentError>;
}

#[derive(Deserialize, Clone, Debug)]
pub struct Passage {
    pub text: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
struct PassageCollection {
    name: String,
    description: String,
    passages: Vec<Passage>,
}

/// One of the passage collections compiled into the binary
#[derive(Debug, Clone)]
pub struct PassageSource {
    collection: PassageCollection,
}

impl PassageSource {
    pub fn load(name: &str) -> Result<Self, ContentError> {
        let file = PASSAGE_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| ContentError::UnknownSource(name.to_string()))?;

        let json = file
            .contents_utf8()
            .ok_or_else(|| ContentError::Unavailable(format!("{name} is not valid UTF-8")))?;

        Ok(Self {
            collection: serde_json::from_str(json)?,
        })
    }

    pub fn passages(&self) -> &[Passage] {
        &self.collection.passages
    }
}

impl ContentSource for PassageSource {
    fn name(&self) -> &str {
        &self.collection.name
    }

    fn description(&self) -> &str {
        &self.collection.description
    }

    fn get_content(&self) -> Result<Content, ContentError> {
        let passage = self
            .collection
            .passages
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| ContentError::Unavailable(format!("{} has no passages", self.name())))?;

        Ok(Content {
            text: passage.text.clone(),
            source_url: passage.url.clone(),
            author: passage.author.clone(),
        })
    }
}

/// Fixed text supplied by the user
#[derive(Debug, Clone)]
pub struct CustomSource {
    text: String,
}

impl CustomSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ContentSource for CustomSource {
    fn name(&self) -> &str {
        "custom"
    }

    fn description(&self) -> &str {
        "Text given on the command line"
    }

    fn get_content(&self) -> Result<Content, ContentError> {
        if self.text.trim().is_empty() {
            return Err(ContentError::Unavailable("custom text is empty".into()));
        }
        Ok(Content {
            text: self.text.clone(),
            source_url: None,
            author: None,
        })
    }
}

pub fn source_by_name(name: &str) -> Result<Box<dyn ContentSource>, ContentError> {
    if !SOURCE_NAMES.iter().any(|n| *n == name) {
        return Err(ContentError::UnknownSource(name.to_string()));
    }
    Ok(Box::new(PassageSource::load(name)?))
}

/// The built-in source after `current`, wrapping around
pub fn next_source_name(current: &str) -> &'static str {
    let idx = SOURCE_NAMES.iter().position(|n| *n == current);
    match idx {
        Some(i) => SOURCE_NAMES[(i + 1) % SOURCE_NAMES.len()],
        None => SOURCE_NAMES[0],
    }
}

/// Fetch from `source` and filter it into race-ready text.
///
/// Filtering down to nothing is reported as `EmptyAfterFilter` rather than
/// producing a zero-length race.
pub fn prepare_content(
    source: &dyn ContentSource,
    options: &FilterOptions,
) -> Result<Content, ContentError> {
    let mut content = source.get_content()?;
    let raw_len = content.text.chars().count();

    content.text = apply_filters(&content.text, options);
    if content.text.is_empty() {
        return Err(ContentError::EmptyAfterFilter);
    }

    debug!(
        source = source.name(),
        raw_len,
        filtered_len = content.text.chars().count(),
        "content prepared"
    );
    Ok(content)
}
