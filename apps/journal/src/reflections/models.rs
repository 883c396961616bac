use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Closed set of affect labels a reflection can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionTag {
    Calm,
    Awareness,
    Hope,
    Guilt,
    Anger,
    Frustrated,
    Ashamed,
    Relief,
    Proud,
}

impl EmotionTag {
    pub const ALL: [EmotionTag; 9] = [
        EmotionTag::Calm,
        EmotionTag::Awareness,
        EmotionTag::Hope,
        EmotionTag::Guilt,
        EmotionTag::Anger,
        EmotionTag::Frustrated,
        EmotionTag::Ashamed,
        EmotionTag::Relief,
        EmotionTag::Proud,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionTag::Calm => "Calm",
            EmotionTag::Awareness => "Awareness",
            EmotionTag::Hope => "Hope",
            EmotionTag::Guilt => "Guilt",
            EmotionTag::Anger => "Anger",
            EmotionTag::Frustrated => "Frustrated",
            EmotionTag::Ashamed => "Ashamed",
            EmotionTag::Relief => "Relief",
            EmotionTag::Proud => "Proud",
        }
    }
}

impl fmt::Display for EmotionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown emotion tag '{0}'")]
pub struct UnknownEmotion(pub String);

impl FromStr for EmotionTag {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmotionTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}

/// Identifier assigned by whichever backend stored the reflection.
///
/// The flat-file store hands out sequential integers; the managed store
/// generates UUIDs. Serialized untagged, so clients see either a JSON number
/// or a UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReflectionId {
    Sequential(i64),
    Uuid(Uuid),
}

impl fmt::Display for ReflectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflectionId::Sequential(n) => write!(f, "{n}"),
            ReflectionId::Uuid(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("'{0}' is neither an integer nor a UUID")]
pub struct InvalidReflectionId(pub String);

impl FromStr for ReflectionId {
    type Err = InvalidReflectionId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<i64>() {
            return Ok(ReflectionId::Sequential(n));
        }
        Uuid::parse_str(s)
            .map(ReflectionId::Uuid)
            .map_err(|_| InvalidReflectionId(s.to_string()))
    }
}

/// A stored reflection, as persisted and as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reflection {
    pub id: ReflectionId,
    pub user_id: String,
    pub prompt_id: String,
    pub body: String,
    #[serde(default)]
    pub emotions: Vec<EmotionTag>,
    #[serde(default)]
    pub insights: Option<String>,
    #[serde(default)]
    pub facilitator_visible: bool,
    #[serde(default)]
    pub voice_note_url: Option<String>,
    #[serde(default)]
    pub voice_note_duration: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// A validated reflection that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReflection {
    pub user_id: String,
    pub prompt_id: String,
    pub body: String,
    pub emotions: Vec<EmotionTag>,
    pub insights: Option<String>,
    pub facilitator_visible: bool,
    pub voice_note_url: Option<String>,
    pub voice_note_duration: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl NewReflection {
    pub fn into_reflection(self, id: ReflectionId) -> Reflection {
        Reflection {
            id,
            user_id: self.user_id,
            prompt_id: self.prompt_id,
            body: self.body,
            emotions: self.emotions,
            insights: self.insights,
            facilitator_visible: self.facilitator_visible,
            voice_note_url: self.voice_note_url,
            voice_note_duration: self.voice_note_duration,
            created_at: self.created_at,
        }
    }
}

/// Body of `POST /api/reflections`. Every field is optional at the wire level
/// so validation can name the one that is missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReflectionRequest {
    pub prompt_id: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub emotions: Vec<String>,
    pub insights: Option<String>,
    pub facilitator_visible: Option<bool>,
    pub voice_note_url: Option<String>,
    pub voice_note_duration: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub user_id: Option<String>,
}
