use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::reflections::models::{CreateReflectionRequest, EmotionTag, NewReflection};

/// A reflection keeps at most this many emotion tags; extras are dropped.
pub const MAX_EMOTIONS: usize = 3;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Validates a create request on behalf of `user_id`.
///
/// Unknown emotion tags anywhere in the list are rejected; a valid list longer
/// than [`MAX_EMOTIONS`] is truncated, preserving order. `created_at` falls
/// back to `now` when the caller does not supply one.
pub fn validate_new_reflection(
    request: CreateReflectionRequest,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<NewReflection, AppError> {
    if let Some(claimed) = request.user_id.as_deref() {
        if claimed != user_id {
            return Err(AppError::Forbidden(
                "Cannot create reflections for another user".to_string(),
            ));
        }
    }

    let prompt_id = require_text("promptId", request.prompt_id)?;
    let body = require_text("body", request.body)?;

    let mut emotions = parse_emotions(&request.emotions)?;
    emotions.truncate(MAX_EMOTIONS);

    if let Some(duration) = request.voice_note_duration {
        if duration < 0 {
            return Err(AppError::Validation(
                "voiceNoteDuration: must not be negative".to_string(),
            ));
        }
    }

    Ok(NewReflection {
        user_id: user_id.to_string(),
        prompt_id,
        body,
        emotions,
        insights: request.insights,
        facilitator_visible: request.facilitator_visible.unwrap_or(false),
        voice_note_url: request.voice_note_url.filter(|url| !url.trim().is_empty()),
        voice_note_duration: request.voice_note_duration,
        created_at: request.created_at.unwrap_or(now),
    })
}

/// Parses raw tag names, reporting the position of the first unknown one.
pub fn parse_emotions(raw: &[String]) -> Result<Vec<EmotionTag>, AppError> {
    raw.iter()
        .enumerate()
        .map(|(i, name)| {
            name.parse::<EmotionTag>()
                .map_err(|e| AppError::Validation(format!("emotions[{i}]: {e}")))
        })
        .collect()
}

/// Resolves `limit`/`offset` query parameters into a bounded page.
pub fn validate_page(limit: Option<i64>, offset: Option<i64>) -> Result<(u32, u32), AppError> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit: must be between 1 and {MAX_PAGE_LIMIT}"
        )));
    }
    let offset = offset.unwrap_or(0);
    let offset = u32::try_from(offset)
        .map_err(|_| AppError::Validation("offset: must be a non-negative integer".to_string()))?;
    Ok((limit as u32, offset))
}

fn require_text(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(AppError::Validation(format!("{field}: must not be blank"))),
        None => Err(AppError::Validation(format!("{field}: is required"))),
    }
}
