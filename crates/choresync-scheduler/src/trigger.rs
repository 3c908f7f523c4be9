//! Document path patterns for creation triggers,
//! e.g. `households/{householdId}/messages/{messageId}`.

use std::collections::BTreeMap;

use choresync_core::error::{ChoreSyncError, Result};

pub const MESSAGE_TRIGGER: &str = "households/{householdId}/messages/{messageId}";
pub const NOTIFICATION_TRIGGER: &str = "households/{householdId}/notifications/{notificationId}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPattern {
    segments: Vec<Segment>,
}

impl TriggerPattern {
    /// Patterns address documents, so the segment count must be even.
    pub fn parse(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim_matches('/');
        let mut segments = Vec::new();
        for raw in trimmed.split('/') {
            if raw.is_empty() {
                return Err(ChoreSyncError::InvalidInput(format!(
                    "Empty segment in trigger pattern '{pattern}'"
                )));
            }
            let segment = match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some("") => {
                    return Err(ChoreSyncError::InvalidInput(format!(
                        "Unnamed parameter in trigger pattern '{pattern}'"
                    )));
                }
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(raw.to_string()),
            };
            segments.push(segment);
        }
        if segments.len() % 2 != 0 {
            return Err(ChoreSyncError::InvalidInput(format!(
                "Trigger pattern '{pattern}' must point at documents"
            )));
        }
        Ok(Self { segments })
    }

    /// Parameters captured from `path`, or `None` when it does not match.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            if part.is_empty() {
                return None;
            }
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }
}
