use crate::service::{generator::GenerationError, render::RenderError, Tier};

use super::event::Reply;

/// Request-local failures. Every variant is shown to the user; none ends the process.
#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    #[error("daily quota of {quota} exhausted")]
    QuotaExceeded { quota: u32 },
    #[error("feature requires {min_tier}")]
    FeatureRestricted { min_tier: Tier },
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("no prior {missing} to work with")]
    NoPriorContext { missing: &'static str },
    #[error("room {0} not found")]
    RoomNotFound(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("photo could not be downloaded")]
    PhotoUnavailable,
}

impl AssistError {
    pub fn user_message(&self) -> String {
        match self {
            AssistError::QuotaExceeded { quota } => t!("errors.quota_exceeded", quota = quota).to_string(),
            AssistError::FeatureRestricted { min_tier } => {
                t!("errors.feature_restricted", tier = min_tier.label()).to_string()
            }
            AssistError::Generation(_) => t!("errors.generation").to_string(),
            AssistError::Render(_) => t!("errors.render").to_string(),
            AssistError::NoPriorContext { missing } => {
                t!(format!("errors.no_prior_context.{}", missing)).to_string()
            }
            AssistError::RoomNotFound(room) => t!("errors.room_not_found", room = room).to_string(),
            AssistError::Usage(usage) => t!(format!("errors.usage.{}", usage)).to_string(),
            AssistError::PhotoUnavailable => t!("errors.photo_download").to_string(),
        }
    }
}

impl From<AssistError> for Reply {
    fn from(error: AssistError) -> Self {
        Reply::Text(error.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_limit_and_tier() {
        assert!(AssistError::QuotaExceeded { quota: 1 }.user_message().contains('1'));
        assert!(AssistError::FeatureRestricted {
            min_tier: Tier::ProStudent
        }
        .user_message()
        .contains("Pro Student"));
    }

    #[test]
    fn test_generation_message_hides_cause() {
        let error = AssistError::Generation(GenerationError::Upstream {
            status: 500,
            body: "secret upstream body".into(),
        });
        assert!(!error.user_message().contains("secret upstream body"));
    }
}
