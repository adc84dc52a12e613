//! The mutation gateway: validate, append, push.

use campus_types::{ActorIdentity, AnnouncementRecord, Authorizer, AuthRejection, LiveFrame};

use crate::error::PublishError;
use crate::service::LiveService;

/// Checks that both fields are present and not blank.
///
/// Returns the trimmed values that will be stored.
///
/// # Errors
///
/// Returns [`PublishError::Validation`] naming the first offending field.
pub fn validate_announcement<'a>(
    event: &'a str,
    update: &'a str,
) -> Result<(&'a str, &'a str), PublishError> {
    let event = event.trim();
    let update = update.trim();
    match (event.is_empty(), update.is_empty()) {
        (false, false) => Ok((event, update)),
        (true, true) => Err(PublishError::Validation(
            "event and update required".to_string(),
        )),
        (true, false) => Err(PublishError::Validation("event is required".to_string())),
        (false, true) => Err(PublishError::Validation("update is required".to_string())),
    }
}

impl LiveService {
    /// Publishes an announcement on behalf of an already-authorized actor.
    ///
    /// The record is appended and pushed to every open observer inside one
    /// critical section. Success means the record was appended; it does not
    /// mean every observer received it.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Validation`] if `event` or `update` is blank.
    /// The store and the observers are untouched in that case.
    pub async fn publish(
        &self,
        actor: &ActorIdentity,
        event: &str,
        update: &str,
    ) -> Result<AnnouncementRecord, PublishError> {
        let (event, update) = validate_announcement(event, update)?;

        let mut sequencer = self.sequencer.lock().await;
        let record = sequencer.store.append(event, update);
        let frame = LiveFrame::Increment {
            record: record.clone(),
        };
        match serde_json::to_string(&frame) {
            Ok(json) => {
                let report = sequencer.hub.push(&json);
                tracing::debug!(
                    id = record.id,
                    delivered = report.delivered,
                    skipped = report.skipped,
                    pruned = report.pruned,
                    "announcement pushed"
                );
            }
            Err(e) => {
                // The record is committed regardless; observers will see it
                // in the next snapshot.
                tracing::error!(id = record.id, "failed to serialize increment frame: {}", e);
            }
        }
        drop(sequencer);

        tracing::info!(
            id = record.id,
            club_id = actor.club_id,
            club = %actor.name,
            event = %record.event,
            "announcement published"
        );
        Ok(record)
    }

    /// Authorizes `token` through `authorizer`, then publishes.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Unauthorized`] if the token is missing or
    /// rejected, and [`PublishError::Validation`] as for [`Self::publish`].
    /// Neither case mutates the store.
    pub async fn publish_with_token(
        &self,
        authorizer: &dyn Authorizer,
        token: Option<&str>,
        event: &str,
        update: &str,
    ) -> Result<AnnouncementRecord, PublishError> {
        let token = token.ok_or(AuthRejection::Missing)?;
        let actor = authorizer.verify(token).map_err(|rejection| {
            tracing::warn!(%rejection, "publish rejected by authorizer");
            PublishError::Unauthorized(rejection)
        })?;
        self.publish(&actor, event, update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAuthorizer;

    impl Authorizer for FixedAuthorizer {
        fn verify(&self, token: &str) -> Result<ActorIdentity, AuthRejection> {
            if token == "good" {
                Ok(ActorIdentity {
                    club_id: 7,
                    name: "Music Club".to_string(),
                    email: "music@univ.com".to_string(),
                })
            } else {
                Err(AuthRejection::Invalid("bad signature".to_string()))
            }
        }
    }

    #[test]
    fn validation_rejects_blank_fields() {
        assert!(matches!(
            validate_announcement("", "x"),
            Err(PublishError::Validation(_))
        ));
        assert!(matches!(
            validate_announcement("x", ""),
            Err(PublishError::Validation(_))
        ));
        assert!(matches!(
            validate_announcement("  ", "\t"),
            Err(PublishError::Validation(_))
        ));
        assert_eq!(
            validate_announcement(" Seminar ", "Starts at 5 PM").unwrap(),
            ("Seminar", "Starts at 5 PM")
        );
    }

    #[tokio::test]
    async fn rejected_token_does_not_append() {
        let live = LiveService::default();
        let err = live
            .publish_with_token(&FixedAuthorizer, Some("forged"), "Seminar", "Starts at 5 PM")
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Unauthorized(AuthRejection::Invalid(_))));
        assert!(live.is_empty().await);
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let live = LiveService::default();
        let err = live
            .publish_with_token(&FixedAuthorizer, None, "Seminar", "Starts at 5 PM")
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Unauthorized(AuthRejection::Missing)));
        assert!(live.is_empty().await);
    }

    #[tokio::test]
    async fn accepted_token_appends() {
        let live = LiveService::default();
        let record = live
            .publish_with_token(&FixedAuthorizer, Some("good"), "Seminar", "Starts at 5 PM")
            .await
            .unwrap();
        assert_eq!(record, AnnouncementRecord::new(1, "Seminar", "Starts at 5 PM"));
        assert_eq!(live.len().await, 1);
    }

    #[tokio::test]
    async fn authorization_is_checked_before_validation() {
        let live = LiveService::default();
        let err = live
            .publish_with_token(&FixedAuthorizer, Some("forged"), "", "")
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Unauthorized(_)));
    }
}
