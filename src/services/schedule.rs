//! Schedule service
//!
//! The scheduling core: projects weekly recurrence templates onto
//! concrete upcoming occurrences, rejects duplicate templates on
//! creation, and gates every mutation behind a verified admin
//! credential. The authorization check is defined once here; every
//! mutation goes through it. Reads are never gated.

use crate::db::repositories::{is_unique_violation, ActivityRepository};
use crate::models::{parse_hhmm, Activity, ActivityDraft, Claims, Occurrence, Weekday};
use crate::services::token::{TokenError, TokenService};
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use std::sync::Arc;

/// Error types for schedule operations
#[derive(Debug, thiserror::Error)]
pub enum ScheduleServiceError {
    /// No credential presented with a mutating request
    #[error("No credential presented")]
    Unauthenticated,

    /// Credential malformed or badly signed
    #[error("Credential is malformed or badly signed")]
    InvalidToken,

    /// Credential past its validity window
    #[error("Credential has expired")]
    Expired,

    /// Valid credential without the admin claim
    #[error("Only administrators may modify the schedule")]
    Forbidden,

    /// Missing or malformed required field
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An activity with the same title, weekday and time range exists
    #[error("An equivalent activity already exists: {0}")]
    Duplicate(String),

    /// Update/delete target is absent
    #[error("Activity not found: {0}")]
    NotFound(i64),

    /// Unexpected store failure; outcome unknown, re-query before retrying
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

/// Schedule service: reads, projection, and role-gated mutation
pub struct ScheduleService {
    repo: Arc<dyn ActivityRepository>,
    tokens: Arc<TokenService>,
    timezone: FixedOffset,
}

impl ScheduleService {
    /// Create a new schedule service.
    ///
    /// `timezone` is the deployment's canonical civil timezone; "today"
    /// and "now" are always resolved in it, never in host or caller
    /// locale.
    pub fn new(
        repo: Arc<dyn ActivityRepository>,
        tokens: Arc<TokenService>,
        timezone: FixedOffset,
    ) -> Self {
        Self {
            repo,
            tokens,
            timezone,
        }
    }

    /// List all activity templates in store order. Not gated.
    pub async fn list(&self) -> Result<Vec<Activity>, ScheduleServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list activities")
            .map_err(Into::into)
    }

    /// The soonest `limit` upcoming occurrences, ascending. Not gated.
    ///
    /// No caching: every call re-fetches the template set and recomputes
    /// the projection against the current instant.
    pub async fn upcoming(&self, limit: usize) -> Result<Vec<Occurrence>, ScheduleServiceError> {
        let activities = self.list().await?;
        project_upcoming(&activities, Utc::now(), self.timezone, limit)
            .context("Failed to project upcoming occurrences")
            .map_err(Into::into)
    }

    /// Create a new activity template. Admin-gated.
    pub async fn create(
        &self,
        token: Option<&str>,
        draft: &ActivityDraft,
    ) -> Result<Activity, ScheduleServiceError> {
        let claims = self.authorize(token)?;
        let day_of_week = validate_draft(draft)?;

        if self
            .repo
            .exists_duplicate(&draft.title, day_of_week, &draft.start_hour, &draft.end_hour)
            .await
            .context("Failed to check for duplicate activity")?
        {
            return Err(ScheduleServiceError::Duplicate(draft.title.clone()));
        }

        let activity = Activity::new(draft, day_of_week);
        let created = match self.repo.create(&activity).await {
            Ok(created) => created,
            // Lost the race against a concurrent identical create
            Err(e) if is_unique_violation(&e) => {
                return Err(ScheduleServiceError::Duplicate(draft.title.clone()));
            }
            Err(e) => return Err(internal(e.context("Failed to create activity"))),
        };

        tracing::info!(
            activity_id = created.id,
            admin = %claims.name,
            "Activity created: {} ({} {}-{})",
            created.title,
            created.day_of_week,
            created.start_hour,
            created.end_hour
        );
        Ok(created)
    }

    /// Replace an activity's fields in place. Admin-gated.
    pub async fn update(
        &self,
        token: Option<&str>,
        id: i64,
        draft: &ActivityDraft,
    ) -> Result<Activity, ScheduleServiceError> {
        let claims = self.authorize(token)?;
        let day_of_week = validate_draft(draft)?;

        let existing = self
            .repo
            .find_by_id(id)
            .await
            .context("Failed to look up activity")?
            .ok_or(ScheduleServiceError::NotFound(id))?;

        let replacement = Activity {
            id: existing.id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            day_of_week,
            start_hour: draft.start_hour.clone(),
            end_hour: draft.end_hour.clone(),
            location: draft.location.clone(),
            instructor: draft.instructor.clone(),
            created_at: existing.created_at,
            updated_at: existing.updated_at,
        };

        let updated = match self.repo.update(&replacement).await {
            Ok(updated) => updated,
            // Replacement collided with another template's slot
            Err(e) if is_unique_violation(&e) => {
                return Err(ScheduleServiceError::Duplicate(draft.title.clone()));
            }
            Err(e) => return Err(internal(e.context("Failed to update activity"))),
        };

        tracing::info!(activity_id = id, admin = %claims.name, "Activity updated: {}", updated.title);
        Ok(updated)
    }

    /// Remove an activity permanently. Admin-gated.
    pub async fn delete(
        &self,
        token: Option<&str>,
        id: i64,
    ) -> Result<(), ScheduleServiceError> {
        let claims = self.authorize(token)?;

        let existing = self
            .repo
            .find_by_id(id)
            .await
            .context("Failed to look up activity")?
            .ok_or(ScheduleServiceError::NotFound(id))?;

        let removed = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete activity")?;
        if !removed {
            return Err(ScheduleServiceError::NotFound(id));
        }

        tracing::info!(activity_id = id, admin = %claims.name, "Activity deleted: {}", existing.title);
        Ok(())
    }

    /// Verify the credential and require the admin claim.
    ///
    /// Every failure short-circuits before any store access.
    fn authorize(&self, token: Option<&str>) -> Result<Claims, ScheduleServiceError> {
        let token = token.ok_or(ScheduleServiceError::Unauthenticated)?;
        let claims = self.tokens.verify(token).map_err(|e| match e {
            TokenError::Invalid => ScheduleServiceError::InvalidToken,
            TokenError::Expired => ScheduleServiceError::Expired,
        })?;
        if !claims.is_admin {
            return Err(ScheduleServiceError::Forbidden);
        }
        Ok(claims)
    }
}

fn internal(err: anyhow::Error) -> ScheduleServiceError {
    tracing::error!("Schedule store failure: {:#}", err);
    ScheduleServiceError::Internal(err)
}

/// Validate a mutation draft and parse its weekday label.
///
/// Required: non-empty `title`, a known weekday label, well-formed
/// `HH:MM` start and end with start strictly before end.
fn validate_draft(draft: &ActivityDraft) -> Result<Weekday, ScheduleServiceError> {
    if draft.title.trim().is_empty() {
        return Err(ScheduleServiceError::InvalidInput(
            "title must not be empty".to_string(),
        ));
    }
    if draft.day_of_week.trim().is_empty() {
        return Err(ScheduleServiceError::InvalidInput(
            "day_of_week must not be empty".to_string(),
        ));
    }
    let day_of_week: Weekday = draft.day_of_week.parse().map_err(|_| {
        ScheduleServiceError::InvalidInput(format!(
            "day_of_week must be one of Monday..Sunday, got '{}'",
            draft.day_of_week
        ))
    })?;

    let start = parse_hhmm(&draft.start_hour).ok_or_else(|| {
        ScheduleServiceError::InvalidInput(format!(
            "start_hour must be HH:MM, got '{}'",
            draft.start_hour
        ))
    })?;
    let end = parse_hhmm(&draft.end_hour).ok_or_else(|| {
        ScheduleServiceError::InvalidInput(format!(
            "end_hour must be HH:MM, got '{}'",
            draft.end_hour
        ))
    })?;
    if start >= end {
        return Err(ScheduleServiceError::InvalidInput(format!(
            "start_hour {} must be before end_hour {}",
            draft.start_hour, draft.end_hour
        )));
    }

    Ok(day_of_week)
}

/// Project every activity onto its next occurrence and keep the soonest.
///
/// For each template: days until its weekday (0..6 from `now` in the
/// canonical timezone), candidate at `start_hour` on that date; a
/// same-day candidate that has already started rolls forward exactly
/// seven days, while one starting exactly at `now` still counts as
/// upcoming. Every template always yields an occurrence. The sort is
/// stable, so equal instants keep store order; the result is truncated
/// to `limit`.
pub fn project_upcoming(
    activities: &[Activity],
    now: DateTime<Utc>,
    timezone: FixedOffset,
    limit: usize,
) -> Result<Vec<Occurrence>> {
    let local_now = now.with_timezone(&timezone);
    let today = i64::from(local_now.weekday().num_days_from_sunday());

    let mut occurrences = Vec::with_capacity(activities.len());
    for activity in activities {
        let diff_days = (activity.day_of_week.days_from_sunday() - today).rem_euclid(7);

        let (hour, minute) = parse_hhmm(&activity.start_hour).with_context(|| {
            format!(
                "Activity {} has a malformed start_hour: {}",
                activity.id, activity.start_hour
            )
        })?;
        let start = NaiveTime::from_hms_opt(hour, minute, 0)
            .with_context(|| format!("Activity {} start time out of range", activity.id))?;

        let date = local_now.date_naive() + Duration::days(diff_days);
        let mut starts_at = timezone
            .from_local_datetime(&date.and_time(start))
            .single()
            .with_context(|| format!("Activity {} start does not map to an instant", activity.id))?;

        // Today's slot already started: next week's occurrence is the next one
        if diff_days == 0 && starts_at.with_timezone(&Utc) < now {
            starts_at = starts_at + Duration::days(7);
        }

        occurrences.push(Occurrence {
            activity: activity.clone(),
            starts_at,
        });
    }

    occurrences.sort_by_key(|o| o.starts_at);
    occurrences.truncate(limit);
    Ok(occurrences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxActivityRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::User;
    use proptest::prelude::*;

    const TEST_OFFSET_HOURS: i32 = -3;

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(TEST_OFFSET_HOURS * 3600).unwrap()
    }

    /// 2024-05-01 was a Wednesday; 08:00 in the canonical zone.
    fn wednesday_0800() -> DateTime<Utc> {
        tz().with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn activity(id: i64, title: &str, day: Weekday, start: &str, end: &str) -> Activity {
        Activity {
            id,
            title: title.to_string(),
            description: None,
            day_of_week: day,
            start_hour: start.to_string(),
            end_hour: end.to_string(),
            location: None,
            instructor: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn draft(title: &str, day: &str, start: &str, end: &str) -> ActivityDraft {
        ActivityDraft {
            title: title.to_string(),
            day_of_week: day.to_string(),
            start_hour: start.to_string(),
            end_hour: end.to_string(),
            ..ActivityDraft::default()
        }
    }

    // ========================================================================
    // Projection tests
    // ========================================================================

    #[test]
    fn test_today_later_slot_is_today() {
        let now = wednesday_0800();
        let activities = [activity(1, "Oficina", Weekday::Wednesday, "10:00", "11:00")];

        let result = project_upcoming(&activities, now, tz(), 10).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(
            result[0].starts_at,
            tz().with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_slot_exactly_now_counts_as_upcoming() {
        let now = wednesday_0800();
        let activities = [activity(1, "Oficina", Weekday::Wednesday, "08:00", "09:00")];

        let result = project_upcoming(&activities, now, tz(), 10).unwrap();
        assert_eq!(
            result[0].starts_at,
            tz().with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_passed_slot_rolls_forward_exactly_seven_days() {
        let now = wednesday_0800();
        let activities = [activity(1, "Oficina", Weekday::Wednesday, "07:59", "09:00")];

        let result = project_upcoming(&activities, now, tz(), 10).unwrap();
        assert_eq!(
            result[0].starts_at,
            tz().with_ymd_and_hms(2024, 5, 8, 7, 59, 0).unwrap()
        );
    }

    #[test]
    fn test_end_to_end_example() {
        // Activities from the portal's published schedule; now = Wednesday 08:00
        let now = wednesday_0800();
        let activities = [
            activity(1, "Reforço", Weekday::Tuesday, "14:00", "16:00"),
            activity(2, "Dança", Weekday::Thursday, "09:00", "10:00"),
        ];

        let result = project_upcoming(&activities, now, tz(), 2).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].activity.title, "Dança");
        assert_eq!(
            result[0].starts_at,
            tz().with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap()
        );
        assert_eq!(result[1].activity.title, "Reforço");
        assert_eq!(
            result[1].starts_at,
            tz().with_ymd_and_hms(2024, 5, 7, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_ties_keep_store_order() {
        let now = wednesday_0800();
        let activities = [
            activity(10, "Primeiro", Weekday::Friday, "10:00", "11:00"),
            activity(11, "Segundo", Weekday::Friday, "10:00", "12:00"),
        ];

        let result = project_upcoming(&activities, now, tz(), 10).unwrap();
        assert_eq!(result[0].activity.id, 10);
        assert_eq!(result[1].activity.id, 11);
    }

    #[test]
    fn test_truncates_to_limit() {
        let now = wednesday_0800();
        let activities = [
            activity(1, "A", Weekday::Thursday, "09:00", "10:00"),
            activity(2, "B", Weekday::Friday, "09:00", "10:00"),
            activity(3, "C", Weekday::Saturday, "09:00", "10:00"),
        ];

        let result = project_upcoming(&activities, now, tz(), 2).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].activity.title, "A");
        assert_eq!(result[1].activity.title, "B");
    }

    #[test]
    fn test_empty_set_projects_empty() {
        let result = project_upcoming(&[], wednesday_0800(), tz(), 5).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_projection_is_timezone_dependent() {
        // 2024-05-01 01:00 UTC is still Tuesday 22:00 in the canonical
        // zone, so a Tuesday 23:00 slot is under an hour away
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 1, 0, 0).unwrap();
        let activities = [activity(1, "Vigília", Weekday::Tuesday, "23:00", "23:30")];

        let result = project_upcoming(&activities, now, tz(), 10).unwrap();
        assert_eq!(
            result[0].starts_at,
            tz().with_ymd_and_hms(2024, 4, 30, 23, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_malformed_stored_time_is_an_error() {
        let activities = [activity(1, "Quebrada", Weekday::Monday, "25:99", "26:00")];
        assert!(project_upcoming(&activities, wednesday_0800(), tz(), 10).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Projections are sorted ascending, truncated to the limit, and
        /// every next occurrence falls within [now, now + 7 days).
        #[test]
        fn property_projection_window_and_order(
            days in prop::collection::vec(0usize..7, 1..20),
            hours in prop::collection::vec(0u32..24, 1..20),
            minutes in prop::collection::vec(0u32..60, 1..20),
            limit in 0usize..25
        ) {
            let n = days.len().min(hours.len()).min(minutes.len());
            let activities: Vec<Activity> = (0..n)
                .map(|i| {
                    let day = Weekday::ALL[days[i]];
                    let start = format!("{:02}:{:02}", hours[i], minutes[i]);
                    // end is irrelevant to projection; keep it a valid slot
                    activity(i as i64 + 1, &format!("Atividade {}", i), day, &start, "23:59")
                })
                .collect();

            let now = wednesday_0800();
            let result = project_upcoming(&activities, now, tz(), limit).unwrap();

            prop_assert!(result.len() <= limit);
            prop_assert_eq!(result.len(), limit.min(activities.len()));

            let week = Duration::days(7);
            for pair in result.windows(2) {
                prop_assert!(pair[0].starts_at <= pair[1].starts_at);
            }
            for occurrence in &result {
                let instant = occurrence.starts_at.with_timezone(&Utc);
                prop_assert!(instant >= now);
                prop_assert!(instant < now + week);
            }
        }

        /// An activity on today's weekday lands today when its slot is
        /// still ahead, and exactly one week out when it has passed.
        #[test]
        fn property_same_day_rollover(hour in 0u32..24, minute in 0u32..60) {
            let now = wednesday_0800();
            let start = format!("{:02}:{:02}", hour, minute);
            let activities = [activity(1, "Hoje", Weekday::Wednesday, &start, "23:59")];

            let result = project_upcoming(&activities, now, tz(), 1).unwrap();
            let starts_at = result[0].starts_at;

            let slot_today = tz().with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap();
            if slot_today.with_timezone(&Utc) >= now {
                prop_assert_eq!(starts_at, slot_today);
            } else {
                prop_assert_eq!(starts_at, slot_today + Duration::days(7));
            }
        }
    }

    // ========================================================================
    // Mutation gate tests
    // ========================================================================

    async fn setup_service() -> (ScheduleService, Arc<TokenService>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let repo = SqlxActivityRepository::shared(pool);
        let tokens = Arc::new(TokenService::new("test-secret", 7));
        let service = ScheduleService::new(repo, tokens.clone(), tz());
        (service, tokens)
    }

    fn admin_token(tokens: &TokenService) -> String {
        let user = User {
            id: 1,
            username: "ana".to_string(),
            password_hash: String::new(),
            display_name: None,
            is_admin: true,
            created_at: Utc::now(),
        };
        tokens.mint(&user).expect("mint admin token")
    }

    fn member_token(tokens: &TokenService) -> String {
        let user = User {
            id: 2,
            username: "rui".to_string(),
            password_hash: String::new(),
            display_name: None,
            is_admin: false,
            created_at: Utc::now(),
        };
        tokens.mint(&user).expect("mint member token")
    }

    #[tokio::test]
    async fn test_create_with_admin_credential() {
        let (service, tokens) = setup_service().await;
        let token = admin_token(&tokens);

        let created = service
            .create(Some(&token), &draft("Reforço", "Tuesday", "14:00", "16:00"))
            .await
            .expect("create should succeed");

        assert!(created.id > 0);
        assert_eq!(created.day_of_week, Weekday::Tuesday);
    }

    #[tokio::test]
    async fn test_mutation_without_credential() {
        let (service, _tokens) = setup_service().await;

        let result = service
            .create(None, &draft("Reforço", "Tuesday", "14:00", "16:00"))
            .await;
        assert!(matches!(result, Err(ScheduleServiceError::Unauthenticated)));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mutation_with_garbage_credential() {
        let (service, _tokens) = setup_service().await;

        let result = service
            .create(Some("not.a.token"), &draft("Reforço", "Tuesday", "14:00", "16:00"))
            .await;
        assert!(matches!(result, Err(ScheduleServiceError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_mutation_with_expired_credential() {
        let (service, tokens) = setup_service().await;

        let now = Utc::now();
        let stale = Claims {
            sub: 1,
            name: "ana".to_string(),
            is_admin: true,
            iat: (now - Duration::days(9)).timestamp(),
            exp: (now - Duration::days(2)).timestamp(),
        };
        let token = tokens.sign(&stale).expect("sign");

        let result = service
            .create(Some(&token), &draft("Reforço", "Tuesday", "14:00", "16:00"))
            .await;
        assert!(matches!(result, Err(ScheduleServiceError::Expired)));
    }

    #[tokio::test]
    async fn test_non_admin_delete_is_forbidden_and_store_unchanged() {
        let (service, tokens) = setup_service().await;
        let admin = admin_token(&tokens);
        let member = member_token(&tokens);

        let created = service
            .create(Some(&admin), &draft("Dança", "Thursday", "09:00", "10:00"))
            .await
            .expect("create");

        let result = service.delete(Some(&member), created.id).await;
        assert!(matches!(result, Err(ScheduleServiceError::Forbidden)));

        let all = service.list().await.expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_tuple_rejected_and_store_unchanged() {
        let (service, tokens) = setup_service().await;
        let token = admin_token(&tokens);

        service
            .create(Some(&token), &draft("Dança", "Thursday", "09:00", "10:00"))
            .await
            .expect("first create");
        let before = service.list().await.expect("list");

        let result = service
            .create(Some(&token), &draft("Dança", "Thursday", "09:00", "10:00"))
            .await;
        assert!(matches!(result, Err(ScheduleServiceError::Duplicate(_))));

        let after = service.list().await.expect("list");
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_same_title_different_slot_is_not_a_conflict() {
        let (service, tokens) = setup_service().await;
        let token = admin_token(&tokens);

        service
            .create(Some(&token), &draft("Dança", "Thursday", "09:00", "10:00"))
            .await
            .expect("first create");
        service
            .create(Some(&token), &draft("Dança", "Thursday", "10:00", "11:00"))
            .await
            .expect("second create with different slot");

        assert_eq!(service.list().await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn test_create_validates_required_fields() {
        let (service, tokens) = setup_service().await;
        let token = admin_token(&tokens);

        let cases = [
            draft("", "Tuesday", "14:00", "16:00"),
            draft("Reforço", "", "14:00", "16:00"),
            draft("Reforço", "Tuesdays", "14:00", "16:00"),
            draft("Reforço", "Tuesday", "", "16:00"),
            draft("Reforço", "Tuesday", "14:00", ""),
            draft("Reforço", "Tuesday", "2pm", "16:00"),
            draft("Reforço", "Tuesday", "16:00", "14:00"),
            draft("Reforço", "Tuesday", "14:00", "14:00"),
        ];

        for case in &cases {
            let result = service.create(Some(&token), case).await;
            assert!(
                matches!(result, Err(ScheduleServiceError::InvalidInput(_))),
                "draft {:?} should be rejected",
                case
            );
        }
        assert!(service.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_wholesale() {
        let (service, tokens) = setup_service().await;
        let token = admin_token(&tokens);

        let created = service
            .create(Some(&token), &draft("Reforço", "Tuesday", "14:00", "16:00"))
            .await
            .expect("create");

        let mut replacement = draft("Reforço escolar", "Wednesday", "15:00", "17:00");
        replacement.location = Some("Sala 3".to_string());
        let updated = service
            .update(Some(&token), created.id, &replacement)
            .await
            .expect("update");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Reforço escolar");
        assert_eq!(updated.day_of_week, Weekday::Wednesday);
        assert_eq!(updated.location.as_deref(), Some("Sala 3"));
        // Old optional fields do not survive a replace
        assert!(updated.description.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_target() {
        let (service, tokens) = setup_service().await;
        let token = admin_token(&tokens);

        let result = service
            .update(Some(&token), 404, &draft("Reforço", "Tuesday", "14:00", "16:00"))
            .await;
        assert!(matches!(result, Err(ScheduleServiceError::NotFound(404))));
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let (service, tokens) = setup_service().await;
        let token = admin_token(&tokens);

        let created = service
            .create(Some(&token), &draft("Judô", "Saturday", "08:00", "09:30"))
            .await
            .expect("create");

        service
            .delete(Some(&token), created.id)
            .await
            .expect("delete");
        let again = service.delete(Some(&token), created.id).await;
        assert!(matches!(again, Err(ScheduleServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reads_are_idempotent_and_ungated() {
        let (service, tokens) = setup_service().await;
        let token = admin_token(&tokens);

        service
            .create(Some(&token), &draft("Dança", "Thursday", "09:00", "10:00"))
            .await
            .expect("create");

        // No credential needed for reads
        let first = service.list().await.expect("first list");
        let second = service.list().await.expect("second list");
        assert_eq!(first, second);

        let upcoming = service.upcoming(10).await.expect("upcoming");
        assert_eq!(upcoming.len(), 1);
    }
}
