//! Calendar view of scheduled posts

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Error;
use crate::http::Http;
use crate::posts::Post;

/// Client for the schedule endpoints
pub struct ScheduleClient {
    http: Arc<Http>,
}

impl ScheduleClient {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Scheduled posts whose publish time falls inside the window
    pub async fn window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Post>, Error> {
        self.http
            .get("/schedule")
            .query("start", &start.to_rfc3339())
            .query("end", &end.to_rfc3339())
            .execute()
            .await
    }
}

/// Group posts by the calendar day of their publish time, the shape a
/// month or week view renders from. Posts without a scheduled time are
/// skipped.
pub fn group_by_day(posts: &[Post]) -> BTreeMap<NaiveDate, Vec<Post>> {
    let mut days: BTreeMap<NaiveDate, Vec<Post>> = BTreeMap::new();
    for post in posts {
        if let Some(at) = post.scheduled_at {
            days.entry(at.date_naive()).or_default().push(post.clone());
        }
    }
    days
}
