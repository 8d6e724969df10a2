//! Admin console endpoints under `/admin`.

use jotter_core::models::journal::{RoleChange, UserAccount, WeeklyMoodStat};
use reqwest::Method;

use crate::client::ApiClient;
use crate::error::ApiResult;

impl ApiClient {
    /// `GET /admin/all-users`.
    pub async fn all_users(&self) -> ApiResult<Vec<UserAccount>> {
        let builder = self.request(Method::GET, "/admin/all-users")?;
        Ok(self.send_optional_json(builder).await?.unwrap_or_default())
    }

    /// `GET /admin/weekly-mood-stats`.
    pub async fn weekly_mood_stats(&self) -> ApiResult<Vec<WeeklyMoodStat>> {
        let builder = self.request(Method::GET, "/admin/weekly-mood-stats")?;
        Ok(self.send_optional_json(builder).await?.unwrap_or_default())
    }

    /// `PUT /admin/change-role`.
    pub async fn change_roles(&self, change: &RoleChange) -> ApiResult<()> {
        let builder = self.request(Method::PUT, "/admin/change-role")?.json(change);
        self.send_empty(builder).await
    }

    /// `DELETE /admin/id/{id}`.
    pub async fn delete_user(&self, id: &str) -> ApiResult<()> {
        let builder = self.request(Method::DELETE, &format!("/admin/id/{id}"))?;
        self.send_empty(builder).await
    }
}

#[cfg(test)]
mod tests {
    use jotter_core::models::session::Role;
    use jotter_core::stats::{AdminOverview, MoodSeries};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_support::signed_in_client;

    #[tokio::test]
    async fn lists_users_for_overview() {
        let server = MockServer::start().await;
        let (client, _, _) = signed_in_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/admin/all-users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": 1,
                    "username": "root",
                    "roles": ["USER", "ADMIN"],
                    "journalEntryList": [
                        { "id": 7, "title": "t", "content": "c", "date": "2024-03-01" }
                    ]
                },
                { "id": 2, "username": "bob", "roles": ["USER"], "journalEntryList": null }
            ])))
            .mount(&server)
            .await;

        let users = client.all_users().await.unwrap();
        let overview = AdminOverview::compute(&users);
        assert_eq!(overview.total_users, 2);
        assert_eq!(overview.total_admins, 1);
        assert_eq!(overview.total_journals, 1);
        assert_eq!(overview.recent_journals[0].username, "root");
    }

    #[tokio::test]
    async fn weekly_stats_feed_mood_series() {
        let server = MockServer::start().await;
        let (client, _, _) = signed_in_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/admin/weekly-mood-stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "date": "2024-03-01", "sentiments": { "HAPPY": 2, "CALM": 1 } },
                { "date": "2024-03-02", "sentiments": {} }
            ])))
            .mount(&server)
            .await;

        let stats = client.weekly_mood_stats().await.unwrap();
        let series = MoodSeries::from_weekly(&stats);
        assert_eq!(series.days.len(), 2);
        assert_eq!(series.days[0].total(), 3);
        assert_eq!(series.days[1].total(), 0);
    }

    #[tokio::test]
    async fn change_roles_and_delete_user() {
        let server = MockServer::start().await;
        let (client, _, _) = signed_in_client(&server).await;

        Mock::given(method("PUT"))
            .and(path("/admin/change-role"))
            .and(body_json(serde_json::json!({
                "username": "bob",
                "roles": ["USER", "ADMIN"],
                "email": "bob@example.com"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/admin/id/2"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client
            .change_roles(&RoleChange {
                username: "bob".into(),
                roles: vec![Role::user(), Role::admin()],
                email: "bob@example.com".into(),
            })
            .await
            .unwrap();
        client.delete_user("2").await.unwrap();
    }
}
