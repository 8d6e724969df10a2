//! Dashboard statistics derived from journal and admin listings.

use chrono::{DateTime, Duration, Utc};

use crate::models::journal::{JournalEntry, Sentiment, UserAccount, WeeklyMoodStat};

/// Number of journals listed in [`AdminOverview::recent_journals`].
pub const RECENT_JOURNAL_LIMIT: usize = 10;

/// Figures shown on the user dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalStats {
    pub total: usize,
    pub this_week: usize,
    pub this_month: usize,
    pub avg_per_week: f64,
}

impl JournalStats {
    /// Compute stats relative to `now`. Undated entries count only towards
    /// the total.
    pub fn compute(entries: &[JournalEntry], now: DateTime<Utc>) -> Self {
        let total = entries.len();
        let dates: Vec<DateTime<Utc>> = entries.iter().filter_map(JournalEntry::timestamp).collect();

        let week_ago = now - Duration::days(7);
        let month_ago = now - Duration::days(30);
        let this_week = dates.iter().filter(|d| **d >= week_ago).count();
        let this_month = dates.iter().filter(|d| **d >= month_ago).count();

        let avg_per_week = match dates.iter().min() {
            Some(first) => {
                let weeks_active = (now - *first).num_milliseconds() as f64
                    / Duration::weeks(1).num_milliseconds() as f64;
                if weeks_active > 1.0 {
                    total as f64 / weeks_active
                } else {
                    total as f64
                }
            }
            None => total as f64,
        };

        Self {
            total,
            this_week,
            this_month,
            avg_per_week,
        }
    }

    /// Average per week with one decimal, as displayed.
    pub fn avg_per_week_display(&self) -> String {
        format!("{:.1}", self.avg_per_week)
    }
}

/// A journal tagged with its author, for the admin console.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoredEntry {
    pub username: String,
    pub entry: JournalEntry,
}

/// Figures shown on the admin console.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminOverview {
    pub total_users: usize,
    pub total_admins: usize,
    pub total_journals: usize,
    /// Newest journals across all users, at most [`RECENT_JOURNAL_LIMIT`].
    pub recent_journals: Vec<AuthoredEntry>,
}

impl AdminOverview {
    pub fn compute(users: &[UserAccount]) -> Self {
        let mut recent: Vec<AuthoredEntry> = users
            .iter()
            .flat_map(|user| {
                user.journal_entry_list.iter().map(|entry| AuthoredEntry {
                    username: user.username.clone(),
                    entry: entry.clone(),
                })
            })
            .collect();
        recent.sort_by_key(|a| std::cmp::Reverse(a.entry.timestamp()));
        recent.truncate(RECENT_JOURNAL_LIMIT);

        Self {
            total_users: users.len(),
            total_admins: users.iter().filter(|u| u.is_admin()).count(),
            total_journals: users.iter().map(|u| u.journal_entry_list.len()).sum(),
            recent_journals: recent,
        }
    }
}

/// One day of mood counts, with every known sentiment present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodDay {
    pub date: String,
    pub counts: Vec<(Sentiment, u64)>,
}

impl MoodDay {
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Weekly mood chart data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MoodSeries {
    pub days: Vec<MoodDay>,
}

impl MoodSeries {
    /// Normalize the API's sparse per-day maps; missing sentiments become 0.
    pub fn from_weekly(stats: &[WeeklyMoodStat]) -> Self {
        let days = stats
            .iter()
            .map(|day| {
                let counts = Sentiment::KNOWN
                    .iter()
                    .map(|sentiment| {
                        let count = day
                            .sentiments
                            .iter()
                            .filter(|(code, _)| Sentiment::parse(code) == *sentiment)
                            .map(|(_, n)| *n)
                            .sum::<u64>();
                        (sentiment.clone(), count)
                    })
                    .collect();
                MoodDay {
                    date: day.date.clone(),
                    counts,
                }
            })
            .collect();
        Self { days }
    }

    /// Per-sentiment totals over the whole series.
    pub fn totals(&self) -> Vec<(Sentiment, u64)> {
        Sentiment::KNOWN
            .iter()
            .map(|sentiment| {
                let total = self
                    .days
                    .iter()
                    .flat_map(|d| d.counts.iter())
                    .filter(|(s, _)| s == sentiment)
                    .map(|(_, n)| *n)
                    .sum::<u64>();
                (sentiment.clone(), total)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::session::Role;

    fn entry(id: &str, date: Option<&str>) -> JournalEntry {
        JournalEntry {
            id: id.into(),
            title: format!("entry {id}"),
            content: "text".into(),
            date: date.map(str::to_string),
            sentiment: None,
        }
    }

    fn now() -> DateTime<Utc> {
        "2024-06-30T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn empty_journal_has_zero_stats() {
        let stats = JournalStats::compute(&[], now());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.avg_per_week_display(), "0.0");
    }

    #[test]
    fn counts_recent_windows() {
        let entries = vec![
            entry("a", Some("2024-06-29T09:00:00")),
            entry("b", Some("2024-06-20T09:00:00")),
            entry("c", Some("2024-06-02T09:00:00")),
            entry("d", Some("2024-04-01T09:00:00")),
        ];
        let stats = JournalStats::compute(&entries, now());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.this_week, 1);
        assert_eq!(stats.this_month, 3);
        // First entry ~12.9 weeks ago.
        assert_eq!(stats.avg_per_week_display(), "0.3");
    }

    #[test]
    fn young_journal_averages_to_total() {
        let entries = vec![
            entry("a", Some("2024-06-29T09:00:00")),
            entry("b", Some("2024-06-28T09:00:00")),
        ];
        let stats = JournalStats::compute(&entries, now());
        assert_eq!(stats.avg_per_week_display(), "2.0");
    }

    #[test]
    fn admin_overview_tags_and_limits_recent_journals() {
        let many: Vec<JournalEntry> = (1..=12)
            .map(|day| entry(&format!("r{day}"), Some(format!("2024-06-{day:02}").as_str())))
            .collect();
        let users = vec![
            UserAccount {
                id: Some("1".into()),
                username: "root".into(),
                email: None,
                roles: vec![Role::user(), Role::admin()],
                sentiment_analysis: false,
                journal_entry_list: vec![entry("x", Some("2024-06-30"))],
            },
            UserAccount {
                id: Some("2".into()),
                username: "alice".into(),
                email: None,
                roles: vec![Role::user()],
                sentiment_analysis: true,
                journal_entry_list: many,
            },
        ];

        let overview = AdminOverview::compute(&users);
        assert_eq!(overview.total_users, 2);
        assert_eq!(overview.total_admins, 1);
        assert_eq!(overview.total_journals, 13);
        assert_eq!(overview.recent_journals.len(), RECENT_JOURNAL_LIMIT);
        assert_eq!(overview.recent_journals[0].username, "root");
        assert_eq!(overview.recent_journals[1].entry.id, "r12");
    }

    #[test]
    fn mood_series_fills_missing_sentiments() {
        let stats = vec![WeeklyMoodStat {
            date: "2024-06-30".into(),
            sentiments: BTreeMap::from([("HAPPY".to_string(), 3), ("sad".to_string(), 1)]),
        }];
        let series = MoodSeries::from_weekly(&stats);
        let day = &series.days[0];
        assert_eq!(day.counts.len(), 6);
        assert_eq!(day.counts[0], (Sentiment::Happy, 3));
        assert_eq!(day.counts[4], (Sentiment::Sad, 1));
        assert_eq!(day.counts[5], (Sentiment::Angry, 0));
        assert_eq!(day.total(), 4);
        assert_eq!(series.totals()[0], (Sentiment::Happy, 3));
    }
}
