//! Journal, mood, and admin models.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::Role;
use super::{null_as_default, string_or_number};

/// Mood detected for a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sentiment {
    Happy,
    Pleasant,
    Calm,
    Neutral,
    Sad,
    Angry,
    /// Anything the client does not recognise, kept verbatim.
    Unknown(String),
}

impl Sentiment {
    /// Recognised sentiments in chart order.
    pub const KNOWN: [Sentiment; 6] = [
        Sentiment::Happy,
        Sentiment::Pleasant,
        Sentiment::Calm,
        Sentiment::Neutral,
        Sentiment::Sad,
        Sentiment::Angry,
    ];

    /// Case-insensitive parse; unrecognised values become `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "HAPPY" => Self::Happy,
            "PLEASANT" => Self::Pleasant,
            "CALM" => Self::Calm,
            "NEUTRAL" => Self::Neutral,
            "SAD" => Self::Sad,
            "ANGRY" => Self::Angry,
            _ => Self::Unknown(value.to_string()),
        }
    }

    /// Wire code (upper case).
    pub fn code(&self) -> &str {
        match self {
            Self::Happy => "HAPPY",
            Self::Pleasant => "PLEASANT",
            Self::Calm => "CALM",
            Self::Neutral => "NEUTRAL",
            Self::Sad => "SAD",
            Self::Angry => "ANGRY",
            Self::Unknown(raw) => raw,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            Self::Happy => "Happy",
            Self::Pleasant => "Pleasant",
            Self::Calm => "Calm",
            Self::Neutral => "Neutral",
            Self::Sad => "Sad",
            Self::Angry => "Angry",
            Self::Unknown(raw) if raw.is_empty() => "Unknown",
            Self::Unknown(raw) => raw,
        }
    }

    /// Chart colour (hex).
    pub fn color(&self) -> &'static str {
        match self {
            Self::Happy => "#4caf50",
            Self::Pleasant => "#2196f3",
            Self::Calm => "#00bcd4",
            Self::Neutral => "#9e9e9e",
            Self::Sad => "#ff9800",
            Self::Angry => "#f44336",
            Self::Unknown(_) => "#9e9e9e",
        }
    }
}

impl From<String> for Sentiment {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Sentiment> for String {
    fn from(value: Sentiment) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse the API's date strings, which may or may not carry an offset.
pub fn parse_api_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A journal entry as returned by `GET /journal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// Raw date string as sent by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

impl JournalEntry {
    /// Parsed entry date, if any.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_api_date)
    }
}

/// Newest first; undated entries sink to the end.
pub fn sort_newest_first(entries: &mut [JournalEntry]) {
    entries.sort_by_key(|e| std::cmp::Reverse(e.timestamp()));
}

/// Body of `POST /journal` and `PUT /journal/id/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalDraft {
    pub title: String,
    pub content: String,
}

/// Account as listed by `GET /admin/all-users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(default, deserialize_with = "string_or_number_opt")]
    pub id: Option<String>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<Role>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentiment_analysis: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub journal_entry_list: Vec<JournalEntry>,
}

impl UserAccount {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin)
    }
}

fn string_or_number_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "string_or_number")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(id)| id))
}

/// Body of `PUT /admin/change-role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleChange {
    pub username: String,
    pub roles: Vec<Role>,
    pub email: String,
}

/// One day of `GET /admin/weekly-mood-stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyMoodStat {
    pub date: String,
    /// Counts keyed by sentiment code.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentiments: BTreeMap<String, u64>,
}

/// Body of `PUT /user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub sentiment_analysis: bool,
}

/// Body of `PUT /user/password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub password: String,
}

/// Response of `GET /user/daily-quote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuote {
    pub quote: String,
    #[serde(default)]
    pub author: String,
}

impl DailyQuote {
    /// Shown when the quote service is unavailable.
    pub fn fallback() -> Self {
        Self {
            quote: "The only way to do great work is to love what you do.".into(),
            author: "Steve Jobs".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_parses_case_insensitively() {
        assert_eq!(Sentiment::parse("happy"), Sentiment::Happy);
        assert_eq!(Sentiment::parse("Angry"), Sentiment::Angry);
        assert_eq!(
            Sentiment::parse("elated"),
            Sentiment::Unknown("elated".into())
        );
        assert_eq!(Sentiment::parse("elated").label(), "elated");
        assert_eq!(Sentiment::parse("").label(), "Unknown");
        assert_eq!(Sentiment::Calm.color(), "#00bcd4");
    }

    #[test]
    fn entry_parses_numeric_id_and_naive_date() {
        let json = serde_json::json!({
            "id": 42,
            "title": "Monday",
            "content": "Rain again.",
            "date": "2024-05-06T08:30:00",
            "sentiment": "sad"
        });
        let entry: JournalEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.id, "42");
        assert_eq!(entry.sentiment, Some(Sentiment::Sad));
        assert_eq!(
            entry.timestamp().unwrap(),
            "2024-05-06T08:30:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn parse_api_date_accepts_common_shapes() {
        assert!(parse_api_date("2024-05-06T08:30:00.123Z").is_some());
        assert!(parse_api_date("2024-05-06T08:30:00+02:00").is_some());
        assert!(parse_api_date("2024-05-06").is_some());
        assert!(parse_api_date("yesterday").is_none());
    }

    #[test]
    fn sorts_newest_first_with_undated_last() {
        let mk = |id: &str, date: Option<&str>| JournalEntry {
            id: id.into(),
            title: String::new(),
            content: String::new(),
            date: date.map(str::to_string),
            sentiment: None,
        };
        let mut entries = vec![
            mk("old", Some("2024-01-01")),
            mk("none", None),
            mk("new", Some("2024-03-01")),
        ];
        sort_newest_first(&mut entries);
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old", "none"]);
    }

    #[test]
    fn user_account_parses_admin_listing() {
        let json = serde_json::json!({
            "id": "u1",
            "username": "root",
            "email": null,
            "roles": ["USER", "ADMIN"],
            "sentimentAnalysis": false,
            "journalEntryList": null
        });
        let account: UserAccount = serde_json::from_value(json).unwrap();
        assert!(account.is_admin());
        assert!(account.journal_entry_list.is_empty());
        assert_eq!(account.id.as_deref(), Some("u1"));
    }

    #[test]
    fn password_change_uses_camel_case() {
        let body = serde_json::to_value(PasswordChange {
            current_password: "old".into(),
            password: "new-secret".into(),
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "currentPassword": "old", "password": "new-secret" })
        );
    }
}
