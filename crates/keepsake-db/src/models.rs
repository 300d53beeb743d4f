//! Database models

use crate::utils::{parse_date_or_today, parse_datetime_or_now};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Error type for parsing models from strings
#[derive(Debug, Clone)]
pub enum ParseError {
    InvalidTemplate(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidTemplate(s) => write!(f, "Invalid template: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// Presentation template for an album
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Template1,
    Template2,
    Template3,
    Template4,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Template1 => "template1",
            Template::Template2 => "template2",
            Template::Template3 => "template3",
            Template::Template4 => "template4",
        }
    }
}

impl FromStr for Template {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "template1" => Ok(Template::Template1),
            "template2" => Ok(Template::Template2),
            "template3" => Ok(Template::Template3),
            "template4" => Ok(Template::Template4),
            _ => Err(ParseError::InvalidTemplate(s.to_string())),
        }
    }
}

/// A letter-style note rendered in the flipbook viewer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LetterNote {
    pub title: String,
    /// Lines of the letter body
    pub content: Vec<String>,
    pub date: String,
}

/// Per-album viewer settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSettings {
    pub auto_play: bool,
    pub show_counter: bool,
    pub allow_comments: bool,
}

impl Default for AlbumSettings {
    fn default() -> Self {
        Self {
            auto_play: true,
            show_counter: true,
            allow_comments: true,
        }
    }
}

/// Album model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub subtitle: String,
    /// Relationship start date shown by the day counter
    pub day_start: String,
    pub template: Template,
    pub cover_image: String,
    pub male_avatar: String,
    pub female_avatar: String,
    pub photos: Vec<String>,
    /// Caption per photo, keyed by photo index
    pub messages: BTreeMap<String, String>,
    pub quote: String,
    pub letter_notes: Vec<LetterNote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<String>,
    pub is_public: bool,
    pub views: i64,
    pub likes: i64,
    pub created_by: String,
    pub tags: Vec<String>,
    pub settings: AlbumSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New album (for insertion)
#[derive(Debug, Clone)]
pub struct NewAlbum {
    pub slug: String,
    pub name: String,
    pub subtitle: String,
    pub day_start: String,
    pub template: Template,
    pub cover_image: String,
    pub male_avatar: String,
    pub female_avatar: String,
    pub photos: Vec<String>,
    pub messages: BTreeMap<String, String>,
    pub quote: String,
    pub letter_notes: Vec<LetterNote>,
    pub music: Option<String>,
    pub is_public: bool,
    pub created_by: String,
    pub tags: Vec<String>,
    pub settings: AlbumSettings,
}

/// Partial album update (for PUT /api/albums/{slug})
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub day_start: Option<String>,
    #[serde(default)]
    pub template: Option<Template>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub male_avatar: Option<String>,
    #[serde(default)]
    pub female_avatar: Option<String>,
    #[serde(default)]
    pub photos: Option<Vec<String>>,
    #[serde(default)]
    pub messages: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub letter_notes: Option<Vec<LetterNote>>,
    #[serde(default)]
    pub music: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub settings: Option<AlbumSettings>,
}

impl AlbumUpdate {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.subtitle.is_none()
            && self.day_start.is_none()
            && self.template.is_none()
            && self.cover_image.is_none()
            && self.male_avatar.is_none()
            && self.female_avatar.is_none()
            && self.photos.is_none()
            && self.messages.is_none()
            && self.quote.is_none()
            && self.letter_notes.is_none()
            && self.music.is_none()
            && self.is_public.is_none()
            && self.tags.is_none()
            && self.settings.is_none()
    }
}

/// Admin account model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: i64,
    pub account: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

/// New admin (for insertion)
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub account: String,
    pub password_hash: String,
}

/// Note model (letter notes posted against an album)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub album_slug: String,
    pub title: String,
    pub content: String,
    pub date: String,
    pub author: String,
    pub is_public: bool,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New note (for insertion)
#[derive(Debug, Clone)]
pub struct NewNote {
    pub album_slug: String,
    pub title: String,
    pub content: String,
    pub date: String,
    pub author: String,
    pub is_public: bool,
}

/// One day of analytics counters for an album
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsDay {
    pub id: i64,
    pub album_slug: String,
    pub date: NaiveDate,
    pub views: i64,
    pub unique_views: i64,
    /// Seconds spent in the viewer
    pub time_spent: i64,
    pub music_plays: i64,
    pub note_views: i64,
    pub share_count: i64,
    /// View count per photo, keyed by photo index
    pub photo_views: BTreeMap<String, i64>,
}

/// Category model (curated album groupings)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub cover_image: String,
    pub album_slugs: Vec<String>,
    pub is_active: bool,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New category (for insertion)
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub cover_image: String,
    pub album_slugs: Vec<String>,
    pub is_active: bool,
    pub sort_order: i64,
}

// ==================== TryFrom Implementations ====================

fn json_column<T: serde::de::DeserializeOwned + Default>(raw: &str) -> T {
    serde_json::from_str(raw).unwrap_or_default()
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Album {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let template_str: String = row.try_get("template")?;
        Ok(Album {
            id: row.try_get("id")?,
            slug: row.try_get("slug")?,
            name: row.try_get("name")?,
            subtitle: row.try_get("subtitle")?,
            day_start: row.try_get("day_start")?,
            template: Template::from_str(&template_str).unwrap_or_default(),
            cover_image: row.try_get("cover_image")?,
            male_avatar: row.try_get("male_avatar")?,
            female_avatar: row.try_get("female_avatar")?,
            photos: json_column(&row.try_get::<String, _>("photos")?),
            messages: json_column(&row.try_get::<String, _>("messages")?),
            quote: row.try_get("quote")?,
            letter_notes: json_column(&row.try_get::<String, _>("letter_notes")?),
            music: row.try_get("music")?,
            is_public: row.try_get("is_public")?,
            views: row.try_get("views")?,
            likes: row.try_get("likes")?,
            created_by: row.try_get("created_by")?,
            tags: json_column(&row.try_get::<String, _>("tags")?),
            settings: serde_json::from_str(&row.try_get::<String, _>("settings")?)
                .unwrap_or_default(),
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Admin {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let last_login: Option<String> = row.try_get("last_login")?;
        Ok(Admin {
            id: row.try_get("id")?,
            account: row.try_get("account")?,
            password_hash: row.try_get("password_hash")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
            last_login: last_login.as_deref().map(parse_datetime_or_now),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Note {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Note {
            id: row.try_get("id")?,
            album_slug: row.try_get("album_slug")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            date: row.try_get("date")?,
            author: row.try_get("author")?,
            is_public: row.try_get("is_public")?,
            likes: row.try_get("likes")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for AnalyticsDay {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(AnalyticsDay {
            id: row.try_get("id")?,
            album_slug: row.try_get("album_slug")?,
            date: parse_date_or_today(&row.try_get::<String, _>("date")?),
            views: row.try_get("views")?,
            unique_views: row.try_get("unique_views")?,
            time_spent: row.try_get("time_spent")?,
            music_plays: row.try_get("music_plays")?,
            note_views: row.try_get("note_views")?,
            share_count: row.try_get("share_count")?,
            photo_views: json_column(&row.try_get::<String, _>("photo_views")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Category {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Category {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            cover_image: row.try_get("cover_image")?,
            album_slugs: json_column(&row.try_get::<String, _>("album_slugs")?),
            is_active: row.try_get("is_active")?,
            sort_order: row.try_get("sort_order")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}
