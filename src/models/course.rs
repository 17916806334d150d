use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const LEVEL_BEGINNER: &str = "BEGINNER";
pub const LEVEL_INTERMEDIATE: &str = "INTERMEDIATE";
pub const LEVEL_ADVANCED: &str = "ADVANCED";

pub const LEVELS: [&str; 3] = [LEVEL_BEGINNER, LEVEL_INTERMEDIATE, LEVEL_ADVANCED];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub price: i32,
    pub level: String,
    pub estimated_duration: Option<String>,
    pub tags: Vec<String>,
    pub thumbnail: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
