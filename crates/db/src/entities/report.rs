//! Report entity (a published fact-check card).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(nullable)]
    pub title: Option<String>,

    /// "image", "headline" or "link"
    #[sea_orm(nullable)]
    pub source_type: Option<String>,

    #[sea_orm(nullable)]
    pub source_url: Option<String>,

    /// Public URL of the attached image, if any
    #[sea_orm(nullable)]
    pub image_url: Option<String>,

    #[sea_orm(nullable)]
    pub headline: Option<String>,

    #[sea_orm(nullable)]
    pub link: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub analysis_text: Option<String>,

    /// Score in [0, 100]
    #[sea_orm(nullable)]
    pub reliability: Option<f64>,

    /// Ordered list of tag strings
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,

    /// Ordered list of reasons behind the score
    #[sea_orm(column_type = "JsonBinary")]
    pub reasons: Json,

    /// Only "published" reports appear in trending
    pub status: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::report_vote::Entity")]
    Votes,
}

impl Related<super::report_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
