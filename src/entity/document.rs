//! Document entity.
//!
//! `file_path` is the opaque handle returned by the file storage service;
//! `content_type` and `file_size` always derive from the uploaded payload.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub file_path: String,
    pub content_type: String,
    pub file_size: i64,
    pub upload_date: DateTimeUtc,
    pub last_modified: Option<DateTimeUtc>,
    pub uploaded_by_user_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UploadedByUserId",
        to = "super::user::Column::Id"
    )]
    UploadedByUser,
    #[sea_orm(has_many = "super::document_metadata::Entity")]
    Metadata,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UploadedByUser.def()
    }
}

impl Related<super::document_metadata::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Metadata.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
