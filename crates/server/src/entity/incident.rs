use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "incident")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub status_page_id: i32,
    pub title: String,
    pub content: String,
    pub style: String, // "info", "warning", "danger", "primary", "light", "dark"
    pub pin: bool,
    pub active: bool,
    pub created_date: OffsetDateTime,
    pub last_updated_date: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
