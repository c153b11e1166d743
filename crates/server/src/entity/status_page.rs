use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "status_page")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub theme: String,
    pub auto_refresh_interval: i32,
    pub custom_css: Option<String>,
    pub footer_text: Option<String>,
    pub published: bool,
    pub show_tags: bool,
    pub show_powered_by: bool,
    pub show_certificate_expiry: bool,
    pub google_analytics_tag_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::status_page_cname::Entity")]
    StatusPageCname,
}

impl Related<super::status_page_cname::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusPageCname.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
