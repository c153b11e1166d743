use sea_orm::entity::prelude::*;

/// A custom domain mapped onto a status page.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "status_page_cname")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub status_page_id: i32,
    #[sea_orm(unique)]
    pub domain: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::status_page::Entity",
        from = "Column::StatusPageId",
        to = "super::status_page::Column::Id"
    )]
    StatusPage,
}

impl Related<super::status_page::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusPage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
