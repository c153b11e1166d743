use crate::m20261001_120000_add_status_page_tables::Group;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Monitor::Table)
                    .if_not_exists()
                    .col(pk_auto(Monitor::Id))
                    .col(string(Monitor::Name).not_null().to_owned())
                    .col(string(Monitor::Type).not_null().to_owned())
                    .col(text_null(Monitor::Url))
                    .col(string_null(Monitor::Hostname))
                    .col(integer_null(Monitor::Port))
                    .col(boolean(Monitor::SendUrl).default(false).to_owned())
                    .col(boolean(Monitor::Active).default(true).to_owned())
                    .col(string_null(Monitor::BasicAuthUser))
                    .col(string_null(Monitor::BasicAuthPass))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MonitorGroup::Table)
                    .if_not_exists()
                    .col(pk_auto(MonitorGroup::Id))
                    .col(integer(MonitorGroup::MonitorId).not_null().to_owned())
                    .col(integer(MonitorGroup::GroupId).not_null().to_owned())
                    .col(integer(MonitorGroup::Weight).default(1000).to_owned())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_monitor_group_monitor")
                            .from(MonitorGroup::Table, MonitorGroup::MonitorId)
                            .to(Monitor::Table, Monitor::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_monitor_group_group")
                            .from(MonitorGroup::Table, MonitorGroup::GroupId)
                            .to(Group::Table, Group::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tag::Table)
                    .if_not_exists()
                    .col(pk_auto(Tag::Id))
                    .col(string(Tag::Name).not_null().to_owned())
                    .col(string(Tag::Color).not_null().to_owned())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MonitorTag::Table)
                    .if_not_exists()
                    .col(pk_auto(MonitorTag::Id))
                    .col(integer(MonitorTag::MonitorId).not_null().to_owned())
                    .col(integer(MonitorTag::TagId).not_null().to_owned())
                    .col(string(MonitorTag::Value).default("").to_owned())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_monitor_tag_monitor")
                            .from(MonitorTag::Table, MonitorTag::MonitorId)
                            .to(Monitor::Table, Monitor::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_monitor_tag_tag")
                            .from(MonitorTag::Table, MonitorTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MonitorTlsInfo::Table)
                    .if_not_exists()
                    .col(pk_auto(MonitorTlsInfo::Id))
                    .col(
                        integer(MonitorTlsInfo::MonitorId)
                            .not_null()
                            .unique_key()
                            .to_owned(),
                    )
                    .col(text(MonitorTlsInfo::InfoJson).not_null().to_owned())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_monitor_tls_info_monitor")
                            .from(MonitorTlsInfo::Table, MonitorTlsInfo::MonitorId)
                            .to(Monitor::Table, Monitor::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MonitorTlsInfo::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MonitorTag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MonitorGroup::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Monitor::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Monitor {
    Table,
    Id,
    Name,
    Type,
    Url,
    Hostname,
    Port,
    SendUrl,
    Active,
    BasicAuthUser,
    BasicAuthPass,
}

#[derive(DeriveIden)]
enum MonitorGroup {
    Table,
    Id,
    MonitorId,
    GroupId,
    Weight,
}

#[derive(DeriveIden)]
enum Tag {
    Table,
    Id,
    Name,
    Color,
}

#[derive(DeriveIden)]
enum MonitorTag {
    Table,
    Id,
    MonitorId,
    TagId,
    Value,
}

#[derive(DeriveIden)]
enum MonitorTlsInfo {
    Table,
    Id,
    MonitorId,
    InfoJson,
}
