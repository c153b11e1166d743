use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StatusPage::Table)
                    .if_not_exists()
                    .col(pk_auto(StatusPage::Id))
                    .col(string(StatusPage::Slug).not_null().unique_key().to_owned())
                    .col(string(StatusPage::Title).not_null().to_owned())
                    .col(text_null(StatusPage::Description))
                    .col(string_null(StatusPage::Icon))
                    .col(string(StatusPage::Theme).default("auto").to_owned())
                    .col(integer(StatusPage::AutoRefreshInterval).default(300).to_owned())
                    .col(text_null(StatusPage::CustomCss))
                    .col(text_null(StatusPage::FooterText))
                    .col(boolean(StatusPage::Published).default(true).to_owned())
                    .col(boolean(StatusPage::ShowTags).default(false).to_owned())
                    .col(boolean(StatusPage::ShowPoweredBy).default(true).to_owned())
                    .col(
                        boolean(StatusPage::ShowCertificateExpiry)
                            .default(false)
                            .to_owned(),
                    )
                    .col(string_null(StatusPage::GoogleAnalyticsTagId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StatusPageCname::Table)
                    .if_not_exists()
                    .col(pk_auto(StatusPageCname::Id))
                    .col(integer(StatusPageCname::StatusPageId).not_null().to_owned())
                    .col(string(StatusPageCname::Domain).not_null().unique_key().to_owned())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_page_cname_status_page")
                            .from(StatusPageCname::Table, StatusPageCname::StatusPageId)
                            .to(StatusPage::Table, StatusPage::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Incident::Table)
                    .if_not_exists()
                    .col(pk_auto(Incident::Id))
                    .col(integer(Incident::StatusPageId).not_null().to_owned())
                    .col(string(Incident::Title).not_null().to_owned())
                    .col(text(Incident::Content).not_null().to_owned())
                    .col(string(Incident::Style).default("primary").to_owned())
                    .col(boolean(Incident::Pin).default(true).to_owned())
                    .col(boolean(Incident::Active).default(true).to_owned())
                    .col(
                        timestamp_with_time_zone(Incident::CreatedDate)
                            .default(Expr::current_timestamp())
                            .not_null()
                            .to_owned(),
                    )
                    .col(timestamp_with_time_zone_null(Incident::LastUpdatedDate))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_incident_status_page")
                            .from(Incident::Table, Incident::StatusPageId)
                            .to(StatusPage::Table, StatusPage::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Maintenance::Table)
                    .if_not_exists()
                    .col(pk_auto(Maintenance::Id))
                    .col(string(Maintenance::Title).not_null().to_owned())
                    .col(text(Maintenance::Description).default("").to_owned())
                    .col(string(Maintenance::Strategy).default("single").to_owned())
                    .col(boolean(Maintenance::Active).default(true).to_owned())
                    .col(timestamp_with_time_zone_null(Maintenance::StartDate))
                    .col(timestamp_with_time_zone_null(Maintenance::EndDate))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MaintenanceStatusPage::Table)
                    .if_not_exists()
                    .col(pk_auto(MaintenanceStatusPage::Id))
                    .col(integer(MaintenanceStatusPage::MaintenanceId).not_null().to_owned())
                    .col(integer(MaintenanceStatusPage::StatusPageId).not_null().to_owned())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_status_page_maintenance")
                            .from(
                                MaintenanceStatusPage::Table,
                                MaintenanceStatusPage::MaintenanceId,
                            )
                            .to(Maintenance::Table, Maintenance::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_status_page_status_page")
                            .from(
                                MaintenanceStatusPage::Table,
                                MaintenanceStatusPage::StatusPageId,
                            )
                            .to(StatusPage::Table, StatusPage::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_maintenance_status_page_status_page_id")
                    .table(MaintenanceStatusPage::Table)
                    .col(MaintenanceStatusPage::StatusPageId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Group::Table)
                    .if_not_exists()
                    .col(pk_auto(Group::Id))
                    .col(string(Group::Name).not_null().to_owned())
                    .col(boolean(Group::Public).default(false).to_owned())
                    .col(integer_null(Group::StatusPageId))
                    .col(integer(Group::Weight).default(1000).to_owned())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_status_page")
                            .from(Group::Table, Group::StatusPageId)
                            .to(StatusPage::Table, StatusPage::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Group::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_maintenance_status_page_status_page_id")
                    .table(MaintenanceStatusPage::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(MaintenanceStatusPage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Maintenance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Incident::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StatusPageCname::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StatusPage::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum StatusPage {
    Table,
    Id,
    Slug,
    Title,
    Description,
    Icon,
    Theme,
    AutoRefreshInterval,
    CustomCss,
    FooterText,
    Published,
    ShowTags,
    ShowPoweredBy,
    ShowCertificateExpiry,
    GoogleAnalyticsTagId,
}

#[derive(DeriveIden)]
enum StatusPageCname {
    Table,
    Id,
    StatusPageId,
    Domain,
}

#[derive(DeriveIden)]
enum Incident {
    Table,
    Id,
    StatusPageId,
    Title,
    Content,
    Style,
    Pin,
    Active,
    CreatedDate,
    LastUpdatedDate,
}

#[derive(DeriveIden)]
enum Maintenance {
    Table,
    Id,
    Title,
    Description,
    Strategy,
    Active,
    StartDate,
    EndDate,
}

#[derive(DeriveIden)]
enum MaintenanceStatusPage {
    Table,
    Id,
    MaintenanceId,
    StatusPageId,
}

#[derive(DeriveIden)]
pub(crate) enum Group {
    Table,
    Id,
    Name,
    Public,
    StatusPageId,
    Weight,
}
