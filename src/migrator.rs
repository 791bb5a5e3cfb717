use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_tasks_table::Migration),
            Box::new(m20240101_000003_create_quotes_table::Migration),
            Box::new(m20240101_000004_create_ratings_table::Migration),
            Box::new(m20240101_000005_create_notifications_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_users_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(ColumnDef::new(Users::Skills).string().null())
                        .col(ColumnDef::new(Users::ImageUrl).string().null())
                        .col(ColumnDef::new(Users::Mobile).string().null())
                        .col(ColumnDef::new(Users::Latitude).double().null())
                        .col(ColumnDef::new(Users::Longitude).double().null())
                        .col(ColumnDef::new(Users::WorkPlatform).string().null())
                        .col(
                            ColumnDef::new(Users::IsAdmin)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_email")
                        .table(Users::Table)
                        .col(Users::Email)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Username,
        Email,
        PasswordHash,
        Role,
        Skills,
        ImageUrl,
        Mobile,
        Latitude,
        Longitude,
        WorkPlatform,
        IsAdmin,
        CreatedAt,
    }
}

mod m20240101_000002_create_tasks_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_tasks_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tasks::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Tasks::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Tasks::Title).string().not_null())
                        .col(ColumnDef::new(Tasks::Description).text().not_null())
                        .col(ColumnDef::new(Tasks::Category).string().not_null())
                        .col(ColumnDef::new(Tasks::Reward).string().null())
                        .col(ColumnDef::new(Tasks::Status).string().not_null())
                        .col(ColumnDef::new(Tasks::Latitude).double().not_null())
                        .col(ColumnDef::new(Tasks::Longitude).double().not_null())
                        .col(ColumnDef::new(Tasks::PosterId).integer().not_null())
                        .col(ColumnDef::new(Tasks::HelperId).integer().null())
                        .col(ColumnDef::new(Tasks::Charges).double().null())
                        .col(ColumnDef::new(Tasks::Hours).double().null())
                        .col(ColumnDef::new(Tasks::ImageUrl).string().null())
                        .col(
                            ColumnDef::new(Tasks::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Tasks::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Status drives the open-task scans; poster/helper drive the "mine"
            // and "assigned" listings
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tasks_status")
                        .table(Tasks::Table)
                        .col(Tasks::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tasks_poster_id")
                        .table(Tasks::Table)
                        .col(Tasks::PosterId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tasks_helper_id")
                        .table(Tasks::Table)
                        .col(Tasks::HelperId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Tasks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Tasks {
        Table,
        Id,
        Title,
        Description,
        Category,
        Reward,
        Status,
        Latitude,
        Longitude,
        PosterId,
        HelperId,
        Charges,
        Hours,
        ImageUrl,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_quotes_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_quotes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Quotes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Quotes::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Quotes::TaskId).integer().not_null())
                        .col(ColumnDef::new(Quotes::HelperId).integer().not_null())
                        .col(ColumnDef::new(Quotes::Charges).double().not_null())
                        .col(ColumnDef::new(Quotes::Hours).double().not_null())
                        .col(ColumnDef::new(Quotes::Mobile).string().not_null())
                        .col(ColumnDef::new(Quotes::Status).string().not_null())
                        .col(
                            ColumnDef::new(Quotes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quotes_task_id")
                        .table(Quotes::Table)
                        .col(Quotes::TaskId)
                        .to_owned(),
                )
                .await?;

            // One quote per helper per task; resubmission replaces in place
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quotes_task_helper")
                        .table(Quotes::Table)
                        .col(Quotes::TaskId)
                        .col(Quotes::HelperId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Quotes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Quotes {
        Table,
        Id,
        TaskId,
        HelperId,
        Charges,
        Hours,
        Mobile,
        Status,
        CreatedAt,
    }
}

mod m20240101_000004_create_ratings_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_ratings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Ratings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Ratings::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Ratings::TaskId).integer().not_null())
                        .col(ColumnDef::new(Ratings::RaterId).integer().not_null())
                        .col(ColumnDef::new(Ratings::RateeId).integer().not_null())
                        .col(ColumnDef::new(Ratings::Score).integer().not_null())
                        .col(ColumnDef::new(Ratings::Comment).text().null())
                        .col(
                            ColumnDef::new(Ratings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_ratings_ratee_id")
                        .table(Ratings::Table)
                        .col(Ratings::RateeId)
                        .to_owned(),
                )
                .await?;

            // Each participant rates the other at most once per task
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_ratings_task_rater_ratee")
                        .table(Ratings::Table)
                        .col(Ratings::TaskId)
                        .col(Ratings::RaterId)
                        .col(Ratings::RateeId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Ratings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Ratings {
        Table,
        Id,
        TaskId,
        RaterId,
        RateeId,
        Score,
        Comment,
        CreatedAt,
    }
}

mod m20240101_000005_create_notifications_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_notifications_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Notifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifications::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Notifications::UserId).integer().not_null())
                        .col(ColumnDef::new(Notifications::Message).string().not_null())
                        .col(
                            ColumnDef::new(Notifications::IsRead)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Notifications::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_notifications_user_id")
                        .table(Notifications::Table)
                        .col(Notifications::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Notifications::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Notifications {
        Table,
        Id,
        UserId,
        Message,
        IsRead,
        CreatedAt,
    }
}
