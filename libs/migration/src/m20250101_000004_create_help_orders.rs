use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HelpOrders::Table)
                    .if_not_exists()
                    .col(pk_auto(HelpOrders::Id))
                    .col(integer(HelpOrders::StudentId))
                    .col(text(HelpOrders::Question))
                    .col(text_null(HelpOrders::Answer))
                    .col(timestamp_with_time_zone_null(HelpOrders::AnsweredAt))
                    .col(
                        timestamp_with_time_zone(HelpOrders::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(HelpOrders::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_help_orders_student_id")
                            .from(HelpOrders::Table, HelpOrders::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_help_orders_student_id")
                    .table(HelpOrders::Table)
                    .col(HelpOrders::StudentId)
                    .to_owned(),
            )
            .await?;

        // The unanswered queue is the hot read
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_help_orders_unanswered ON help_orders (created_at) WHERE answered_at IS NULL",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER help_orders_touch_updated_at
                    BEFORE UPDATE ON help_orders
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS help_orders_touch_updated_at ON help_orders")
            .await?;

        manager
            .drop_table(Table::drop().table(HelpOrders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum HelpOrders {
    Table,
    Id,
    StudentId,
    Question,
    Answer,
    AnsweredAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
}
