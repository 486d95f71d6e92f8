use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(uuid(Movie::Id).primary_key())
                    .col(string_len(Movie::Title, 200).extra("COLLATE NOCASE"))
                    .col(integer(Movie::Rating))
                    .col(string_len(Movie::Synopsis, 1000))
                    .col(integer(Movie::Year))
                    .col(text(Movie::Styles))
                    .col(integer(Movie::Length))
                    .col(text(Movie::TrailerLink))
                    .col(text(Movie::Realisators))
                    .col(text(Movie::Scenarists))
                    .col(text(Movie::Actors))
                    .col(text(Movie::Producers))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_title_year")
                    .table(Movie::Table)
                    .col(Movie::Title)
                    .col(Movie::Year)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Title,
    Rating,
    Synopsis,
    Year,
    Styles,
    Length,
    TrailerLink,
    Realisators,
    Scenarists,
    Actors,
    Producers,
}
