use sea_orm::sea_query::{Index, IndexCreateStatement, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::entity::{alternative, exam, question, user};
use crate::handlers::auth::normalize_email;
use crate::utils::hash;

/// Create the configured bootstrap account if it does not exist yet.
///
/// There is no sign-up endpoint, so this is how the first administrator
/// gets in. An existing account with the same email is left untouched.
pub async fn seed_bootstrap_account(db: &DatabaseConnection, auth: &AuthConfig) -> Result<(), DbErr> {
    let (Some(email), Some(password)) = (&auth.bootstrap_email, &auth.bootstrap_password) else {
        info!("No bootstrap account configured");
        return Ok(());
    };

    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        warn!("Bootstrap account email or password is empty, skipping");
        return Ok(());
    }

    let hash = hash::hash_password(password)
        .map_err(|e| DbErr::Custom(format!("Password hash error: {e}")))?;

    let model = user::ActiveModel {
        email: Set(email.clone()),
        password: Set(hash),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(
            OnConflict::column(user::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => {}
        Ok(_) => info!(email = %email, "Seeded bootstrap account"),
        Err(e) => return Err(e),
    }

    Ok(())
}

/// Ensure lookup indexes exist.
///
/// SeaORM's schema-sync doesn't create non-unique indexes on foreign key
/// columns, so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes: [(&str, IndexCreateStatement); 3] = [
        // Exams of an institution, and the exam count in the institution list.
        (
            "idx_provas_instituicao",
            Index::create()
                .if_not_exists()
                .name("idx_provas_instituicao")
                .table(exam::Entity)
                .col(exam::Column::Instituicao)
                .to_owned(),
        ),
        // Questions of an exam ordered by number.
        (
            "idx_questoes_prova_numero",
            Index::create()
                .if_not_exists()
                .name("idx_questoes_prova_numero")
                .table(question::Entity)
                .col(question::Column::Prova)
                .col(question::Column::Numero)
                .to_owned(),
        ),
        (
            "idx_alternativas_questao",
            Index::create()
                .if_not_exists()
                .name("idx_alternativas_questao")
                .table(alternative::Entity)
                .col(alternative::Column::Questao)
                .to_owned(),
        ),
    ];

    for (name, stmt) in indexes {
        match db
            .execute_unprepared(&stmt.to_string(PostgresQueryBuilder))
            .await
        {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}
