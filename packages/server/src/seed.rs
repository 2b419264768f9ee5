use sea_orm::sea_query::{Index, IndexCreateStatement, OnConflict, PostgresQueryBuilder, SqliteQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{role, role_permission, situational_result, test_result};
use crate::extractors::auth::{LESSON_MANAGE, LESSON_STUDY};

/// Default roles seeded on startup.
const DEFAULT_ROLES: &[&str] = &[role::ADMIN_ROLE, role::DEFAULT_ROLE];

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Admin: authoring, and may walk through lessons as a student
    (role::ADMIN_ROLE, LESSON_MANAGE),
    (role::ADMIN_ROLE, LESSON_STUDY),
    // Student
    (role::DEFAULT_ROLE, LESSON_STUDY),
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut roles_inserted = 0u32;
    for &name in DEFAULT_ROLES {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(OnConflict::column(role::Column::Name).do_nothing().to_owned())
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) if n > 0 => roles_inserted += 1,
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) if n > 0 => perms_inserted += 1,
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Latest result per (user, test):
    // SELECT ... FROM test_result WHERE user_id = ? AND test_id = ? ORDER BY completed_at DESC
    let latest_result = Index::create()
        .if_not_exists()
        .name("idx_test_result_user_test_completed")
        .table(test_result::Entity)
        .col(test_result::Column::UserId)
        .col(test_result::Column::TestId)
        .col(test_result::Column::CompletedAt)
        .to_owned();
    create_index(db, "idx_test_result_user_test_completed", &latest_result).await;

    // Restart and results page:
    // SELECT/DELETE ... FROM situational_result WHERE user_id = ? AND lesson_id = ?
    let lesson_answers = Index::create()
        .if_not_exists()
        .name("idx_situational_result_user_lesson")
        .table(situational_result::Entity)
        .col(situational_result::Column::UserId)
        .col(situational_result::Column::LessonId)
        .to_owned();
    create_index(db, "idx_situational_result_user_lesson", &lesson_answers).await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: &IndexCreateStatement) {
    let sql = match db.get_database_backend() {
        DbBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        _ => stmt.to_string(PostgresQueryBuilder),
    };

    match db.execute_unprepared(&sql).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
    }
}
