//! Integration tests for the data-access objects
//!
//! These run against the MySQL database named by `DATABASE_URL` and are
//! skipped when it is not set. They share tables, so they run serially.

use anyhow::Result;
use chrono::{Duration, Utc};
use common::database::{DatabaseConfig, init_pool};
use serial_test::serial;
use sqlx::{MySql, MySqlConnection, pool::PoolConnection};
use uuid::Uuid;

use store::{
    OrderBy, Page, Pageable, Patch, StoreError,
    models::{
        Activation, NewActivation, NewAuthSession, NewDailyActiveUser, NewEmailVerification, NewUser,
        UpdateActivation, UpdateAuthSession, UpdateDailyActiveUser, UpdateEmailVerification, UpdateUser,
        User,
    },
    repositories::{ActivationDao, AuthSessionDao, DailyActiveUserDao, EmailVerificationDao, UserDao},
    schema,
};

/// Connection to a freshly emptied database, or `None` when no database is configured
async fn setup() -> Result<Option<PoolConnection<MySql>>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping DAO integration test");
        return Ok(None);
    }

    let config = DatabaseConfig::from_env()?;
    let pool = init_pool(&config).await?;
    schema::migrate(&pool).await?;

    let mut conn = pool.acquire().await?;
    reset(&mut conn).await?;
    Ok(Some(conn))
}

async fn reset(conn: &mut MySqlConnection) -> Result<()> {
    DailyActiveUserDao::new(conn).delete_all().await?;
    AuthSessionDao::new(conn).delete_all().await?;
    ActivationDao::new(conn).delete_all().await?;
    EmailVerificationDao::new(conn).delete_all().await?;
    UserDao::new(conn).delete_all().await?;
    Ok(())
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        display_name: "Ada".to_string(),
        hashed_password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        activated: false,
    }
}

async fn create_user(conn: &mut MySqlConnection, email: &str) -> Result<User> {
    Ok(UserDao::new(conn).create(new_user(email)).await?)
}

fn new_session(user_uid: Uuid, token: &str) -> NewAuthSession {
    NewAuthSession {
        user_uid,
        token: token.to_string(),
    }
}

#[tokio::test]
#[serial]
async fn test_create_user_applies_defaults() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let user = create_user(&mut conn, "ada@example.com").await?;
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.display_name, "Ada");
    assert_eq!(user.login_count, 0);
    assert!(!user.activated);
    assert!(!user.disabled);
    assert_eq!(user.last_access_datetime, None);

    let fetched = UserDao::new(&mut conn).get(&user.uid).await?;
    assert_eq!(fetched, user);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_get_missing_user_is_not_found() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let result = UserDao::new(&mut conn).get(&Uuid::new_v4()).await;
    assert!(matches!(result, Err(StoreError::NotFound { entity: "User", .. })));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_email_is_unique_and_found_ignoring_case() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let user = create_user(&mut conn, "ada@example.com").await?;

    let mut users = UserDao::new(&mut conn);
    let duplicate = users.create(new_user("ADA@Example.com")).await;
    assert!(matches!(duplicate, Err(StoreError::Conflict { .. })));
    assert_eq!(users.count().await?, 1);

    let found = users.find_by_email("Ada@EXAMPLE.com").await?;
    assert_eq!(found.map(|u| u.uid), Some(user.uid));
    assert_eq!(users.find_by_email("nobody@example.com").await?, None);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_invalid_payload_is_rejected_before_insert() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let mut users = UserDao::new(&mut conn);
    let result = users.create(new_user("not-an-email")).await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
    assert_eq!(users.count().await?, 0);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_empty_update_returns_current_user() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let user = create_user(&mut conn, "ada@example.com").await?;
    let updated = UserDao::new(&mut conn).update(&user.uid, UpdateUser::default()).await?;
    assert_eq!(updated, user);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_partial_update_changes_only_supplied_field() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let user = create_user(&mut conn, "ada@example.com").await?;
    let update = UpdateUser {
        display_name: Patch::Set("X".to_string()),
        ..UpdateUser::default()
    };
    let updated = UserDao::new(&mut conn).update(&user.uid, update).await?;

    assert_eq!(updated.display_name, "X");
    assert_eq!(
        updated,
        User {
            display_name: "X".to_string(),
            ..user
        }
    );
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_update_sets_and_clears_nullable_field() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let user = create_user(&mut conn, "ada@example.com").await?;
    let mut users = UserDao::new(&mut conn);

    let accessed = users
        .update(
            &user.uid,
            UpdateUser {
                last_access_datetime: Patch::Set(user.created_datetime + Duration::hours(1)),
                ..UpdateUser::default()
            },
        )
        .await?;
    assert_eq!(
        accessed.last_access_datetime,
        Some(user.created_datetime + Duration::hours(1))
    );

    let cleared = users
        .update(
            &user.uid,
            UpdateUser {
                last_access_datetime: Patch::Clear,
                ..UpdateUser::default()
            },
        )
        .await?;
    assert_eq!(cleared, user);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_update_missing_user_is_not_found() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let update = UpdateUser {
        disabled: Patch::Set(true),
        ..UpdateUser::default()
    };
    let result = UserDao::new(&mut conn).update(&Uuid::new_v4(), update).await;
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_delete_reports_whether_a_row_was_removed() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let user = create_user(&mut conn, "ada@example.com").await?;
    let mut users = UserDao::new(&mut conn);

    assert!(users.delete(&user.uid).await?);
    assert!(!users.delete(&user.uid).await?);
    assert!(!users.delete(&Uuid::new_v4()).await?);
    assert_eq!(users.count().await?, 0);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_session_requires_existing_user() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let result = AuthSessionDao::new(&mut conn)
        .create(new_session(Uuid::new_v4(), "orphan"))
        .await;
    assert!(matches!(result, Err(StoreError::ReferenceViolation { .. })));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_session_token_is_unique() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let user = create_user(&mut conn, "ada@example.com").await?;
    let mut sessions = AuthSessionDao::new(&mut conn);

    let session = sessions.create(new_session(user.uid, "abc0")).await?;
    assert_eq!(session.last_access_datetime, session.created_datetime);
    assert!(!session.invalid);

    let duplicate = sessions.create(new_session(user.uid, "abc0")).await;
    assert!(matches!(duplicate, Err(StoreError::Conflict { .. })));
    assert_eq!(sessions.count().await?, 1);

    let found = sessions.find_by_token("abc0").await?;
    assert_eq!(found, Some(session));
    assert_eq!(sessions.find_by_token("ABC0").await?, None);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_order_by_creation_time_round_trip() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let user = create_user(&mut conn, "ada@example.com").await?;
    let mut sessions = AuthSessionDao::new(&mut conn);
    for token in ["A", "B", "C"] {
        sessions.create(new_session(user.uid, token)).await?;
    }

    let ascending = OrderBy::asc("createdDatetime").into();
    let tokens: Vec<_> = sessions
        .list(Some(&ascending))
        .await?
        .into_iter()
        .map(|s| s.token)
        .collect();
    assert_eq!(tokens, vec!["A", "B", "C"]);

    let descending = OrderBy::desc("createdDatetime").into();
    let tokens: Vec<_> = sessions
        .list(Some(&descending))
        .await?
        .into_iter()
        .map(|s| s.token)
        .collect();
    assert_eq!(tokens, vec!["C", "B", "A"]);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_paging_two_hundred_sessions() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let user = create_user(&mut conn, "ada@example.com").await?;
    let mut sessions = AuthSessionDao::new(&mut conn);
    for i in 0..200 {
        let token = if i % 2 == 0 {
            format!("abc{}", i)
        } else {
            format!("xyz{}", i)
        };
        sessions.create(new_session(user.uid, &token)).await?;
    }

    let first = sessions.page(&Pageable::new(0, 10)).await?;
    assert_eq!(first.total_pages, 20);
    assert_eq!(first.num_items, 10);
    assert_eq!(first.content[0].token, "abc0");

    let last = sessions
        .page(&Pageable::new(13, 15).ordered_by(OrderBy::desc("createdDatetime")))
        .await?;
    assert_eq!(last.index, 13);
    assert_eq!(last.total_pages, 14);
    assert_eq!(last.total_items, 200);
    assert_eq!(last.page_size, 15);
    assert_eq!(last.num_items, 5);
    assert_eq!(last.content[0].token, "abc4");
    assert_eq!(last.content[4].token, "abc0");

    let beyond = sessions.page(&Pageable::new(14, 15)).await?;
    assert_eq!(beyond.num_items, 0);
    assert!(beyond.content.is_empty());
    assert_eq!(beyond.total_pages, 14);
    assert_eq!(beyond.total_items, 200);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_unbounded_page_matches_list() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let user = create_user(&mut conn, "ada@example.com").await?;
    let mut sessions = AuthSessionDao::new(&mut conn);
    for i in 0..7 {
        sessions.create(new_session(user.uid, &format!("t{}", i))).await?;
    }

    let page: Page<_> = sessions.page(&Pageable::default()).await?;
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.page_size, 7);
    assert_eq!(page.total_items, 7);
    assert_eq!(page.num_items, 7);
    assert_eq!(page.content, sessions.list(None).await?);

    let second = sessions
        .page(&Pageable {
            index: Some(1),
            ..Pageable::default()
        })
        .await?;
    assert_eq!(second.num_items, 0);
    assert_eq!(second.total_items, 7);
    assert_eq!(second.total_pages, 1);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_unknown_order_field_is_rejected() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let pageable = Pageable::new(0, 10).ordered_by(OrderBy::asc("hashedPassword"));
    let result = UserDao::new(&mut conn).page(&pageable).await;
    assert!(matches!(result, Err(StoreError::Validation(_))));

    let pageable = Pageable::new(0, 10).ordered_by(OrderBy::asc("createdDatetime; DELETE FROM AHA_USER"));
    let result = UserDao::new(&mut conn).page(&pageable).await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_record_login_and_activity_count() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let ada = create_user(&mut conn, "ada@example.com").await?;
    let grace = create_user(&mut conn, "grace@example.com").await?;
    create_user(&mut conn, "idle@example.com").await?;

    let start = Utc::now() - Duration::minutes(5);
    let mut users = UserDao::new(&mut conn);

    let ada = users.record_login(&ada.uid, Utc::now()).await?;
    let ada = users.record_login(&ada.uid, Utc::now()).await?;
    assert_eq!(ada.login_count, 2);
    assert!(ada.last_access_datetime.is_some());

    users.record_login(&grace.uid, Utc::now()).await?;

    let active = users
        .count_active_between(start, Utc::now() + Duration::minutes(5))
        .await?;
    assert_eq!(active, 2);

    let missing = users.record_login(&Uuid::new_v4(), Utc::now()).await;
    assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_sessions_of_a_user_can_be_invalidated() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let ada = create_user(&mut conn, "ada@example.com").await?;
    let grace = create_user(&mut conn, "grace@example.com").await?;
    let mut sessions = AuthSessionDao::new(&mut conn);

    let first = sessions.create(new_session(ada.uid, "ada-1")).await?;
    sessions.create(new_session(ada.uid, "ada-2")).await?;
    sessions.create(new_session(grace.uid, "grace-1")).await?;

    sessions
        .update(
            &first.uid,
            UpdateAuthSession {
                invalid: Patch::Set(true),
                ..UpdateAuthSession::default()
            },
        )
        .await?;

    assert_eq!(sessions.invalidate_for_user(&ada.uid).await?, 1);

    let ada_sessions = sessions.list_for_user(&ada.uid).await?;
    assert_eq!(ada_sessions.len(), 2);
    assert!(ada_sessions.iter().all(|s| s.invalid));

    let grace_sessions = sessions.list_for_user(&grace.uid).await?;
    assert_eq!(grace_sessions.len(), 1);
    assert!(!grace_sessions[0].invalid);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_deleting_user_removes_dependents() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let user = create_user(&mut conn, "ada@example.com").await?;
    AuthSessionDao::new(&mut conn)
        .create(new_session(user.uid, "abc0"))
        .await?;

    assert!(UserDao::new(&mut conn).delete(&user.uid).await?);
    assert_eq!(AuthSessionDao::new(&mut conn).count().await?, 0);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_activation_lifecycle() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let user = create_user(&mut conn, "ada@example.com").await?;
    let mut activations = ActivationDao::new(&mut conn);

    let activation: Activation = activations
        .create(NewActivation {
            user_uid: user.uid,
            token: "activate-me".to_string(),
        })
        .await?;
    assert!(!activation.is_used());

    let found = activations.find_by_token("activate-me").await?;
    assert_eq!(found.as_ref(), Some(&activation));
    assert_eq!(activations.find_by_token("missing").await?, None);

    let used = activations
        .update(
            &activation.uid,
            UpdateActivation {
                activated_datetime: Patch::Set(activation.created_datetime + Duration::minutes(3)),
            },
        )
        .await?;
    assert!(used.is_used());

    let duplicate = activations
        .create(NewActivation {
            user_uid: user.uid,
            token: "activate-me".to_string(),
        })
        .await;
    assert!(matches!(duplicate, Err(StoreError::Conflict { .. })));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_email_verification_lifecycle() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let user = create_user(&mut conn, "ada@example.com").await?;
    let mut verifications = EmailVerificationDao::new(&mut conn);

    let verification = verifications
        .create(NewEmailVerification {
            user_uid: user.uid,
            token: "verify-me".to_string(),
        })
        .await?;
    assert!(!verification.is_verified());

    let verified = verifications
        .update(
            &verification.uid,
            UpdateEmailVerification {
                verified_datetime: Patch::Set(Utc::now()),
            },
        )
        .await?;
    assert!(verified.is_verified());

    let found = verifications.find_by_token("verify-me").await?;
    assert_eq!(found, Some(verified));

    assert!(verifications.delete(&verification.uid).await?);
    assert_eq!(verifications.find_by_token("verify-me").await?, None);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_daily_active_users_are_keyed_by_date() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    let mut stats = DailyActiveUserDao::new(&mut conn);

    stats
        .create(NewDailyActiveUser {
            date: 20240102,
            count: 3,
        })
        .await?;
    let duplicate = stats
        .create(NewDailyActiveUser {
            date: 20240102,
            count: 9,
        })
        .await;
    assert!(matches!(duplicate, Err(StoreError::Conflict { .. })));

    stats.record(20240101, 5).await?;
    let replaced = stats.record(20240101, 7).await?;
    assert_eq!(replaced.count, 7);
    assert_eq!(stats.count().await?, 2);

    let bumped = stats
        .update(
            &20240102,
            UpdateDailyActiveUser {
                count: Patch::Set(4),
            },
        )
        .await?;
    assert_eq!(bumped.count, 4);

    let by_date = stats
        .page(&Pageable::new(0, 10).ordered_by(OrderBy::asc("date")))
        .await?;
    let dates: Vec<_> = by_date.content.iter().map(|d| d.date).collect();
    assert_eq!(dates, vec![20240101, 20240102]);

    assert!(matches!(
        stats.record(20240231, 1).await,
        Err(StoreError::Validation(_))
    ));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_rolled_back_transaction_leaves_no_rows() -> Result<()> {
    let Some(mut conn) = setup().await? else {
        return Ok(());
    };

    {
        use sqlx::Connection;

        let mut tx = conn.begin().await?;
        let user = UserDao::new(&mut tx).create(new_user("ada@example.com")).await?;
        assert_eq!(UserDao::new(&mut tx).get(&user.uid).await?, user);
        tx.rollback().await?;
    }

    assert_eq!(UserDao::new(&mut conn).count().await?, 0);
    Ok(())
}
