use anyhow::Result;
use chrono::Duration;
use hr_tests::{fixed_now, insert_department, insert_employee, insert_user, memory_db};
use platform_authz::Role;
use platform_db::{create_session, delete_session, find_user_by_email, load_session_actor};

#[tokio::test]
async fn session_resolves_to_a_scoped_actor() -> Result<()> {
    let db = memory_db().await?;
    let nursing = insert_department(&db, "Nursing").await?;
    let head = insert_employee(&db, "Morgan", Some(nursing)).await?;
    let user_id = insert_user(
        &db,
        "morgan@example.test",
        "department_head",
        Some(nursing),
        Some(head),
        true,
    )
    .await?;

    let user = find_user_by_email(&db, " Morgan@Example.TEST ").await?;
    assert_eq!(user.map(|u| u.id), Some(user_id));

    let now = fixed_now();
    let session = create_session(&db, user_id, now, Duration::days(30)).await?;
    let (user, actor) = load_session_actor(&db, session, now + Duration::days(1))
        .await?
        .expect("live session");
    assert_eq!(user.id, user_id);
    assert_eq!(actor.role, Some(Role::DepartmentHead));
    assert_eq!(actor.department_id, Some(nursing));
    assert_eq!(actor.employee_id, Some(head));

    delete_session(&db, session).await?;
    assert!(load_session_actor(&db, session, now).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn expired_or_deactivated_sessions_are_absent() -> Result<()> {
    let db = memory_db().await?;
    let now = fixed_now();

    let active = insert_user(&db, "ada@example.test", "hr_manager", None, None, true).await?;
    let expired = create_session(&db, active, now, Duration::days(1)).await?;
    assert!(load_session_actor(&db, expired, now + Duration::days(2)).await?.is_none());
    // The expired row is removed, so even an earlier clock no longer finds it.
    assert!(load_session_actor(&db, expired, now).await?.is_none());

    let retired = insert_user(&db, "bo@example.test", "employee", None, None, false).await?;
    let session = create_session(&db, retired, now, Duration::days(30)).await?;
    assert!(load_session_actor(&db, session, now).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn unknown_role_names_load_without_a_role() -> Result<()> {
    let db = memory_db().await?;
    let user_id = insert_user(&db, "cy@example.test", "superuser", None, None, true).await?;
    let session = create_session(&db, user_id, fixed_now(), Duration::days(30)).await?;
    let (_, actor) = load_session_actor(&db, session, fixed_now())
        .await?
        .expect("live session");
    assert_eq!(actor.role, None);
    Ok(())
}
