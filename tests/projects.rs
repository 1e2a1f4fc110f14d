use actix_web::{test, web, App};
use serde_json::json;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use taskhub::auth::{generate_token, AuthMiddleware};
use taskhub::error::AppError;
use taskhub::models::{CreateTaskInput, CreateUserInput, UpdateProjectInput, UserRole};
use taskhub::services::{projects, tasks, users};
use taskhub::{db, routes};
use uuid::Uuid;

async fn test_pool() -> SqlitePool {
    std::env::set_var("JWT_SECRET", "integration-test-secret");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    db::init_schema(&pool).await.expect("Failed to apply schema");
    pool
}

macro_rules! test_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                ),
        )
        .await
    };
}

/// Seeds a user with the given role and returns its id plus a valid token.
async fn seed_user(pool: &SqlitePool, email: &str, role: UserRole) -> (Uuid, String) {
    let user = users::create(
        pool,
        CreateUserInput {
            email: email.to_string(),
            first_name: "Seed".to_string(),
            last_name: "User".to_string(),
            password: "password123".to_string(),
            role: Some(role),
        },
    )
    .await
    .expect("Failed to seed user");
    let token = generate_token(user.id, &user.email, user.role).expect("Failed to sign token");
    (user.id, token)
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

#[actix_rt::test]
async fn test_project_create_role_policy() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let (_, user_token) = seed_user(&pool, "user@example.com", UserRole::User).await;
    let (manager_id, manager_token) = seed_user(&pool, "mgr@example.com", UserRole::Manager).await;

    let payload = json!({ "name": "Website Redesign", "manager_id": manager_id });

    // Plain users may not create projects.
    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header(bearer(&user_token))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);

    // Managers may.
    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header(bearer(&manager_token))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(body["name"], "Website Redesign");
    assert_eq!(body["is_active"], true);

    // Reads are open to any authenticated caller.
    let req = test::TestRequest::get()
        .uri("/api/projects")
        .insert_header(bearer(&user_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let list: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);
    // The manager reference comes back resolved, without password material.
    assert_eq!(list[0]["manager"]["email"], "mgr@example.com");
    assert!(list[0]["manager"].get("password_hash").is_none());
}

#[actix_rt::test]
async fn test_project_create_with_unknown_manager_fails() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let (_, manager_token) = seed_user(&pool, "mgr@example.com", UserRole::Manager).await;

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header(bearer(&manager_token))
        .set_json(&json!({ "name": "Orphan", "manager_id": Uuid::new_v4() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    // Nothing was persisted.
    assert!(projects::find_all(&pool).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_project_update_revalidates_manager_and_leaves_record_unchanged() {
    let pool = test_pool().await;

    let (manager_id, _) = seed_user(&pool, "mgr@example.com", UserRole::Manager).await;
    let project = projects::create(
        &pool,
        taskhub::models::CreateProjectInput {
            name: "Stable".to_string(),
            description: Some("before".to_string()),
            manager_id: Some(manager_id),
        },
    )
    .await
    .unwrap();

    // Pointing the manager at a non-existent user fails with NotFound...
    match projects::update(
        &pool,
        project.id,
        UpdateProjectInput {
            name: Some("Poked".to_string()),
            manager_id: Some(Uuid::new_v4()),
            ..Default::default()
        },
    )
    .await
    {
        Err(AppError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }

    // ...and leaves the project untouched.
    let after = projects::get_entity(&pool, project.id).await.unwrap();
    assert_eq!(after.name, "Stable");
    assert_eq!(after.manager_id, Some(manager_id));

    // A partial update merges only what was sent.
    let updated = projects::update(
        &pool,
        project.id,
        UpdateProjectInput {
            description: Some("after".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Stable");
    assert_eq!(updated.description.as_deref(), Some("after"));
    assert_eq!(updated.manager_id, Some(manager_id));
}

#[actix_rt::test]
async fn test_project_update_missing_project_dominates() {
    let pool = test_pool().await;

    // Even with an equally missing manager, the project lookup runs first.
    match projects::update(
        &pool,
        Uuid::new_v4(),
        UpdateProjectInput {
            manager_id: Some(Uuid::new_v4()),
            ..Default::default()
        },
    )
    .await
    {
        Err(AppError::NotFound(msg)) => assert!(msg.contains("Project")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[actix_rt::test]
async fn test_project_delete_is_admin_only_and_cascades_tasks() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let (_, manager_token) = seed_user(&pool, "mgr@example.com", UserRole::Manager).await;
    let (_, admin_token) = seed_user(&pool, "admin@example.com", UserRole::Admin).await;

    let project = projects::create(
        &pool,
        taskhub::models::CreateProjectInput {
            name: "Doomed".to_string(),
            description: None,
            manager_id: None,
        },
    )
    .await
    .unwrap();

    for title in ["one", "two", "three"] {
        tasks::create(
            &pool,
            CreateTaskInput {
                title: title.to_string(),
                description: None,
                status: None,
                priority: None,
                due_date: None,
                project_id: project.id,
                assigned_user_id: None,
            },
        )
        .await
        .unwrap();
    }
    assert_eq!(tasks::find_by_project(&pool, project.id).await.unwrap().len(), 3);

    // Managers may not delete projects.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/projects/{}", project.id))
        .insert_header(bearer(&manager_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);

    // Admins may, and the delete takes the owned tasks with it.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/projects/{}", project.id))
        .insert_header(bearer(&admin_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NO_CONTENT);

    assert!(tasks::find_by_project(&pool, project.id).await.unwrap().is_empty());
    assert_eq!(tasks::get_task_statistics(&pool).await.unwrap().total, 0);

    // Deleting again reports the absence.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/projects/{}", project.id))
        .insert_header(bearer(&admin_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_find_one_resolves_manager_and_tasks() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let (manager_id, token) = seed_user(&pool, "mgr@example.com", UserRole::Manager).await;
    let project = projects::create(
        &pool,
        taskhub::models::CreateProjectInput {
            name: "Detailed".to_string(),
            description: None,
            manager_id: Some(manager_id),
        },
    )
    .await
    .unwrap();
    tasks::create(
        &pool,
        CreateTaskInput {
            title: "inside".to_string(),
            description: None,
            status: None,
            priority: None,
            due_date: None,
            project_id: project.id,
            assigned_user_id: None,
        },
    )
    .await
    .unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/{}", project.id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(body["manager"]["id"], json!(manager_id));
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(body["tasks"][0]["title"], "inside");

    // Unknown id is a 404.
    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/{}", Uuid::new_v4()))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_find_by_manager_id() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let (manager_id, token) = seed_user(&pool, "mgr@example.com", UserRole::Manager).await;
    let (other_id, _) = seed_user(&pool, "other@example.com", UserRole::Manager).await;

    for (name, mid) in [("mine-1", manager_id), ("mine-2", manager_id), ("theirs", other_id)] {
        projects::create(
            &pool,
            taskhub::models::CreateProjectInput {
                name: name.to_string(),
                description: None,
                manager_id: Some(mid),
            },
        )
        .await
        .unwrap();
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/manager/{}", manager_id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let list: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["mine-1", "mine-2"]);
}
