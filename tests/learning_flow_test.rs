use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{delete, get, patch, post, put},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use elearning_backend::{middleware, models, routes, utils, AppState};

fn build_app(state: AppState) -> Router {
    let public_api = Router::new()
        .route("/api/auth/signup", post(routes::auth::signup))
        .route("/api/auth/login", post(routes::auth::login))
        .route(
            "/api/auth/username-available",
            get(routes::auth::username_available),
        )
        .route("/api/public/courses", get(routes::public::list_courses))
        .route("/api/public/courses/:slug", get(routes::public::get_course))
        .route("/api/public/stats", get(routes::public::stats))
        .route("/api/public/contact", post(routes::public::contact));

    let student_api = Router::new()
        .route(
            "/api/me",
            get(routes::student::get_profile).patch(routes::student::update_profile),
        )
        .route("/api/me/password", post(routes::student::change_password))
        .route("/api/me/dashboard", get(routes::student::dashboard))
        .route("/api/me/courses", get(routes::student::list_courses))
        .route("/api/me/courses/:slug", get(routes::student::course_detail))
        .route(
            "/api/me/progress/:course_id",
            get(routes::student::course_progress),
        )
        .route(
            "/api/me/lessons/:id/complete",
            post(routes::student::complete_lesson),
        )
        .route("/api/me/quizzes/:id", get(routes::student::get_quiz))
        .route(
            "/api/me/quizzes/:id/attempts",
            get(routes::student::quiz_attempts).post(routes::student::submit_quiz),
        )
        .route(
            "/api/me/quizzes/:id/attempts/latest",
            get(routes::student::latest_quiz_attempt),
        )
        .route(
            "/api/me/notes/:course_id",
            get(routes::student::get_note).put(routes::student::put_note),
        )
        .route("/api/me/certificates", get(routes::student::certificates))
        .route("/api/me/orders", get(routes::student::orders))
        .layer(axum::middleware::from_fn(
            middleware::auth::require_bearer_auth,
        ));

    let admin_api = Router::new()
        .route(
            "/api/admin/stats",
            get(routes::admin_platform::dashboard_stats),
        )
        .route(
            "/api/admin/courses",
            get(routes::admin_courses::list_courses).post(routes::admin_courses::create_course),
        )
        .route(
            "/api/admin/courses/:id",
            get(routes::admin_courses::get_course)
                .patch(routes::admin_courses::update_course)
                .delete(routes::admin_courses::delete_course),
        )
        .route(
            "/api/admin/courses/:id/modules",
            post(routes::admin_courses::create_module),
        )
        .route(
            "/api/admin/modules/:id/lessons",
            post(routes::admin_courses::create_lesson),
        )
        .route(
            "/api/admin/modules/:id/quiz",
            put(routes::admin_courses::upsert_quiz).delete(routes::admin_courses::delete_quiz),
        )
        .route(
            "/api/admin/users/:id",
            get(routes::admin_users::get_user),
        )
        .route(
            "/api/admin/users/:id/courses/:course_id/override-complete",
            post(routes::admin_users::override_complete),
        )
        .route(
            "/api/admin/users/:id/courses/:course_id/progress",
            get(routes::admin_users::user_course_progress),
        )
        .route(
            "/api/admin/enrollments",
            get(routes::admin_enrollments::list_enrollments)
                .post(routes::admin_enrollments::provision_access),
        )
        .route(
            "/api/admin/enrollments/:id/revoke",
            post(routes::admin_enrollments::revoke_enrollment),
        )
        .route(
            "/api/admin/enrollments/:id/restore",
            post(routes::admin_enrollments::restore_enrollment),
        )
        .route(
            "/api/admin/certificates/:id",
            delete(routes::admin_enrollments::revoke_certificate),
        )
        .route(
            "/api/admin/email-templates",
            get(routes::admin_platform::list_email_templates),
        )
        .route(
            "/api/admin/email-templates/:name",
            patch(routes::admin_platform::update_email_template),
        )
        .route(
            "/api/admin/email-templates/:name/send",
            post(routes::admin_platform::send_email_template),
        )
        .route(
            "/api/admin/contact-submissions",
            get(routes::admin_platform::list_contact_submissions),
        )
        .layer(axum::middleware::from_fn(middleware::auth::require_admin));

    public_api
        .merge(student_api)
        .merge(admin_api)
        .with_state(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, json)
}

async fn submit_answer(
    app: &Router,
    token: &str,
    quiz_id: Uuid,
    question_id: Uuid,
    selected: &str,
) -> (StatusCode, JsonValue) {
    send(
        app,
        "POST",
        &format!("/api/me/quizzes/{}/attempts", quiz_id),
        Some(token),
        Some(json!({
            "answers": [{ "question_id": question_id, "selected_answer": selected }]
        })),
    )
    .await
}

async fn certificate_count(app: &Router, token: &str) -> usize {
    let (status, body) = send(app, "GET", "/api/me/certificates", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().unwrap().len()
}

#[tokio::test]
async fn learning_flow_end_to_end() {
    dotenvy::dotenv().ok();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("skipping learning_flow_end_to_end: DATABASE_URL not set");
        return;
    }
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("PUBLIC_RPS", "1000");
    env::set_var("APP_RPS", "1000");
    env::set_var("ADMIN_RPS", "1000");

    elearning_backend::config::init_config().expect("init config");
    let pool = elearning_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let suffix = Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..8];

    // Admin account seeded directly; there is no admin signup path.
    let admin_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, name, username, email, password_hash, role)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(admin_id)
    .bind("Test Admin")
    .bind(format!("adm_{}", suffix))
    .bind(format!("admin_{}@example.com", suffix))
    .bind(utils::password::hash_password("admin-pass-123").expect("hash"))
    .bind(models::user::ROLE_ADMIN)
    .execute(&pool)
    .await
    .expect("seed admin");
    let admin_token =
        utils::token::issue_token(admin_id, models::user::ROLE_ADMIN).expect("admin token");

    let app = build_app(AppState::new(pool.clone()));

    // Student signup and login.
    let username = format!("stu_{}", suffix);
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Test Student",
            "username": username,
            "email": format!("student_{}@example.com", suffix),
            "password": "student-pass-123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let student_token = body["token"].as_str().expect("token").to_string();
    let student_id: Uuid = body["user"]["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(body["user"]["role"], "STUDENT");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/auth/username-available?username={}", username),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": "student-pass-123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Admin authors a course with one module, two lessons and a quiz.
    let slug = format!("rust-basics-{}", suffix);
    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/courses",
        Some(&admin_token),
        Some(json!({
            "title": "Rust Basics",
            "slug": slug,
            "short_description": "Ownership from the ground up",
            "price": 4900,
            "level": "BEGINNER",
            "tags": ["rust"],
            "published": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let course_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/admin/courses/{}/modules", course_id),
        Some(&admin_token),
        Some(json!({ "title": "Getting Started" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["position"], 1);
    let module_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let mut lesson_ids = Vec::new();
    for title in ["Installing the toolchain", "Your first program"] {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/admin/modules/{}/lessons", module_id),
            Some(&admin_token),
            Some(json!({ "title": title, "content": "lesson body" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        lesson_ids.push(body["id"].as_str().unwrap().parse::<Uuid>().unwrap());
    }

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/admin/modules/{}/quiz", module_id),
        Some(&admin_token),
        Some(json!({
            "title": "Checkpoint",
            "questions": [
                {
                    "text": "Which keyword declares an immutable binding?",
                    "option_a": "let",
                    "option_b": "mut",
                    "option_c": "const fn",
                    "option_d": "static mut",
                    "correct_answer": "A"
                },
                {
                    "text": "What does the ? operator do?",
                    "option_a": "Panics",
                    "option_b": "Loops",
                    "option_c": "Propagates errors",
                    "option_d": "Ignores errors",
                    "correct_answer": "C"
                }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let quiz_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    let question_ids: Vec<Uuid> = body["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_str().unwrap().parse().unwrap())
        .collect();
    assert_eq!(question_ids.len(), 2);

    // Public catalogue shows the published course but never the answer key.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/public/courses?search={}", slug),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", &format!("/api/public/courses/{}", slug), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modules"][0]["has_quiz"], true);
    assert!(body["modules"][0].get("quiz").is_none());

    // No access before provisioning.
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/me/courses/{}", slug),
        Some(&student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/enrollments",
        Some(&admin_token),
        Some(json!({
            "user_id": student_id,
            "course_id": course_id,
            "amount": 4900,
            "notes": "manual bank transfer"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let enrollment_id: Uuid = body["enrollment"]["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(body["enrollment"]["status"], "ACTIVE");
    assert_eq!(body["order"]["amount"], 4900);

    // Provisioning again while access is active is rejected.
    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/enrollments",
        Some(&admin_token),
        Some(json!({ "user_id": student_id, "course_id": course_id, "amount": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/me/courses/{}", slug),
        Some(&student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"]["total"], 2);
    assert_eq!(body["progress"]["completed"], 0);
    assert!(body["modules"][0]["quiz"]["latest_attempt"].is_null());

    // Failing attempt: latest-attempt gate must stay open later.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/me/quizzes/{}/attempts", quiz_id),
        Some(&student_token),
        Some(json!({
            "answers": [
                { "question_id": question_ids[0], "selected_answer": "B" },
                { "question_id": question_ids[1], "selected_answer": "D" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["score"], 0);
    assert_eq!(body["grade"], "F");
    assert_eq!(body["passed"], false);

    // Lessons complete one by one; marking is idempotent.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/me/lessons/{}/complete", lesson_ids[0]),
        Some(&student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], 1);
    assert_eq!(body["percentage"], 50);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/me/lessons/{}/complete", lesson_ids[0]),
        Some(&student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/me/lessons/{}/complete", lesson_ids[1]),
        Some(&student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["percentage"], 100);

    // All lessons done but the latest attempt failed: still no certificate.
    let (status, body) = send(&app, "GET", "/api/me/certificates", Some(&student_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);

    // Passing retake closes the last gate and issues the certificate.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/me/quizzes/{}/attempts", quiz_id),
        Some(&student_token),
        Some(json!({
            "answers": [
                { "question_id": question_ids[0], "selected_answer": "A" },
                { "question_id": question_ids[1], "selected_answer": "C" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["score"], 100);
    assert_eq!(body["grade"], "A");
    assert_eq!(body["passed"], true);
    assert_eq!(body["is_override"], false);
    assert_eq!(body["answers"].as_array().unwrap().len(), 2);

    let (status, body) = send(&app, "GET", "/api/me/certificates", Some(&student_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let certs = body.as_array().unwrap();
    assert_eq!(certs.len(), 1);
    let cert_number = certs[0]["certificate_number"].as_str().unwrap();
    assert!(cert_number.starts_with("CPTE-"));
    let cert_id: Uuid = certs[0]["id"].as_str().unwrap().parse().unwrap();

    // Re-passing must not mint a second certificate.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/me/quizzes/{}/attempts", quiz_id),
        Some(&student_token),
        Some(json!({
            "answers": [
                { "question_id": question_ids[0], "selected_answer": "A" },
                { "question_id": question_ids[1], "selected_answer": "C" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = send(&app, "GET", "/api/me/certificates", Some(&student_token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/me/quizzes/{}/attempts", quiz_id),
        Some(&student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    // Notes are scoped to the course and upserted wholesale.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/me/notes/{}", course_id),
        Some(&student_token),
        Some(json!({ "content": "ownership moves by default" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/me/notes/{}", course_id),
        Some(&student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "ownership moves by default");

    // Admin view of the student ties it all together.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/admin/users/{}", student_id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enrollments"].as_array().unwrap().len(), 1);
    assert_eq!(body["certificates"].as_array().unwrap().len(), 1);
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);

    // Certificate revocation returns the pair to "not yet certified".
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/admin/certificates/{}", cert_id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, "GET", "/api/me/certificates", Some(&student_token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    // Administrative override force-completes and re-issues.
    let (status, body) = send(
        &app,
        "POST",
        &format!(
            "/api/admin/users/{}/courses/{}/override-complete",
            student_id, course_id
        ),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["certificate_number"].as_str().unwrap().starts_with("CPTE-"));
    assert_eq!(body["lessons_completed"], 2);
    assert_eq!(body["quizzes_passed"], 1);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/me/quizzes/{}/attempts/latest", quiz_id),
        Some(&student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_override"], true);
    assert_eq!(body["passed"], true);

    let (_, body) = send(&app, "GET", "/api/me/certificates", Some(&student_token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Revoking access blocks content without touching progress or certificates.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/admin/enrollments/{}/revoke", enrollment_id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "REVOKED");

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/me/courses/{}", slug),
        Some(&student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, body) = send(&app, "GET", "/api/me/certificates", Some(&student_token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/admin/enrollments/{}/restore", enrollment_id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACTIVE");

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/me/courses/{}", slug),
        Some(&student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Dashboard and stats reflect the activity.
    let (status, body) = send(&app, "GET", "/api/me/dashboard", Some(&student_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["courses"].as_array().unwrap().len(), 1);
    assert_eq!(body["certificates"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", "/api/public/stats", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["courses"].as_i64().unwrap() >= 1);
    assert!(body["certificates"].as_i64().unwrap() >= 1);

    let (status, body) = send(&app, "GET", "/api/admin/stats", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["revenue_total"].as_i64().unwrap() >= 4900);
    assert_eq!(body["monthly"].as_array().unwrap().len(), 6);

    // Contact form lands in the admin inbox.
    let (status, _) = send(
        &app,
        "POST",
        "/api/public/contact",
        None,
        Some(json!({
            "name": "Curious Visitor",
            "email": "visitor@example.com",
            "subject": "Course question",
            "message": "Do you cover async Rust as well?"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(
        &app,
        "GET",
        "/api/admin/contact-submissions",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.as_array().unwrap().is_empty());

    // Seeded email templates render with variable substitution.
    let (status, body) = send(
        &app,
        "GET",
        "/api/admin/email-templates",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/email-templates/Welcome%20Email/send",
        Some(&admin_token),
        Some(json!({
            "recipient": "student@example.com",
            "variables": { "user_name": "Test Student" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["subject"].as_str().unwrap().contains("Test Student"));

    // Second course with a quiz per module: a failing retake after a pass
    // must reopen the certification gate until the quiz is passed again.
    let slug2 = format!("async-rust-{}", suffix);
    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/courses",
        Some(&admin_token),
        Some(json!({
            "title": "Async Rust",
            "slug": slug2,
            "price": 0,
            "level": "INTERMEDIATE",
            "tags": ["rust", "async"],
            "published": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let course2_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let mut gate_lessons = Vec::new();
    let mut gate_quizzes = Vec::new();
    for (module_title, lesson_title) in [
        ("Futures", "Polling by hand"),
        ("Executors", "Spawning tasks"),
    ] {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/admin/courses/{}/modules", course2_id),
            Some(&admin_token),
            Some(json!({ "title": module_title })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let module_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/admin/modules/{}/lessons", module_id),
            Some(&admin_token),
            Some(json!({ "title": lesson_title, "content": "lesson body" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        gate_lessons.push(body["id"].as_str().unwrap().parse::<Uuid>().unwrap());

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/admin/modules/{}/quiz", module_id),
            Some(&admin_token),
            Some(json!({
                "title": format!("{} checkpoint", module_title),
                "questions": [{
                    "text": "Which trait models a value that is not ready yet?",
                    "option_a": "Future",
                    "option_b": "Iterator",
                    "option_c": "Display",
                    "option_d": "Drop",
                    "correct_answer": "A"
                }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let quiz_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
        let question_id: Uuid = body["questions"][0]["id"].as_str().unwrap().parse().unwrap();
        gate_quizzes.push((quiz_id, question_id));
    }
    let (first_quiz, first_question) = gate_quizzes[0];
    let (second_quiz, second_question) = gate_quizzes[1];

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/enrollments",
        Some(&admin_token),
        Some(json!({ "user_id": student_id, "course_id": course2_id, "amount": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Both quizzes passed but one lesson still open: no certificate.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/me/lessons/{}/complete", gate_lessons[0]),
        Some(&student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = submit_answer(&app, &student_token, first_quiz, first_question, "A").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["passed"], true);
    let (status, body) =
        submit_answer(&app, &student_token, second_quiz, second_question, "A").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["passed"], true);
    assert_eq!(certificate_count(&app, &student_token).await, 1);

    // Failing retake: the latest attempt for the second quiz is now a fail.
    let (status, body) =
        submit_answer(&app, &student_token, second_quiz, second_question, "B").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["passed"], false);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/me/lessons/{}/complete", gate_lessons[1]),
        Some(&student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["percentage"], 100);
    assert_eq!(certificate_count(&app, &student_token).await, 1);

    // All lessons done and the first quiz freshly passed, but the second
    // quiz's newest attempt is the fail: its earlier pass must not count.
    let (status, body) = submit_answer(&app, &student_token, first_quiz, first_question, "A").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["passed"], true);
    assert_eq!(certificate_count(&app, &student_token).await, 1);

    // Passing the failed quiz again closes the reopened gate.
    let (status, _) =
        submit_answer(&app, &student_token, second_quiz, second_question, "A").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(certificate_count(&app, &student_token).await, 2);

    // Third course mixes a question-bearing quiz, a quiz-less module and an
    // empty quiz: the override fabricates a pass only for the first.
    let slug3 = format!("capstone-{}", suffix);
    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/courses",
        Some(&admin_token),
        Some(json!({
            "title": "Capstone",
            "slug": slug3,
            "price": 9900,
            "level": "ADVANCED",
            "tags": ["rust"],
            "published": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let course3_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/admin/courses/{}/modules", course3_id),
        Some(&admin_token),
        Some(json!({ "title": "Project work" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let project_module: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    for title in ["Scoping", "Building", "Shipping"] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/admin/modules/{}/lessons", project_module),
            Some(&admin_token),
            Some(json!({ "title": title, "content": "lesson body" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/admin/modules/{}/quiz", project_module),
        Some(&admin_token),
        Some(json!({
            "title": "Final quiz",
            "questions": [
                {
                    "text": "Which tool formats a crate?",
                    "option_a": "rustfmt",
                    "option_b": "clippy",
                    "option_c": "miri",
                    "option_d": "bindgen",
                    "correct_answer": "A"
                },
                {
                    "text": "Which file pins dependency versions?",
                    "option_a": "Cargo.toml",
                    "option_b": "Cargo.lock",
                    "option_c": "rust-toolchain",
                    "option_d": "build.rs",
                    "correct_answer": "B"
                },
                {
                    "text": "Which command runs the test suite?",
                    "option_a": "cargo run",
                    "option_b": "cargo bench",
                    "option_c": "cargo test",
                    "option_d": "cargo doc",
                    "correct_answer": "C"
                }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let final_quiz: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/admin/courses/{}/modules", course3_id),
        Some(&admin_token),
        Some(json!({ "title": "Reading list" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let reading_module: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    for title in ["The book", "The nomicon"] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/admin/modules/{}/lessons", reading_module),
            Some(&admin_token),
            Some(json!({ "title": title, "content": "lesson body" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/admin/courses/{}/modules", course3_id),
        Some(&admin_token),
        Some(json!({ "title": "Archive" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let archive_module: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/admin/modules/{}/quiz", archive_module),
        Some(&admin_token),
        Some(json!({ "title": "Placeholder", "questions": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let archive_quiz: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/enrollments",
        Some(&admin_token),
        Some(json!({ "user_id": student_id, "course_id": course3_id, "amount": 9900 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        &format!(
            "/api/admin/users/{}/courses/{}/override-complete",
            student_id, course3_id
        ),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lessons_completed"], 5);
    assert_eq!(body["quizzes_passed"], 1);
    assert!(body["certificate_number"].as_str().unwrap().starts_with("CPTE-"));
    assert_eq!(certificate_count(&app, &student_token).await, 3);

    // The fabricated pass covers every question of the question-bearing quiz.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/me/quizzes/{}/attempts/latest", final_quiz),
        Some(&student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_override"], true);
    assert_eq!(body["score"], 100);
    assert_eq!(body["answers"].as_array().unwrap().len(), 3);

    // The empty quiz got no fabricated attempt at all.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/me/quizzes/{}/attempts", archive_quiz),
        Some(&student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        "GET",
        &format!(
            "/api/admin/users/{}/courses/{}/progress",
            student_id, course3_id
        ),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], 5);
    assert_eq!(body["percentage"], 100);
}
