use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use elearning_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware, routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

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
        .route("/api/public/contact", post(routes::public::contact))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.public_rps),
            middleware::rate_limit::rps_middleware,
        ));

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
        ))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.app_rps),
            middleware::rate_limit::rps_middleware,
        ));

    let admin_api = Router::new()
        .route("/api/admin/stats", get(routes::admin_platform::dashboard_stats))
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
            "/api/admin/courses/:id/modules/reorder",
            post(routes::admin_courses::reorder_modules),
        )
        .route(
            "/api/admin/modules/:id",
            patch(routes::admin_courses::update_module).delete(routes::admin_courses::delete_module),
        )
        .route(
            "/api/admin/modules/:id/lessons",
            post(routes::admin_courses::create_lesson),
        )
        .route(
            "/api/admin/modules/:id/lessons/reorder",
            post(routes::admin_courses::reorder_lessons),
        )
        .route(
            "/api/admin/modules/:id/quiz",
            put(routes::admin_courses::upsert_quiz).delete(routes::admin_courses::delete_quiz),
        )
        .route(
            "/api/admin/lessons/:id",
            patch(routes::admin_courses::update_lesson).delete(routes::admin_courses::delete_lesson),
        )
        .route(
            "/api/admin/users",
            get(routes::admin_users::list_users).post(routes::admin_users::create_user),
        )
        .route(
            "/api/admin/users/:id",
            get(routes::admin_users::get_user)
                .patch(routes::admin_users::update_user)
                .delete(routes::admin_users::delete_user),
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
            "/api/admin/users/:id/lessons/:lesson_id/toggle",
            post(routes::admin_users::toggle_lesson),
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
        .layer(axum::middleware::from_fn(middleware::auth::require_admin))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.admin_rps),
            middleware::rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(public_api)
        .merge(student_api)
        .merge(admin_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
