//! # Server Configuration
//!
//! Router assembly and server startup for the Registrar API.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::error;
use crate::handlers;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/colleges",
            post(handlers::colleges::create_college).get(handlers::colleges::list_colleges),
        )
        .route(
            "/colleges/{id}",
            get(handlers::colleges::get_college)
                .patch(handlers::colleges::update_college)
                .delete(handlers::colleges::delete_college),
        )
        .route(
            "/students",
            post(handlers::students::create_student).get(handlers::students::list_students),
        )
        .route(
            "/students/{id}",
            get(handlers::students::get_student)
                .patch(handlers::students::update_student)
                .delete(handlers::students::delete_student),
        )
        .route(
            "/courses",
            post(handlers::courses::create_course).get(handlers::courses::list_courses),
        )
        .route(
            "/courses/{id}",
            get(handlers::courses::get_course)
                .patch(handlers::courses::update_course)
                .delete(handlers::courses::delete_course),
        )
        .route(
            "/course-timetables",
            post(handlers::course_timetables::create_timetable)
                .get(handlers::course_timetables::list_timetables),
        )
        .route(
            "/course-timetables/{id}",
            get(handlers::course_timetables::get_timetable)
                .patch(handlers::course_timetables::update_timetable)
                .delete(handlers::course_timetables::delete_timetable),
        )
        .route(
            "/student-course-mapping",
            post(handlers::enrollments::create_enrollment),
        )
        .route(
            "/student-course-mapping/{student_id}",
            get(handlers::enrollments::get_student_enrollments),
        )
        .layer(middleware::from_fn(error::attach_error_path))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let state = AppState { db };
    let app = create_app(state);

    let addr = config
        .bind_addr()
        .map_err(|err| anyhow::anyhow!("invalid server address: {err}"))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, profile = %config.profile, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::colleges::create_college,
        crate::handlers::colleges::list_colleges,
        crate::handlers::colleges::get_college,
        crate::handlers::colleges::update_college,
        crate::handlers::colleges::delete_college,
        crate::handlers::students::create_student,
        crate::handlers::students::list_students,
        crate::handlers::students::get_student,
        crate::handlers::students::update_student,
        crate::handlers::students::delete_student,
        crate::handlers::courses::create_course,
        crate::handlers::courses::list_courses,
        crate::handlers::courses::get_course,
        crate::handlers::courses::update_course,
        crate::handlers::courses::delete_course,
        crate::handlers::course_timetables::create_timetable,
        crate::handlers::course_timetables::list_timetables,
        crate::handlers::course_timetables::get_timetable,
        crate::handlers::course_timetables::update_timetable,
        crate::handlers::course_timetables::delete_timetable,
        crate::handlers::enrollments::create_enrollment,
        crate::handlers::enrollments::get_student_enrollments,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ErrorEnvelope,
            crate::error::ErrorDetail,
        )
    ),
    info(
        title = "Registrar API",
        description = "Enrollment and scheduling API for colleges, courses, students, and timetables",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
