//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, options, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Auth
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/me", get(handlers::me))
        // Courses / staff / students
        .route(
            "/api/courses/",
            get(handlers::list_courses).post(handlers::create_course),
        )
        .route("/api/staff/", post(handlers::create_staff))
        .route(
            "/api/students/",
            get(handlers::list_students).post(handlers::create_student),
        )
        // Attendance
        .route(
            "/api/attendance/",
            get(handlers::get_attendance).post(handlers::submit_attendance),
        )
        // Leave requests (explicit preflight for the leave form)
        .route(
            "/api/leaves/",
            options(handlers::leaves_preflight).post(handlers::create_leave_request),
        )
        // Subjects
        .route(
            "/api/subjects/",
            get(handlers::list_subjects).post(handlers::create_subject),
        )
        .route("/api/subjects/{subject_id}", delete(handlers::delete_subject))
        // Results
        .route(
            "/api/results/",
            get(handlers::get_results).post(handlers::add_result),
        )
        // Reference books
        .route(
            "/api/reference-books/",
            get(handlers::list_reference_books).post(handlers::upload_reference_book),
        )
        .route(
            "/api/reference-books/{book_id}",
            delete(handlers::delete_reference_book),
        )
        // Uploaded PDFs and the frontend bundle
        .route("/uploads/{*filename}", get(handlers::serve_upload))
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::index))
        .fallback(handlers::serve_frontend)
        // Allow large PDF payloads during uploads.
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
