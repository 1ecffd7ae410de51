//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic. File intake and static serving live
//! here too; they are request-layer concerns.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::dto::{
    AttendanceQuery, AttendanceRecordDto, AttendanceSavedResponse, AttendanceSubmission,
    CourseDto, CreateCourseRequest, CreateLeaveRequest, CreateResultRequest,
    CreateStaffRequest, CreateStudentRequest, CreateSubjectRequest, HealthResponse,
    LeaveCreatedResponse, LoginRequest, LoginResponse, MeResponse, MessageResponse,
    ReferenceBookDto, ResultDto, ResultsQuery, StaffCreatedResponse, StudentCreatedResponse,
    StudentDto, StudentsQuery, SubjectDto, UserDto,
};
use super::error::AppError;
use super::extract::{AuthUser, OptionalUser};
use super::state::AppState;
use crate::db::services::{self, LeaveRequestInput, ResultInput};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for creation handlers (201 + body).
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the database
/// is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Auth
// =============================================================================

/// POST /api/auth/login
///
/// Authenticate by username-or-email and password; issues an 8-hour token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> HandlerResult<LoginResponse> {
    let success = services::login(
        state.repository.as_ref(),
        &state.tokens,
        request.identifier(),
        request.password.as_deref(),
        request.user_type.as_deref(),
        Utc::now(),
    )
    .await?;

    let profile = success.profile;
    let student_name = profile.student_id.map(|_| profile.user.full_name.clone());

    Ok(Json(LoginResponse {
        access_token: success.token,
        role: profile.user.role,
        user: UserDto {
            id: profile.user.id.value(),
            full_name: profile.user.full_name,
            username: profile.user.username,
            email: profile.user.email,
        },
        student_id: profile.student_id.map(|id| id.value()),
        student_name,
        course_name: profile.course_name,
    }))
}

/// GET /api/auth/me
///
/// Return the profile behind the bearer token.
pub async fn me(State(state): State<AppState>, user: AuthUser) -> HandlerResult<MeResponse> {
    let profile = services::current_user(state.repository.as_ref(), user.0.user_id()).await?;
    let student_name = profile.student_id.map(|_| profile.user.full_name.clone());

    Ok(Json(MeResponse {
        id: profile.user.id.value(),
        name: profile.user.full_name.clone(),
        full_name: profile.user.full_name,
        username: profile.user.username,
        email: profile.user.email,
        role: profile.user.role,
        user_type: profile.user.role,
        student_id: profile.student_id.map(|id| id.value()),
        student_name,
        course_name: profile.course_name,
    }))
}

// =============================================================================
// Courses
// =============================================================================

/// GET /api/courses/
///
/// List courses, alphabetically by name.
pub async fn list_courses(State(state): State<AppState>) -> HandlerResult<Vec<CourseDto>> {
    let courses = services::list_courses(state.repository.as_ref()).await?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

/// POST /api/courses/
pub async fn create_course(
    State(state): State<AppState>,
    Json(request): Json<CreateCourseRequest>,
) -> CreatedResult<CourseDto> {
    let course =
        services::create_course(state.repository.as_ref(), request.name, request.code).await?;
    Ok((StatusCode::CREATED, Json(course.into())))
}

// =============================================================================
// Staff
// =============================================================================

/// POST /api/staff/
///
/// Create a staff account; the course reference resolves by name-or-code.
pub async fn create_staff(
    State(state): State<AppState>,
    Json(request): Json<CreateStaffRequest>,
) -> CreatedResult<StaffCreatedResponse> {
    let created = services::create_staff(
        state.repository.as_ref(),
        request.name,
        request.email,
        request.course,
        request.password,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(StaffCreatedResponse {
            id: created.user.id.value(),
            full_name: created.user.full_name,
            email: created.user.email,
            course_name: created.course_name,
            role: created.user.role,
        }),
    ))
}

// =============================================================================
// Students
// =============================================================================

/// GET /api/students/?course=
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<StudentsQuery>,
) -> HandlerResult<Vec<StudentDto>> {
    let students =
        services::list_students(state.repository.as_ref(), query.course.as_deref()).await?;
    Ok(Json(students.into_iter().map(Into::into).collect()))
}

/// POST /api/students/
pub async fn create_student(
    State(state): State<AppState>,
    Json(request): Json<CreateStudentRequest>,
) -> CreatedResult<StudentCreatedResponse> {
    let created = services::create_student(
        state.repository.as_ref(),
        request.name,
        request.email,
        request.course,
        request.password,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(StudentCreatedResponse {
            id: created.student.id.value(),
            name: created.full_name,
            email: created.email,
            course: created.course_name,
        }),
    ))
}

// =============================================================================
// Attendance
// =============================================================================

/// POST /api/attendance/
///
/// Store an attendance sheet. The submitted set replaces whatever was
/// recorded for (date, course); rows naming unknown students are reported
/// in `skipped`.
pub async fn submit_attendance(
    State(state): State<AppState>,
    Json(request): Json<AttendanceSubmission>,
) -> CreatedResult<AttendanceSavedResponse> {
    let outcome = services::submit_attendance(
        state.repository.as_ref(),
        request.date.as_deref(),
        request.course.as_deref(),
        request.records,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(AttendanceSavedResponse {
            msg: "Attendance saved".to_string(),
            applied: outcome.applied,
            skipped: outcome.skipped,
        }),
    ))
}

/// GET /api/attendance/?date=YYYY-MM-DD&course=
pub async fn get_attendance(
    State(state): State<AppState>,
    Query(query): Query<AttendanceQuery>,
) -> HandlerResult<Vec<AttendanceRecordDto>> {
    let entries = services::get_attendance(
        state.repository.as_ref(),
        query.date.as_deref(),
        query.course.as_deref(),
    )
    .await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

// =============================================================================
// Leave Requests
// =============================================================================

/// OPTIONS /api/leaves/
///
/// Explicit preflight response for the leave form.
pub async fn leaves_preflight() -> Json<Value> {
    Json(serde_json::json!({}))
}

fn value_to_text(value: Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    }
}

/// POST /api/leaves/
///
/// Create a leave request. Extra fields (`title`, `subject`,
/// `requester_name`) are echoed back without being stored.
pub async fn create_leave_request(
    State(state): State<AppState>,
    Json(request): Json<CreateLeaveRequest>,
) -> CreatedResult<LeaveCreatedResponse> {
    let leave = services::create_leave_request(
        state.repository.as_ref(),
        LeaveRequestInput {
            student_id: request.student_id,
            reason: request.reason,
            from_date: request.from_date,
            to_date: request.to_date,
        },
    )
    .await?;

    info!(leave_id = leave.id, student_id = leave.student_id.value(), "leave request created");

    Ok((
        StatusCode::CREATED,
        Json(LeaveCreatedResponse {
            id: leave.id,
            student_id: leave.student_id.value(),
            reason: leave.reason,
            from_date: leave.from_date.format("%Y-%m-%d").to_string(),
            to_date: leave.to_date.format("%Y-%m-%d").to_string(),
            status: leave.status,
            created_at: leave.created_at.to_rfc3339(),
            requester_name: value_to_text(request.requester_name),
            title: value_to_text(request.title),
            subject: value_to_text(request.subject),
        }),
    ))
}

// =============================================================================
// Subjects
// =============================================================================

/// GET /api/subjects/
pub async fn list_subjects(State(state): State<AppState>) -> HandlerResult<Vec<SubjectDto>> {
    let subjects = services::list_subjects(state.repository.as_ref()).await?;
    Ok(Json(subjects.into_iter().map(Into::into).collect()))
}

/// POST /api/subjects/
pub async fn create_subject(
    State(state): State<AppState>,
    Json(request): Json<CreateSubjectRequest>,
) -> CreatedResult<SubjectDto> {
    let subject = services::create_subject(
        state.repository.as_ref(),
        request.name,
        request.course,
        request.staff,
        request.session,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(subject.into())))
}

/// DELETE /api/subjects/{subject_id}
pub async fn delete_subject(
    State(state): State<AppState>,
    Path(subject_id): Path<i64>,
) -> HandlerResult<MessageResponse> {
    services::delete_subject(state.repository.as_ref(), subject_id).await?;
    Ok(Json(MessageResponse::new("Deleted")))
}

// =============================================================================
// Results
// =============================================================================

/// POST /api/results/
pub async fn add_result(
    State(state): State<AppState>,
    Json(request): Json<CreateResultRequest>,
) -> CreatedResult<ResultDto> {
    let entry = services::add_result(
        state.repository.as_ref(),
        ResultInput {
            student_id: request.student_id,
            student_name: request.student_name,
            subject_name: request.subject_name,
            ia1: request.ia1,
            ia2: request.ia2,
            ia3: request.ia3,
            attendance: request.attendance,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// GET /api/results/?student_id=&student_name=
pub async fn get_results(
    State(state): State<AppState>,
    Query(query): Query<ResultsQuery>,
) -> HandlerResult<Vec<ResultDto>> {
    let entries = services::get_results(
        state.repository.as_ref(),
        query.student_id.as_deref(),
        query.student_name.as_deref(),
    )
    .await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

// =============================================================================
// Reference Books
// =============================================================================

/// Strip path components and unsafe characters from a client-supplied
/// filename.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_matches('.').to_string()
}

/// POST /api/reference-books/
///
/// Multipart upload: author, title and a PDF file. The uploader is
/// recorded when a valid token accompanies the request.
pub async fn upload_reference_book(
    State(state): State<AppState>,
    user: OptionalUser,
    mut multipart: Multipart,
) -> CreatedResult<ReferenceBookDto> {
    let mut author: Option<String> = None;
    let mut title: Option<String> = None;
    let mut pdf: Option<(String, axum::body::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("author") => {
                author = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Invalid multipart body: {}", e))
                })?);
            }
            Some("title") => {
                title = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Invalid multipart body: {}", e))
                })?);
            }
            Some("pdf") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Invalid multipart body: {}", e))
                })?;
                pdf = Some((filename, data));
            }
            _ => {}
        }
    }

    let (author, title, (raw_filename, data)) = match (
        author.filter(|s| !s.is_empty()),
        title.filter(|s| !s.is_empty()),
        pdf,
    ) {
        (Some(a), Some(t), Some(p)) => (a, t, p),
        _ => {
            return Err(AppError::BadRequest(
                "author, title and pdf are required".to_string(),
            ))
        }
    };

    let mut filename = sanitize_filename(&raw_filename);
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(AppError::BadRequest("Only PDF files allowed".to_string()));
    }

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to prepare upload dir: {}", e)))?;

    // Avoid overwrite by adding a timestamp suffix if needed.
    let mut save_path = state.upload_dir.join(&filename);
    if tokio::fs::try_exists(&save_path).await.unwrap_or(false) {
        let (base, ext) = filename
            .rsplit_once('.')
            .map(|(b, e)| (b.to_string(), format!(".{}", e)))
            .unwrap_or((filename.clone(), String::new()));
        filename = format!("{}_{}{}", base, Utc::now().timestamp(), ext);
        save_path = state.upload_dir.join(&filename);
    }

    tokio::fs::write(&save_path, &data)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store upload: {}", e)))?;

    let pdf_url = format!("/uploads/{}", filename);
    let uploaded_by = user.0.map(|claims| claims.user_id());

    let book = services::store_reference_book(
        state.repository.as_ref(),
        author,
        title,
        pdf_url,
        uploaded_by,
    )
    .await?;

    info!(book_id = book.id, file = %filename, "reference book uploaded");
    Ok((StatusCode::CREATED, Json(book.into())))
}

/// GET /api/reference-books/
pub async fn list_reference_books(
    State(state): State<AppState>,
) -> HandlerResult<Vec<ReferenceBookDto>> {
    let books = services::list_reference_books(state.repository.as_ref()).await?;
    Ok(Json(books.into_iter().map(Into::into).collect()))
}

/// DELETE /api/reference-books/{book_id}
///
/// Removes the catalog row; the stored PDF stays on disk.
pub async fn delete_reference_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> HandlerResult<MessageResponse> {
    services::delete_reference_book(state.repository.as_ref(), book_id).await?;
    Ok(Json(MessageResponse::new("Deleted")))
}

// =============================================================================
// Static files
// =============================================================================

fn content_type_for(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

/// A relative path is servable when it cannot escape its base directory.
fn is_safe_relative_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && !path.split('/').any(|segment| segment == "..")
}

async fn serve_file(base: &std::path::Path, relative: &str) -> Result<Response, AppError> {
    if !is_safe_relative_path(relative) {
        return Err(AppError::NotFound("Not Found".to_string()));
    }

    let full = base.join(relative);
    let bytes = tokio::fs::read(&full)
        .await
        .map_err(|_| AppError::NotFound("Not Found".to_string()))?;

    Ok(([(header::CONTENT_TYPE, content_type_for(&full))], bytes).into_response())
}

/// GET /uploads/{filename}
///
/// Serve an uploaded PDF from the upload directory.
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    serve_file(&state.upload_dir, &filename).await
}

/// GET /
///
/// Serve the main landing page.
pub async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    serve_file(&state.frontend_dir, "main.html").await
}

/// Fallback: serve any other file from the frontend folder. API and upload
/// routes are matched first; anything unmatched that is not a frontend
/// file is a JSON 404.
pub async fn serve_frontend(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, AppError> {
    let relative = uri.path().trim_start_matches('/');
    serve_file(&state.frontend_dir, relative).await
}
