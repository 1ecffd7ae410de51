//! # SAPT Backend
//!
//! Backend service for the Student Attendance & Progress Tracker (SAPT).
//!
//! This crate provides a Rust backend for managing courses, staff, students,
//! attendance, results, leave requests, and uploaded reference material. The
//! backend exposes a REST API via Axum for the prebuilt web frontend and
//! serves that frontend's static files itself.
//!
//! ## Features
//!
//! - **Authentication**: credential login issuing signed, time-limited tokens
//! - **Record management**: courses, staff and student accounts
//! - **Attendance capture**: wholesale per-day replacement semantics
//! - **Results and leave requests**: simple create/list flows
//! - **Reference books**: PDF upload with collision-safe storage
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: shared identifier and enum types used across layers
//! - [`auth`]: token signing/verification and password hashing
//! - [`db`]: repository pattern, storage backends, and the service layer
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod api;
pub mod auth;
pub mod db;
pub mod http;
