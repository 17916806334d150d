pub mod admin_courses;
pub mod admin_enrollments;
pub mod admin_platform;
pub mod admin_users;
pub mod auth;
pub mod health;
pub mod public;
pub mod student;
