pub mod attempt_service;
pub mod certificate_service;
pub mod contact_service;
pub mod course_service;
pub mod email_service;
pub mod enrollment_service;
pub mod grading_service;
pub mod note_service;
pub mod progress_service;
pub mod stats_service;
pub mod user_service;
