pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    attempt_service::AttemptService, certificate_service::CertificateService,
    contact_service::ContactService, course_service::CourseService, email_service::EmailService,
    enrollment_service::EnrollmentService, note_service::NoteService,
    progress_service::ProgressService, stats_service::StatsService, user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub course_service: CourseService,
    pub enrollment_service: EnrollmentService,
    pub progress_service: ProgressService,
    pub attempt_service: AttemptService,
    pub certificate_service: CertificateService,
    pub note_service: NoteService,
    pub email_service: EmailService,
    pub stats_service: StatsService,
    pub contact_service: ContactService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let user_service = UserService::new(pool.clone());
        let course_service = CourseService::new(pool.clone());
        let enrollment_service = EnrollmentService::new(pool.clone());
        let progress_service = ProgressService::new(pool.clone());
        let attempt_service = AttemptService::new(pool.clone());
        let certificate_service = CertificateService::new(pool.clone());
        let note_service = NoteService::new(pool.clone());
        let email_service = EmailService::new(pool.clone());
        let stats_service = StatsService::new(pool.clone());
        let contact_service = ContactService::new(pool.clone());

        Self {
            pool,
            user_service,
            course_service,
            enrollment_service,
            progress_service,
            attempt_service,
            certificate_service,
            note_service,
            email_service,
            stats_service,
            contact_service,
        }
    }
}
