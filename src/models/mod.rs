pub mod attempt;
pub mod certificate;
pub mod contact;
pub mod course;
pub mod email_template;
pub mod enrollment;
pub mod lesson;
pub mod module;
pub mod note;
pub mod order;
pub mod progress;
pub mod question;
pub mod quiz;
pub mod user;
