pub mod certificate;
pub mod password;
pub mod token;
