pub mod auth;
pub mod exam;
pub mod institution;
pub mod profile;
pub mod question;
pub mod storage;
pub mod taxonomy;
