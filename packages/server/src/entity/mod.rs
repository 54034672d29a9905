pub mod alternative;
pub mod category;
pub mod exam;
pub mod institution;
pub mod profile;
pub mod question;
pub mod subcategory;
pub mod subject;
pub mod user;
pub mod user_profile;

pub use question::ImageUrls;
