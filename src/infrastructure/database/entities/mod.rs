//! Sea-ORM entity definitions
//!
//! One logical schema shared by both partition databases.

pub mod change_log;
pub mod participant;
pub mod photo;
pub mod photo_data;
pub mod photo_tag;
pub mod rating;
pub mod share;
pub mod tag;
pub mod thumbnail;

// Re-export all entities
pub use change_log::Entity as ChangeLog;
pub use participant::Entity as Participant;
pub use photo::Entity as Photo;
pub use photo_data::Entity as PhotoData;
pub use photo_tag::Entity as PhotoTag;
pub use rating::Entity as Rating;
pub use share::Entity as Share;
pub use tag::Entity as Tag;
pub use thumbnail::Entity as Thumbnail;
