pub mod collection;
pub mod photo;

pub use collection::{Collection, CoverPhoto};
pub use photo::{EnrichedPhoto, Photo, PhotoStatistics, PhotoUser, UserLinks};
