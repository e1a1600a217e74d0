pub mod exif;
pub mod pdf;
