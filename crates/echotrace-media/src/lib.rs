//! EchoTrace Media - frame and contour file I/O
//!
//! This crate handles:
//! - Decoding frames into gray intensity images
//! - Reading masks and hand-drawn reference images
//! - RGB to HSV conversion for hue-coded contours
//! - The plain-text per-wall contour file format

pub mod color;
pub mod contour_file;
pub mod decoder;

pub use color::{find_color, hue_mask, rgb_to_hsv};
pub use contour_file::{wall_file_path, ContourFile};
pub use decoder::{
    frame_number, list_frames, load_gray, load_mask, load_rgb, rgb_to_gray, systole_index,
    FileFrames,
};
pub use image::RgbImage;
