//! Single-channel extraction, the first and only mandatory stage.

use image::{DynamicImage, GrayImage, Luma};

use crate::config::Channel;

/// Reduce a frame to one 8-bit channel.
///
/// Single-channel sources pass through unchanged. Colour sources are read as
/// RGBA and the selected channel is copied out; [`Channel::Luma`] uses the
/// `image` crate's luminance conversion instead.
pub fn extract_channel(image: &DynamicImage, channel: Channel) -> GrayImage {
    if !image.color().has_color() {
        return image.to_luma8();
    }

    let index = match channel {
        Channel::Red => 0,
        Channel::Green => 1,
        Channel::Blue => 2,
        Channel::Luma => return image.to_luma8(),
    };

    let rgba = image.to_rgba8();
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        Luma([rgba.get_pixel(x, y)[index]])
    })
}

/// Step-log entry for the channel stage.
pub fn describe(image: &DynamicImage, channel: Channel) -> String {
    if image.color().has_color() {
        format!(
            "channel: extract {} ({}x{})",
            channel,
            image.width(),
            image.height()
        )
    } else {
        format!(
            "channel: single-channel passthrough ({}x{})",
            image.width(),
            image.height()
        )
    }
}
