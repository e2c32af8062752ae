use image::ImageFormat;
use thiserror::Error;

use crate::models::TabletImage;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UploadError {
    #[error("Please upload a tablet image to proceed.")]
    Missing,

    #[error("Unsupported image type {0}; upload a JPG, JPEG or PNG file")]
    UnsupportedFormat(String),
}

impl TabletImage {
    /// Accept PNG and JPEG uploads, trusting the bytes over the declared type.
    pub fn from_upload(data: Vec<u8>) -> Result<Self, UploadError> {
        if data.is_empty() {
            return Err(UploadError::Missing);
        }

        let mime_type = match image::guess_format(&data) {
            Ok(ImageFormat::Png) => "image/png",
            Ok(ImageFormat::Jpeg) => "image/jpeg",
            Ok(other) => {
                return Err(UploadError::UnsupportedFormat(
                    other.to_mime_type().to_string(),
                ));
            }
            Err(_) => return Err(UploadError::UnsupportedFormat("unknown".to_string())),
        };

        Ok(Self {
            mime_type: mime_type.to_string(),
            data,
        })
    }
}
