//! QR rendering of provisioning strings.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// The provisioning string could not be turned into an image.
#[derive(Debug, Clone, Error)]
#[error("QR encoding failed: {message}")]
pub struct QrError {
    /// What went wrong.
    pub message: String,
}

impl QrError {
    /// Create an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A rendered QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedQr {
    /// PNG bytes.
    pub png: Vec<u8>,
}

impl EncodedQr {
    /// Standard base64 of the PNG, without a data-URL prefix.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }

    /// `data:image/png;base64,...` URL of the PNG.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }
}

/// Turns a provisioning string into a scannable image.
pub trait QrEncoder: Send + Sync {
    /// Render `payload` as a QR image.
    fn encode(&self, payload: &str) -> Result<EncodedQr, QrError>;
}

#[cfg(feature = "qr")]
pub use png::PngQrEncoder;

#[cfg(feature = "qr")]
mod png {
    use super::{EncodedQr, QrEncoder, QrError};
    use image::{ImageFormat, Luma};
    use qrcode::{EcLevel, QrCode};
    use std::io::Cursor;

    /// Smallest side of the rendered image, in pixels.
    pub const DEFAULT_MIN_SIZE: u32 = 256;

    /// Grayscale PNG encoder backed by the `qrcode` and `image` crates.
    #[derive(Debug, Clone, Copy)]
    pub struct PngQrEncoder {
        min_size: u32,
        ec_level: EcLevel,
    }

    impl Default for PngQrEncoder {
        fn default() -> Self {
            Self {
                min_size: DEFAULT_MIN_SIZE,
                ec_level: EcLevel::M,
            }
        }
    }

    impl PngQrEncoder {
        /// Encoder with a 256 pixel minimum size and medium error correction.
        pub fn new() -> Self {
            Self::default()
        }

        /// Set the minimum side of the image.
        pub fn with_min_size(mut self, min_size: u32) -> Self {
            self.min_size = min_size;
            self
        }

        /// Set the error correction level.
        pub fn with_ec_level(mut self, ec_level: EcLevel) -> Self {
            self.ec_level = ec_level;
            self
        }
    }

    impl QrEncoder for PngQrEncoder {
        fn encode(&self, payload: &str) -> Result<EncodedQr, QrError> {
            if payload.trim().is_empty() {
                return Err(QrError::new("provisioning string is empty"));
            }

            let code = QrCode::with_error_correction_level(payload.as_bytes(), self.ec_level)
                .map_err(|e| QrError::new(e.to_string()))?;

            let image = code
                .render::<Luma<u8>>()
                .quiet_zone(true)
                .min_dimensions(self.min_size, self.min_size)
                .build();

            let mut png = Vec::new();
            image
                .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                .map_err(|e| QrError::new(e.to_string()))?;

            Ok(EncodedQr { png })
        }
    }

}
