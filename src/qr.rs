use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};

use crate::error::{AppError, AppResult};

/// Pixels per QR module.
pub const QR_MODULE_SIZE: u32 = 10;

/// Quiet zone width in modules (fixed by the renderer for standard QR codes).
pub const QR_QUIET_ZONE: u32 = 4;

/// Turns a content string into a QR image.
pub trait QrEncoder: Send + Sync {
    /// Encodes `content` as a PNG image.
    fn encode_png(&self, content: &str) -> AppResult<Vec<u8>>;

    /// Encodes `content` as a PNG image and base64-encodes the bytes for storage.
    fn encode_base64(&self, content: &str) -> AppResult<String> {
        let png = self.encode_png(content)?;
        Ok(STANDARD.encode(png))
    }
}

/// Black-on-white PNG encoder backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy)]
pub struct PngQrEncoder {
    ec_level: EcLevel,
    module_size: u32,
}

impl PngQrEncoder {
    pub fn new(ec_level: EcLevel, module_size: u32) -> Self {
        Self {
            ec_level,
            module_size,
        }
    }
}

impl Default for PngQrEncoder {
    fn default() -> Self {
        Self::new(EcLevel::L, QR_MODULE_SIZE)
    }
}

impl QrEncoder for PngQrEncoder {
    fn encode_png(&self, content: &str) -> AppResult<Vec<u8>> {
        let code = QrCode::with_error_correction_level(content.as_bytes(), self.ec_level)
            .map_err(|e| AppError::Encoder(format!("{} (content length {})", e, content.len())))?;

        let image = code
            .render::<Luma<u8>>()
            .module_dimensions(self.module_size, self.module_size)
            .quiet_zone(true)
            .build();

        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| AppError::Encoder(format!("PNG encoding failed: {}", e)))?;

        Ok(buffer.into_inner())
    }
}
