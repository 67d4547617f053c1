use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraymarkError {
    #[error("key store error: {0}")]
    KeyStore(String),

    #[error("{role} key required for this operation")]
    MissingKey { role: &'static str },

    #[error("payload does not fit any QR version: {0}")]
    PayloadTooLarge(String),

    #[error("layer dimensions differ: data {data_h}x{data_w}, signature {sig_h}x{sig_w}")]
    LayerMismatch {
        data_h: usize,
        data_w: usize,
        sig_h: usize,
        sig_w: usize,
    },

    #[error("signature error: {0}")]
    Signature(String),

    #[error("payload parse error: {0}")]
    PayloadParse(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GraymarkError>;
