use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown animation: {name}")]
    UnknownAnimation { name: String },

    #[error("unknown skin: {name}")]
    UnknownSkin { name: String },

    #[error("unknown bone: {name}")]
    UnknownBone { name: String },

    #[error("unknown slot: {name}")]
    UnknownSlot { name: String },

    #[error("attachment '{name}' not found for slot '{slot}'")]
    UnknownAttachment { slot: String, name: String },

    #[error("invalid value: {message}")]
    InvalidValue { message: String },
}
