pub mod encrypted;
pub mod encryption;
pub mod format;
pub mod kv;
pub mod slot;
pub mod traits;
