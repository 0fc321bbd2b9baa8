use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::journal::Journal;
use crate::models::trade::Trade;

use super::encryption::{random_bytes, JournalCipher, KdfParams};
use super::format::{Container, CURRENT_VERSION};
use super::traits::TradeStorage;

/// Encrypt a journal to portable bytes.
///
/// Flow: Journal → bincode → AES-256-GCM(Argon2id(password)) → TJNL container
pub fn seal_journal(journal: &Journal, password: &str, params: &KdfParams) -> Result<Vec<u8>, CoreError> {
    let plaintext = bincode::serialize(journal)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize journal: {e}")))?;

    let salt = random_bytes::<16>()?;
    let nonce = random_bytes::<12>()?;
    let cipher = JournalCipher::derive(password, &salt, params)?;
    let ciphertext = cipher.seal(&plaintext, &nonce)?;

    Ok(Container {
        version: CURRENT_VERSION,
        kdf_params: *params,
        salt,
        nonce,
        ciphertext: &ciphertext,
    }
    .encode())
}

/// Decrypt bytes produced by [`seal_journal`].
pub fn open_journal(data: &[u8], password: &str) -> Result<Journal, CoreError> {
    let container = Container::decode(data)?;
    let cipher = JournalCipher::derive(password, &container.salt, &container.kdf_params)?;
    let plaintext = cipher.open(container.ciphertext, &container.nonce)?;

    bincode::deserialize(&plaintext)
        .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize journal: {e}")))
}

/// Password-protected journal file (native only).
///
/// A missing file loads as an empty journal; the first save creates it.
/// Writes go to `<path>.tmp` and are renamed over the journal, so a failed
/// save leaves the previous file readable.
#[cfg(not(target_arch = "wasm32"))]
pub struct EncryptedFileStorage {
    path: std::path::PathBuf,
    password: String,
    kdf_params: KdfParams,
}

#[cfg(not(target_arch = "wasm32"))]
impl EncryptedFileStorage {
    pub fn new(path: impl Into<std::path::PathBuf>, password: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            password: password.into(),
            kdf_params: KdfParams::default(),
        }
    }

    /// Override the Argon2 cost used for subsequent saves.
    pub fn with_kdf_params(mut self, params: KdfParams) -> Self {
        self.kdf_params = params;
        self
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Re-encrypt the file under a new password. The current password is
    /// proven by decrypting the existing file first.
    pub fn change_password(&mut self, current: &str, new_password: &str) -> Result<(), CoreError> {
        let bytes = std::fs::read(&self.path)?;
        let journal = open_journal(&bytes, current)?;
        let sealed = seal_journal(&journal, new_password, &self.kdf_params)?;
        self.replace_file(&sealed)?;
        self.password = new_password.to_string();
        info!(path = %self.path.display(), "journal password changed");
        Ok(())
    }

    fn replace_file(&self, bytes: &[u8]) -> Result<(), CoreError> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp);
        std::fs::write(&tmp, bytes)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TradeStorage for EncryptedFileStorage {
    fn name(&self) -> &str {
        "encrypted file"
    }

    fn load(&self) -> Result<Vec<Trade>, CoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no journal file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let trades = open_journal(&bytes, &self.password)?.into_trades()?;
        info!(path = %self.path.display(), count = trades.len(), "encrypted journal loaded");
        Ok(trades)
    }

    fn save(&mut self, trades: &[Trade]) -> Result<(), CoreError> {
        let sealed = seal_journal(&Journal::new(trades.to_vec()), &self.password, &self.kdf_params)?;
        self.replace_file(&sealed)?;
        debug!(path = %self.path.display(), count = trades.len(), "encrypted journal saved");
        Ok(())
    }
}
