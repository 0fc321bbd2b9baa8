use super::encryption::KdfParams;
use crate::errors::CoreError;

/// Magic bytes identifying an encrypted trade journal file.
pub const MAGIC: &[u8; 4] = b"TJNL";

/// Current container version (independent of the journal schema version).
pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf_params(12) + salt(16) + nonce(12) + ciphertext_len(8)
pub const HEADER_SIZE: usize = 54;

/// Parsed encrypted container.
///
/// Layout, all integers little-endian:
/// ```text
/// [TJNL] [version u16] [memory_cost u32] [time_cost u32] [parallelism u32]
/// [salt 16B] [nonce 12B] [ciphertext_len u64] [ciphertext + tag]
/// ```
#[derive(Debug)]
pub struct Container<'a> {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; 16],
    pub nonce: [u8; 12],
    pub ciphertext: &'a [u8],
}

impl<'a> Container<'a> {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + self.ciphertext.len());
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.memory_cost.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.time_cost.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.parallelism.to_le_bytes());
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&(self.ciphertext.len() as u64).to_le_bytes());
        buf.extend_from_slice(self.ciphertext);
        buf
    }

    pub fn decode(data: &'a [u8]) -> Result<Self, CoreError> {
        if data.len() < HEADER_SIZE {
            return Err(CoreError::InvalidFileFormat(
                "File too small to be an encrypted journal".into(),
            ));
        }

        let mut reader = Reader { data, offset: 0 };

        if reader.take::<4>()? != *MAGIC {
            return Err(CoreError::InvalidFileFormat(
                "Invalid magic bytes — not an encrypted journal".into(),
            ));
        }

        let version = u16::from_le_bytes(reader.take()?);
        if version == 0 || version > CURRENT_VERSION {
            return Err(CoreError::UnsupportedVersion(version));
        }

        let kdf_params = KdfParams {
            memory_cost: u32::from_le_bytes(reader.take()?),
            time_cost: u32::from_le_bytes(reader.take()?),
            parallelism: u32::from_le_bytes(reader.take()?),
        };
        kdf_params.check_bounds()?;

        let salt = reader.take::<16>()?;
        let nonce = reader.take::<12>()?;
        let declared = u64::from_le_bytes(reader.take()?);

        let remaining = &data[reader.offset..];
        let len = usize::try_from(declared)
            .ok()
            .filter(|len| *len <= remaining.len())
            .ok_or_else(|| {
                CoreError::InvalidFileFormat(format!(
                    "File truncated: header declares {declared} bytes of ciphertext, {} present",
                    remaining.len()
                ))
            })?;

        Ok(Self {
            version,
            kdf_params,
            salt,
            nonce,
            ciphertext: &remaining[..len],
        })
    }
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let end = self.offset + N;
        let bytes: [u8; N] = self
            .data
            .get(self.offset..end)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| CoreError::InvalidFileFormat(format!("Header cut short at byte {}", self.offset)))?;
        self.offset = end;
        Ok(bytes)
    }
}
