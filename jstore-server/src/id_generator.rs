use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Builder;

use crate::errors::JStoreResult;

/// Mints identifiers for newly created documents.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> JStoreResult<String>;
}

/// Random (version 4) UUIDs drawn straight from the OS entropy source, so an
/// unavailable source is reported instead of panicking.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomUuidGenerator;

impl IdGenerator for RandomUuidGenerator {
    fn generate(&self) -> JStoreResult<String> {
        let mut bytes = [0u8; 16];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Builder::from_random_bytes(bytes)
            .into_uuid()
            .hyphenated()
            .to_string())
    }
}
