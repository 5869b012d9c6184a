//! RSA key pair loading

use jsonwebtoken::{DecodingKey, EncodingKey};
use std::path::Path;
use tracing::info;

use crate::error::AuthError;

/// Process-wide RSA key pair for token signing and verification.
///
/// Loaded once at startup from PEM files and shared read-only (behind an
/// `Arc`) by the issuer, the verifier, and the middleware. The pair is
/// immutable for the process lifetime, which is what makes lock-free
/// concurrent verification safe.
pub struct KeyStore {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl KeyStore {
    /// Load the key pair from PEM files on disk.
    ///
    /// Fails with [`AuthError::KeyLoad`] if either file is unreadable or
    /// does not contain a valid RSA key. This is fatal at startup: the
    /// server must not begin serving requests without a valid pair.
    pub fn load(
        private_key_path: impl AsRef<Path>,
        public_key_path: impl AsRef<Path>,
    ) -> Result<Self, AuthError> {
        let private_pem = read_pem(private_key_path.as_ref())?;
        let public_pem = read_pem(public_key_path.as_ref())?;

        let store = Self::from_pem(&private_pem, &public_pem)?;

        info!(
            "Loaded RSA key pair ({} / {})",
            private_key_path.as_ref().display(),
            public_key_path.as_ref().display()
        );

        Ok(store)
    }

    /// Build a key store from in-memory PEM data.
    pub fn from_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self, AuthError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| AuthError::KeyLoad(format!("invalid private key: {}", e)))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem)
            .map_err(|e| AuthError::KeyLoad(format!("invalid public key: {}", e)))?;

        Ok(Self {
            encoding_key,
            decoding_key,
        })
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, AuthError> {
    std::fs::read(path).map_err(|e| AuthError::KeyLoad(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_keys::{TEST_PRIVATE_KEY, TEST_PUBLIC_KEY};
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_pair() {
        let private = write_temp(TEST_PRIVATE_KEY);
        let public = write_temp(TEST_PUBLIC_KEY);

        let result = KeyStore::load(private.path(), public.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let public = write_temp(TEST_PUBLIC_KEY);

        let result = KeyStore::load("/nonexistent/app.rsa", public.path());
        assert!(matches!(result, Err(AuthError::KeyLoad(_))));
    }

    #[test]
    fn test_load_garbage_pem() {
        let private = write_temp("not a key at all");
        let public = write_temp(TEST_PUBLIC_KEY);

        let result = KeyStore::load(private.path(), public.path());
        assert!(matches!(result, Err(AuthError::KeyLoad(_))));
    }

    #[test]
    fn test_from_pem_rejects_swapped_keys() {
        // Public key material where the private key is expected
        let result = KeyStore::from_pem(TEST_PUBLIC_KEY.as_bytes(), TEST_PUBLIC_KEY.as_bytes());
        assert!(matches!(result, Err(AuthError::KeyLoad(_))));
    }
}
