use std::fs;
use std::path::PathBuf;

use alloy::signers::local::PrivateKeySigner;
use color_eyre::eyre::{eyre, Result};

use crate::config::Config;

const KEYSTORE_FILE: &str = "keystore.json";
const APP_DIR: &str = "waveportal-tui";

/// Where the signing key comes from.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// JSON keystore on disk, unlocked with a passphrase
    Keystore(PathBuf),
    /// Raw hex private key, already usable without a prompt
    RawKey(String),
}

/// Local wallet capability. The rest of the app only ever asks three things:
/// is any key material configured, can an account be adopted without
/// prompting, and can the key be unlocked with a passphrase from the prompt.
pub struct Wallet {
    source: Option<KeySource>,
    password: Option<String>,
}

impl Wallet {
    pub fn new(source: Option<KeySource>, password: Option<String>) -> Self {
        Self { source, password }
    }

    /// Build the wallet from CLI configuration. A raw private key takes
    /// precedence over a keystore; with neither configured, the wallet is
    /// absent and chain-dependent actions stay disabled.
    pub fn from_config(config: &Config) -> Self {
        let source = if let Some(ref key) = config.private_key {
            Some(KeySource::RawKey(key.clone()))
        } else if let Some(ref path) = config.keystore {
            Some(KeySource::Keystore(path.clone()))
        } else {
            default_keystore_path().filter(|p| p.exists()).map(KeySource::Keystore)
        };

        let password = config.password.clone().or_else(|| {
            let path = config.password_file.as_ref()?;
            fs::read_to_string(path).ok().map(|s| s.trim_end().to_string())
        });

        Self::new(source, password)
    }

    /// Whether any key material is configured at all.
    pub fn is_available(&self) -> bool {
        self.source.is_some()
    }

    /// Adopt a signer without prompting the user: a raw key parses directly,
    /// a keystore only unlocks here if a passphrase was supplied up front.
    pub fn authorized_signer(&self) -> Option<PrivateKeySigner> {
        match self.source.as_ref()? {
            KeySource::RawKey(key) => key.parse().ok(),
            KeySource::Keystore(path) => {
                let password = self.password.as_ref()?;
                PrivateKeySigner::decrypt_keystore(path, password).ok()
            }
        }
    }

    /// Unlock with a passphrase typed into the connect prompt. A raw key
    /// needs no passphrase and succeeds regardless of the input.
    pub fn unlock(&self, password: &str) -> Result<PrivateKeySigner> {
        match self.source.as_ref() {
            None => Err(eyre!("no wallet configured")),
            Some(KeySource::RawKey(key)) => {
                key.parse().map_err(|e| eyre!("invalid private key: {e}"))
            }
            Some(KeySource::Keystore(path)) => PrivateKeySigner::decrypt_keystore(path, password)
                .map_err(|e| eyre!("could not unlock keystore: {e}")),
        }
    }
}

/// Default keystore location, ~/.config/waveportal-tui/keystore.json.
fn default_keystore_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join(APP_DIR).join(KEYSTORE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known anvil dev key, safe to embed in tests.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_absent_wallet() {
        let wallet = Wallet::new(None, None);
        assert!(!wallet.is_available());
        assert!(wallet.authorized_signer().is_none());
        assert!(wallet.unlock("hunter2").is_err());
    }

    #[test]
    fn test_raw_key_is_authorized_without_prompt() {
        let wallet = Wallet::new(Some(KeySource::RawKey(DEV_KEY.to_string())), None);
        assert!(wallet.is_available());
        let signer = wallet.authorized_signer().expect("raw key should parse");
        assert_eq!(format!("{}", signer.address()), DEV_ADDRESS);
    }

    #[test]
    fn test_raw_key_unlock_ignores_password() {
        let wallet = Wallet::new(Some(KeySource::RawKey(DEV_KEY.to_string())), None);
        assert!(wallet.unlock("").is_ok());
    }

    #[test]
    fn test_keystore_without_password_needs_prompt() {
        let wallet = Wallet::new(
            Some(KeySource::Keystore(PathBuf::from("/nonexistent/keystore.json"))),
            None,
        );
        assert!(wallet.is_available());
        // No passphrase supplied up front, so nothing unlocks silently.
        assert!(wallet.authorized_signer().is_none());
    }

    #[test]
    fn test_missing_keystore_unlock_fails() {
        let wallet = Wallet::new(
            Some(KeySource::Keystore(PathBuf::from("/nonexistent/keystore.json"))),
            None,
        );
        assert!(wallet.unlock("hunter2").is_err());
    }

    #[test]
    fn test_invalid_raw_key_not_authorized() {
        let wallet = Wallet::new(Some(KeySource::RawKey("0xnothex".to_string())), None);
        assert!(wallet.is_available());
        assert!(wallet.authorized_signer().is_none());
    }
}
