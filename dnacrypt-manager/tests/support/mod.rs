//! Shared helpers for manager integration tests.

#![allow(dead_code)]

use dnacrypt_manager::dnacrypt_crypto::KdfParams;
use dnacrypt_manager::{EncryptionManager, ManagerConfig};

/// Minimal Argon2id cost so each test derives keys in milliseconds.
pub fn fast_config() -> ManagerConfig {
    ManagerConfig {
        kdf: KdfParams::new(64, 1, 1),
        ..ManagerConfig::default()
    }
}

pub fn manager(secret: &str) -> EncryptionManager {
    init_tracing();
    EncryptionManager::with_config(secret, fast_config()).unwrap()
}

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
