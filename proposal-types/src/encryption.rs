// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

/// Encryption method for the new devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionMethod {
    Luks1,
    Luks2,
    PervasiveLuks2,
    TpmFde,
    ProtectedSwap,
    SecureSwap,
    RandomSwap,
}

impl EncryptionMethod {
    pub const ALL: [EncryptionMethod; 7] = [
        Self::Luks1,
        Self::Luks2,
        Self::PervasiveLuks2,
        Self::TpmFde,
        Self::ProtectedSwap,
        Self::SecureSwap,
        Self::RandomSwap,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Luks1 => "luks1",
            Self::Luks2 => "luks2",
            Self::PervasiveLuks2 => "pervasive_luks2",
            Self::TpmFde => "tpm_fde",
            Self::ProtectedSwap => "protected_swap",
            Self::SecureSwap => "secure_swap",
            Self::RandomSwap => "random_swap",
        }
    }

    pub fn find(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.id() == id)
    }
}

/// Password-based key derivation function for LUKS2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PbkdFunction {
    Pbkdf2,
    Argon2i,
    Argon2id,
}

impl PbkdFunction {
    pub fn value(&self) -> &'static str {
        match self {
            Self::Pbkdf2 => "pbkdf2",
            Self::Argon2i => "argon2i",
            Self::Argon2id => "argon2id",
        }
    }

    pub fn find(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pbkdf2" => Some(Self::Pbkdf2),
            "argon2i" => Some(Self::Argon2i),
            "argon2id" => Some(Self::Argon2id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionSettings {
    /// Encryption is disabled when there is no password
    pub password: Option<String>,
    pub method: Option<EncryptionMethod>,
    pub pbkd_function: Option<PbkdFunction>,
}

impl EncryptionSettings {
    pub fn enabled(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// Boot loader related settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootSettings {
    /// Whether the proposal should create the partitions needed for booting
    pub configure: bool,

    /// Device to boot from (`None` = derive from the installation target)
    pub device: Option<String>,
}

impl Default for BootSettings {
    fn default() -> Self {
        Self {
            configure: true,
            device: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_ids_roundtrip() {
        for method in EncryptionMethod::ALL {
            assert_eq!(EncryptionMethod::find(method.id()), Some(method));
        }
        assert_eq!(EncryptionMethod::find("rot13"), None);
    }

    #[test]
    fn pbkd_lookup_is_case_insensitive() {
        assert_eq!(PbkdFunction::find("Argon2ID"), Some(PbkdFunction::Argon2id));
        assert_eq!(PbkdFunction::find("scrypt"), None);
    }

    #[test]
    fn encryption_needs_a_password() {
        let mut settings = EncryptionSettings::default();
        assert!(!settings.enabled());
        settings.password = Some(String::new());
        assert!(!settings.enabled());
        settings.password = Some("notsecret".to_string());
        assert!(settings.enabled());
    }
}
