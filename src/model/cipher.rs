/// Cipher suite requested for key generation.
///
/// New keys are always `Cv25519`; a key store may refuse the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CipherSuite {
    Rsa4k,
    #[default]
    Cv25519,
}

impl CipherSuite {
    pub fn name(self) -> &'static str {
        match self {
            CipherSuite::Rsa4k => "RSA 4096",
            CipherSuite::Cv25519 => "Curve25519",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_cv25519() {
        assert_eq!(CipherSuite::default(), CipherSuite::Cv25519);
        assert_eq!(CipherSuite::default().name(), "Curve25519");
    }
}
