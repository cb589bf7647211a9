//! Hashing utilities for source-set fingerprints.

use std::path::Path;

use sha2::{Digest, Sha256};

/// A hasher for building fingerprints from multiple components.
///
/// Every component is terminated by a NUL separator so that `["ab", "c"]`
/// and `["a", "bc"]` never collide.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    /// Create a new fingerprint builder.
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component to the fingerprint.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0");
        self
    }

    /// Add a path component, normalized to forward slashes.
    pub fn update_path(&mut self, path: &Path) -> &mut Self {
        let s = path.to_string_lossy().replace('\\', "/");
        self.update_str(&s)
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }

    /// Finalize and return a short fingerprint (first 16 chars).
    pub fn finish_short(self) -> String {
        self.finish()[..16].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_fingerprint_separates_components() {
        let fp1 = {
            let mut fp = Fingerprint::new();
            fp.update_str("ab").update_str("c");
            fp.finish()
        };
        let fp2 = {
            let mut fp = Fingerprint::new();
            fp.update_str("a").update_str("bc");
            fp.finish()
        };
        assert_ne!(fp1, fp2);
    }

    #[test]
    fn test_path_fingerprint_ignores_separator_style() {
        let fp1 = {
            let mut fp = Fingerprint::new();
            fp.update_path(&PathBuf::from("a/b/foo.h"));
            fp.finish_short()
        };
        let fp2 = {
            let mut fp = Fingerprint::new();
            fp.update_path(&PathBuf::from("a\\b\\foo.h"));
            fp.finish_short()
        };
        assert_eq!(fp1, fp2);
        assert_eq!(fp1.len(), 16);
    }
}
