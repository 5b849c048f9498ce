use std::hash::{BuildHasher, BuildHasherDefault, DefaultHasher, Hasher as _};

use fnv::FnvBuildHasher;

/// Trait for a hasher factory that turns item bytes into the 64-bit
/// fingerprint which seeds a signature's random stream.
///
/// It is a super set of [`BuildHasher`], enforcing additional requirements
/// on the hasher builder that are required for signatures to be comparable.
///
/// When comparing or merging two signatures, the hashers must be equal, i.e.
/// they must produce the same fingerprint for the same item.
pub trait ReproducibleBuildHasher: BuildHasher + Default + Clone {
    /// Hashes `salt` followed by the raw `bytes` of an item.
    ///
    /// The bytes are written without a length prefix, so the fingerprint only
    /// depends on the salt and the item content.
    #[inline]
    fn fingerprint(&self, salt: u64, bytes: &[u8]) -> u64 {
        let mut hasher = self.build_hasher();
        hasher.write_u64(salt);
        hasher.write(bytes);
        hasher.finish()
    }

    #[inline]
    fn debug_assert_hashers_eq() {
        // In debug builds we check that hash outputs are the same for
        // self and other. The library user should only have implemented
        // our build hasher trait if this is already true, but we check
        // here in case they have implemented the trait in error.
        debug_assert_eq!(
            Self::default().fingerprint(0, b"superminhash"),
            Self::default().fingerprint(0, b"superminhash"),
            "Hashers produced by ReproducibleBuildHasher do not produce the same output with the same input"
        );
    }
}

/// Note that this `BuildHasher` has a consistent implementation of `Default`
/// but is NOT stable across releases of Rust. Signatures built with it must
/// only be compared against signatures built by the same binary.
pub type UnstableDefaultBuildHasher = BuildHasherDefault<DefaultHasher>;

impl ReproducibleBuildHasher for UnstableDefaultBuildHasher {}
impl ReproducibleBuildHasher for FnvBuildHasher {}
