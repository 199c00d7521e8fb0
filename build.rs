//! Build script for paseto-tokens.
//!
//! This emits compile-time warnings for security-sensitive feature flags.

fn main() {
    #[cfg(feature = "v1")]
    {
        // Note: Using single-colon syntax for MSRV 1.75.0 compatibility
        println!("cargo:warning=SECURITY WARNING: The 'v1' feature is enabled.");
        println!("cargo:warning=V1 public tokens use the `rsa` crate which is affected by RUSTSEC-2023-0071 (Marvin Attack).");
        println!("cargo:warning=Use V4 for new deployments. V1 is provided only for legacy interoperability.");
    }
}
