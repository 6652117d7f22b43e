//! Generates the Swift and Kotlin bindings for `recipe_finder`.
//!
//! Bindings are read from the metadata embedded in a built library, so build
//! the target the host app links first. The iOS app consumes the static
//! archive (`.a`) in an XCFramework; the Android app loads the shared object.
//!
//! ## Usage
//!
//! Swift, from a macOS build:
//! ```bash
//! cargo build --release --target aarch64-apple-ios
//! cargo run --features cli --bin uniffi-bindgen generate \
//!     --library target/aarch64-apple-ios/release/librecipe_finder.a \
//!     --language swift --out-dir ./bindings/swift
//! ```
//!
//! A host `.dylib` (`target/release/librecipe_finder.dylib`) works as well
//! when generating on a Mac without a cross target.
//!
//! Kotlin:
//! ```bash
//! cargo run --features cli --bin uniffi-bindgen generate \
//!     --library target/release/librecipe_finder.so \
//!     --language kotlin --out-dir ./bindings/kotlin
//! ```

fn main() {
    uniffi::uniffi_bindgen_main()
}
