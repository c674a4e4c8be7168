//! Generates the Swift and Kotlin bindings for `sessionkit`.

fn main() {
    uniffi::uniffi_bindgen_main();
}
