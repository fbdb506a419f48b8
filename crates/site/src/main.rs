//! Browser entrypoint for the NAS desktop shell.

#[cfg(all(target_arch = "wasm32", feature = "csr"))]
fn main() {
    site::mount();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("nas_desktop only runs in the browser; build it for wasm32 with the `csr` feature.");
}
