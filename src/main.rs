#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

mod chrome;
mod config;
mod error;
mod interactions;
mod navigation;
mod optimizer;
mod preference;
mod reveal;
mod typing;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod frontend;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("This project is frontend-only. Run `trunk serve` or `trunk build --release`.");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    frontend::run();
}
