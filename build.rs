//! Build script for strand-kit.

use std::{env, fs, path::PathBuf};

fn main() {
    // Arrange memory.x when building for the Pico 1; host builds need
    // nothing from us.
    let target = env::var("TARGET").unwrap();
    if target.starts_with("thumbv6m") {
        let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
        let memory_x =
            fs::read_to_string("memory-pico1w.x").expect("Failed to read memory-pico1w.x");
        fs::write(out_dir.join("memory.x"), memory_x).expect("Failed to write memory.x");
        println!("cargo:rustc-link-search={}", out_dir.display());
        println!("cargo:rerun-if-changed=memory-pico1w.x");
    }
}
