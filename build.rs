//! Build script for libpostal-parser
//!
//! This script handles:
//! - Locating the system libpostal through pkg-config
//! - Emitting link flags for it
//! - Exposing `cfg(libpostal_linked)` so the crate knows whether the native
//!   entry points are available

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=LIBPOSTAL_SKIP_BUILD");
    println!("cargo:rerun-if-env-changed=LIBPOSTAL_LIB_DIR");
    println!("cargo::rustc-check-cfg=cfg(libpostal_linked)");

    // Useful for docs.rs and for machines without libpostal installed
    if env::var("LIBPOSTAL_SKIP_BUILD").is_ok() {
        println!("cargo:warning=Skipping libpostal linking due to LIBPOSTAL_SKIP_BUILD");
        return;
    }

    if try_lib_dir() || try_system_libpostal() {
        println!("cargo:rustc-cfg=libpostal_linked");
        return;
    }

    println!(
        "cargo:warning=libpostal not found; engine setup will fail at runtime. \
         Install libpostal or set LIBPOSTAL_LIB_DIR."
    );
}

/// Link against an explicit install prefix (e.g. a static build under /opt)
fn try_lib_dir() -> bool {
    let Ok(dir) = env::var("LIBPOSTAL_LIB_DIR") else {
        return false;
    };

    println!("cargo:rustc-link-search=native={dir}");
    println!("cargo:rustc-link-lib=postal");

    if cfg!(target_os = "linux") {
        println!("cargo:rustc-link-lib=pthread");
        println!("cargo:rustc-link-lib=m");
    }
    true
}

/// Try to use system-installed libpostal via pkg-config
fn try_system_libpostal() -> bool {
    match pkg_config::probe_library("libpostal") {
        Ok(library) => {
            for path in &library.link_paths {
                println!("cargo:rustc-link-search=native={}", path.display());
            }
            for lib in &library.libs {
                println!("cargo:rustc-link-lib={lib}");
            }
            true
        }
        Err(_) => false,
    }
}
