// Copyright 2025-2026 CEMAXECUTER LLC

fn main() {
    println!("cargo:rerun-if-env-changed=BLADERF_LIB_DIR");

    #[cfg(feature = "bladerf")]
    {
        // Non-standard install prefix (e.g. /opt/bladeRF/lib): add it to the
        // search path and embed an rpath so the tools run without LD_LIBRARY_PATH.
        if let Ok(dir) = std::env::var("BLADERF_LIB_DIR") {
            if std::path::Path::new(&dir).is_dir() {
                println!("cargo:rustc-link-search=native={}", dir);
                println!("cargo:rustc-link-arg=-Wl,-rpath,{}", dir);
            }
        }
        println!("cargo:rustc-link-lib=bladeRF");
    }
}
