fn main() {
    // Use the "built" crate to generate some useful build-time information,
    // including the git hash and compiler version.
    built::write_built_file().expect("Failed to acquire build-time information");

    println!("cargo:rerun-if-changed=build.rs");
}
