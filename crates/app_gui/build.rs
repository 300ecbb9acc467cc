use std::env;

fn main() {
    let version =
        env::var("CROPDOC_VERSION").unwrap_or_else(|_| env::var("CARGO_PKG_VERSION").unwrap());
    println!("cargo:rustc-env=CROPDOC_VERSION={version}");
    println!("cargo:rerun-if-env-changed=CROPDOC_VERSION");
}
