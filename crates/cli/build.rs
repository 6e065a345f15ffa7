//! Build script for the cmdgraph CLI binary.
//!
//! Embeds `data/demo.json` so that every subcommand works without a
//! `--grammar` flag. If the file is missing the binary is built without it
//! and `--grammar <PATH>` becomes mandatory at runtime.

use std::path::Path;

fn main() {
    println!("cargo::rustc-check-cfg=cfg(has_embedded_grammar)");
    println!("cargo:rerun-if-changed=data/demo.json");

    let grammar = Path::new("data/demo.json");
    if !grammar.exists() {
        return;
    }

    println!("cargo:rustc-cfg=has_embedded_grammar");

    // Copy into OUT_DIR so include_str! has a stable, absolute path.
    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR not set");
    let dest = Path::new(&out_dir).join("demo.json");
    std::fs::copy(grammar, &dest).expect("failed to copy demo.json to OUT_DIR");
}
