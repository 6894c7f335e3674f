//! Build script for rvtrails
//!
//! Re-runs when the bundled dataset changes and embeds build-time
//! information (git commit, dirty status, build timestamp).

fn main() {
    println!("cargo:rerun-if-changed=assets/campgrounds.json");

    // Embed git commit, build time, and dirty status
    shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build info");
}
