/// Builds the gRPC client and server code for the `eta.proto` definition using
/// `tonic-prost-build`.
///
/// The generated module is included from `src/common/mod.rs` via
/// `tonic::include_proto!("eta")`, and a file descriptor set is written next
/// to it so the server can expose gRPC reflection.
///
/// - Proto file: `proto/eta.proto`
/// - Includes: `proto/`
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let descriptor_path = out_dir.join("eta_descriptor.bin");

    println!("cargo:rerun-if-changed=proto/eta.proto");

    tonic_prost_build::configure()
        .file_descriptor_set_path(&descriptor_path)
        .compile_protos(&["proto/eta.proto"], &["proto"])?;

    Ok(())
}
