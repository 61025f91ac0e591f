use std::fs;
use std::path::Path;

fn main() {
    // Rerun when the API surface or its DTOs change
    println!("cargo:rerun-if-changed=src/api.rs");
    println!("cargo:rerun-if-changed=src/models.rs");
    println!("cargo:rerun-if-changed=src/map.rs");
    println!("cargo:rerun-if-changed=src/services/station_service.rs");
    println!("cargo:rerun-if-changed=src/services/prediction_service.rs");

    // The real document comes from the generate-openapi binary
    let openapi_path = Path::new("openapi.json");

    if !openapi_path.exists() {
        let placeholder = r#"{
  "note": "Run 'cargo run --bin generate-openapi' to generate the OpenAPI spec"
}"#;
        fs::write(openapi_path, placeholder).expect("Failed to create openapi.json placeholder");
    }
}
