use catalog_server::openapi::ApiDoc;
use utoipa::OpenApi;

/// Print the OpenAPI document as pretty JSON.
fn main() {
    match ApiDoc::openapi().to_pretty_json() {
        Ok(spec) => println!("{spec}"),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI document: {e}");
            std::process::exit(1);
        }
    }
}
