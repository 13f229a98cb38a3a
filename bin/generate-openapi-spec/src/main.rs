//! Print the `OpenAPI` document of the bridgescope API

use api::ApiDoc;
use utoipa::OpenApi;

fn main() -> eyre::Result<()> {
    let json = ApiDoc::openapi().to_pretty_json()?;
    println!("{json}");
    Ok(())
}
