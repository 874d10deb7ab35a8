use crate::error::{CliError, Result};
use babelrun::core::listing::Listing;
use babelrun::engine::progress::JobHandle;
use babelrun::workflows::service::BabelService;
use std::fmt::Write;
use tracing::info;

pub async fn run_formats(service: &BabelService) -> Result<()> {
    info!("Querying readable formats.");
    let listing = await_listing(service.query_read_formats()?).await?;
    print!("{}", render_formats(&listing));
    Ok(())
}

pub async fn run_forcefields(service: &BabelService) -> Result<()> {
    info!("Querying available force fields.");
    let listing = await_listing(service.query_forcefields()?).await?;
    print!("{}", render_forcefields(&listing));
    Ok(())
}

async fn await_listing(handle: JobHandle<Listing>) -> Result<Listing> {
    let kind = handle.kind();
    let listing = handle.finished().await.ok_or(CliError::Aborted(kind))?;
    if listing.is_empty() {
        return Err(CliError::EmptyResult(kind));
    }
    info!("Received {} entries.", listing.len());
    Ok(listing)
}

/// One line per description, followed by its extensions.
fn render_formats(listing: &Listing) -> String {
    let mut out = String::new();
    for description in listing.keys() {
        let _ = writeln!(out, "{}: {}", description, listing.get(description).join(", "));
    }
    out
}

fn render_forcefields(listing: &Listing) -> String {
    let width = listing.keys().map(str::len).max().unwrap_or(0);
    let mut out = String::new();
    for (name, description) in listing.iter() {
        let _ = writeln!(out, "{:<width$}  {}", name, description, width = width);
    }
    out
}
