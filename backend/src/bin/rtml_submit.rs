//! Liverpool Telescope RTML submission tool.
//!
//! # Usage
//!
//! ```bash
//! rtml-submit types
//! rtml-submit sites
//! rtml-submit render form.json catalog.json
//! rtml-submit submit form.json catalog.json
//! ```
//!
//! `render` prints the indented request document without sending anything.
//! `submit` sends it, or writes it to the debug sink when `debug` is set.
//!
//! # Environment Variables
//!
//! - `LT_USERNAME`, `LT_PASSWORD` (required unless an `lt.toml` is found)
//! - `LT_HOST`, `LT_PORT`, `LT_TIMEOUT_SECS`, `LT_DEBUG`, `LT_DEBUG_OUTPUT`, `LT_PROPOSALS`
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::fs;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use lt_rtml::catalog::LocalCatalog;
use lt_rtml::{FacilityConfig, LtFacility, ObservationForm};

const USAGE: &str = "usage: rtml-submit <types | sites | render FORM CATALOG | submit FORM CATALOG>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["types"] => {
            for t in LtFacility::observation_types() {
                println!("{}\t{}", t.code, t.label);
            }
        }
        ["sites"] => {
            println!("{}", serde_json::to_string_pretty(&LtFacility::observing_sites())?);
        }
        ["render", form, catalog] => {
            let facility = load_facility(catalog)?;
            let document = facility.observation_payload(load_form(form)?).await?;
            print!("{}", document.to_pretty_xml()?);
        }
        ["submit", form, catalog] => {
            let facility = load_facility(catalog)?;
            let form = load_form(form)?;

            let errors = facility.validate_observation(&form).await;
            if !errors.is_empty() {
                bail!("observation form is invalid:\n  {}", errors.join("\n  "));
            }

            let result = facility
                .submit_observation(form)
                .await
                .context("submission failed")?;
            info!("Submission accepted");
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

fn load_facility(catalog_path: &str) -> anyhow::Result<LtFacility> {
    let config = FacilityConfig::load().context("loading facility configuration")?;
    let catalog = LocalCatalog::from_json_file(catalog_path)
        .with_context(|| format!("loading target catalog {}", catalog_path))?;
    info!(
        "Loaded {} targets, endpoint {}{}",
        catalog.len(),
        config.endpoint_url(),
        if config.debug { " (debug mode)" } else { "" }
    );
    Ok(LtFacility::new(config, Arc::new(catalog))?)
}

fn load_form(path: &str) -> anyhow::Result<ObservationForm> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading observation form {}", path))?;
    Ok(ObservationForm::from_json(&content)?)
}
