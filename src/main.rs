//! Command-line front end: fill the complaint template from a case form.
//!
//! # Usage
//!
//! ```sh
//! complaint-docx --form case.yaml
//! complaint-docx --form case.yaml --template letters/with_placeholder.docx \
//!     --output out/complaint.docx --summary-table
//! ```
//!
//! Set `RUST_LOG=complaint_docx=debug` to see every rewritten paragraph.

use anyhow::{Context, Result};
use clap::Parser;
use complaint_docx::config::FillOptions;
use complaint_docx::fill::fill;
use complaint_docx::form::CaseForm;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Fill the fraud complaint template with the answers of a case form
#[derive(Parser, Debug)]
#[command(
    name = "complaint-docx",
    about = "Fill the fraud complaint Word template from a case form",
    version
)]
struct Args {
    /// Case form (YAML) with one entry per placeholder
    #[arg(short, long, value_name = "FORM")]
    form: PathBuf,

    /// Template document [default: with_placeholder.docx]
    #[arg(short, long, value_name = "TEMPLATE")]
    template: Option<PathBuf>,

    /// Output document [default: modified_document.docx]
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Fill options (YAML); flags given on the command line take precedence
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Append the transaction summary table
    #[arg(long)]
    summary_table: bool,
}

impl Args {
    fn fill_options(&self) -> Result<FillOptions> {
        let mut options = match self.config {
            Some(ref path) => FillOptions::from_yaml_file(path)
                .with_context(|| format!("loading fill options from {}", path.display()))?,
            None => FillOptions::default(),
        };

        if let Some(ref template) = self.template {
            options = options.with_template(template);
        }
        if let Some(ref output) = self.output {
            options = options.with_output(output);
        }
        if self.summary_table {
            options = options.with_summary_table(true);
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let options = args.fill_options()?;

    let form = CaseForm::from_yaml_file(&args.form)
        .with_context(|| format!("reading case form {}", args.form.display()))?;
    let map = form.to_replacements().context("building replacements")?;

    let path = fill(&map, &options)
        .with_context(|| format!("filling template {}", options.template.display()))?;

    println!("{}", path.display());
    Ok(())
}
