//! Command-line submission client for the intake service.
//!
//! ```text
//! apply --name "Jane Doe" --email jane@x.com --phone 555-1234 \
//!       --position Engineer --cv ./jane.pdf
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use intake::client::{ApplicationForm, CvFile, SubmissionClient};

#[derive(Debug, Parser)]
#[command(name = "apply", version, about = "Submit a job application to the intake service")]
struct Args {
    /// Intake server root URL
    #[arg(long, env = "INTAKE_URL", default_value = "http://localhost:5002")]
    server: String,

    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    phone: String,

    #[arg(long)]
    position: String,

    /// Path to the CV (PDF)
    #[arg(long)]
    cv: PathBuf,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let cv = CvFile::from_path(&args.cv)
        .await
        .with_context(|| format!("failed to read CV at {}", args.cv.display()))?;

    let mut form = ApplicationForm {
        name: args.name,
        email: args.email,
        phone: args.phone,
        position: args.position,
        cv: Some(cv),
    };

    let client = SubmissionClient::new(&args.server, Duration::from_secs(args.timeout_secs))?;
    let receipt = client
        .submit(&mut form)
        .await
        .context("Error submitting application. Please try again.")?;

    println!("{}", receipt.message);
    if let Some(cv_url) = receipt.cv_url {
        println!("CV stored at: {cv_url}");
    }
    Ok(())
}
