use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "cropsight-cli")]
#[command(about = "Management CLI for the cropsight backend", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the remote model is loaded
    Health,
    /// List crops the model recognizes
    Crops,
    /// Analyze a crop image
    Analyze {
        /// Path to the image file
        image: PathBuf,
        /// Crop name, e.g. "Apple"
        #[arg(short, long)]
        crop: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client
                .get(format!("{}/api/crop/health", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Crops => {
            let res = client
                .get(format!("{}/api/crop/crops", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Analyze { image, crop } => {
            let bytes = tokio::fs::read(&image).await?;
            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name(
                    image
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "image.jpg".to_string()),
                )
                .mime_str("image/jpeg")?;
            let form = reqwest::multipart::Form::new()
                .part("image", part)
                .text("crop", crop);

            let res = client
                .post(format!("{}/api/crop/analyze", cli.url))
                .multipart(form)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
