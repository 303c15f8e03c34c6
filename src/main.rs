use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imgconv::client::{ConvertService, HttpConvertClient, LocalConvertClient};
use imgconv::codec::ImageProcessor;
use imgconv::controller::ConversionController;
use imgconv::models::{Config, ConversionResult, TargetFormat};
use imgconv::progress::ProgressObserver;
use imgconv::server;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "imgconv")]
#[command(about = "Convert images to WebP, AVIF, JPEG or PNG")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP conversion endpoint.
    Serve {
        /// Address to listen on (overrides IMGCONV_BIND_ADDR).
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Convert files one at a time and write the results to a directory.
    Convert {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Target format: webp, avif, jpeg or png.
        #[arg(short, long, default_value = "webp", value_parser = parse_format_arg)]
        format: TargetFormat,

        /// Base URL of a running endpoint. Converts in-process when unset.
        #[arg(long)]
        endpoint: Option<String>,

        #[arg(short, long, default_value = "converted")]
        output: PathBuf,

        /// Send requests without the original file names.
        #[arg(long)]
        no_original_name: bool,

        /// Also write the combined download link of the run to FILE.
        #[arg(long, value_name = "FILE")]
        download_link: Option<PathBuf>,
    },
}

fn parse_format_arg(input: &str) -> std::result::Result<TargetFormat, String> {
    input
        .parse()
        .map_err(|_| format!("Invalid format '{}'. Expected one of: webp, avif, jpeg, png", input))
}

struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        let template = "{bar:40} {pos}/{len} ({percent}%) {msg}";
        if let Ok(style) = ProgressStyle::with_template(template) {
            bar.set_style(style);
        }
        Self { bar }
    }
}

impl ProgressObserver for BarProgress {
    fn on_run_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_item_converted(
        &self,
        completed: usize,
        _total: usize,
        _progress: f64,
        result: &ConversionResult,
    ) {
        self.bar.set_position(completed as u64);
        self.bar.set_message(result.name.clone());
    }

    fn on_item_failed(
        &self,
        completed: usize,
        _total: usize,
        _progress: f64,
        name: &str,
        _error: &imgconv::Error,
    ) {
        self.bar.set_position(completed as u64);
        self.bar.println(format!("failed: {}", name));
    }

    fn on_run_complete(&self, _results: &[ConversionResult]) {
        self.bar.finish_and_clear();
    }
}

async fn run_convert(
    config: &Config,
    files: Vec<PathBuf>,
    format: TargetFormat,
    endpoint: Option<String>,
    output: &Path,
    send_original_names: bool,
    download_link: Option<PathBuf>,
) -> Result<()> {
    let service: Box<dyn ConvertService> = match endpoint.or_else(|| config.endpoint.clone()) {
        Some(url) => {
            info!("Using conversion endpoint {}", url);
            Box::new(HttpConvertClient::new(url))
        }
        None => {
            info!("No endpoint configured, converting in-process");
            Box::new(LocalConvertClient::new(Arc::new(ImageProcessor::new())))
        }
    };

    let mut controller = ConversionController::new().with_original_names(send_original_names);
    controller.set_format(format);
    controller.select_files(&files).await;

    let observer = BarProgress::new();
    let results = controller.convert_all(service.as_ref(), &observer).await;

    tokio::fs::create_dir_all(output)
        .await
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let mut written = HashSet::new();
    for (index, result) in results.iter().enumerate() {
        let name = if written.insert(result.name.clone()) {
            result.name.clone()
        } else {
            format!("{}-{}", index + 1, result.name)
        };
        let path = output.join(&name);
        tokio::fs::write(&path, result.decode_data()?)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("{} - {} bytes", path.display(), result.size);
    }

    let failed = controller.selected().len() - controller.results().len();
    if failed > 0 {
        warn!("{} of {} image(s) failed to convert", failed, controller.selected().len());
    }

    if let Some(link_path) = download_link {
        if let Some(link) = controller.download_link() {
            tokio::fs::write(&link_path, link).await?;
            info!(
                "Wrote download link for {} to {}",
                controller.download_name(),
                link_path.display()
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgconv=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let mut config = Config::from_env()?;

    let outcome = match args.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            server::serve(&config, Arc::new(ImageProcessor::new()))
                .await
                .map_err(anyhow::Error::from)
        }
        Command::Convert {
            files,
            format,
            endpoint,
            output,
            no_original_name,
            download_link,
        } => {
            run_convert(
                &config,
                files,
                format,
                endpoint,
                &output,
                !no_original_name,
                download_link,
            )
            .await
        }
    };

    if let Err(e) = outcome {
        error!("imgconv failed: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
