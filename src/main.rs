use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use vin_qr::pipeline::{self, GenerationRequest, PipelineError};
use vin_qr::{config, imaging, lot, output};

/// Exit status when the attributes fall outside the vocabularies.
const EXIT_INVALID: u8 = 2;

/// Attributes identifying one wine.
#[derive(clap::Args, Clone)]
struct WineArgs {
    /// Vintage year
    year: u16,
    /// mercurey, rully or bourgogne
    appellation: String,
    /// red or white
    color: String,
    /// "Champs Martin", Fromange or - (not applicable)
    #[arg(long)]
    climat: Option<String>,
    /// village, "1er cru", "grand cru" or - (not applicable)
    #[arg(long)]
    cru: Option<String>,
    /// Energy per 100 ml, "312 kJ / 75 kcal" or a kJ value [default: from config]
    #[arg(long)]
    energy: Option<String>,
}

impl WineArgs {
    fn into_request(self) -> GenerationRequest {
        GenerationRequest {
            climat: self.climat,
            cru: self.cru,
            energy: self.energy,
            ..GenerationRequest::new(self.year, self.appellation, self.color)
        }
    }
}

#[derive(Parser)]
#[command(name = "vin-qr")]
#[command(about = "QR code labels and product pages for wine lots")]
#[command(long_about = "\
QR code labels and product pages for wine lots

Each generation reserves the next lot number and writes two artifacts that
share one slug:

  labels/
  ├── .vin-qr-lot                                          # last issued lot
  └── QRCODE_mercurey_champs_martin_1er_cru_red_2024_lm0001.png
  pages/
  ├── organic-logo.png                                     # copied once
  └── mercurey_champs_martin_1er_cru_red_2024_lm0001.html

The QR code encodes https://<host>/<slug>.html. When ImageMagick is
installed the image gets an INGREDIENT & NUTRITION header and an energy
footer. When the page directory does not exist the page is skipped.

Run 'vin-qr vocabulary' to list accepted values and 'vin-qr gen-config' to
generate a documented vin-qr.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding the QR images and lot counter
    #[arg(long, default_value = ".", global = true)]
    artifacts: PathBuf,

    /// Directory containing vin-qr.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reserve a lot and write its QR image and product page
    Generate {
        #[command(flatten)]
        wine: WineArgs,
        /// Page directory [default: [page] output_dir]
        #[arg(long)]
        output: Option<PathBuf>,
        /// Leave the organic logo off the page
        #[arg(long)]
        no_logo: bool,
        /// Print the generation report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the lot token the next generation would use
    NextLot,
    /// Validate attributes and show the artifact names without writing
    Check {
        #[command(flatten)]
        wine: WineArgs,
    },
    /// List the accepted appellations, colors, crus and climats
    Vocabulary,
    /// Print a stock vin-qr.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            wine,
            output: page_dir,
            no_logo,
            json,
        } => {
            let config = config::load_config(&cli.config)?;
            let mut request = wine.into_request();
            request.output_dir = page_dir;
            if no_logo {
                request.organic_logo = Some(false);
            }

            let backend = imaging::select_backend(&config.annotation.tools);
            let result = if json {
                pipeline::generate(&request, &config, &cli.artifacts, backend.as_ref(), None)
            } else {
                let (tx, rx) = std::sync::mpsc::channel();
                let printer = output::EventPrinter::spawn(rx);
                let result = pipeline::generate(
                    &request,
                    &config,
                    &cli.artifacts,
                    backend.as_ref(),
                    Some(tx),
                );
                printer.finish()?;
                result
            };

            match result {
                Ok(report) if json => println!("{}", serde_json::to_string_pretty(&report)?),
                Ok(report) => output::print_generation_summary(&report),
                Err(PipelineError::Invalid(invalid)) => {
                    output::print_invalid_attributes(&invalid);
                    return Ok(ExitCode::from(EXIT_INVALID));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::NextLot => {
            println!("{}", lot::next_lot(&cli.artifacts)?);
        }
        Command::Check { wine } => {
            let config = config::load_config(&cli.config)?;
            match pipeline::preview(&wine.into_request(), &config, &cli.artifacts) {
                Ok(preview) => output::print_preview(&preview),
                Err(PipelineError::Invalid(invalid)) => {
                    output::print_invalid_attributes(&invalid);
                    return Ok(ExitCode::from(EXIT_INVALID));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Vocabulary => {
            output::print_vocabulary();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}
