use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "burn-severity")]
#[command(about = "Fire severity indices from pre- and post-fire imagery")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the available indices with their dependencies
    Indices,

    /// Compute burn indices for one fire event
    Analyze {
        /// Name of the fire event
        #[arg(short = 'f', long)]
        fire_event: String,

        /// Prefire spectral raster (JSON)
        #[arg(long)]
        prefire: PathBuf,

        /// Postfire spectral raster (JSON)
        #[arg(long)]
        postfire: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Indices to compute (default: nbr,dnbr,rdnbr,rbr)
        #[arg(short = 'i', long = "index", value_delimiter = ',')]
        indices: Vec<String>,

        /// Band identifier of the NIR band
        #[arg(long, default_value = "nir")]
        nir: String,

        /// Band identifier of the SWIR band
        #[arg(long, default_value = "swir22")]
        swir: String,

        /// Severity class breaks (default: 0.1,0.27,0.66)
        #[arg(long, value_delimiter = ',')]
        breaks: Vec<f64>,
    },

    /// Run the analyses listed in a JSON batch file
    Batch {
        /// Batch configuration file
        config: PathBuf,
    },
}
