mod error;
mod lfsr;
mod matcher;
mod playlist;
mod spectrum;
mod waveform;

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info};

use self::error::Result;
use self::lfsr::{output_trace, simulate, Feedback, Register, Taps};

/// Output captured from the 8 bit generator.
const CAPTURE_DIRECT: &str = "1100100011011111010100100101001101";
/// Output captured from the 8 bit generator through an inverter.
const CAPTURE_INVERTED: &str = "01001000101001010100111011101100111101111110100110";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    Fibonacci8,
    Fibonacci16,
}

#[derive(Args, Debug)]
struct Generator {
    /// Register width in bits
    #[arg(short, long)]
    width: Option<usize>,

    /// Built in feedback taps
    #[arg(short, long, value_enum, conflicts_with = "taps")]
    preset: Option<Preset>,

    /// Comma separated tap positions to XOR, e.g. 5,4,7,3
    #[arg(short, long)]
    taps: Option<Taps>,

    /// Invert the XOR of the taps
    #[arg(short, long, requires = "taps")]
    invert: bool,
}

impl Generator {
    fn resolve(&self) -> (Taps, usize) {
        let (taps, default_width) = match (&self.taps, self.preset) {
            (Some(taps), _) => (
                taps.clone().with_invert(self.invert),
                Register::DEFAULT_WIDTH,
            ),
            (None, None | Some(Preset::Fibonacci8)) => (Taps::fibonacci8(), 8),
            (None, Some(Preset::Fibonacci16)) => (Taps::fibonacci16(), 16),
        };
        (taps, self.width.unwrap_or(default_width))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a generator and print its output trace
    Analyse {
        #[command(flatten)]
        generator: Generator,

        /// Write the power spectral density of the trace as CSV
        #[arg(long)]
        psd: Option<PathBuf>,

        /// Sample rate used for the power spectral density
        #[arg(long, default_value_t = 2e6)]
        sample_rate: f64,

        /// Voltage of a high logic level
        #[arg(long, default_value_t = spectrum::DEFAULT_VOLTS)]
        volts: f64,

        /// Print mean and variance of the logic levels
        #[arg(long)]
        stats: bool,
    },
    /// Look for a measured bit sequence in a generator's output
    Match {
        #[command(flatten)]
        generator: Generator,

        /// Bits to look for, e.g. 0110_1001
        #[arg(short, long)]
        sequence: String,

        /// The sequence was measured through an inverter
        #[arg(long)]
        inverted: bool,
    },
    /// Analyse the 8 bit generator and check the captured sequences
    Demo,
    /// Make the paths in an m3u playlist relative to the Music directory
    Playlist {
        /// Playlist path
        #[arg(short, long)]
        file: PathBuf,
    },
}

/// Shift register sequence generator analysis
#[derive(Parser, Debug)]
#[command(author, version,about, long_about=None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn analyse<F, W>(feedback: &F, width: usize, out: &mut W) -> Result<Vec<bool>>
where
    F: Feedback + Display,
    W: Write,
{
    writeln!(
        out,
        "Analysing {} Bit Sequence Generator with feedback {}",
        width, feedback
    )?;
    let trace = output_trace(&simulate(feedback, width)?);
    waveform::render_waveform(&trace, out)?;
    writeln!(out, "Length of Sequence: {}", trace.len())?;
    Ok(trace)
}

fn run<W: Write>(command: Command, out: &mut W) -> Result<ExitCode> {
    match command {
        Command::Analyse {
            generator,
            psd,
            sample_rate,
            volts,
            stats,
        } => {
            let (taps, width) = generator.resolve();
            let trace = analyse(&taps, width, out)?;
            let levels = spectrum::logic_levels(&trace, volts);

            if stats {
                if let (Some(mean), Some(variance)) = (
                    spectrum::mean_estimate(&levels),
                    spectrum::variance_estimate(&levels),
                ) {
                    writeln!(out, "Mean: {}", mean)?;
                    writeln!(out, "Variance: {}", variance)?;
                }
            }

            if let Some(path) = psd {
                let rows = spectrum::periodogram(&levels, sample_rate)?;
                let mut writer = BufWriter::new(File::create(&path)?);
                spectrum::write_psd(&rows, &mut writer)?;
                writer.flush()?;
                info!("wrote {} PSD bins to {}", rows.len(), path.display());
            }
        }
        Command::Match {
            generator,
            sequence,
            inverted,
        } => {
            let candidate = matcher::parse_bits(&sequence)?;
            let (taps, width) = generator.resolve();
            let mut trace = output_trace(&simulate(&taps, width)?);
            if inverted {
                trace.iter_mut().for_each(|b| *b = !*b);
            }
            if matcher::report_match(&candidate, &trace, out)?.is_none() {
                return Ok(ExitCode::from(1));
            }
        }
        Command::Demo => {
            let trace = analyse(&Taps::fibonacci8(), 8, out)?;

            let direct = matcher::parse_bits(CAPTURE_DIRECT)?;
            matcher::report_match(&direct, &trace, out)?;

            let inverse: Vec<bool> = trace.iter().map(|b| !b).collect();
            let through_inverter = matcher::parse_bits(CAPTURE_INVERTED)?;
            matcher::report_match(&through_inverter, &inverse, out)?;

            let reproduced = matcher::contains_subsequence(&direct, &trace)
                && matcher::contains_subsequence(&through_inverter, &inverse);
            writeln!(out, "Captures reproduced: {}", reproduced)?;
            if !reproduced {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Playlist { file } => {
            let original = playlist::rewrite_playlist(&file)?;
            writeln!(
                out,
                "Rewrote {}, original kept as {}",
                file.display(),
                original.display()
            )?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match run(cli.command, &mut out) {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
