use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::{Parser, ValueEnum};

use pdfcairo::{
    CairoImageOutputDev, CairoOutputDev, DeviceConfig, ErrorReporter, ImageFilter, Replayer,
    Session, Severity, ToyFontEngine, Trace,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Filter {
    Fast,
    Good,
    Best,
    Nearest,
    Bilinear,
}

impl From<Filter> for ImageFilter {
    fn from(f: Filter) -> ImageFilter {
        match f {
            Filter::Fast => ImageFilter::Fast,
            Filter::Good => ImageFilter::Good,
            Filter::Best => ImageFilter::Best,
            Filter::Nearest => ImageFilter::Nearest,
            Filter::Bilinear => ImageFilter::Bilinear,
        }
    }
}

/// Replays a JSON trace of drawing operations with the Cairo backend.
#[derive(Parser, Debug)]
#[command(name = "pdfcairo-replay", version, about)]
struct Args {
    /// Trace to replay; "-" reads standard input
    input: PathBuf,

    /// PNG file to write the page to, or directory for --extract-images
    #[arg(short, long)]
    output: PathBuf,

    /// Write every image of the page to its own PNG instead of rendering the page
    #[arg(long)]
    extract_images: bool,

    /// Let Cairo scale down stencil masks instead of box-filtering them first
    #[arg(long)]
    no_prescale: bool,

    /// Filter for scaled images
    #[arg(long, value_enum, default_value_t = Filter::Bilinear)]
    image_filter: Filter,

    /// Print the problems that were skipped over while rendering
    #[arg(short, long)]
    verbose: bool,
}

struct StderrReporter;

impl ErrorReporter for StderrReporter {
    fn report(&self, severity: Severity, message: &str) {
        eprintln!("{severity}: {message}");
    }
}

fn read_trace(path: &Path) -> Result<Trace> {
    let json = if path == Path::new("-") {
        let mut s = String::new();
        io::stdin()
            .read_to_string(&mut s)
            .context("could not read standard input")?;
        s
    } else {
        fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))?
    };

    Ok(Trace::from_json(&json)?)
}

fn write_png(surface: &cairo::ImageSurface, path: &Path) -> Result<()> {
    let mut file =
        fs::File::create(path).with_context(|| format!("could not create {}", path.display()))?;

    surface
        .write_to_png(&mut file)
        .with_context(|| format!("could not write {}", path.display()))?;

    Ok(())
}

fn render_page(args: &Args, trace: &Trace, config: DeviceConfig) -> Result<()> {
    if trace.width == 0 || trace.height == 0 {
        bail!("the page has no area");
    }

    let surface = cairo::ImageSurface::create(
        cairo::Format::ARgb32,
        i32::try_from(trace.width)?,
        i32::try_from(trace.height)?,
    )?;

    {
        let cr = cairo::Context::new(&surface)?;

        if let Some([r, g, b]) = trace.background {
            cr.set_source_rgb(r, g, b);
            cr.paint()?;
        }

        let mut dev = CairoOutputDev::new(Session::new(), config, Box::new(ToyFontEngine::new()));
        if args.verbose {
            dev = dev.with_error_reporter(Box::new(StderrReporter));
        }

        dev.set_cairo(Some(cr));
        Replayer::new(&mut dev).replay(trace)?;
        dev.set_cairo(None);
    }

    write_png(&surface, &args.output)
}

fn extract_images(args: &Args, trace: &Trace, config: DeviceConfig) -> Result<()> {
    let mut dev = CairoImageOutputDev::new(Session::new(), config);
    if args.verbose {
        dev = dev.with_error_reporter(Box::new(StderrReporter));
    }

    Replayer::new(&mut dev).replay(trace)?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("could not create {}", args.output.display()))?;

    for (i, image) in dev.take_images().into_iter().enumerate() {
        let (x1, y1, x2, y2) = image.rect();
        let path = args.output.join(format!("image-{i:03}.png"));

        write_png(image.surface(), &path)?;
        println!("{}: {}x{} at ({x1}, {y1}) - ({x2}, {y2})", path.display(), image.width(), image.height());
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let trace = read_trace(&args.input)?;

    let config = DeviceConfig {
        prescale_images: !args.no_prescale,
        image_filter: args.image_filter.into(),
        ..DeviceConfig::default()
    };

    if args.extract_images {
        extract_images(&args, &trace, config)
    } else {
        render_page(&args, &trace, config)
    }
}
