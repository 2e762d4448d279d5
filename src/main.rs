use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use testdrive_sprites::containers::arc::ArcArchive;
use testdrive_sprites::extractor::{extract_files, find_sprite_files, save_png, ExtractOptions};
use testdrive_sprites::graphics::{composite_screen, read_descriptor};
use testdrive_sprites::{Container, Result, SpriteName, TableOfContents};

/// Extract sprites from the packed .CMP (CGA) and .EMP (EGA) sprite files
#[derive(Parser)]
#[command(name = "tdsprites")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every sprite of every container in the input directories as PNG
    Extract {
        /// Directories scanned (not recursively) for .CMP and .EMP files
        #[arg(default_values = ["testdrive", "arcfiles"])]
        inputs: Vec<PathBuf>,

        #[arg(short, long, default_value = "sprites")]
        output: PathBuf,

        /// Recompress written PNGs with oxipng
        #[arg(long)]
        optimise: bool,

        /// Skip renamed duplicates (car_2, ...) identical to the sprite already written as car
        #[arg(long)]
        skip_duplicates: bool,

        /// Do not write the per-file JSON placement manifest
        #[arg(long)]
        no_manifest: bool,
    },

    /// Print the table of contents and sprite headers of a container
    List { file: PathBuf },

    /// Composite sprites onto a 320x200 screen, in the given order
    Screen {
        file: PathBuf,

        /// Sprite names; later sprites are drawn over earlier ones
        #[arg(required = true)]
        sprites: Vec<String>,

        #[arg(short, long, default_value = "screen.png")]
        output: PathBuf,
    },

    /// Write the unpacked contents of a container
    Dump {
        file: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Repackage .PES files into an ARC archive of .EMP members
    PackArc {
        #[arg(short, long, default_value = "testdrive")]
        input: PathBuf,

        #[arg(short, long, default_value = "arcfiles/TESTDRIVE.ARC")]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Extract {
            inputs,
            output,
            optimise,
            skip_duplicates,
            no_manifest,
        } => {
            let options = ExtractOptions {
                output_dir: output,
                optimise_png: optimise,
                skip_duplicates,
                write_manifest: !no_manifest,
            };

            let files = find_sprite_files(&inputs);
            info!("Found {} sprite files", files.len());

            let report = extract_files(&files, &options);
            for (path, e) in report.failed() {
                error!("{}: {}", path.display(), e);
            }
            info!(
                "Processing complete: {} sprites from {} files, {} files failed",
                report.sprites_written(),
                report.succeeded().count(),
                report.failed().count()
            );

            Ok(if report.has_failures() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::List { file } => {
            let container = Container::open(&file)?;
            let toc = TableOfContents::parse(&container)?;
            let color_space = container.color_space();

            println!(
                "{}: {:?}, {} bytes unpacked, {} sprites",
                file.display(),
                color_space,
                container.unpacked_length(),
                toc.len()
            );
            for entry in &toc {
                let d = read_descriptor(&container, &toc, &entry.name)?;
                println!(
                    "{:<8} offset {:>6}  {:>3}x{:<3} at ({:>3}, {:>3})  layer {:08x}  [{}]",
                    entry.name.to_string(),
                    entry.offset,
                    d.pixel_width(color_space),
                    d.height,
                    d.pos_x,
                    d.pos_y,
                    d.layer_info,
                    d.reserved_hex()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Screen {
            file,
            sprites,
            output,
        } => {
            let container = Container::open(&file)?;
            let toc = TableOfContents::parse(&container)?;
            let names = sprites
                .iter()
                .map(|s| s.parse::<SpriteName>())
                .collect::<Result<Vec<_>>>()?;

            let screen = composite_screen(&container, &toc, &names)?;
            save_png(&screen, &output, false)?;
            info!("Saved screen to {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Dump { file, output } => {
            let container = Container::open(&file)?;
            info!(
                "Dumping {} bytes to {}",
                container.unpacked_length(),
                output.display()
            );
            container.dump(&output)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::PackArc { input, output } => {
            let archive = ArcArchive::from_pes_dir(&input)?;
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output, archive.to_bytes())?;
            info!("Wrote {} members to {}", archive.len(), output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}
