use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use wiiutex::{
    extract,
    filetype::{find_archives, InputKind},
    settings::default_output_for,
    ExtractSettings,
};
use wiiutex_tsxt::TsxtArchive;
#[macro_use]
extern crate tracing;

#[derive(Parser)]
#[command(version, about = "Extracts DDS textures from Wii U .wiiu_textures archives")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Archives or directories to extract, each next to itself
    paths: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Extract a single archive
    #[command(alias = "e")]
    Extract {
        #[arg(short, long)]
        input: PathBuf,

        /// Defaults to the input path without its extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the block data in the console's tiled order
        #[arg(long)]
        disable_deswizzle: bool,
    },

    /// Print the texture table of an archive
    #[command(alias = "l")]
    List { input: PathBuf },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Extract {
            input,
            output,
            disable_deswizzle,
        }) => {
            let settings = ExtractSettings {
                output: output.unwrap_or_else(|| default_output_for(&input)),
                input,
                detile: !disable_deswizzle,
            };
            extract(&settings)?;
        }
        Some(Command::List { input }) => list(&input)?,
        None if cli.paths.is_empty() => Cli::command().print_help()?,
        None => extract_batch(&cli.paths)?,
    }

    Ok(())
}

fn extract_batch(paths: &[PathBuf]) -> anyhow::Result<()> {
    let mut archives = vec![];
    for path in paths {
        match InputKind::guess_from_path(path) {
            Some(InputKind::Archive) => archives.push(path.clone()),
            Some(InputKind::Directory) => archives.extend(find_archives(path)?),
            None => warn!("Skipping {}, not a .wiiu_textures file", path.display()),
        }
    }

    let mut failed = 0;
    for archive in &archives {
        if let Err(e) = extract(&ExtractSettings::new(archive)) {
            error!("{e:?}");
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} archives failed to extract", archives.len());
    }

    Ok(())
}

fn list(input: &Path) -> anyhow::Result<()> {
    let file =
        File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let archive = TsxtArchive::parse(&mut BufReader::new(file))
        .with_context(|| format!("Failed to read texture table of {}", input.display()))?;

    println!(
        "{} - version {:?}, {} textures",
        input.display(),
        archive.version,
        archive.records.len()
    );
    for (index, record) in archive.records.iter().enumerate() {
        let name = if record.is_external() {
            format!("{} (external)", record.path)
        } else {
            record.name.clone()
        };

        print!("{index:>4} {:<10} {name}", format!("{:?}", record.kind));
        if let Some(mips) = record.mipmap_hint() {
            print!(" mips={mips}");
        }
        match record.object_id() {
            Some(id) if !id.is_empty() => println!(" object={id}"),
            _ => println!(),
        }
    }

    Ok(())
}
