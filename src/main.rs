use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use nuswitch::usecase::{workspace_file_path, Solution, WorkspaceDocument};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the NuGet package ids referenced across the solution
    Packages { solution: PathBuf },
    /// Show the recorded local library selections per package
    Status { solution: PathBuf },
    /// Record local libraries to substitute for a package
    Select {
        solution: PathBuf,
        package: String,
        #[arg(required = true)]
        libraries: Vec<PathBuf>,
    },
    /// Drop recorded local libraries for a package
    Unselect {
        solution: PathBuf,
        package: String,
        #[arg(required = true)]
        libraries: Vec<PathBuf>,
    },
    /// Replace package references with file references to the recorded libraries
    Switch { solution: PathBuf },
    /// Delete the obj folder beside every project file
    Clean { solution: PathBuf },
}

#[tokio::main]
async fn main() {
    //logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args.command).await {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Packages { solution } => {
            let solution = open_solution(&solution)?;
            for id in solution.package_ids() {
                println!("{id}");
            }
        }
        Command::Status { solution } => {
            let solution = open_solution(&solution)?;
            let document = load_document(&solution)?;
            for id in solution.package_ids() {
                println!("{id}");
                for library in document.selections(id) {
                    println!("\t{library}");
                }
            }
        }
        Command::Select {
            solution,
            package,
            libraries,
        } => {
            let solution = open_solution(&solution)?;
            let mut document = load_document(&solution)?;
            document.add_local_references(&package, &absolute_paths(&libraries)?)?;
            persist(&solution, &document)?;
        }
        Command::Unselect {
            solution,
            package,
            libraries,
        } => {
            let solution = open_solution(&solution)?;
            let mut document = load_document(&solution)?;
            document.remove_libraries(&package, &absolute_paths(&libraries)?)?;
            persist(&solution, &document)?;
        }
        Command::Switch { solution } => {
            let solution = open_solution(&solution)?;
            let document = load_document(&solution)?;
            if !document.has_any_selections() {
                println!("No libraries selected; nothing to switch.");
                return Ok(());
            }
            for line in solution.switch(&document).await? {
                println!("{line}");
            }
        }
        Command::Clean { solution } => {
            let solution = open_solution(&solution)?;
            for line in solution.delete_obj_folders().await? {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn open_solution(path: &Path) -> anyhow::Result<Solution> {
    let mut solution = Solution::new(path)?;
    solution
        .load()
        .with_context(|| format!("failed to load solution {}", path.display()))?;
    Ok(solution)
}

fn load_document(solution: &Solution) -> nuswitch::Result<WorkspaceDocument> {
    WorkspaceDocument::load(&workspace_file_path(solution.file_path()))
}

fn persist(solution: &Solution, document: &WorkspaceDocument) -> nuswitch::Result<()> {
    if document.is_dirty() {
        document.save(&workspace_file_path(solution.file_path()))?;
    }
    Ok(())
}

fn absolute_paths(paths: &[PathBuf]) -> anyhow::Result<Vec<String>> {
    paths
        .iter()
        .map(|path| {
            std::path::absolute(path)
                .map(|abs| abs.to_string_lossy().into_owned())
                .with_context(|| format!("cannot resolve {}", path.display()))
        })
        .collect()
}
