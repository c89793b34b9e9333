use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use migration_diff::{DEFAULT_CONTEXT_LINES, MigrationDiff, subtract_files};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "migration-diff")]
#[command(about = "Per-feature migration diffs between two scaffold versions")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff every target between two scaffold roots and write <target>.diff files
    Generate {
        /// Scaffold output of the older version
        #[arg(long)]
        from: PathBuf,
        /// Scaffold output of the newer version
        #[arg(long)]
        to: PathBuf,
        /// Directory for the .diff files
        #[arg(short, long, default_value = "migration")]
        output: PathBuf,
        /// Target to diff (repeatable, defaults to all scaffold targets)
        #[arg(short, long = "target")]
        targets: Vec<String>,
        /// Extra glob of paths to ignore (repeatable)
        #[arg(short, long = "ignore")]
        ignores: Vec<String>,
        /// Do not apply the built-in ignore globs
        #[arg(long)]
        no_default_ignores: bool,
        /// Context lines around each change
        #[arg(short = 'U', long, default_value_t = DEFAULT_CONTEXT_LINES)]
        context: usize,
    },
    /// Remove the changes of BASE from DIFF and print the residual diff
    Subtract {
        /// Diff file to reduce
        diff: PathBuf,
        /// Diff file whose changes are removed
        base: PathBuf,
    },
    /// Print a shell completion script
    Completions {
        shell: Shell,
    },
    /// Print the man page
    Man,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            from,
            to,
            output,
            targets,
            ignores,
            no_default_ignores,
            context,
        } => {
            let mut run = MigrationDiff::new(&from, &to).context_lines(context);
            if no_default_ignores {
                run = run.ignore_globs(Vec::<String>::new());
            }
            run = run.extra_ignores(ignores);
            if !targets.is_empty() {
                run = run.targets(targets);
            }

            for path in run.generate(&output)? {
                println!("{}", path.display());
            }
        }
        Commands::Subtract { diff, base } => {
            print!("{}", subtract_files(&diff, &base)?);
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "migration-diff", &mut io::stdout());
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command()).render(&mut io::stdout())?;
        }
    }

    Ok(())
}
