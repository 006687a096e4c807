//! Home-directory init launcher CLI

use clap::{Parser, Subcommand};
use console::style;
use env_logger::{Builder, Env};
use initjail::{utils, Launcher, LauncherBuilder};
use log::{Level, LevelFilter};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "initjail-ctl")]
#[command(version, about = "Run a home directory's init program as its owner", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Run /srv/homes/alice/init as the owner of /srv/homes/alice
    initjail-ctl run /srv/homes/alice init

    # Use a helper installed somewhere else
    initjail-ctl run --helper /usr/libexec/initjail-helper /srv/homes/alice init

    # Check the deployment
    initjail-ctl check
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the privilege-dropping helper (defaults to initjail-helper
    /// next to this executable)
    #[arg(long, value_name = "PATH", global = true)]
    helper: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a home/init pair and run the init program
    Run {
        /// Home directory whose owner the init program runs as
        home: PathBuf,

        /// Init program path, relative to the home directory
        init: PathBuf,
    },

    /// Check launcher requirements
    Check,
}

fn main() {
    let cli = Cli::parse();

    init_logger(cli.verbose);

    let launcher = match build_launcher(cli.helper) {
        Ok(launcher) => launcher,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Run { home, init } => match launcher.launch(&home, &init) {
            Ok(status) => {
                let code = status.exit_code();
                let code_styled = if status.success() {
                    style(code).green().bold()
                } else {
                    style(code).red().bold()
                };
                eprintln!(
                    "{}={} | {}={}",
                    style("exit_code").dim(),
                    code_styled,
                    style("status").dim(),
                    status.describe()
                );
                std::process::exit(code);
            }
            Err(e) => {
                eprintln!("{} {}", style("error:").red().bold(), e);
                std::process::exit(1);
            }
        },
        Commands::Check => check_requirements(&launcher),
    }
}

fn build_launcher(helper: Option<PathBuf>) -> initjail::Result<Launcher> {
    let mut builder = LauncherBuilder::new();
    if let Some(path) = helper {
        builder = builder.helper_path(path);
    }
    builder.build()
}

/// Initialize logger based on verbose flag
fn init_logger(verbose: bool) {
    let env = Env::default().filter_or("RUST_LOG", if verbose { "debug" } else { "warn" });

    Builder::from_env(env)
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => format!("{}", style("ERROR").red().bold()),
                Level::Warn => format!("{}", style("WARN ").yellow().bold()),
                Level::Info => format!("{}", style("INFO ").green()),
                Level::Debug => format!("{}", style("DEBUG").cyan()),
                Level::Trace => format!("{}", style("TRACE").dim()),
            };
            writeln!(buf, "{} {}", level, record.args())
        })
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .init();
}

fn check_requirements(launcher: &Launcher) {
    println!("[*] Checking launcher requirements...");
    println!();

    if utils::is_root() {
        println!("[✓] Running as root");
    } else {
        println!("[✗] NOT running as root (helper cannot drop privileges)");
    }

    let helper = launcher.helper_path();
    if utils::is_executable(helper) {
        println!("[✓] Helper found at {}", helper.display());
    } else {
        println!("[✗] Helper missing or not executable: {}", helper.display());
    }

    println!("    UID: {}", utils::get_uid());
    println!("    GID: {}", utils::get_gid());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_launcher_uses_explicit_helper() {
        let launcher = build_launcher(Some(PathBuf::from("/opt/helper"))).unwrap();
        assert_eq!(launcher.helper_path(), std::path::Path::new("/opt/helper"));
    }

    #[test]
    fn build_launcher_resolves_default_helper() {
        let launcher = build_launcher(None).unwrap();
        assert!(launcher.helper_path().ends_with("initjail-helper"));
    }

    #[test]
    fn check_requirements_runs() {
        let launcher = build_launcher(Some(PathBuf::from("/opt/helper"))).unwrap();
        check_requirements(&launcher);
    }
}
