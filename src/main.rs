use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueHint};
use std::process::ExitCode;

use gtr::Result;
use gtr::commands::init::Shell;
use gtr::config::ConfigKey;
use gtr::commands::{
    adapter, ai, clamp_exit_code, clean, config, current_manager, doctor, editor, go, init, list,
    new, remove, run,
};
use gtr::error::{EXIT_FAILURE, exit_code_for};
use gtr::prompt::confirmer;
use gtr::worktree::{CreateOptions, RemoveOptions, TrackMode};

#[derive(Parser)]
#[command(name = "git-gtr", bin_name = "git gtr")]
#[command(about = "Manage git worktrees: create, jump, run, open and clean up")]
#[command(version)]
pub struct Cli {
    /// More diagnostic output on stderr (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a worktree for a branch
    New {
        /// Branch to check out (created if needed)
        #[arg(value_hint = ValueHint::Other)]
        branch: String,
        /// Folder name to use instead of the one derived from the branch
        #[arg(long, value_hint = ValueHint::Other)]
        folder: Option<String>,
        /// Suffix appended to the folder name (for a second worktree of a branch)
        #[arg(long, value_hint = ValueHint::Other)]
        name: Option<String>,
        /// Ref new branches start from
        #[arg(long, conflicts_with = "from_current", value_hint = ValueHint::Other)]
        from: Option<String>,
        /// Start new branches from the current branch
        #[arg(long)]
        from_current: bool,
        /// How to find or create the branch
        #[arg(long, value_enum, default_value_t = TrackMode::Auto)]
        track: TrackMode,
        /// Don't copy files from the main checkout
        #[arg(long)]
        no_copy: bool,
        /// Don't fetch from origin first
        #[arg(long)]
        no_fetch: bool,
        /// Allow a branch that is already checked out elsewhere
        #[arg(long)]
        force: bool,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the path of a worktree (`1` is the main checkout)
    Go {
        #[arg(value_hint = ValueHint::Other)]
        id: String,
    },
    /// Run a command inside a worktree
    Run {
        #[arg(value_hint = ValueHint::Other)]
        id: String,
        /// Command and its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Remove one or more worktrees
    #[command(visible_alias = "remove")]
    Rm {
        #[arg(required = true, value_hint = ValueHint::Other)]
        ids: Vec<String>,
        /// Delete the branches too
        #[arg(long)]
        delete_branch: bool,
        /// Remove even with local changes or failing preRemove hooks
        #[arg(long)]
        force: bool,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// List worktrees
    #[command(visible_alias = "ls")]
    List {
        /// Machine-readable output: path<TAB>branch<TAB>status
        #[arg(long)]
        porcelain: bool,
    },
    /// Remove stale worktrees and empty directories
    Clean {
        /// Only show what would be removed
        #[arg(long)]
        dry_run: bool,
        /// Also remove worktrees with local changes
        #[arg(long)]
        force: bool,
        /// Also remove worktrees whose branch is merged into the default branch
        #[arg(long)]
        merged: bool,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Open a worktree in an editor
    Editor {
        #[arg(value_hint = ValueHint::Other)]
        id: String,
        /// Editor to use instead of gtr.editor.default
        #[arg(long, value_hint = ValueHint::Other)]
        editor: Option<String>,
    },
    /// Start an AI coding tool in a worktree
    Ai {
        #[arg(value_hint = ValueHint::Other)]
        id: String,
        /// AI tool to use instead of gtr.ai.default
        #[arg(long, value_hint = ValueHint::Other)]
        ai: Option<String>,
        /// Arguments passed to the tool (after `--`)
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// List built-in editor and AI adapters
    Adapter,
    /// Check the setup
    Doctor,
    /// Read and write gtr settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell integration (adds `gtr cd <id>`)
    Init {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Print the version
    Version,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print a value (exits 1 when unset)
    Get {
        key: String,
        #[arg(long)]
        global: bool,
    },
    /// Replace every value of a key
    Set {
        key: String,
        value: String,
        #[arg(long)]
        global: bool,
    },
    /// Append a value to a multi-valued key
    Add {
        key: String,
        value: String,
        #[arg(long)]
        global: bool,
    },
    /// Remove every value of a key
    Unset {
        key: String,
        #[arg(long)]
        global: bool,
    },
    /// Print all values that are set
    List {
        #[arg(long)]
        global: bool,
        /// Print the recognised keys instead
        #[arg(long)]
        keys: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    gtr::logging::init(cli.verbose);

    match dispatch(cli.command) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn dispatch(command: Commands) -> Result<u8> {
    match command {
        Commands::New {
            branch,
            folder,
            name,
            from,
            from_current,
            track,
            no_copy,
            no_fetch,
            force,
            yes,
        } => {
            let manager = current_manager()?;
            let opts = CreateOptions {
                folder,
                name,
                from,
                from_current,
                track,
                no_copy,
                no_fetch,
                force,
            };
            new::create_worktree(&manager, &branch, &opts, confirmer(yes).as_ref())?;
        }
        Commands::Go { id } => {
            go::print_worktree_path(&current_manager()?, &id)?;
        }
        Commands::Run { id, command } => {
            let code = run::run_in_worktree(&current_manager()?, &id, &command)?;
            return Ok(clamp_exit_code(code));
        }
        Commands::Rm {
            ids,
            delete_branch,
            force,
            yes,
        } => {
            let opts = RemoveOptions {
                delete_branch,
                force,
            };
            remove::remove_worktrees(&current_manager()?, &ids, &opts, confirmer(yes).as_ref())?;
        }
        Commands::List { porcelain } => {
            list::list_worktrees(&current_manager()?, porcelain)?;
        }
        Commands::Clean {
            dry_run,
            force,
            merged,
            yes,
        } => {
            let args = clean::CleanArgs {
                dry_run,
                force,
                merged,
            };
            clean::clean_worktrees(&current_manager()?, args, confirmer(yes).as_ref())?;
        }
        Commands::Editor { id, editor } => {
            editor::open_in_editor(&current_manager()?, &id, editor.as_deref())?;
        }
        Commands::Ai { id, ai, args } => {
            let code = ai::start_ai(&current_manager()?, &id, ai.as_deref(), &args)?;
            return Ok(clamp_exit_code(code));
        }
        Commands::Adapter => adapter::list_adapters(),
        Commands::Doctor => {
            let cwd = std::env::current_dir()?;
            doctor::run_doctor(&cwd);
        }
        Commands::Config { action } => return run_config(action),
        Commands::Init { shell } => init::generate_shell_integration(shell),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            init::generate_completions(shell, &mut cmd);
        }
        Commands::Version => println!("gtr {}", env!("CARGO_PKG_VERSION")),
    }

    Ok(0)
}

fn run_config(action: ConfigAction) -> Result<u8> {
    match action {
        ConfigAction::List { keys: true, .. } => config::list_keys(),
        ConfigAction::List { global, .. } => config::list(&config::open_store(global)?, global)?,
        ConfigAction::Get { key, global } => {
            let key = ConfigKey::parse(&key)?;
            if !config::get(&config::open_store(global)?, key, global)? {
                return Ok(EXIT_FAILURE);
            }
        }
        ConfigAction::Set { key, value, global } => {
            let key = ConfigKey::parse(&key)?;
            config::set(&mut config::open_store(global)?, key, &value, global)?;
        }
        ConfigAction::Add { key, value, global } => {
            let key = ConfigKey::parse(&key)?;
            config::add(&mut config::open_store(global)?, key, &value, global)?;
        }
        ConfigAction::Unset { key, global } => {
            let key = ConfigKey::parse(&key)?;
            config::unset(&mut config::open_store(global)?, key, global)?;
        }
    }
    Ok(0)
}
