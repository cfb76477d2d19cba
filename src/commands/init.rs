use clap::{Command, ValueEnum};
use clap_complete::{Shell as CompleteShell, generate};
use std::io;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

/// Prints the shell integration for `shell`
pub fn generate_shell_integration(shell: Shell) {
    print!("{}", shell_integration(shell));
}

/// Generate native shell completions using clap
pub fn generate_completions(shell: Shell, cmd: &mut Command) {
    let clap_shell = match shell {
        Shell::Bash => CompleteShell::Bash,
        Shell::Zsh => CompleteShell::Zsh,
        Shell::Fish => CompleteShell::Fish,
    };

    generate(
        clap_shell,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}

/// A `gtr` shell function: `gtr cd <id>` changes directory into a worktree
/// (a child process can't), everything else goes to `git gtr`.
#[must_use]
pub fn shell_integration(shell: Shell) -> &'static str {
    match shell {
        Shell::Bash | Shell::Zsh => POSIX_INTEGRATION,
        Shell::Fish => FISH_INTEGRATION,
    }
}

const POSIX_INTEGRATION: &str = r#"# gtr shell integration
# Add to your shell rc file:  eval "$(git gtr init bash)"   (or zsh)

gtr() {
    if [ "$1" = "cd" ]; then
        shift
        local dir
        dir="$(git gtr go "$@")" || return $?
        [ -n "$dir" ] && cd "$dir"
    else
        git gtr "$@"
    fi
}
"#;

const FISH_INTEGRATION: &str = r#"# gtr shell integration
# Add to ~/.config/fish/config.fish:  git gtr init fish | source

function gtr
    if test "$argv[1]" = cd
        set -l dir (git gtr go $argv[2..-1]); or return $status
        test -n "$dir"; and cd $dir
    else
        git gtr $argv
    end
end
"#;
