//! Shell completions command

use clap::CommandFactory;

use crate::cli::CompletionsArgs;
use crate::error::Result;

/// Generate shell completions
pub fn run(args: CompletionsArgs) -> Result<i32> {
    let shell_name = args.shell.to_lowercase();
    let shell = match shell_name.as_str() {
        "bash" => clap_complete::Shell::Bash,
        "elvish" => clap_complete::Shell::Elvish,
        "fish" => clap_complete::Shell::Fish,
        "powershell" | "pwsh" => clap_complete::Shell::PowerShell,
        "zsh" => clap_complete::Shell::Zsh,
        _ => {
            eprintln!("Unknown shell: {}", args.shell);
            eprintln!("Supported shells: bash, elvish, fish, powershell, zsh");
            return Ok(1);
        }
    };

    let mut cmd = <crate::cli::Cli as CommandFactory>::command();
    clap_complete::generate(shell, &mut cmd, "monoship", &mut std::io::stdout().lock());

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_bash() {
        let args = CompletionsArgs {
            shell: "bash".to_string(),
        };
        assert_eq!(run(args).unwrap_or(1), 0);
    }

    #[test]
    fn test_completions_zsh() {
        let args = CompletionsArgs {
            shell: "zsh".to_string(),
        };
        assert_eq!(run(args).unwrap_or(1), 0);
    }

    #[test]
    fn test_completions_mixed_case() {
        let args = CompletionsArgs {
            shell: "Fish".to_string(),
        };
        assert_eq!(run(args).unwrap_or(1), 0);
    }

    #[test]
    fn test_completions_unknown_shell() {
        let args = CompletionsArgs {
            shell: "tcsh".to_string(),
        };
        assert_eq!(run(args).unwrap_or(0), 1);
    }
}
