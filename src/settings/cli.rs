use super::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(about = "Member signup, login, and token lifecycle")]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a member
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Authenticate and receive a token pair
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Revoke the access token and end the session
    Logout {
        #[arg(long)]
        access_token: String,
        #[arg(long)]
        refresh_token: String,
    },
    /// Rotate the refresh token and receive a new pair
    Reissue {
        #[arg(long)]
        access_token: String,
        #[arg(long)]
        refresh_token: String,
    },
    /// Resolve the principal behind an access token
    Authorize {
        #[arg(long)]
        access_token: String,
    },
    /// Read one command per line from stdin and run them in this process
    Shell,
}

/// One line of `shell` input, e.g. `login --email a@x.com --password pw`.
/// Arguments are split on whitespace; there is no quoting.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

impl ShellLine {
    pub fn parse_line(line: &str) -> Result<Self, clap::Error> {
        Self::try_parse_from(line.split_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommand_with_settings_flag() {
        let cli = Cli::try_parse_from([
            "tokenkeep",
            "--settings",
            "settings/dev.toml",
            "login",
            "--email",
            "a@x.com",
            "--password",
            "pw",
        ])
        .unwrap();

        assert_eq!(cli.settings.as_deref(), Some("settings/dev.toml"));
        assert!(matches!(cli.command, Command::Login { ref email, .. } if email == "a@x.com"));
    }

    #[test]
    fn shell_lines_parse_without_binary_name() {
        let line = ShellLine::parse_line("  reissue --access-token a.b.c   --refresh-token d.e.f ")
            .unwrap();
        assert!(matches!(
            line.command,
            Command::Reissue { ref access_token, ref refresh_token }
                if access_token == "a.b.c" && refresh_token == "d.e.f"
        ));

        assert!(ShellLine::parse_line("login --email a@x.com").is_err());
        assert!(ShellLine::parse_line("").is_err());
    }
}
