use tokenkeep::application_port::*;
use tokenkeep::domain_model::{AccessToken, RefreshToken};
use tokenkeep::logger::*;
use tokenkeep::server::*;
use tokenkeep::settings::*;
use serde::Serialize;
use std::process::ExitCode;
use tokio::io;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let server = Server::try_new(&project_settings).await?;
    let code = match cli.command {
        Command::Shell => shell(&server).await?,
        command => {
            if server.is_ephemeral() {
                warn!(
                    "memory backends do not outlive this process; \
                     members and sessions are gone once it exits, use `shell` to chain commands"
                );
            }
            report(run(&server, command).await)
        }
    };
    server.shutdown().await;

    Ok(code)
}

fn report(outcome: Result<String, AuthError>) -> ExitCode {
    match outcome {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error {}: {}", e.status_code(), e);
            ExitCode::FAILURE
        }
    }
}

/// Runs stdin line by line against one service graph, so a session started
/// by `login` can be reissued or ended by later lines.
async fn shell(server: &Server) -> anyhow::Result<ExitCode> {
    let mut reader = BufReader::new(io::stdin()).lines();
    let mut code = ExitCode::SUCCESS;

    while let Some(line) = reader.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let command = match ShellLine::parse_line(line) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                eprintln!("{}", e);
                code = ExitCode::FAILURE;
                continue;
            }
        };
        let outcome = run(server, command).await;
        if outcome.is_err() {
            code = ExitCode::FAILURE;
        }
        report(outcome);
    }

    Ok(code)
}

async fn run(server: &Server, command: Command) -> Result<String, AuthError> {
    let auth = &server.auth_service;
    match command {
        Command::Signup {
            email,
            password,
            name,
        } => {
            let member_id = auth
                .signup(SignupInput {
                    email,
                    password,
                    name,
                })
                .await?;
            to_json(&serde_json::json!({ "member_id": member_id }))
        }
        Command::Login { email, password } => {
            to_json(&auth.login(LoginInput { email, password }).await?)
        }
        Command::Logout {
            access_token,
            refresh_token,
        } => to_json(&auth.logout(token_request(access_token, refresh_token)).await?),
        Command::Reissue {
            access_token,
            refresh_token,
        } => to_json(&auth.reissue(token_request(access_token, refresh_token)).await?),
        Command::Authorize { access_token } => {
            to_json(&auth.authorize(&AccessToken(access_token)).await?)
        }
        Command::Shell => Err(AuthError::InvalidInput("shell cannot be nested".to_string())),
    }
}

fn token_request(access_token: String, refresh_token: String) -> TokenRequest {
    TokenRequest {
        access_token: AccessToken(access_token),
        refresh_token: RefreshToken(refresh_token),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AuthError> {
    serde_json::to_string_pretty(value).map_err(|e| AuthError::InternalError(e.to_string()))
}
