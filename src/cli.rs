use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;

use crate::{
    aws::sts::StsTokenExchange,
    commands::{CompletionsCommand, EnvCommand, WhoamiCommand},
    constants,
    initializer::{self, InvocationOptions},
    settings::Settings,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "aws-utility", version, about = "AWS command-line utility with optional role assumption", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: InvocationOptions,

    #[arg(long, global = true, help = "Path to the settings file (default: $AWS_UTILITY_SETTINGS or ~/.config/aws-utility/settings.ini)")]
    pub settings: Option<PathBuf>,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Show the AWS identity the resolved credentials belong to")]
    Whoami(WhoamiCommand),
    #[command(about = "Print shell exports for the resolved region and credentials")]
    Env(EnvCommand),
    #[command(about = "Generate shell completion scripts for aws-utility")]
    Completions(CompletionsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let command = self.command.unwrap_or(Commands::Whoami(WhoamiCommand {}));

        if let Commands::Completions(cmd) = command {
            cmd.execute();
            return Ok(());
        }

        let settings_path = match self.settings {
            Some(path) => path,
            None => constants::get_settings_path()
                .context("Failed to determine settings file path")?,
        };
        let settings = Settings::load(&settings_path)?;

        let context = initializer::initialize(&self.options, &settings, &StsTokenExchange)
            .await
            .context("Failed to initialize AWS credentials")?;
        info!("Initialized for region: {}", context.region());
        if context.effective_credentials().is_temporary() {
            info!("Using temporary credentials from assumed role");
        }

        match command {
            Commands::Whoami(cmd) => cmd.execute(&context, &settings).await,
            Commands::Env(cmd) => {
                cmd.execute(&context);
                Ok(())
            }
            Commands::Completions(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, error::ErrorKind};
    use serial_test::serial;

    #[test]
    fn test_command_structure_validation() {
        let cmd = Cli::command();
        cmd.debug_assert();
    }

    #[test]
    fn test_no_command_defaults_to_none() {
        let cli = Cli::try_parse_from(["aws-utility"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_options_parsing() {
        let cli = Cli::try_parse_from([
            "aws-utility",
            "--region",
            "eu-west-1",
            "--awsAccessKeyId",
            "AKIAEXAMPLE",
            "--awsSecretAccessKey",
            "xyz",
            "whoami",
        ])
        .unwrap();

        assert_eq!(cli.options.region.as_deref(), Some("eu-west-1"));
        assert_eq!(cli.options.aws_access_key_id.as_deref(), Some("AKIAEXAMPLE"));
        assert_eq!(cli.options.aws_secret_access_key.as_deref(), Some("xyz"));
        assert!(cli.options.assume_role.is_none());
        assert!(matches!(cli.command, Some(Commands::Whoami(_))));
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["aws-utility", "env", "--region", "sa-east-1"]).unwrap();
        assert_eq!(cli.options.region.as_deref(), Some("sa-east-1"));
        assert!(matches!(cli.command, Some(Commands::Env(_))));
    }

    #[test]
    fn test_assume_role_flag_without_value() {
        let cli = Cli::try_parse_from([
            "aws-utility",
            "--assumeRole",
            "--assumedRoleArn",
            "arn:aws:iam::123456789012:role/Foo",
            "env",
        ])
        .unwrap();

        assert_eq!(cli.options.assume_role.as_deref(), Some(""));
        assert_eq!(
            cli.options.assumed_role_arn.as_deref(),
            Some("arn:aws:iam::123456789012:role/Foo")
        );
        assert!(matches!(cli.command, Some(Commands::Env(_))));
    }

    #[test]
    fn test_assume_role_flag_with_value_is_still_present() {
        let cli = Cli::try_parse_from(["aws-utility", "--assumeRole=false"]).unwrap();
        assert_eq!(cli.options.assume_role.as_deref(), Some("false"));
    }

    #[test]
    fn test_assume_role_flag_with_separate_value() {
        let cli = Cli::try_parse_from([
            "aws-utility",
            "whoami",
            "--assumeRole",
            "true",
            "--assumedRoleArn",
            "arn:aws:iam::123:role/Foo",
        ])
        .unwrap();

        assert_eq!(cli.options.assume_role.as_deref(), Some("true"));
        assert_eq!(
            cli.options.assumed_role_arn.as_deref(),
            Some("arn:aws:iam::123:role/Foo")
        );
        assert!(matches!(cli.command, Some(Commands::Whoami(_))));
    }

    #[test]
    fn test_external_id_parsing() {
        let cli =
            Cli::try_parse_from(["aws-utility", "--assumedRoleExternalId", "ext-1"]).unwrap();
        assert_eq!(cli.options.assumed_role_external_id.as_deref(), Some("ext-1"));
    }

    #[test]
    #[serial]
    fn test_settings_option_ignores_env() {
        let original = std::env::var(constants::SETTINGS_ENV_VAR).ok();

        unsafe {
            std::env::set_var(constants::SETTINGS_ENV_VAR, "/from/env.ini");
        }
        let cli = Cli::try_parse_from(["aws-utility"]).unwrap();
        assert_eq!(cli.settings, None);

        unsafe {
            match original {
                Some(val) => std::env::set_var(constants::SETTINGS_ENV_VAR, val),
                None => std::env::remove_var(constants::SETTINGS_ENV_VAR),
            }
        }
    }

    #[test]
    fn test_settings_option() {
        let cli = Cli::try_parse_from(["aws-utility", "--settings", "/tmp/settings.ini"]).unwrap();
        assert_eq!(cli.settings, Some(PathBuf::from("/tmp/settings.ini")));
    }

    #[test]
    fn test_completions_command_parsing() {
        let cli = Cli::try_parse_from(["aws-utility", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Completions(_))));
    }

    #[test]
    fn test_invalid_command_fails() {
        let result = Cli::try_parse_from(["aws-utility", "invalid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_flag_works() {
        let result = Cli::try_parse_from(["aws-utility", "--help"]);
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::DisplayHelp);
        }
    }

    #[test]
    fn test_verbose_flag_multiple() {
        let cli = Cli::try_parse_from(["aws-utility", "-vvv", "whoami"]).unwrap();
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_verbose_default_zero() {
        let cli = Cli::try_parse_from(["aws-utility", "whoami"]).unwrap();
        assert_eq!(cli.verbose, 0);
    }
}
