// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod draft;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use draft::Draft;
use liftcrm_app::{LookupId, LookupKind};
use liftcrm_client::Client;
use runtime::Runtime;
use std::env;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `liftcrm --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    init_logging(config.log_level())?;

    let client = Client::new(
        config.base_url(),
        config.csrf_token().as_deref(),
        config.timeout()?,
    )
    .with_context(|| {
        format!(
            "invalid [server] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;

    if options.check_only {
        let count = client.ping()?;
        tracing::info!(base_url = client.base_url(), customers = count, "server reachable");
        return Ok(());
    }

    let Some(command) = options.command else {
        print_help();
        return Ok(());
    };

    let stdout = io::stdout();
    let mut runtime = Runtime::new(
        &client,
        config.submit_url(),
        config.home_url(),
        stdout.lock(),
    );
    match command {
        Command::List { kind } => runtime.list(kind),
        Command::Add { kind, label } => runtime.add(kind, &label).map(drop),
        Command::Rename { kind, id, label } => runtime.rename(kind, id, &label).map(drop),
        Command::Delete { kind, id, assume_yes } => runtime
            .delete(kind, id, assume_yes, &mut io::stdin().lock())
            .map(drop),
        Command::Submit { draft, edit } => {
            let draft = Draft::load(&draft)?;
            runtime.submit(&draft, edit).map(drop)
        }
        Command::LoadKg { passengers } => runtime.load_kg(&passengers),
        Command::EndDate { start } => runtime.end_date(&start),
    }
}

/// `RUST_LOG` wins over `[log].level`. Output goes to stderr.
fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level {level:?}"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow!("initialize logging: {error}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List { kind: LookupKind },
    Add { kind: LookupKind, label: String },
    Rename { kind: LookupKind, id: LookupId, label: String },
    Delete { kind: LookupKind, id: LookupId, assume_yes: bool },
    Submit { draft: PathBuf, edit: bool },
    LoadKg { passengers: String },
    EndDate { start: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    command: Option<Command>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
        command: None,
    };
    let mut positional = Vec::new();
    let mut assume_yes = false;
    let mut edit = false;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            "--yes" | "-y" => {
                assume_yes = true;
            }
            "--edit" => {
                edit = true;
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                bail!("unknown argument {flag:?}; run with --help to see supported options");
            }
            value => positional.push(value.to_owned()),
        }
    }

    if positional.is_empty() {
        if assume_yes || edit {
            bail!("--yes and --edit need a command; run with --help to see usage");
        }
        return Ok(options);
    }
    let command = parse_command(&positional, assume_yes, edit)?;
    options.command = Some(command);
    Ok(options)
}

fn parse_command(args: &[String], assume_yes: bool, edit: bool) -> Result<Command> {
    let (name, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("missing command"))?;
    let expect = |count: usize, usage: &str| -> Result<()> {
        if rest.len() != count {
            bail!("usage: liftcrm {usage}");
        }
        Ok(())
    };
    if assume_yes && name != "delete" {
        bail!("--yes only applies to `delete`");
    }
    if edit && name != "submit" {
        bail!("--edit only applies to `submit`");
    }

    let command = match name.as_str() {
        "list" => {
            expect(1, "list <customers|amc-types|items>")?;
            Command::List {
                kind: parse_kind(&rest[0])?,
            }
        }
        "add" => {
            expect(2, "add <customers|amc-types> <label>")?;
            Command::Add {
                kind: parse_kind(&rest[0])?,
                label: rest[1].clone(),
            }
        }
        "rename" => {
            expect(3, "rename <customers|amc-types> <id> <label>")?;
            Command::Rename {
                kind: parse_kind(&rest[0])?,
                id: parse_id(&rest[1])?,
                label: rest[2].clone(),
            }
        }
        "delete" => {
            expect(2, "delete <customers|amc-types> <id> [--yes]")?;
            Command::Delete {
                kind: parse_kind(&rest[0])?,
                id: parse_id(&rest[1])?,
                assume_yes,
            }
        }
        "submit" => {
            expect(1, "submit <draft.toml> [--edit]")?;
            Command::Submit {
                draft: PathBuf::from(&rest[0]),
                edit,
            }
        }
        "load-kg" => {
            expect(1, "load-kg <passengers>")?;
            Command::LoadKg {
                passengers: rest[0].clone(),
            }
        }
        "end-date" => {
            expect(1, "end-date <YYYY-MM-DD>")?;
            Command::EndDate {
                start: rest[0].clone(),
            }
        }
        unknown => bail!("unknown command {unknown:?}; run with --help to see supported commands"),
    };
    Ok(command)
}

fn parse_kind(raw: &str) -> Result<LookupKind> {
    LookupKind::parse(raw)
        .ok_or_else(|| anyhow!("unknown lookup kind {raw:?}; use customers, amc-types or items"))
}

fn parse_id(raw: &str) -> Result<LookupId> {
    let id: i64 = raw
        .parse()
        .with_context(|| format!("invalid id {raw:?}; ids are whole numbers"))?;
    Ok(LookupId::new(id))
}

fn print_help() {
    println!("liftcrm: invoice lookups and submission");
    println!("  --config <path>                   Use a specific config path");
    println!("  --print-config-path               Print resolved config path");
    println!("  --print-example-config            Print a v1 config template");
    println!("  --check                           Validate config and reach the server");
    println!("  --help                            Show this help");
    println!();
    println!("  list <kind>                       List customers, amc-types or items");
    println!("  add <kind> <label>                Add a customer or AMC type");
    println!("  rename <kind> <id> <label>        Rename a customer or AMC type");
    println!("  delete <kind> <id> [--yes]        Delete after confirmation");
    println!("  submit <draft.toml> [--edit]      Validate and post an invoice draft");
    println!("  load-kg <passengers>              Print the lift load for a passenger count");
    println!("  end-date <YYYY-MM-DD>             Print the AMC end date for a start date");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, Command, parse_cli_args};
    use anyhow::Result;
    use liftcrm_app::{LookupId, LookupKind};
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/liftcrm-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                check_only: false,
                show_help: false,
                command: None,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml", "list", "customers"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        assert_eq!(
            options.command,
            Some(Command::List {
                kind: LookupKind::Customer
            })
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    #[test]
    fn lookup_commands_parse_kind_id_and_label() -> Result<()> {
        let rename = parse_cli_args(
            vec!["rename", "amc-types", "3", "Labour + Parts"],
            default_options_path(),
        )?;
        assert_eq!(
            rename.command,
            Some(Command::Rename {
                kind: LookupKind::AmcType,
                id: LookupId::new(3),
                label: "Labour + Parts".to_owned(),
            })
        );

        let delete = parse_cli_args(vec!["delete", "customers", "7", "--yes"], default_options_path())?;
        assert_eq!(
            delete.command,
            Some(Command::Delete {
                kind: LookupKind::Customer,
                id: LookupId::new(7),
                assume_yes: true,
            })
        );
        Ok(())
    }

    #[test]
    fn submit_and_derivation_commands_parse() -> Result<()> {
        let submit = parse_cli_args(vec!["--edit", "submit", "draft.toml"], default_options_path())?;
        assert_eq!(
            submit.command,
            Some(Command::Submit {
                draft: PathBuf::from("draft.toml"),
                edit: true,
            })
        );
        let load = parse_cli_args(vec!["load-kg", "8"], default_options_path())?;
        assert_eq!(
            load.command,
            Some(Command::LoadKg {
                passengers: "8".to_owned()
            })
        );
        Ok(())
    }

    #[test]
    fn command_errors_name_the_fix() {
        let cases = [
            (vec!["list"], "usage: liftcrm list"),
            (vec!["list", "vendors"], "unknown lookup kind"),
            (vec!["rename", "customers", "x", "A"], "invalid id"),
            (vec!["frobnicate"], "unknown command"),
            (vec!["add", "customers", "A", "--yes"], "--yes only applies"),
            (vec!["--edit"], "need a command"),
        ];
        for (args, expected) in cases {
            let error = parse_cli_args(args.clone(), default_options_path())
                .expect_err("invalid command should fail");
            assert!(
                error.to_string().contains(expected),
                "{args:?}: unexpected message {error}"
            );
        }
    }
}
