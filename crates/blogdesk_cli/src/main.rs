//! `blogdesk` command-line front-end.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the chosen store.
//! - Turn core failures into user-facing messages and exit codes.

mod args;
mod commands;
mod config;

use args::{parse_args, Command, USAGE};
use blogdesk_core::db::open_db;
use blogdesk_core::{init_logging, ArticleService, InMemoryArticleStore, SqliteArticleStore};
use chrono::Utc;
use commands::{execute, RunContext};
use config::{AppConfig, StorageTarget};
use log::{error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("error: {err}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let config = AppConfig::from_env(&cli.flags);
    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("warning: file logging disabled: {err}");
        }
    }

    match run(&config, &cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AppConfig, command: &Command) -> Result<(), String> {
    let ctx = RunContext {
        out_dir: config.out_dir.clone(),
        now: Utc::now(),
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = match &config.storage {
        StorageTarget::Memory => {
            info!("event=cli_store module=cli status=ok mode=memory persistent=false");
            let mut service = ArticleService::new(InMemoryArticleStore::new());
            execute(&mut service, command, &ctx, &mut out)
        }
        StorageTarget::File(path) => {
            let mut conn = open_db(path)
                .map_err(|err| format!("cannot open `{}`: {err}", path.display()))?;
            let store = SqliteArticleStore::try_new(&mut conn).map_err(|err| err.to_string())?;
            let mut service = ArticleService::new(store);
            execute(&mut service, command, &ctx, &mut out)
        }
    };

    result.map_err(|err| {
        error!("event=cli_command module=cli status=error command={command:?} error={err}");
        err.to_string()
    })
}
