use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tower_lsp::LspService;
use tower_lsp::Server;

use qxcomplete_lsp::Backend;
use qxcomplete_lsp::config::{self, Settings, SettingsPatch};
use qxcomplete_lsp::logging;

/// qooxdoo class, static method and constructor completion over LSP.
#[derive(Debug, Parser)]
#[command(name = "qxcomplete_lsp", version, about)]
struct Cli {
    /// Settings file (TOML).  Defaults to `<config dir>/qxcomplete/config.toml`
    /// when that file exists.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory containing `apiindex.json` and class documents.  May be
    /// repeated; replaces `autocomplete_api_paths` from the config file.
    #[arg(long = "api-path", value_name = "DIR")]
    api_paths: Vec<PathBuf>,

    /// Enable verbose completion diagnostics (`autocomplete_debug`).
    #[arg(long)]
    debug: bool,

    /// Log filter directive, e.g. `debug` or `qxcomplete_lsp=trace`.
    /// Overrides `RUST_LOG`.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Disable ANSI colours in log output.
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn settings_patch(&self) -> SettingsPatch {
        SettingsPatch {
            autocomplete_api_paths: (!self.api_paths.is_empty()).then(|| self.api_paths.clone()),
            autocomplete_debug: self.debug.then_some(true),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut settings = Settings::default();
    let file_patch = match config::load_config_file(cli.config.as_deref()) {
        Ok(patch) => patch,
        Err(e) => {
            eprintln!("qxcomplete_lsp: {e}");
            return ExitCode::FAILURE;
        }
    };
    settings.apply(file_patch);
    settings.apply(cli.settings_patch());

    logging::init_logger(
        cli.log_level.as_deref(),
        settings.autocomplete_debug,
        cli.no_color,
    );
    tracing::debug!(?settings, "starting");

    let (service, socket) = LspService::new(|client| Backend::new(client, settings));
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;

    ExitCode::SUCCESS
}
