use clap::Parser;
use color_eyre::Result;
use salesdash::error_display::user_message_from_report;
use salesdash::{
    AppConfig, Args, ConfigManager, DashboardOptions, DataError, DatasetHandle, APP_NAME,
};
use tracing::error;

fn load_error_message(err: DataError) -> String {
    user_message_from_report(&color_eyre::eyre::Report::new(err))
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        match ConfigManager::new(APP_NAME) {
            Ok(config_manager) => match config_manager.write_default_config(args.force) {
                Ok(path) => {
                    println!("Configuration file written to {}", path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing config file: {}", user_message_from_report(&e));
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let config = match AppConfig::load(APP_NAME) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", user_message_from_report(&e));
            std::process::exit(1);
        }
    };

    let log_level = args
        .log_level
        .clone()
        .or_else(|| config.debug.log_level.clone());
    let _log_guard = salesdash::logging::init(args.log_file.as_deref(), log_level.as_deref());

    let options = DashboardOptions::from_args_and_config(&args, &config);
    let handle = DatasetHandle::new(options.source.clone());
    let dataset = match handle.load() {
        Ok(dataset) => dataset,
        Err(e) => {
            error!(error = %e, "dataset unavailable");
            eprintln!("Error: {}", load_error_message(e));
            std::process::exit(1);
        }
    };
    if let Err(e) = salesdash::run(dataset, options, config) {
        eprintln!("Error: {}", user_message_from_report(&e));
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesdash::Tab;
    use std::path::PathBuf;

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "salesdash",
            "sales.csv",
            "--tab",
            "stakeholder",
            "--price-step",
            "250",
        ]);
        let config = AppConfig::default();
        let opts = DashboardOptions::from_args_and_config(&args, &config);
        assert_eq!(opts.source.path, PathBuf::from("sales.csv"));
        assert_eq!(opts.start_tab, Tab::Stakeholder);
        assert_eq!(opts.price_step, 250);
        assert!(!opts.debug);
    }

    #[test]
    fn test_config_fills_missing_args() {
        let args = Args::parse_from(["salesdash"]);
        let mut config = AppConfig::default();
        config.data.sheet = Some("Sales".to_string());
        config.debug.enabled = true;
        let opts = DashboardOptions::from_args_and_config(&args, &config);
        assert_eq!(opts.source.path, config.data.path);
        assert_eq!(opts.source.sheet.as_deref(), Some("Sales"));
        assert_eq!(opts.start_tab, Tab::Sales);
        assert!(opts.debug);
    }

    #[test]
    fn test_load_error_message_names_file_and_reason() {
        let msg = load_error_message(DataError::DataUnavailable {
            path: PathBuf::from("synthetic_car_sales.xlsx"),
            reason: "file not found".to_string(),
        });
        assert!(msg.contains("synthetic_car_sales.xlsx"), "got: {}", msg);
        assert!(msg.contains("file not found"), "got: {}", msg);
    }
}
