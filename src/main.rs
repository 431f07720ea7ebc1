use clap::Parser;
use stylewarden::cli::commands::{
    cmd_generate, cmd_rules_delete, cmd_rules_list, cmd_rules_toggle, cmd_selectors,
    cmd_summarize, cmd_validate, cmd_watch,
};
use stylewarden::cli::config::{build_timing, load_config, Cli, Commands, RulesAction};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref());

    // Resolve shared settings: CLI > config > defaults
    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| config.store.path.clone());
    let ollama_endpoint = cli
        .ollama_endpoint
        .as_deref()
        .or(config.ollama.endpoint.as_deref());
    let ollama_model = cli
        .ollama_model
        .as_deref()
        .or(config.ollama.model.as_deref());

    match cli.command {
        Commands::Summarize {
            page,
            url,
            include_hidden,
            max_depth,
            max_children,
        } => {
            cmd_summarize(
                &page,
                &url,
                include_hidden,
                max_depth,
                max_children,
                &store_path,
                cli.verbose,
            )?;
        }
        Commands::Selectors { page, url, request } => {
            cmd_selectors(&page, &url, &request, cli.verbose)?;
        }
        Commands::Generate {
            page,
            url,
            request,
            backend,
            save,
        } => {
            let ok = cmd_generate(
                &page,
                &url,
                &request,
                &backend,
                save,
                &store_path,
                cli.verbose,
                ollama_endpoint,
                ollama_model,
            )?;
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::Validate {
            page,
            url,
            domain,
            json,
        } => {
            let all_passed = cmd_validate(
                &page,
                &url,
                domain.as_deref(),
                json,
                &store_path,
                cli.verbose,
            )?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::Watch {
            page,
            url,
            domain,
            scenario,
            duration_ms,
            report,
            trace,
        } => {
            let healthy = cmd_watch(
                &page,
                &url,
                domain.as_deref(),
                scenario.as_deref(),
                duration_ms,
                report.as_deref(),
                trace.as_deref(),
                &store_path,
                build_timing(&config.watch),
                config.watch.notify,
                cli.verbose,
            )?;
            if !healthy {
                std::process::exit(1);
            }
        }
        Commands::Rules { action } => match action {
            RulesAction::List { domain } => {
                cmd_rules_list(domain.as_deref(), &store_path)?;
            }
            RulesAction::Enable { domain, id } => {
                cmd_rules_toggle(&domain, &id, true, &store_path)?;
            }
            RulesAction::Disable { domain, id } => {
                cmd_rules_toggle(&domain, &id, false, &store_path)?;
            }
            RulesAction::Delete { domain, id } => {
                cmd_rules_delete(&domain, &id, &store_path)?;
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
