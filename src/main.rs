use clap::Parser;
use zenodo_upload::utils::logger;
use zenodo_upload::{CliConfig, UploadError, UploadPlan, UploadWorkflow, ZenodoClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting zenodo-upload");

    let settings = match config.resolve() {
        Ok(settings) => settings,
        Err(e) => fail(e),
    };
    tracing::debug!("Resolved settings: {:?}", settings);

    let client = match ZenodoClient::with_timeout(
        &settings.base_url,
        settings.access_token.clone(),
        settings.timeout,
    ) {
        Ok(client) => client,
        Err(e) => fail(e),
    };
    tracing::info!("🌐 Using Zenodo API at {}", client.base_url());

    let workflow = UploadWorkflow::new(client, settings.metadata.clone());

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be created or published");
        match workflow.dry_run(&settings.request).await {
            Ok(UploadPlan::NewDeposition { filename }) => {
                println!("Would create a new deposition and upload '{}'", filename);
            }
            Ok(UploadPlan::NewVersion {
                deposition_id,
                filename,
            }) => {
                println!("Would create a new version of deposition {}", deposition_id);
                if let Some(filename) = filename {
                    println!("Would upload '{}' into the new draft", filename);
                }
            }
            Err(e) => fail(e),
        }
        return Ok(());
    }

    match settings.request.deposition_id {
        Some(existing) => println!(
            "Deposition ID '{}' detected. Updating published file version.",
            existing
        ),
        None => println!("No deposition ID detected. Creating new file publication."),
    }

    match workflow.run(&settings.request).await {
        Ok(outcome) => {
            tracing::info!("✅ Deposition {} published", outcome.deposition_id);
            println!("New upload deposition ID: {}", outcome.deposition_id);
            if let Some(doi) = &outcome.doi {
                println!("DOI: {}", doi);
            }
            if let Some(html_url) = &outcome.html_url {
                println!("URL: {}", html_url);
            }
        }
        Err(e) => fail(e),
    }

    Ok(())
}

fn fail(e: UploadError) -> ! {
    tracing::error!("❌ {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("{}", e.user_friendly_message());
    std::process::exit(e.exit_code());
}
