use anyhow::{bail, Context};
use clap::Parser;
use jrc_common::config::cli::{Command, DoiSource};
use jrc_common::core::run_data::get_run_data;
use jrc_common::core::token::check_token;
use jrc_common::utils::timer::timed;
use jrc_common::utils::{logger, validation::Validate};
use jrc_common::{
    convert_diacritics, ClientSettings, CliConfig, ConfigClient, PmidTarget, ScholarlyClient,
};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_log {
        logger::init_json_logger(cli.debug, cli.verbose);
    } else {
        logger::init_cli_logger(cli.debug, cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let settings = match &cli.settings {
        Some(path) => ClientSettings::from_file(path)
            .with_context(|| format!("reading settings from {}", path.display()))?,
        None => ClientSettings::default(),
    };
    if let Err(e) = settings.validate() {
        tracing::error!("Settings validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let output = timed("jrc", run(cli.command, &settings)).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(command: Command, settings: &ClientSettings) -> anyhow::Result<Value> {
    let output = match command {
        Command::Config { name, path } => {
            let config = ConfigClient::from_env()?.get_config(&name).await?;
            match path {
                Some(path) => match config.path(&path) {
                    Some(value) => value.clone(),
                    None => bail!("{} has no {}", name, path),
                },
                None => config.into_value(),
            }
        }
        Command::Doi { source, doi } => {
            let client = ScholarlyClient::from_settings(settings)?;
            match source {
                DoiSource::Biorxiv => client.biorxiv(&doi).await?,
                DoiSource::Crossref => client.crossref(&doi).await?,
                DoiSource::Datacite => client.datacite(&doi).await?,
                DoiSource::Figshare => client.figshare(&doi).await?,
                DoiSource::Oa => client.oa(&doi).await?,
            }
        }
        Command::Arxiv { query } => ScholarlyClient::from_settings(settings)?.arxiv(&query).await?,
        Command::Orcid { orcid } => ScholarlyClient::from_settings(settings)?.orcid(&orcid).await?,
        Command::People {
            id,
            name,
            suporg,
            page,
        } => {
            let client = ScholarlyClient::from_settings(settings)?;
            match (id, name, suporg) {
                (Some(id), _, _) => client.people_by_id(&id).await?.unwrap_or(Value::Null),
                (_, Some(name), _) => client.people_by_name(&name).await?,
                (_, _, Some(code)) => client.people_by_suporg(&code, page).await?,
                _ => bail!("one of --id, --name or --suporg is required"),
            }
        }
        Command::Pmid { doi } => {
            let pmid = ScholarlyClient::from_settings(settings)?.get_pmid(&doi).await?;
            json!({ "doi": doi, "pmid": pmid })
        }
        Command::ConvertPmid { pmid, to } => {
            let target: PmidTarget = to.parse()?;
            let converted = ScholarlyClient::from_settings(settings)?
                .convert_pmid(&pmid, target)
                .await?;
            let mut answer = serde_json::Map::new();
            answer.insert("pmid".to_string(), Value::String(pmid));
            answer.insert(target.as_str().to_string(), json!(converted));
            Value::Object(answer)
        }
        Command::Token { env } => {
            let token = check_token(&env)?;
            json!({ "header": token.header, "claims": token.claims })
        }
        Command::RunData { program, version } => {
            let source = ConfigClient::from_env()?;
            Value::String(get_run_data(&source, &program, &version).await?)
        }
        Command::Diacritics { text } => json!(convert_diacritics(&text)),
    };
    Ok(output)
}
