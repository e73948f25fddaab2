use {
    crate::{
        domain::{
            Message,
            Orchestrator,
            Report,
            dispatch::Dispatcher,
            rules::{Registry, Settings},
            session::{self, SessionDetails, SessionDirectory},
        },
        infra::{cli, config, observe, payload, state},
    },
    anyhow::{Context, Result},
    clap::Parser,
    std::{collections::HashMap, path::Path, sync::Arc},
};

pub async fn start(args: impl Iterator<Item = String>) {
    let args = cli::Args::parse_from(args);
    observe::init(&args.log, args.log_json);
    tracing::info!("running flow validator with {args:#?}");

    let report = match run(args).await {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(?err, "validation run failed");
            std::process::exit(1);
        }
    };
    match serde_json::to_string_pretty(&report) {
        Ok(report) => println!("{report}"),
        Err(err) => {
            tracing::error!(?err, "failed to serialize report");
            std::process::exit(1);
        }
    }
}

/// Validates one session. Assumes tracing has already been set up.
pub async fn run(args: cli::Args) -> Result<Report> {
    let reporting = config::file::load(&args.config).await;
    let registry = Registry::standard();
    registry
        .verify(reporting.domains())
        .context("rule sets do not cover the reporting configuration")?;

    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        Arc::new(state::Memory::new(args.state_ttl)),
        Settings {
            ready_to_ship: args.ready_to_ship,
        },
    );

    let (flows, session, sessions) = match args.command {
        cli::Command::File {
            messages,
            domain,
            protocol_version,
            session_id,
        } => {
            let flows: HashMap<String, Vec<Message>> = read_json(&messages).await?;
            let details = file_session(domain, protocol_version, &flows)?;
            (
                flows,
                session_id,
                Arc::new(session::Fixed(details)) as Arc<dyn SessionDirectory>,
            )
        }
        cli::Command::Remote {
            storage_url,
            payload_ids,
            session_id,
            http_timeout,
        } => {
            let ids: HashMap<String, Vec<String>> = read_json(&payload_ids).await?;
            let store = Arc::new(payload::Http::try_new(storage_url, http_timeout)?);
            let flows = payload::fetch_flows(store.as_ref(), ids).await;
            (flows, session_id, store as Arc<dyn SessionDirectory>)
        }
    };

    let orchestrator = Orchestrator::new(Arc::new(reporting), sessions, dispatcher);
    Ok(orchestrator.validate(flows, &session).await)
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {path:?}"))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {path:?}"))
}

/// Domain and version of a session read from a file. Values not given on the
/// command line are taken from the context of the first message that has
/// them.
fn file_session(
    domain: Option<String>,
    version: Option<String>,
    flows: &HashMap<String, Vec<Message>>,
) -> Result<SessionDetails> {
    let mut messages = flows.values().flatten();
    let domain = domain
        .or_else(|| messages.clone().find_map(Message::domain).map(str::to_owned))
        .context("no --domain given and no message names one")?;
    let version = version
        .or_else(|| messages.find_map(Message::version).map(str::to_owned))
        .context("no --version given and no message names one")?;
    Ok(SessionDetails { domain, version })
}
