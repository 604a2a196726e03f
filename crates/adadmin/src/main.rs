// # adadmin - record tool
//
// Thin command-line collaborator over adadmin-core. It loads a record,
// lets the core validate it, and either prints it or saves it somewhere
// else. All validation and persistence rules live in adadmin-core.
//
// ## Usage
//
// ```bash
// adadmin <user|lease|feature> <source-uri> [<dest-uri> [format]]
// ```
//
// - Without a destination the record is printed in the default format.
// - With a destination the record is saved there; the format defaults to
//   the one implied by the destination suffix.
//
// ## Configuration
//
// - `ADADMIN_DEFAULT_FORMAT`: Format used when none is given (json, yaml)
// - `ADADMIN_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export ADADMIN_DEFAULT_FORMAT=yaml
// adadmin lease file:///var/lib/adadmin/leases/dc1.json file:///tmp/dc1.yaml
// ```

use adadmin_core::entity::format_from_uri;
use adadmin_core::{
    DirectoryUser, ErrorRecord, FeatureSpec, LeaseRecord, PersistenceConfig, Registries,
};
use anyhow::Result;
use std::env;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum AdminExitCode {
    /// Record processed
    Success = 0,
    /// Usage or configuration error
    ConfigError = 1,
    /// The record failed to load, validate or save
    RecordError = 2,
}

impl From<AdminExitCode> for ExitCode {
    fn from(code: AdminExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Record type selected on the command line
#[derive(Debug, Clone, Copy)]
enum RecordKind {
    User,
    Lease,
    Feature,
}

/// Parsed invocation
struct Invocation {
    kind: RecordKind,
    source: String,
    destination: Option<String>,
    format: Option<String>,
    log_level: String,
    persistence: PersistenceConfig,
}

impl Invocation {
    /// Read arguments and environment
    fn from_env() -> Result<Self> {
        let mut args = env::args().skip(1);

        let kind = match args.next().as_deref() {
            Some("user") => RecordKind::User,
            Some("lease") => RecordKind::Lease,
            Some("feature") => RecordKind::Feature,
            Some(other) => anyhow::bail!(
                "unknown record type '{}'. Supported types: user, lease, feature",
                other
            ),
            None => anyhow::bail!(
                "usage: adadmin <user|lease|feature> <source-uri> [<dest-uri> [format]]"
            ),
        };
        let source = args
            .next()
            .ok_or_else(|| anyhow::anyhow!("missing source URI"))?;

        Ok(Self {
            kind,
            source,
            destination: args.next(),
            format: args.next(),
            log_level: env::var("ADADMIN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            persistence: PersistenceConfig::from_env(),
        })
    }

    /// Validate the invocation
    fn validate(&self) -> Result<()> {
        self.persistence.validate()?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ADADMIN_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        if self.format.is_some() && self.destination.is_none() {
            anyhow::bail!("a format can only be given together with a destination URI");
        }

        Ok(())
    }

    fn save_format(&self) -> String {
        match (&self.format, &self.destination) {
            (Some(format), _) => format.clone(),
            (None, Some(destination)) => format_from_uri(destination).to_string(),
            (None, None) => String::new(),
        }
    }
}

fn main() -> ExitCode {
    let invocation = match Invocation::from_env() {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return AdminExitCode::ConfigError.into();
        }
    };

    if let Err(e) = invocation.validate() {
        eprintln!("Configuration validation error: {}", e);
        return AdminExitCode::ConfigError.into();
    }

    let log_level = match invocation.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AdminExitCode::ConfigError.into();
    }

    let registries = match Registries::from_config(&invocation.persistence) {
        Ok(registries) => Arc::new(registries),
        Err(e) => {
            error!("Failed to build registries: {}", e);
            return AdminExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AdminExitCode::ConfigError.into();
        }
    };

    rt.block_on(async {
        match run(&invocation, registries).await {
            Ok(None) => AdminExitCode::Success,
            Ok(Some(record)) => {
                error!(
                    "{} failed with {} ({}): {}",
                    record.operation(),
                    record.kind(),
                    record.kind().http_status(),
                    record
                );
                AdminExitCode::RecordError
            }
            Err(e) => {
                error!("Output error: {}", e);
                AdminExitCode::RecordError
            }
        }
    })
    .into()
}

/// Process one record, returning its sticky error if the chain failed
async fn run(invocation: &Invocation, registries: Arc<Registries>) -> Result<Option<ErrorRecord>> {
    info!("Loading {:?} from {}", invocation.kind, invocation.source);

    let format = invocation.save_format();
    let output = match invocation.kind {
        RecordKind::User => {
            let mut record = DirectoryUser::new(registries);
            record.load(&invocation.source).await;
            if let Some(destination) = &invocation.destination {
                record.save(destination, &format).await;
            }
            finish(record.error(), || record.serialize(""))
        }
        RecordKind::Lease => {
            let mut record = LeaseRecord::new(registries);
            record.load(&invocation.source).await;
            if let Some(destination) = &invocation.destination {
                record.save(destination, &format).await;
            }
            finish(record.error(), || record.serialize(""))
        }
        RecordKind::Feature => {
            let mut record = FeatureSpec::new(registries);
            record.load(&invocation.source).await;
            if let Some(destination) = &invocation.destination {
                record.save(destination, &format).await;
            }
            finish(record.error(), || record.serialize(""))
        }
    };

    let rendered = match output? {
        Ok(rendered) => rendered,
        Err(record) => return Ok(Some(record)),
    };

    match &invocation.destination {
        Some(destination) => info!("Saved record to {}", destination),
        None => std::io::stdout().write_all(&rendered)?,
    }

    Ok(None)
}

/// Turn a finished chain into either printable bytes or its sticky error
///
/// Render failures that carry no error record are returned as plain errors,
/// so they still end the run with a record error exit code.
fn finish(
    error: Option<ErrorRecord>,
    render: impl FnOnce() -> adadmin_core::Result<Vec<u8>>,
) -> Result<std::result::Result<Vec<u8>, ErrorRecord>> {
    if let Some(record) = error {
        return Ok(Err(record));
    }
    match render() {
        Ok(bytes) => Ok(Ok(bytes)),
        Err(adadmin_core::Error::Record(record)) => Ok(Err(*record)),
        Err(other) => Err(anyhow::Error::new(other).context("failed to render record")),
    }
}
