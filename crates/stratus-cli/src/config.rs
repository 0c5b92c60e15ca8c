//! Command-line arguments.
//!
//! ```text
//! Cli
//! ├── resolve <service>        # ClientConfig + per-call overrides
//! ├── prefix <raw>             # blob listing path
//! └── string-to-sign <service> # ClientConfig + request parts
//! ```
//!
//! Every [`ClientConfig`] flag can also come from its `STRATUS_*`
//! environment variable.

use clap::{Args, Parser, Subcommand};
use jiff::Timestamp;
use stratus_auth::StorageService;
use stratus_storage::ClientConfig;
use stratus_storage::LocationMode;
use stratus_storage::options::{BlobType, PayloadFormat, RequestOptions};
use url::Url;

use crate::TRACING_TARGET_CONFIG;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "stratus")]
#[command(about = "Inspect storage client configuration, options resolution and signing")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the effective options of one operation as JSON.
    Resolve(ResolveArgs),
    /// Split a flat blob path into container and listing prefix.
    Prefix {
        /// Path such as `container/dir/` or `blob-in-root`.
        raw: String,
    },
    /// Print the canonical string to sign for a request.
    StringToSign(StringToSignArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ResolveArgs {
    /// Service whose options are resolved.
    #[arg(value_enum)]
    pub service: StorageService,

    #[command(flatten)]
    pub client: ClientConfig,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Per-call overrides; unset flags inherit the client default.
#[derive(Debug, Clone, Args)]
pub struct OverrideArgs {
    /// Per-call server timeout in seconds
    #[arg(id = "call-server-timeout", long = "call-server-timeout")]
    pub server_timeout_secs: Option<u64>,

    /// Per-call maximum execution time in seconds
    #[arg(id = "call-maximum-execution-time", long = "call-maximum-execution-time")]
    pub maximum_execution_time_secs: Option<u64>,

    /// Per-call absolute deadline (RFC 3339)
    #[arg(id = "call-operation-expiry-time", long = "call-operation-expiry-time")]
    pub operation_expiry_time: Option<Timestamp>,

    /// Per-call location mode
    #[arg(id = "call-location-mode", long = "call-location-mode", value_enum)]
    pub location_mode: Option<LocationMode>,

    /// Blob type the operation targets
    #[arg(long = "blob-type", value_enum, default_value_t = BlobType::Unspecified)]
    pub blob_type: BlobType,

    /// Per-call parallel upload thread count
    #[arg(id = "call-parallel-operation-thread-count", long = "call-parallel-operation-thread-count")]
    pub parallel_operation_thread_count: Option<u32>,

    /// Per-call single-shot upload threshold in bytes
    #[arg(id = "call-single-blob-upload-threshold", long = "call-single-blob-upload-threshold")]
    pub single_blob_upload_threshold_bytes: Option<u64>,

    /// Send a per-request content MD5
    #[arg(long = "use-transactional-md5")]
    pub use_transactional_md5: Option<bool>,

    /// Store the blob's content MD5
    #[arg(long = "store-blob-content-md5")]
    pub store_blob_content_md5: Option<bool>,

    /// Per-call table payload format
    #[arg(id = "call-payload-format", long = "call-payload-format", value_enum)]
    pub payload_format: Option<PayloadFormat>,
}

impl OverrideArgs {
    /// Writes the shared overrides through the validated setters.
    pub fn apply_common(&self, options: &mut RequestOptions) -> stratus_storage::Result<()> {
        options.set_server_timeout(self.server_timeout_secs.map(std::time::Duration::from_secs))?;
        options.set_maximum_execution_time(
            self.maximum_execution_time_secs
                .map(std::time::Duration::from_secs),
        )?;
        options.set_operation_expiry_time(self.operation_expiry_time);
        options.set_location_mode(self.location_mode);
        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
pub struct StringToSignArgs {
    /// Service whose canonical layout is used.
    #[arg(value_enum)]
    pub service: StorageService,

    #[command(flatten)]
    pub client: ClientConfig,

    /// HTTP verb
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Full request URL including query
    #[arg(long)]
    pub url: Url,

    /// Request header as `name:value`; repeatable
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Body length in bytes
    #[arg(long)]
    pub content_length: Option<u64>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `name:value`, got `{raw}`"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

impl Cli {
    /// Loads `.env` (when enabled) and parses arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs the client configuration without secrets.
    pub fn log(&self) {
        let client = match &self.command {
            Command::Resolve(args) => &args.client,
            Command::StringToSign(args) => &args.client,
            Command::Prefix { .. } => return,
        };

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            primary_endpoint = %client.primary_endpoint,
            secondary_endpoint = ?client.secondary_endpoint,
            account_name = ?client.account_name,
            has_account_key = client.account_key.is_some(),
            has_sas_token = client.sas_token.is_some(),
            restricted_platform = client.restricted_platform,
            "Client configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::try_parse_from([
            "stratus",
            "resolve",
            "blob",
            "--primary-endpoint",
            "https://acct.blob.core.windows.net",
            "--call-location-mode",
            "primary-then-secondary",
            "--blob-type",
            "block-blob",
        ])
        .unwrap();

        let Command::Resolve(args) = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(args.service, StorageService::Blob);
        assert_eq!(
            args.overrides.location_mode,
            Some(LocationMode::PrimaryThenSecondary)
        );
        assert_eq!(args.overrides.blob_type, BlobType::BlockBlob);
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("x-ms-date: Fri, 16 Oct 2026 00:00:00 GMT").unwrap(),
            (
                "x-ms-date".to_string(),
                "Fri, 16 Oct 2026 00:00:00 GMT".to_string()
            )
        );
        assert!(parse_header("no-separator").is_err());
    }
}
