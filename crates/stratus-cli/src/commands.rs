//! Subcommand handlers; each returns the JSON document to print.

use anyhow::Context;
use serde_json::{Value, json};
use stratus_auth::{SignableRequest, StorageService};
use stratus_storage::options::{BlobRequestOptions, QueueRequestOptions, TableRequestOptions};
use stratus_storage::{
    BlobServiceClient, QueueServiceClient, ServiceClient, TableServiceClient, parse_user_prefix,
};

use crate::TRACING_TARGET_COMMAND;
use crate::config::{ResolveArgs, StringToSignArgs};

/// Resolves the overrides against a client built from the configuration.
pub fn resolve(args: &ResolveArgs) -> anyhow::Result<Value> {
    let overrides = &args.overrides;

    let options = match args.service {
        StorageService::Blob => {
            let client = BlobServiceClient::from_config(&args.client)
                .context("failed to create blob client")?;

            let mut options = BlobRequestOptions::default();
            overrides.apply_common(&mut options)?;
            options.set_parallel_operation_thread_count(overrides.parallel_operation_thread_count)?;
            options.set_single_blob_upload_threshold_in_bytes(
                overrides.single_blob_upload_threshold_bytes,
            )?;
            options.set_use_transactional_md5(overrides.use_transactional_md5);
            options.set_store_blob_content_md5(overrides.store_blob_content_md5);

            let effective = BlobRequestOptions::resolve(Some(&options), &client, overrides.blob_type)
                .context("failed to resolve blob options")?;
            serde_json::to_value(effective)?
        }
        StorageService::Queue => {
            let client = QueueServiceClient::from_config(&args.client)
                .context("failed to create queue client")?;

            let mut options = QueueRequestOptions::default();
            overrides.apply_common(&mut options)?;

            let effective = QueueRequestOptions::resolve(Some(&options), &client)
                .context("failed to resolve queue options")?;
            serde_json::to_value(effective)?
        }
        StorageService::Table => {
            let client = TableServiceClient::from_config(&args.client)
                .context("failed to create table client")?;

            let mut options = TableRequestOptions::default();
            overrides.apply_common(&mut options)?;
            options.set_payload_format(overrides.payload_format);

            let effective = TableRequestOptions::resolve(Some(&options), &client)
                .context("failed to resolve table options")?;
            serde_json::to_value(effective)?
        }
    };

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        service = %args.service,
        "Resolved effective options"
    );

    Ok(json!({
        "service": args.service,
        "options": options,
    }))
}

/// Splits a flat blob path.
pub fn prefix(raw: &str) -> Value {
    let (container, prefix) = parse_user_prefix(raw);
    json!({
        "container": container,
        "prefix": prefix,
    })
}

/// Builds the canonical string, and the authorization header when the
/// configuration carries an account key.
pub fn string_to_sign(args: &StringToSignArgs) -> anyhow::Result<Value> {
    let storage_uri = args.client.storage_uri().context("invalid endpoint")?;
    let credentials = args.client.credentials().context("invalid credentials")?;

    let mut client = ServiceClient::new(
        args.service,
        storage_uri,
        credentials,
        args.client.capabilities(),
    );
    if let Some(scheme) = args.client.authentication_scheme {
        client.set_authentication_scheme(scheme);
    }

    let mut builder = SignableRequest::builder()
        .with_method(args.method.as_str())
        .with_url(args.url.clone());
    for (name, value) in &args.headers {
        builder = builder.with_header(name, value.as_str());
    }
    if let Some(length) = args.content_length {
        builder = builder.with_content_length(length);
    }
    let mut request = builder.build().context("invalid request")?;

    let account_name = client
        .account_name()
        .context("no account name in credentials or endpoint")?
        .to_string();
    let canonicalizer = client.canonicalizer();
    let string_to_sign = canonicalizer.canonicalize(&request, &account_name);

    client.authorize(&mut request);

    Ok(json!({
        "scheme": client.authentication_scheme(),
        "family": client.service().family(),
        "string_to_sign": string_to_sign,
        "authorization": request.header("authorization"),
    }))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::config::{Cli, Command};

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn test_prefix_output() {
        assert_eq!(
            prefix("/abc"),
            json!({ "container": "$root", "prefix": "abc" })
        );
        assert_eq!(prefix("abc/"), json!({ "container": "abc", "prefix": null }));
    }

    #[test]
    fn test_resolve_table() {
        let Command::Resolve(args) = parse(&[
            "stratus",
            "resolve",
            "table",
            "--primary-endpoint",
            "https://acct.table.core.windows.net",
            "--server-timeout",
            "20",
            "--call-payload-format",
            "json-no-metadata",
        ]) else {
            panic!("expected resolve");
        };

        let output = resolve(&args).unwrap();
        assert_eq!(output["service"], "table");
        assert_eq!(output["options"]["payload_format"], "json_no_metadata");
        assert_eq!(output["options"]["location_mode"], "primary_only");
        assert_eq!(output["options"]["server_timeout"]["secs"], 20);
    }

    #[test]
    fn test_resolve_rejects_out_of_range_override() {
        let Command::Resolve(args) = parse(&[
            "stratus",
            "resolve",
            "blob",
            "--primary-endpoint",
            "https://acct.blob.core.windows.net",
            "--call-parallel-operation-thread-count",
            "65",
        ]) else {
            panic!("expected resolve");
        };

        assert!(resolve(&args).is_err());
    }

    #[test]
    fn test_string_to_sign_anonymous() {
        let Command::StringToSign(args) = parse(&[
            "stratus",
            "string-to-sign",
            "table",
            "--primary-endpoint",
            "https://acct.table.core.windows.net",
            "--url",
            "https://acct.table.core.windows.net/Customers",
            "--header",
            "x-ms-date:Fri, 16 Oct 2026 00:00:00 GMT",
            "--authentication-scheme",
            "shared-key-lite",
        ]) else {
            panic!("expected string-to-sign");
        };

        let output = string_to_sign(&args).unwrap();
        assert_eq!(
            output["string_to_sign"],
            "Fri, 16 Oct 2026 00:00:00 GMT\n/acct/Customers"
        );
        assert_eq!(output["authorization"], Value::Null);
    }
}
