// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kind-generic get, list and delete

use super::Kord;
use crate::output::{self, OutputFormat};
use kord_core::Kind;

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// Resource kind, e.g. mutex, semaphores, leaserequest
    pub kind: Kind,
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Resource kind, e.g. mutex, permits, gates
    pub kind: Kind,
    /// List across every namespace
    #[arg(long, short = 'A')]
    pub all_namespaces: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    pub kind: Kind,
    pub name: String,
}

pub async fn get(args: GetArgs, kord: &Kord, format: OutputFormat) -> anyhow::Result<()> {
    let object = kord.get_object(args.kind, &args.name).await?;
    output::print_object(&object, format);
    Ok(())
}

pub async fn list(args: ListArgs, kord: &Kord, format: OutputFormat) -> anyhow::Result<()> {
    let objects = kord.list_objects(args.kind, args.all_namespaces).await?;
    output::print_objects(&objects, format);
    Ok(())
}

pub async fn delete(args: DeleteArgs, kord: &Kord, format: OutputFormat) -> anyhow::Result<()> {
    kord.delete(args.kind, &args.name).await?;
    match format {
        OutputFormat::Table => println!("Deleted {} {}", args.kind, args.name),
        OutputFormat::Json => output::print(
            &serde_json::json!({
                "kind": args.kind,
                "namespace": kord.namespace(),
                "name": args.name,
                "deleted": true,
            }),
            format,
        ),
    }
    Ok(())
}
