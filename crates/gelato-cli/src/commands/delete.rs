use std::env;

use gelato_core::remote::HttpEntryClient;
use gelato_core::util::normalize_text_option;
use gelato_core::EntryId;

use crate::commands::common::{report_warning, settle, Context};
use crate::error::CliError;

pub fn resolve_password(cli_password: Option<String>) -> Result<String, CliError> {
    normalize_text_option(cli_password)
        .or_else(|| normalize_text_option(env::var("GELATO_ADMIN_PASSWORD").ok()))
        .ok_or(CliError::MissingPassword)
}

pub async fn run_delete(
    id: &str,
    password: Option<String>,
    ctx: &Context,
) -> Result<EntryId, CliError> {
    let id = id.parse::<EntryId>()?;
    let password = resolve_password(password)?;

    let session = ctx.loaded_session().await?;
    let gate: HttpEntryClient = ctx.config.http_client()?;
    if !session.verify_admin(&gate, &password).await? {
        return Err(CliError::InvalidPassword);
    }

    session.dismiss_warning().await;
    let deleted = settle(session.delete_entry(id).await)?;
    report_warning(&session).await;

    println!("{deleted}");
    Ok(deleted)
}
