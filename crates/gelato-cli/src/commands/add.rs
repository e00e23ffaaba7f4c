use gelato_core::{Entry, EntryDraft};

use crate::commands::common::{parse_date, report_warning, settle, Context};
use crate::error::CliError;

pub struct AddArgs<'a> {
    pub flavors: &'a [String],
    pub person: &'a str,
    pub shop: Option<&'a str>,
    pub date: Option<&'a str>,
    pub notes: Option<&'a str>,
}

impl AddArgs<'_> {
    pub fn draft(&self, ctx: &Context) -> Result<EntryDraft, CliError> {
        Ok(EntryDraft {
            shop: self
                .shop
                .map_or_else(|| ctx.config.shops.primary.clone(), str::to_string),
            person: self.person.trim().to_string(),
            date: parse_date(self.date)?,
            notes: self.notes.map(str::to_string),
            flavors: self.flavors.to_vec(),
        })
    }
}

pub async fn run_add(args: &AddArgs<'_>, ctx: &Context) -> Result<Vec<Entry>, CliError> {
    let draft = args.draft(ctx)?;
    // Validate before touching the network.
    draft.requests()?;

    let session = ctx.loaded_session().await?;
    session.dismiss_warning().await;

    let created = settle(session.submit_entries(&draft).await)?;
    report_warning(&session).await;

    for entry in &created {
        println!("{}", entry.id);
    }
    Ok(created)
}
