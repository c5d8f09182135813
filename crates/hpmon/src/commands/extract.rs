//! Read counters from a saved usage page.

use hpmon_core::SavedPage;

use crate::cli::{ExtractArgs, GlobalOpts};
use crate::error::CliError;

pub async fn handle(args: &ExtractArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let page = SavedPage::new(args.file.clone());
    let counters = hpmon_core::probe(&page).await?;
    super::print_counters(&counters, global)
}
