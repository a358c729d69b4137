//! Optimistic mutation coordinator
//!
//! One operation per mutation kind. Card placement mutations apply locally
//! first, confirm remotely and restore their snapshot on failure. Column
//! schema mutations go to the remote end first and only then touch local
//! state.

mod add_card;
mod add_column;
mod column_status;
mod load_more;
mod move_card;
mod set_indicator;
mod update_column_order;
mod update_order;

pub use add_card::{AddCard, AddCardOutcome};
pub use add_column::AddColumn;
pub use column_status::{ArchiveColumn, RestoreColumn};
pub use load_more::LoadMore;
pub use move_card::{MoveCard, PlaceCard};
pub use set_indicator::SetIndicator;
pub use update_column_order::UpdateColumnOrder;
pub use update_order::UpdateOrder;

pub(crate) use load_more::fetch_page;

use crate::error::Result;
use crate::remote::{
    self, method, CustomizationDoc, CustomizationReply, FetchCustomizationArgs, SaveCustomizationArgs,
};
use crate::session::BoardSession;
use tracing::{debug, warn};

/// Fetch the customization document of `doctype`, let `edit` change it and
/// save it back.
async fn customize<F>(session: &BoardSession, doctype: &str, edit: F) -> Result<()>
where
    F: FnOnce(&mut CustomizationDoc) + Send,
{
    let reply: CustomizationReply = remote::submit(
        session.gateway(),
        method::FETCH_TO_CUSTOMIZE,
        &FetchCustomizationArgs {
            doc_type: doctype.to_string(),
        },
    )
    .await?;

    let Some(mut doc) = reply.docs.into_iter().next() else {
        warn!(doctype, "no customization document returned, skipping save");
        return Ok(());
    };
    edit(&mut doc);
    remote::call(
        session.gateway(),
        method::SAVE_CUSTOMIZATION,
        &SaveCustomizationArgs { doc: &doc },
    )
    .await?;
    debug!(doctype, "customization saved");
    Ok(())
}
