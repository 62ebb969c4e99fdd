pub mod call;
pub mod capabilities;
pub mod catalog;
pub mod dashboards;
pub mod queries;

use crate::{context::Site, output::OutputManager};

/// Writes to the memory backend only live for this invocation.
pub(crate) fn note_ephemeral(site: &Site, output: &OutputManager) {
    if site.is_ephemeral() {
        output.warning("memory backend: the new document is discarded when this command exits");
    }
}
