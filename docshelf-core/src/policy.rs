//! Document visibility policy

use crate::entities::Document;
use crate::identity::Identity;

/// Whether `viewer` may read `doc`.
///
/// True iff the document is public, the viewer owns it, or the viewer is
/// in its grant list. Pure; linear in the grant list.
pub fn is_visible(doc: &Document, viewer: &Identity) -> bool {
    doc.is_public || &doc.owner == viewer || doc.grant.iter().any(|g| g == viewer)
}
