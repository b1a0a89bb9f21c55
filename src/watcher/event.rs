//! Translation of `notify` events into build events.

use notify::event::{MetadataKind, ModifyKind, RenameMode};
use notify::{Event, EventKind};

use crate::build::BuildEvent;

/// Map one notify event to the build events it implies.
///
/// Renames become a removal of the old path and an addition of the new
/// one. Access events and metadata changes other than write time are
/// dropped.
pub fn map_event(event: &Event) -> Vec<BuildEvent> {
    let paths = &event.paths;
    match event.kind {
        EventKind::Create(_) => paths.iter().cloned().map(BuildEvent::Added).collect(),

        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => match paths.as_slice() {
            [from, to, ..] => vec![
                BuildEvent::Removed(from.clone()),
                BuildEvent::Added(to.clone()),
            ],
            _ => Vec::new(),
        },
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            paths.iter().cloned().map(BuildEvent::Removed).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            paths.iter().cloned().map(BuildEvent::Added).collect()
        }
        // Backends that cannot tell the rename direction
        EventKind::Modify(ModifyKind::Name(_)) => paths
            .iter()
            .cloned()
            .map(|p| {
                if p.exists() {
                    BuildEvent::Added(p)
                } else {
                    BuildEvent::Removed(p)
                }
            })
            .collect(),

        EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Any)
        | EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)) => {
            paths.iter().cloned().map(BuildEvent::Changed).collect()
        }

        EventKind::Remove(_) => paths.iter().cloned().map(BuildEvent::Removed).collect(),

        _ => Vec::new(),
    }
}
