use crate::message::{Message, NOTIFICATION_CLICKED, ids};
use crate::types::ObjectId;

use log::trace;

/// Built-in behavior for a message that has no registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DefaultRoute {
    Paint,
    Click(ObjectId),
    Platform,
}

pub(crate) fn resolve_default_route(message: &Message) -> DefaultRoute {
    match message.id() {
        ids::PAINT => DefaultRoute::Paint,
        ids::COMMAND if message.high_word_wparam() == NOTIFICATION_CLICKED => {
            DefaultRoute::Click(message.command_id())
        }
        ids::COMMAND => {
            trace!(
                "[Route] WM_COMMAND notification {:#x} for control {} left to the platform",
                message.high_word_wparam(),
                message.command_id().raw()
            );
            DefaultRoute::Platform
        }
        _ => DefaultRoute::Platform,
    }
}
