/*
 * Per-instance message routing behind the single class-wide window procedure.
 *
 * The OS allows one procedure per window class, so every native handle of a
 * class lands in the same callback. This module keeps a thread-local arena of
 * window instances keyed by `WindowKey`, plus a map from native handle to key.
 * A handle is bound on its creation notification (`WM_NCCREATE`, whose creation
 * parameter carries the key) and looked up on every later message. The arena
 * only holds weak references; the window value owned by the caller keeps the
 * instance alive and unregisters it when dropped.
 *
 * Dispatch is single threaded: instances are resolved to an `Rc` and the arena
 * borrow is released before the instance runs, so handlers may create or
 * destroy windows re-entrantly.
 */
use crate::message::{Message, ids};
use crate::platform::{LResult, Platform};
use crate::types::{NativeHandle, WindowKey};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use log::{debug, trace, warn};

/// An instance that can receive routed messages.
pub(crate) trait Routable {
    fn route(&self, handle: NativeHandle, message: Message) -> LResult;

    /// Called once `WM_NCDESTROY` has been routed for `handle`.
    fn release_handle(&self, handle: NativeHandle);
}

struct WindowArena {
    instances: HashMap<WindowKey, Weak<dyn Routable>>,
    handles: HashMap<NativeHandle, WindowKey>,
    next_key: u64,
}

impl WindowArena {
    fn new() -> Self {
        Self {
            instances: HashMap::new(),
            handles: HashMap::new(),
            next_key: 1,
        }
    }
}

thread_local! {
    static ARENA: RefCell<WindowArena> = RefCell::new(WindowArena::new());
}

pub(crate) fn allocate_key() -> WindowKey {
    ARENA.with(|arena| {
        let mut arena = arena.borrow_mut();
        let key = WindowKey::from_raw(arena.next_key);
        arena.next_key += 1;
        key
    })
}

pub(crate) fn register_instance(key: WindowKey, instance: Weak<dyn Routable>) {
    ARENA.with(|arena| {
        arena.borrow_mut().instances.insert(key, instance);
    });
    debug!("Dispatch: registered window instance {key:?}");
}

/// Drops the instance and every handle still bound to it.
pub(crate) fn unregister_instance(key: WindowKey) {
    ARENA.with(|arena| {
        let mut arena = arena.borrow_mut();
        arena.instances.remove(&key);
        arena.handles.retain(|_, bound| *bound != key);
    });
    debug!("Dispatch: unregistered window instance {key:?}");
}

/*
 * Binds `handle` to the instance registered under `key`. Returns false when
 * no such instance exists. Rebinding the same pair is harmless.
 */
pub(crate) fn bind_handle(handle: NativeHandle, key: WindowKey) -> bool {
    ARENA.with(|arena| {
        let mut arena = arena.borrow_mut();
        if !arena.instances.contains_key(&key) {
            return false;
        }
        if let Some(previous) = arena.handles.insert(handle, key) {
            if previous != key {
                warn!("Dispatch: handle {handle} rebound from {previous:?} to {key:?}");
            }
        }
        true
    })
}

pub(crate) fn unbind_handle(handle: NativeHandle) {
    ARENA.with(|arena| {
        arena.borrow_mut().handles.remove(&handle);
    });
}

pub(crate) fn key_for_handle(handle: NativeHandle) -> Option<WindowKey> {
    ARENA.with(|arena| arena.borrow().handles.get(&handle).copied())
}

fn resolve(handle: NativeHandle) -> Option<Rc<dyn Routable>> {
    ARENA.with(|arena| {
        let arena = arena.borrow();
        let key = arena.handles.get(&handle)?;
        arena.instances.get(key)?.upgrade()
    })
}

/*
 * Body of the trampoline. `creation_key` is the key recovered from the
 * creation parameter of a `WM_NCCREATE`; it is ignored for other messages.
 *
 * `WM_DESTROY` always posts the quit message and reports handled without
 * consulting the instance. Messages for handles with no live instance go to
 * the platform default procedure. After `WM_NCDESTROY` the handle is unbound.
 */
pub fn route_message(
    platform: &dyn Platform,
    handle: NativeHandle,
    message: Message,
    creation_key: Option<WindowKey>,
) -> LResult {
    if message.id() == ids::NC_CREATE {
        if let Some(key) = creation_key {
            if bind_handle(handle, key) {
                debug!("Dispatch: bound handle {handle} to {key:?}");
            } else {
                warn!("Dispatch: creation key {key:?} for handle {handle} has no live instance");
            }
        }
    }

    if message.id() == ids::DESTROY {
        debug!("Dispatch: WM_DESTROY for handle {handle}; posting quit");
        platform.post_quit(0);
        return 0;
    }

    let instance = resolve(handle);
    let result = match &instance {
        Some(instance) => {
            trace!(
                "Dispatch: routing message {:#06x} to handle {handle}",
                message.id()
            );
            instance.route(handle, message)
        }
        None => platform.default_procedure(handle, &message),
    };

    if message.id() == ids::NC_DESTROY {
        unbind_handle(handle);
        if let Some(instance) = instance {
            instance.release_handle(handle);
        }
        debug!("Dispatch: handle {handle} released");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPlatform;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Probe {
        routed: RefCell<Vec<(NativeHandle, u32)>>,
        released: Cell<bool>,
    }

    impl Routable for Probe {
        fn route(&self, handle: NativeHandle, message: Message) -> LResult {
            self.routed.borrow_mut().push((handle, message.id()));
            7
        }

        fn release_handle(&self, _handle: NativeHandle) {
            self.released.set(true);
        }
    }

    fn registered_probe() -> (WindowKey, Rc<Probe>) {
        let probe = Rc::new(Probe::default());
        let key = allocate_key();
        let weak: Weak<dyn Routable> = Rc::downgrade(&probe) as Weak<dyn Routable>;
        register_instance(key, weak);
        (key, probe)
    }

    #[test]
    fn creation_notification_binds_handle_for_later_messages() {
        // Arrange
        let platform = RecordingPlatform::new();
        let (key, probe) = registered_probe();
        let handle = NativeHandle::from_raw(0x500);
        // Act
        route_message(&platform, handle, Message::on_nc_create(), Some(key));
        let result = route_message(&platform, handle, Message::on_paint(), None);
        // Assert
        assert_eq!(result, 7);
        assert_eq!(key_for_handle(handle), Some(key));
        assert_eq!(
            *probe.routed.borrow(),
            vec![(handle, ids::NC_CREATE), (handle, ids::PAINT)]
        );
        assert_eq!(platform.default_procedure_calls(), 0);
        unregister_instance(key);
    }

    #[test]
    fn unknown_handle_falls_back_to_default_procedure_once() {
        let platform = RecordingPlatform::new();
        let handle = NativeHandle::from_raw(0x777);

        route_message(&platform, handle, Message::on_paint(), None);

        assert_eq!(platform.default_procedure_calls(), 1);
        assert!(platform.quit_codes().is_empty());
    }

    #[test]
    fn destroy_posts_quit_exactly_once_without_reaching_instance() {
        let platform = RecordingPlatform::new();
        let (key, probe) = registered_probe();
        let handle = NativeHandle::from_raw(0x501);
        route_message(&platform, handle, Message::on_nc_create(), Some(key));

        let result = route_message(&platform, handle, Message::on_destroy(), None);

        assert_eq!(result, 0);
        assert_eq!(platform.quit_codes(), vec![0]);
        assert!(
            !probe
                .routed
                .borrow()
                .iter()
                .any(|(_, id)| *id == ids::DESTROY)
        );
        assert_eq!(platform.default_procedure_calls(), 0);
        unregister_instance(key);
    }

    #[test]
    fn nc_destroy_unbinds_handle_and_releases_instance() {
        let platform = RecordingPlatform::new();
        let (key, probe) = registered_probe();
        let handle = NativeHandle::from_raw(0x502);
        route_message(&platform, handle, Message::on_nc_create(), Some(key));

        route_message(&platform, handle, Message::on_nc_destroy(), None);
        route_message(&platform, handle, Message::on_paint(), None);

        assert!(probe.released.get());
        assert_eq!(key_for_handle(handle), None);
        assert_eq!(platform.default_procedure_calls(), 1);
        unregister_instance(key);
    }

    #[test]
    fn dropped_instance_is_not_resolved() {
        let platform = RecordingPlatform::new();
        let (key, probe) = registered_probe();
        let handle = NativeHandle::from_raw(0x503);
        route_message(&platform, handle, Message::on_nc_create(), Some(key));

        drop(probe);
        route_message(&platform, handle, Message::on_close(), None);

        assert_eq!(platform.default_procedure_calls(), 1);
        unregister_instance(key);
        assert_eq!(key_for_handle(handle), None);
    }

    #[test]
    fn creation_key_without_instance_is_ignored() {
        let platform = RecordingPlatform::new();
        let handle = NativeHandle::from_raw(0x504);
        let stale = allocate_key();

        route_message(&platform, handle, Message::on_nc_create(), Some(stale));

        assert_eq!(key_for_handle(handle), None);
        assert_eq!(platform.default_procedure_calls(), 1);
    }
}
