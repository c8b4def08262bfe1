//! Quartz Event Tap lifecycle
//!
//! Owns the two CGEventTap registrations: a listen-only tap for
//! touch/gesture notifications and a mutating tap for scroll-wheel and
//! primary-click-down events. Both are attached to the run loop of the
//! thread that calls [`TapLifecycle::start`]; the OS then invokes the
//! callbacks strictly serially on that thread, which is what lets the
//! engine run lock-free.
//!
//! # Permissions
//!
//! Requires Accessibility permission in System Settings → Privacy &
//! Security → Accessibility.

use crate::engine::{Action, EventKind, FilterEngine, PointerEvent};
use crate::tap::permissions;
use crate::time::timebase::MachTimebase;
use core_foundation::base::{CFRelease, CFTypeRef};
use core_foundation::runloop::kCFRunLoopCommonModes;
use std::cell::{Cell, UnsafeCell};
use std::ffi::c_void;
use std::marker::PhantomData;
use std::ptr;
use tracing::{debug, info, warn};

// Core Graphics event types
type CGEventRef = CFTypeRef;
type CGEventTapProxy = *const c_void;
type CGEventMask = u64;
type CGEventTapCallback = extern "C" fn(CGEventTapProxy, u32, CGEventRef, *mut c_void) -> CGEventRef;

// CGEventTap location
#[repr(u32)]
#[derive(Copy, Clone)]
#[allow(dead_code, clippy::enum_variant_names)]
enum CGEventTapLocation {
    HIDEventTap = 0,
    SessionEventTap = 1,
    AnnotatedSessionEventTap = 2,
}

// CGEventTap placement
#[repr(u32)]
#[derive(Copy, Clone)]
#[allow(dead_code, clippy::enum_variant_names)]
enum CGEventTapPlacement {
    HeadInsertEventTap = 0,
    TailAppendEventTap = 1,
}

// CGEventTap options
#[repr(u32)]
#[derive(Copy, Clone)]
enum CGEventTapOptions {
    DefaultTap = 0,
    ListenOnly = 1,
}

// CGEventType values the filter cares about
const CG_EVENT_LEFT_MOUSE_DOWN: u32 = 1;
const CG_EVENT_SCROLL_WHEEL: u32 = 22;
// NSEventTypeGesture; CGEventType has no name for it but taps deliver it
const NS_EVENT_GESTURE: u32 = 29;
// Synthesized types the OS injects when it disables a tap
const CG_EVENT_TAP_DISABLED_BY_TIMEOUT: u32 = 0xFFFF_FFFE;
const CG_EVENT_TAP_DISABLED_BY_USER_INPUT: u32 = 0xFFFF_FFFF;

// CGEventField values
const CG_SCROLL_WHEEL_EVENT_DELTA_AXIS_1: u32 = 11; // vertical
const CG_SCROLL_WHEEL_EVENT_DELTA_AXIS_2: u32 = 12; // horizontal
const CG_SCROLL_WHEEL_EVENT_IS_CONTINUOUS: u32 = 88;

// CGEventFlags
const CG_EVENT_FLAG_MASK_SHIFT: u64 = 0x00020000;
const CG_EVENT_FLAG_MASK_CONTROL: u64 = 0x00040000;

// NSTouchPhase: Began | Moved | Stationary
const NS_TOUCH_PHASE_TOUCHING: usize = 0x7;

// FFI declarations for Core Graphics
#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventTapCreate(
        tap: CGEventTapLocation,
        place: CGEventTapPlacement,
        options: CGEventTapOptions,
        events_of_interest: CGEventMask,
        callback: CGEventTapCallback,
        user_info: *mut c_void,
    ) -> CFTypeRef;

    fn CGEventTapEnable(tap: CFTypeRef, enable: bool);

    fn CGEventGetIntegerValueField(event: CGEventRef, field: u32) -> i64;
    fn CGEventSetIntegerValueField(event: CGEventRef, field: u32, value: i64);
    fn CGEventGetFlags(event: CGEventRef) -> u64;
    fn CGEventSetFlags(event: CGEventRef, flags: u64);
    fn CGEventGetTimestamp(event: CGEventRef) -> u64;
}

// FFI declarations for Core Foundation
#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFMachPortCreateRunLoopSource(
        allocator: CFTypeRef,
        port: CFTypeRef,
        order: i64,
    ) -> CFTypeRef;

    fn CFRunLoopGetCurrent() -> CFTypeRef;
    fn CFRunLoopAddSource(rl: CFTypeRef, source: CFTypeRef, mode: CFTypeRef);
    fn CFRunLoopRemoveSource(rl: CFTypeRef, source: CFTypeRef, mode: CFTypeRef);
    fn CFRunLoopRun();
    fn CFRunLoopStop(rl: CFTypeRef);
}

/// Borrowed, zero-allocation view over a live CGEvent.
///
/// Implements [`PointerEvent`] by reading and writing the event's fields in
/// place, preserving the mutation contract on the externally owned record.
pub struct CgEventView<'a> {
    event: CGEventRef,
    _marker: PhantomData<&'a mut c_void>,
}

impl CgEventView<'_> {
    /// Safety: `event` must be a valid CGEvent for the view's lifetime, and
    /// the view must not outlive the callback invocation that produced it.
    unsafe fn new(event: CGEventRef) -> Self {
        Self {
            event,
            _marker: PhantomData,
        }
    }
}

impl PointerEvent for CgEventView<'_> {
    fn timestamp_nanos(&self) -> u64 {
        // CGEvent timestamps are mach ticks
        MachTimebase::ticks_to_nanos(unsafe { CGEventGetTimestamp(self.event) })
    }

    fn is_continuous(&self) -> bool {
        unsafe { CGEventGetIntegerValueField(self.event, CG_SCROLL_WHEEL_EVENT_IS_CONTINUOUS) != 0 }
    }

    fn vertical_delta(&self) -> i64 {
        unsafe { CGEventGetIntegerValueField(self.event, CG_SCROLL_WHEEL_EVENT_DELTA_AXIS_1) }
    }

    fn horizontal_delta(&self) -> i64 {
        unsafe { CGEventGetIntegerValueField(self.event, CG_SCROLL_WHEEL_EVENT_DELTA_AXIS_2) }
    }

    fn set_vertical_delta(&mut self, delta: i64) {
        unsafe {
            CGEventSetIntegerValueField(self.event, CG_SCROLL_WHEEL_EVENT_DELTA_AXIS_1, delta);
        }
    }

    fn set_horizontal_delta(&mut self, delta: i64) {
        unsafe {
            CGEventSetIntegerValueField(self.event, CG_SCROLL_WHEEL_EVENT_DELTA_AXIS_2, delta);
        }
    }

    fn shift_flag(&self) -> bool {
        unsafe { CGEventGetFlags(self.event) & CG_EVENT_FLAG_MASK_SHIFT != 0 }
    }

    fn clear_shift_flag(&mut self) {
        unsafe {
            let flags = CGEventGetFlags(self.event);
            CGEventSetFlags(self.event, flags & !CG_EVENT_FLAG_MASK_SHIFT);
        }
    }

    fn control_flag(&self) -> bool {
        unsafe { CGEventGetFlags(self.event) & CG_EVENT_FLAG_MASK_CONTROL != 0 }
    }

    fn clear_control_flag(&mut self) {
        unsafe {
            let flags = CGEventGetFlags(self.event);
            CGEventSetFlags(self.event, flags & !CG_EVENT_FLAG_MASK_CONTROL);
        }
    }

    fn touch_count(&self) -> u32 {
        touching_touch_count(self.event)
    }
}

/// Count touches currently in the touching phase by bridging the CGEvent to
/// an NSEvent. Returns 0 for events that carry no touch data.
fn touching_touch_count(event: CGEventRef) -> u32 {
    use objc::runtime::{Class, Object};
    use objc::{msg_send, sel, sel_impl};

    unsafe {
        let ns_event_class = match Class::get("NSEvent") {
            Some(cls) => cls,
            None => return 0,
        };
        let ns_event: *mut Object = msg_send![ns_event_class, eventWithCGEvent: event];
        if ns_event.is_null() {
            return 0;
        }
        let touches: *mut Object = msg_send![ns_event,
            touchesMatchingPhase: NS_TOUCH_PHASE_TOUCHING
            inView: ptr::null_mut::<Object>()];
        if touches.is_null() {
            return 0;
        }
        let count: usize = msg_send![touches, count];
        count as u32
    }
}

/// Context shared with both tap callbacks via `user_info`.
///
/// Safety: the engine lives in an UnsafeCell because the callbacks need
/// `&mut` access without a lock. Both taps are attached to the same run
/// loop, so their callbacks are invoked strictly serially on one thread and
/// never overlap with `start()`/`stop()`, which run on that same thread.
struct TapContext {
    engine: UnsafeCell<FilterEngine>,
    // Filled in after tap creation so the callbacks can re-enable their own
    // tap when the OS disables it (timeout or user input).
    gesture_port: Cell<CFTypeRef>,
    filter_port: Cell<CFTypeRef>,
}

/// One tap registration: mach port + run-loop source, attached and enabled.
/// Dropping it detaches the source, disables the tap, and releases both.
struct TapRegistration {
    port: CFTypeRef,
    source: CFTypeRef,
    run_loop: CFTypeRef,
}

impl TapRegistration {
    fn create(
        options: CGEventTapOptions,
        mask: CGEventMask,
        callback: CGEventTapCallback,
        user_info: *mut c_void,
        label: &str,
    ) -> crate::Result<Self> {
        let port = unsafe {
            CGEventTapCreate(
                CGEventTapLocation::SessionEventTap,
                CGEventTapPlacement::HeadInsertEventTap,
                options,
                mask,
                callback,
                user_info,
            )
        };
        if port.is_null() {
            return Err(crate::Error::TapCreation(format!(
                "CGEventTapCreate returned null for the {label} tap"
            )));
        }

        let source = unsafe { CFMachPortCreateRunLoopSource(ptr::null(), port, 0) };
        if source.is_null() {
            unsafe { CFRelease(port) };
            return Err(crate::Error::TapCreation(format!(
                "failed to create run loop source for the {label} tap"
            )));
        }

        let run_loop = unsafe { CFRunLoopGetCurrent() };
        unsafe {
            CFRunLoopAddSource(run_loop, source, kCFRunLoopCommonModes as CFTypeRef);
            CGEventTapEnable(port, true);
        }
        debug!("{label} tap registered");

        Ok(Self {
            port,
            source,
            run_loop,
        })
    }
}

impl Drop for TapRegistration {
    fn drop(&mut self) {
        unsafe {
            CFRunLoopRemoveSource(self.run_loop, self.source, kCFRunLoopCommonModes as CFTypeRef);
            CGEventTapEnable(self.port, false);
            CFRelease(self.source);
            CFRelease(self.port);
        }
    }
}

struct TapHandles {
    _gesture: TapRegistration,
    _filter: TapRegistration,
}

/// Owns both tap registrations and their run-loop attachment.
///
/// `Inactive → start() → Active → stop() → Inactive`. Construction never
/// touches the OS; all registration happens in [`TapLifecycle::start`].
pub struct TapLifecycle {
    context: Box<TapContext>,
    taps: Option<TapHandles>,
}

impl TapLifecycle {
    pub fn new(engine: FilterEngine) -> Self {
        Self {
            context: Box::new(TapContext {
                engine: UnsafeCell::new(engine),
                gesture_port: Cell::new(ptr::null()),
                filter_port: Cell::new(ptr::null()),
            }),
            taps: None,
        }
    }

    /// Activate both taps on the current thread's run loop.
    ///
    /// Idempotent: a no-op when already active. On any failure, whatever
    /// was partially created is rolled back and the lifecycle stays
    /// Inactive.
    ///
    /// # Errors
    /// [`crate::Error::PermissionDenied`] if the accessibility check fails;
    /// [`crate::Error::TapCreation`] if either registration fails.
    pub fn start(&mut self) -> crate::Result<()> {
        if self.taps.is_some() {
            debug!("start() called while already active; ignoring");
            return Ok(());
        }

        if !permissions::is_trusted() {
            return Err(crate::Error::PermissionDenied);
        }

        let user_info = &*self.context as *const TapContext as *mut c_void;

        let gesture = TapRegistration::create(
            CGEventTapOptions::ListenOnly,
            1 << NS_EVENT_GESTURE,
            gesture_tap_callback,
            user_info,
            "gesture",
        )?;
        // If this fails, `gesture` is dropped and rolls itself back
        let filter = TapRegistration::create(
            CGEventTapOptions::DefaultTap,
            (1 << CG_EVENT_SCROLL_WHEEL) | (1 << CG_EVENT_LEFT_MOUSE_DOWN),
            filter_tap_callback,
            user_info,
            "filter",
        )?;

        self.context.gesture_port.set(gesture.port);
        self.context.filter_port.set(filter.port);
        self.taps = Some(TapHandles {
            _gesture: gesture,
            _filter: filter,
        });

        info!("event taps active");
        Ok(())
    }

    /// Detach and invalidate both registrations. Idempotent; safe to call
    /// from the shutdown path on the run-loop thread.
    pub fn stop(&mut self) {
        if self.taps.take().is_some() {
            self.context.gesture_port.set(ptr::null());
            self.context.filter_port.set(ptr::null());
            info!("event taps stopped");
        }
    }

    /// True iff both registrations are live.
    pub fn is_active(&self) -> bool {
        self.taps.is_some()
    }
}

impl Drop for TapLifecycle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Callback for the passive gesture tap. The return value of a listen-only
/// tap is ignored by the OS, so this only feeds the touch tracker.
extern "C" fn gesture_tap_callback(
    _proxy: CGEventTapProxy,
    event_type: u32,
    event: CGEventRef,
    user_info: *mut c_void,
) -> CGEventRef {
    if user_info.is_null() || event.is_null() {
        return event;
    }
    let context = unsafe { &*(user_info as *const TapContext) };

    if reenable_if_disabled(event_type, context.gesture_port.get(), "gesture") {
        return event;
    }

    if event_type == NS_EVENT_GESTURE {
        // Safety: serial callback invocation on the run-loop thread
        let engine = unsafe { &mut *context.engine.get() };
        let mut view = unsafe { CgEventView::new(event) };
        engine.dispatch(EventKind::Gesture, &mut view);
    }

    event
}

/// Callback for the mutating filter tap. The returned event replaces the
/// intercepted one; anything the engine does not model is forwarded
/// unmodified.
extern "C" fn filter_tap_callback(
    _proxy: CGEventTapProxy,
    event_type: u32,
    event: CGEventRef,
    user_info: *mut c_void,
) -> CGEventRef {
    if user_info.is_null() || event.is_null() {
        return event;
    }
    let context = unsafe { &*(user_info as *const TapContext) };

    if reenable_if_disabled(event_type, context.filter_port.get(), "filter") {
        return event;
    }

    let kind = match event_type {
        CG_EVENT_SCROLL_WHEEL => EventKind::Scroll,
        CG_EVENT_LEFT_MOUSE_DOWN => EventKind::PrimaryDown,
        _ => EventKind::Other,
    };

    // Safety: serial callback invocation on the run-loop thread
    let engine = unsafe { &mut *context.engine.get() };
    let mut view = unsafe { CgEventView::new(event) };
    match engine.dispatch(kind, &mut view) {
        Action::Forward => event,
        Action::Drop => ptr::null(),
    }
}

/// Handle the synthesized tap-disabled events: the OS turns a tap off when
/// its callback is too slow or on certain user input; turn it back on.
fn reenable_if_disabled(event_type: u32, port: CFTypeRef, label: &str) -> bool {
    match event_type {
        CG_EVENT_TAP_DISABLED_BY_TIMEOUT | CG_EVENT_TAP_DISABLED_BY_USER_INPUT => {
            warn!("{label} tap disabled by the OS; re-enabling");
            if !port.is_null() {
                unsafe { CGEventTapEnable(port, true) };
            }
            true
        }
        _ => false,
    }
}

/// Handle to a CFRunLoop, used to stop the blocked run loop from the signal
/// handler thread.
#[derive(Clone, Copy)]
pub struct RunLoopHandle(CFTypeRef);

// Safety: CFRunLoopStop is documented as safe to call from any thread.
unsafe impl Send for RunLoopHandle {}

impl RunLoopHandle {
    /// Handle to the current thread's run loop.
    pub fn current() -> Self {
        Self(unsafe { CFRunLoopGetCurrent() })
    }

    /// Block running the current thread's run loop until stopped.
    pub fn run() {
        unsafe { CFRunLoopRun() }
    }

    /// Stop the referenced run loop. Callable from any thread.
    pub fn stop(&self) {
        unsafe { CFRunLoopStop(self.0) }
    }
}
