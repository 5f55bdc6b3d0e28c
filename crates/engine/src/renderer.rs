//! Renderer state machine.
//!
//! Any thread may *request* a render state at any time. Only the render
//! thread, in [`RendererWithState::service_render_request`], performs the
//! matching action and advances the current state:
//!
//! | Requested | Action |
//! |-----------|--------|
//! | `Uninitialised` | `delete_rendering` (skipped if nothing was initialised) |
//! | `Initialised` | `init_rendering` |
//! | `Rendering` | `init_rendering` if needed, `render`, then `flip_buffers` |
//! | `Free` | `free_rendering` |
//! | `ReplaceScreen` | `replace_rendering_screen` |
//!
//! `Free` releases what belongs to the current screen only, while
//! `Uninitialised` tears down everything tied to the render context.

use log::{debug, trace};
use parking_lot::{Mutex, MutexGuard};

use crate::error::Result;
use crate::render::RenderContext;
use crate::types::RenderState;

/// Something that draws, and owns render-side resources.
///
/// All methods run on the render thread.
pub trait Renderer: Send {
    /// Create resources. Must tolerate being called again for the same
    /// context (for instance by comparing [`RenderContext::index`]).
    fn init_rendering(&mut self, rc: &mut dyn RenderContext) -> Result<()>;

    fn delete_rendering(&mut self, rc: &mut dyn RenderContext) -> Result<()>;

    fn render(&mut self, rc: &mut dyn RenderContext) -> Result<()>;

    /// Release per-screen resources, keeping shared ones.
    fn free_rendering(&mut self, rc: &mut dyn RenderContext) -> Result<()> {
        self.delete_rendering(rc)
    }

    /// Called on the outgoing screen when another screen takes over.
    fn replace_rendering_screen(&mut self, rc: &mut dyn RenderContext) -> Result<()> {
        self.free_rendering(rc)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct States {
    current: RenderState,
    requested: RenderState,
}

/// A [`Renderer`] plus its current and requested [`RenderState`].
pub struct RendererWithState<R> {
    name: &'static str,
    states: Mutex<States>,
    inner: Mutex<R>,
}

impl<R: Renderer> RendererWithState<R> {
    pub fn new(name: &'static str, inner: R) -> Self {
        Self {
            name,
            states: Mutex::new(States::default()),
            inner: Mutex::new(inner),
        }
    }

    pub fn render_state(&self) -> RenderState {
        self.states.lock().current
    }

    pub fn requested_render_state(&self) -> RenderState {
        self.states.lock().requested
    }

    pub fn request_render_state(&self, state: RenderState) {
        self.states.lock().requested = state;
    }

    /// Lock the wrapped renderer.
    pub fn inner(&self) -> MutexGuard<'_, R> {
        self.inner.lock()
    }

    /// Perform the action for the requested state. Render thread only.
    pub fn service_render_request(&self, rc: &mut dyn RenderContext) -> Result<()> {
        let States { current, requested } = *self.states.lock();
        if current != requested {
            debug!("render: {} {:?} -> {:?}", self.name, current, requested);
        } else {
            trace!("render: {} {:?}", self.name, current);
        }

        let mut inner = self.inner.lock();
        let needs_init = matches!(
            current,
            RenderState::Uninitialised | RenderState::Free | RenderState::ReplaceScreen
        );
        match requested {
            RenderState::Uninitialised => {
                if current != RenderState::Uninitialised {
                    inner.delete_rendering(rc)?;
                }
            }
            RenderState::Initialised => {
                if needs_init {
                    inner.init_rendering(rc)?;
                }
            }
            RenderState::Rendering => {
                if needs_init {
                    inner.init_rendering(rc)?;
                }
                inner.render(rc)?;
                rc.flip_buffers()?;
            }
            RenderState::Free => {
                if !matches!(current, RenderState::Uninitialised | RenderState::Free) {
                    inner.free_rendering(rc)?;
                }
            }
            RenderState::ReplaceScreen => {
                if current != RenderState::ReplaceScreen {
                    inner.replace_rendering_screen(rc)?;
                }
            }
        }
        drop(inner);

        self.states.lock().current = requested;
        Ok(())
    }

    /// Delete whatever is initialised, overriding any pending request.
    /// Render thread only.
    pub fn teardown(&self, rc: &mut dyn RenderContext) -> Result<()> {
        let current = {
            let mut states = self.states.lock();
            states.requested = RenderState::Uninitialised;
            states.current
        };
        if current != RenderState::Uninitialised {
            debug!("render: {} {:?} -> teardown", self.name, current);
            self.inner.lock().delete_rendering(rc)?;
        }
        self.states.lock().current = RenderState::Uninitialised;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessContext;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl Renderer for Recorder {
        fn init_rendering(&mut self, _rc: &mut dyn RenderContext) -> Result<()> {
            self.calls.push("init");
            Ok(())
        }

        fn delete_rendering(&mut self, _rc: &mut dyn RenderContext) -> Result<()> {
            self.calls.push("delete");
            Ok(())
        }

        fn render(&mut self, _rc: &mut dyn RenderContext) -> Result<()> {
            self.calls.push("render");
            Ok(())
        }

        fn free_rendering(&mut self, _rc: &mut dyn RenderContext) -> Result<()> {
            self.calls.push("free");
            Ok(())
        }
    }

    fn service(r: &RendererWithState<Recorder>, rc: &mut HeadlessContext, s: RenderState) {
        r.request_render_state(s);
        r.service_render_request(rc).unwrap();
        assert_eq!(r.render_state(), s);
    }

    #[test_log::test]
    fn rendering_initialises_first() {
        let r = RendererWithState::new("test", Recorder::default());
        let mut rc = HeadlessContext::new(4, 4);
        let stats = rc.stats();
        service(&r, &mut rc, RenderState::Rendering);
        service(&r, &mut rc, RenderState::Rendering);
        assert_eq!(r.inner().calls, ["init", "render", "render"]);
        assert_eq!(stats.lock().flips, 2);
    }

    #[test_log::test]
    fn full_lifecycle() {
        let r = RendererWithState::new("test", Recorder::default());
        let mut rc = HeadlessContext::new(4, 4);
        service(&r, &mut rc, RenderState::Initialised);
        service(&r, &mut rc, RenderState::Rendering);
        service(&r, &mut rc, RenderState::Free);
        service(&r, &mut rc, RenderState::Rendering);
        service(&r, &mut rc, RenderState::ReplaceScreen);
        service(&r, &mut rc, RenderState::Uninitialised);
        assert_eq!(
            r.inner().calls,
            ["init", "render", "free", "init", "render", "free", "delete"]
        );
    }

    #[test_log::test]
    fn teardown_overrides_a_late_request() {
        let r = RendererWithState::new("test", Recorder::default());
        let mut rc = HeadlessContext::new(4, 4);
        service(&r, &mut rc, RenderState::Rendering);
        r.request_render_state(RenderState::ReplaceScreen);
        r.teardown(&mut rc).unwrap();
        assert_eq!(r.render_state(), RenderState::Uninitialised);
        assert_eq!(r.requested_render_state(), RenderState::Uninitialised);
        r.teardown(&mut rc).unwrap();
        assert_eq!(r.inner().calls, ["init", "render", "delete"]);
    }

    #[test_log::test]
    fn deleting_uninitialised_is_a_no_op() {
        let r = RendererWithState::new("test", Recorder::default());
        let mut rc = HeadlessContext::new(4, 4);
        service(&r, &mut rc, RenderState::Uninitialised);
        service(&r, &mut rc, RenderState::Free);
        assert!(r.inner().calls.is_empty());
    }

    #[test_log::test]
    fn request_does_not_advance_current() {
        let r = RendererWithState::new("test", Recorder::default());
        r.request_render_state(RenderState::Rendering);
        assert_eq!(r.render_state(), RenderState::Uninitialised);
        assert_eq!(r.requested_render_state(), RenderState::Rendering);
    }

    #[test_log::test]
    fn failed_action_keeps_current_state() {
        let r = RendererWithState::new("test", Recorder::default());
        let mut rc = HeadlessContext::new(4, 4);
        rc.stats().lock().fail_next_flip = true;
        r.request_render_state(RenderState::Rendering);
        assert!(r.service_render_request(&mut rc).is_err());
        assert_eq!(r.render_state(), RenderState::Uninitialised);
    }
}
