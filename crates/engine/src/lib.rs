//! Engine: threads, events and the abstract render pipeline.
//!
//! An [`Application`] runs two threads. The render thread owns the
//! [`RenderContext`] and services the current [`Screen`] whenever a render
//! is requested. The logic thread runs the screen's own event loop, fed by
//! the [`EventQueue`] with a synthesized `Tick` every period.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`event`] | pooled events and the blocking FIFO |
//! | [`application`] | render loop, render requests, screen switching, tick coalescing |
//! | [`renderer`] | [`Renderer`] trait and the [`RendererWithState`] state machine |
//! | [`screen`] | [`Screen`] trait and the logic thread runner |
//! | [`render`] | render context trait, atlases, sprites, tile batcher, software backend |
//! | [`settings`] | `key:value` persistence |
//! | [`config`] | environment configuration |
//! | [`widget`] | tap hit-testing |

pub mod application;
pub mod clock;
pub mod config;
pub mod controls;
pub mod error;
pub mod event;
pub mod platform;
pub mod render;
pub mod renderer;
pub mod screen;
pub mod settings;
pub mod widget;

pub use bombz_types as types;

pub use application::Application;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use controls::{Controls, FixedControls};
pub use error::{EngineError, Result};
pub use event::{EventPool, EventQueue, PooledEvent};
pub use platform::Platform;
pub use render::{
    AtlasId, ContextIndex, HeadlessContext, HeadlessStats, Image, Quad, Rect, RenderContext,
    Rgba, SoftwareCanvas, Sprite, TextureAtlas, TextureRegion, TileBatcher,
};
pub use renderer::{Renderer, RendererWithState};
pub use screen::{handle_context_event, Screen, ScreenRunner};
pub use settings::Settings;
pub use widget::{Widget, WidgetGroup};
