//! Terminal render backend.
//!
//! Implements [`RenderContext`](bombz_engine::RenderContext) on top of a
//! terminal. Drawing goes to a [`SoftwareCanvas`](bombz_engine::SoftwareCanvas);
//! on every buffer flip the canvas is folded into a framebuffer of character
//! cells and only the cells that changed since the previous frame are written.
//!
//! Each cell shows two pixels stacked vertically with the upper half block
//! `▀`: the foreground colour is the top pixel, the background the bottom one.
//! A terminal of `cols × rows` cells is therefore a `cols × 2·rows` pixel
//! surface.

pub mod context;
pub mod fb;
pub mod renderer;

pub use bombz_types as types;

pub use context::TermRenderContext;
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
