//! Tap targets.
//!
//! A [`WidgetGroup`] maps taps in screen pixels to an action value. Areas are
//! set on the render thread once sprite positions are known, and read on the
//! logic thread when a `Tap` arrives, so the group is usually kept behind a
//! mutex by its owner.

use crate::render::Rect;

#[derive(Debug, Clone, PartialEq)]
pub struct Widget<A> {
    pub action: A,
    pub area: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetGroup<A> {
    widgets: Vec<Widget<A>>,
}

impl<A> Default for WidgetGroup<A> {
    fn default() -> Self {
        Self {
            widgets: Vec::new(),
        }
    }
}

impl<A: Copy + PartialEq> WidgetGroup<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a widget with an empty area.
    pub fn add(&mut self, action: A) {
        self.widgets.push(Widget {
            action,
            area: Rect::default(),
        });
    }

    /// Set the sensitive area of the widget for `action`.
    pub fn set_area(&mut self, action: A, area: Rect) {
        if let Some(w) = self.widgets.iter_mut().find(|w| w.action == action) {
            w.area = area;
        }
    }

    /// First widget containing the point, in insertion order.
    pub fn hit(&self, x: i32, y: i32) -> Option<A> {
        self.widgets
            .iter()
            .find(|w| w.area.contains(x, y))
            .map(|w| w.action)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Widget<A>> {
        self.widgets.iter()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Forget all areas, for instance when the context goes away.
    pub fn clear_areas(&mut self) {
        for w in &mut self.widgets {
            w.area = Rect::default();
        }
    }
}
