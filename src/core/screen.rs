//! Screen collaborator: the drawing surface and widgets owned by the interpreter thread.

use crate::core::event::Event;

/// Output side of the bridge. Drawing itself is out of scope here; the bridge only tells the
/// screen when to resize, redraw or flush and hands it events it does not consume itself.
pub trait Screen {
    fn resize(&mut self, width: u32, height: u32);

    fn redraw(&mut self) {}

    /// Push pending drawing to the host. `force` flushes even when nothing changed.
    fn flush(&mut self, _force: bool) {}

    /// Events the dispatcher does not route elsewhere (pointer, focus, char, options...).
    fn handle_event(&mut self, _event: &Event) {}

    /// Canonical key for the active editor widget.
    fn handle_key(&mut self, _key: i32) {}

    fn show_menu(&mut self) {}

    /// Scale the font to `percent` of the host's startup size.
    fn set_font_scale(&mut self, _percent: i32) {}
}

impl<S: Screen + ?Sized> Screen for Box<S> {
    fn resize(&mut self, width: u32, height: u32) {
        (**self).resize(width, height);
    }

    fn redraw(&mut self) {
        (**self).redraw();
    }

    fn flush(&mut self, force: bool) {
        (**self).flush(force);
    }

    fn handle_event(&mut self, event: &Event) {
        (**self).handle_event(event);
    }

    fn handle_key(&mut self, key: i32) {
        (**self).handle_key(key);
    }

    fn show_menu(&mut self) {
        (**self).show_menu();
    }

    fn set_font_scale(&mut self, percent: i32) {
        (**self).set_font_scale(percent);
    }
}
