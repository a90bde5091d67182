use std::time::{Duration, Instant};

/// How long a short notification stays on screen.
pub const SHORT: Duration = Duration::from_secs(2);

/// Fire-and-forget user-facing messages.
pub trait Notifier {
    fn notify(&mut self, text: &str);
}

pub struct Toast {
    pub text: String,
    pub expires_at: Instant,
}

#[derive(Default)]
pub struct Toasts {
    items: Vec<Toast>,
}

impl Toasts {
    pub fn push_at(&mut self, text: &str, now: Instant, duration: Duration) {
        self.items.push(Toast {
            text: text.to_string(),
            expires_at: now + duration,
        });
    }

    /// Drops expired toasts.
    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|toast| toast.expires_at > now);
    }

    pub fn active(&self) -> &[Toast] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn show(&self, ctx: &egui::Context) {
        if self.items.is_empty() {
            return;
        }

        egui::Area::new("toasts")
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -80.0))
            .interactable(false)
            .show(ctx, |ui| {
                for toast in self.active() {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(&toast.text);
                    });
                }
            });
    }
}

impl Notifier for Toasts {
    fn notify(&mut self, text: &str) {
        tracing::debug!(text, "showing toast");
        self.push_at(text, Instant::now(), SHORT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_their_duration() {
        let mut toasts = Toasts::default();
        let start = Instant::now();
        toasts.push_at("Location not found", start, SHORT);
        toasts.push_at("later", start + Duration::from_secs(1), SHORT);

        toasts.prune(start + Duration::from_millis(1999));
        assert_eq!(toasts.active().len(), 2);

        toasts.prune(start + SHORT);
        assert_eq!(toasts.active().len(), 1);
        assert_eq!(toasts.active()[0].text, "later");

        toasts.prune(start + Duration::from_secs(3));
        assert!(toasts.is_empty());
    }

    #[test]
    fn notify_queues_a_short_toast() {
        let mut toasts = Toasts::default();
        toasts.notify("Geocoding failed");
        assert_eq!(toasts.active().len(), 1);
        assert!(toasts.active()[0].expires_at > Instant::now());
    }
}
