use gpui::*;
use gpui_component::{
    ActiveTheme, Disableable, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
    v_flex,
};

use crate::chat::events::Submit;

pub const INPUT_PLACEHOLDER: &str = "Ask about SDM analytics, reports, or incidents...";
const INPUT_HINT: &str = "Press Enter to send, Shift+Enter for new line";

pub struct MessageInput {
    input_state: Entity<InputState>,
    is_pending: bool,
    pending_newline: bool,
}

impl EventEmitter<Submit> for MessageInput {}

impl MessageInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder(INPUT_PLACEHOLDER)
                .clean_on_escape()
                .auto_grow(1, 6)
        });

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, window, cx| {
                if let InputEvent::PressEnter { secondary } = event {
                    if *secondary {
                        this.pending_newline = false;
                        return;
                    }

                    if this.pending_newline {
                        // Shift+Enter already inserted the newline; swallow its PressEnter.
                        this.pending_newline = false;
                    } else {
                        this.trim_trailing_newline(window, cx);
                        this.handle_submit(window, cx);
                    }
                }
            },
        )
        .detach();

        Self {
            input_state,
            is_pending: false,
            pending_newline: false,
        }
    }

    /// Locks the input while a reply is in flight.
    pub fn set_pending(&mut self, pending: bool, cx: &mut Context<Self>) {
        if self.is_pending == pending {
            return;
        }
        self.is_pending = pending;
        if !pending {
            self.pending_newline = false;
        }
        cx.notify();
    }

    pub fn clear(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
        self.pending_newline = false;
    }

    fn handle_shift_enter(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.is_pending {
            return;
        }

        self.pending_newline = true;
        self.input_state.update(cx, |state, cx| {
            state.insert("\n", window, cx);
        });
        cx.notify();
    }

    fn trim_trailing_newline(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            let value = state.value().to_string();
            if let Some(trimmed) = value.strip_suffix('\n') {
                state.set_value(trimmed.to_string(), window, cx);
            }
        });
    }

    fn handle_submit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.is_pending {
            return;
        }

        let value = self.input_state.read(cx).value().to_string();
        let Some(content) = submittable(&value) else {
            return;
        };

        cx.emit(Submit::new(content));
        self.clear(window, cx);
    }
}

impl Render for MessageInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let is_pending = self.is_pending;

        v_flex()
            .bg(theme.background)
            .gap_1()
            .p_3()
            .child(
                h_flex()
                    .w_full()
                    .gap_2()
                    .items_end()
                    .px_3()
                    .py_2()
                    .rounded_lg()
                    .border_1()
                    .border_color(theme.border)
                    .bg(theme.background)
                    .on_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                        if event.keystroke.key == "enter" && event.keystroke.modifiers.shift {
                            this.handle_shift_enter(window, cx);
                        }
                    }))
                    .child(
                        div().flex_1().min_w_0().child(
                            Input::new(&self.input_state)
                                .w_full()
                                .disabled(is_pending),
                        ),
                    )
                    .child(
                        Button::new("send")
                            .small()
                            .primary()
                            .icon(IconName::ArrowUp)
                            .disabled(is_pending)
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.handle_submit(window, cx);
                            })),
                    ),
            )
            .child(
                div()
                    .w_full()
                    .flex()
                    .justify_center()
                    .text_xs()
                    .text_color(theme.muted_foreground)
                    .child(INPUT_HINT),
            )
    }
}

/// Trimmed prompt, or `None` when there is nothing to send.
pub fn submittable(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn blank_input_is_not_submitted() {
        assert_eq!(submittable("   \n\t"), None);
        assert_eq!(submittable(""), None);
    }

    #[::core::prelude::v1::test]
    fn submitted_prompt_is_trimmed() {
        assert_eq!(
            submittable("  Show me incident trends\n"),
            Some("Show me incident trends".to_string())
        );
        assert_eq!(submittable("line one\nline two"), Some("line one\nline two".to_string()));
    }
}
