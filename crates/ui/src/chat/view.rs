use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme, h_flex, v_flex};
use sdm_session::{SessionId, SessionStore};

use crate::chat::events::Submit;
use crate::chat::{MessageInput, MessageList};

pub const WELCOME_TITLE: &str = "Welcome to SDM GEN-AI";
pub const WELCOME_SUBTITLE: &str =
    "Your intelligent assistant for Service Desk Management analytics and insights.";

const WELCOME_MAX_WIDTH: Pixels = px(720.);

/// A welcome-screen card that sends a fixed prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub title: &'static str,
    pub caption: &'static str,
    pub prompt: &'static str,
}

pub const SUGGESTIONS: [Suggestion; 4] = [
    Suggestion {
        title: "Annual Maintenance Report",
        caption: "View pie charts and bar graphs",
        prompt: "Give SDM PIE chart and bar graph for last annual maintenance",
    },
    Suggestion {
        title: "Incident Trends",
        caption: "Analyze incident patterns",
        prompt: "Show me incident trends",
    },
    Suggestion {
        title: "Top Issues",
        caption: "Identify common problems",
        prompt: "What are the top issues?",
    },
    Suggestion {
        title: "Resolution Report",
        caption: "Review performance metrics",
        prompt: "Generate resolution report",
    },
];

/// Chat pane: welcome screen or transcript, with the input docked below.
pub struct ChatView {
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
    active_session: Option<SessionId>,
    show_welcome: bool,
}

impl EventEmitter<Submit> for ChatView {}

impl ChatView {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let message_list = cx.new(MessageList::new);
        let message_input = cx.new(|cx| MessageInput::new(window, cx));

        cx.subscribe(&message_input, |_, _, event: &Submit, cx| {
            cx.emit(event.clone());
        })
        .detach();

        Self {
            message_list,
            message_input,
            active_session: None,
            show_welcome: true,
        }
    }

    /// Re-renders from a published store snapshot.
    pub fn set_store(&mut self, store: &SessionStore, cx: &mut Context<Self>) {
        let active = store.active_session();
        let active_id = active.map(|session| session.id);
        let session_changed = active_id != self.active_session;
        // The thinking row belongs to the session that is waiting for the reply.
        let thinking = store
            .pending_reply()
            .is_some_and(|pending| Some(pending.session_id) == active_id);
        let messages = active.map(|session| session.messages.as_slice()).unwrap_or(&[]);

        self.active_session = active_id;
        self.show_welcome = should_show_welcome(messages.len(), thinking);
        self.message_list.update(cx, |list, cx| {
            list.set_messages(messages, thinking, session_changed, cx);
        });
        let pending = store.is_pending();
        self.message_input.update(cx, |input, cx| {
            input.set_pending(pending, cx);
        });
        cx.notify();
    }

    fn render_welcome(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("chat-welcome")
            .size_full()
            .items_center()
            .justify_center()
            .overflow_y_scroll()
            .p_6()
            .child(
                v_flex()
                    .w_full()
                    .max_w(WELCOME_MAX_WIDTH)
                    .gap_6()
                    .items_center()
                    .child(
                        div()
                            .text_2xl()
                            .font_weight(FontWeight::BOLD)
                            .text_color(theme.foreground)
                            .child(WELCOME_TITLE),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child(WELCOME_SUBTITLE),
                    )
                    .child(
                        h_flex()
                            .w_full()
                            .flex_wrap()
                            .gap_3()
                            .justify_center()
                            .children(
                                SUGGESTIONS
                                    .iter()
                                    .enumerate()
                                    .map(|(index, suggestion)| {
                                        self.render_suggestion(index, *suggestion, cx)
                                    }),
                            ),
                    ),
            )
    }

    fn render_suggestion(
        &self,
        index: usize,
        suggestion: Suggestion,
        cx: &Context<Self>,
    ) -> impl IntoElement {
        let theme = cx.theme();
        let hover_bg = theme.muted;

        v_flex()
            .id(("suggestion", index))
            .w(px(300.))
            .gap_1()
            .p_4()
            .rounded_lg()
            .border_1()
            .border_color(theme.border)
            .bg(theme.background)
            .cursor_pointer()
            .hover(move |style| style.bg(hover_bg))
            .child(
                div()
                    .text_sm()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(theme.foreground)
                    .child(suggestion.title),
            )
            .child(
                div()
                    .text_xs()
                    .text_color(theme.muted_foreground)
                    .child(suggestion.caption),
            )
            .on_click(cx.listener(move |_, _, _, cx| {
                cx.emit(Submit::new(suggestion.prompt));
            }))
    }
}

impl Render for ChatView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let show_welcome = self.show_welcome;

        v_flex()
            .id("chat-view")
            .relative()
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(
                div()
                    .id("chat-view-body")
                    .flex_1()
                    .min_h_0()
                    .when(show_welcome, |body| body.child(self.render_welcome(cx)))
                    .when(!show_welcome, |body| body.child(self.message_list.clone())),
            )
            .child(
                div()
                    .id("chat-view-message-input")
                    .flex_shrink_0()
                    .w_full()
                    .border_t_1()
                    .border_color(theme.border)
                    .child(self.message_input.clone()),
            )
    }
}

fn should_show_welcome(message_count: usize, thinking: bool) -> bool {
    message_count == 0 && !thinking
}

#[cfg(test)]
mod tests {
    use sdm_session::{ReplyPlan, classify};

    use super::*;

    #[::core::prelude::v1::test]
    fn welcome_only_for_an_idle_empty_chat() {
        assert!(should_show_welcome(0, false));
        assert!(!should_show_welcome(0, true));
        assert!(!should_show_welcome(2, false));
    }

    #[::core::prelude::v1::test]
    fn each_suggestion_maps_to_its_reply() {
        let plans = SUGGESTIONS.map(|suggestion| classify(suggestion.prompt));

        assert_eq!(
            plans,
            [
                ReplyPlan::Chart,
                ReplyPlan::Trends,
                ReplyPlan::TopIssues,
                ReplyPlan::ResolutionPerformance,
            ]
        );
    }
}
