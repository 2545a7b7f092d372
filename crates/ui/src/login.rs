use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{
    ActiveTheme, Icon, IconName,
    button::{Button, ButtonVariants},
    input::{Input, InputEvent, InputState},
    label::Label,
    v_flex,
};

pub const LOGIN_TITLE: &str = "SDM GEN-AI Dashboard";
pub const LOGIN_SUBTITLE: &str = "Sign in to access your AI-powered analytics";
const DEMO_CAPTION: &str = "Demo: Use any username and password to login";
const CARD_WIDTH: Pixels = px(380.);

/// The user pressed "Sign In" (or Enter) with the current form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequested {
    pub username: String,
    pub password: String,
}

pub struct LoginView {
    username_input: Entity<InputState>,
    password_input: Entity<InputState>,
    error: Option<SharedString>,
}

impl EventEmitter<LoginRequested> for LoginView {}

impl LoginView {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let username_input =
            cx.new(|cx| InputState::new(window, cx).placeholder("Enter your username"));
        let password_input = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder("Enter your password")
                .masked(true)
        });

        for input in [&username_input, &password_input] {
            cx.subscribe_in(input, window, |this, _, event: &InputEvent, _window, cx| {
                match event {
                    InputEvent::PressEnter { .. } => this.submit(cx),
                    InputEvent::Change => this.clear_error(cx),
                    _ => {}
                }
            })
            .detach();
        }

        Self {
            username_input,
            password_input,
            error: None,
        }
    }

    /// Shows an inline error under the form.
    pub fn set_error(&mut self, message: impl Into<SharedString>, cx: &mut Context<Self>) {
        self.error = Some(message.into());
        cx.notify();
    }

    fn clear_error(&mut self, cx: &mut Context<Self>) {
        if self.error.take().is_some() {
            cx.notify();
        }
    }

    fn submit(&mut self, cx: &mut Context<Self>) {
        let username = self.username_input.read(cx).value().to_string();
        let password = self.password_input.read(cx).value().to_string();
        cx.emit(LoginRequested { username, password });
    }

    fn render_field(
        &self,
        label: &'static str,
        input: &Entity<InputState>,
        cx: &Context<Self>,
    ) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .w_full()
            .gap_1()
            .child(
                Label::new(label)
                    .text_sm()
                    .text_color(theme.foreground),
            )
            .child(Input::new(input).w_full())
    }
}

impl Render for LoginView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let error = self.error.clone();

        v_flex()
            .id("login-view")
            .size_full()
            .items_center()
            .justify_center()
            .bg(theme.muted)
            .child(
                v_flex()
                    .w(CARD_WIDTH)
                    .gap_4()
                    .p_6()
                    .rounded_xl()
                    .border_1()
                    .border_color(theme.border)
                    .bg(theme.background)
                    .shadow_lg()
                    .child(
                        v_flex()
                            .items_center()
                            .gap_2()
                            .child(
                                Icon::new(IconName::Star)
                                    .size(px(32.))
                                    .text_color(theme.primary),
                            )
                            .child(
                                div()
                                    .text_xl()
                                    .font_weight(FontWeight::BOLD)
                                    .text_color(theme.foreground)
                                    .child(LOGIN_TITLE),
                            )
                            .child(
                                div()
                                    .text_sm()
                                    .text_color(theme.muted_foreground)
                                    .child(LOGIN_SUBTITLE),
                            ),
                    )
                    .child(self.render_field("Username", &self.username_input, cx))
                    .child(self.render_field("Password", &self.password_input, cx))
                    .when_some(error, |form, error| {
                        form.child(
                            div()
                                .id("login-error")
                                .w_full()
                                .px_3()
                                .py_2()
                                .rounded_md()
                                .border_1()
                                .border_color(theme.danger)
                                .text_sm()
                                .text_color(theme.danger)
                                .child(error),
                        )
                    })
                    .child(
                        Button::new("sign-in")
                            .primary()
                            .w_full()
                            .child("Sign In")
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.submit(cx);
                            })),
                    )
                    .child(
                        div()
                            .w_full()
                            .flex()
                            .justify_center()
                            .text_xs()
                            .text_color(theme.muted_foreground)
                            .child(DEMO_CAPTION),
                    ),
            )
    }
}
