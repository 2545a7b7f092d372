use std::sync::Arc;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::notification::NotificationList;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};
use sdm_session::{AuthSession, SettingsStore, ThemePreference, validate_credentials};
use tokio::runtime::Handle;

use crate::chat::{LogoutClicked, ThemeToggleClicked};
use crate::dashboard::DashboardView;
use crate::login::{LOGIN_TITLE, LoginRequested, LoginView};
use crate::theme::apply_theme;

#[cfg(target_os = "macos")]
const WINDOW_TOOLBAR_LEFT_SAFE_PADDING: f32 = 78.0;
#[cfg(not(target_os = "macos"))]
const WINDOW_TOOLBAR_LEFT_SAFE_PADDING: f32 = 16.0;
#[cfg(target_os = "windows")]
const WINDOW_TOOLBAR_RIGHT_SAFE_PADDING: f32 = 120.0;
#[cfg(not(target_os = "windows"))]
const WINDOW_TOOLBAR_RIGHT_SAFE_PADDING: f32 = 16.0;

/// Top toolbar height, scaled with the user's rem size.
fn window_toolbar_height(window: &Window) -> Pixels {
    (1.75 * window.rem_size()).max(px(34.0))
}

gpui::actions!(shell, [NewChat, ToggleSidebar, Quit,]);

enum Screen {
    Login(Entity<LoginView>),
    Dashboard(Entity<DashboardView>),
}

/// Root view: swaps between the login form and the dashboard.
pub struct AppShell {
    notification_list: Entity<NotificationList>,
    settings: Arc<SettingsStore>,
    runtime: Handle,
    auth: AuthSession,
    theme: ThemePreference,
    screen: Screen,
    title_bar_should_move: bool,
}

impl AppShell {
    pub fn new(
        notification_list: Entity<NotificationList>,
        settings: Arc<SettingsStore>,
        runtime: Handle,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let theme = settings.settings().theme_mode;
        let screen = Screen::Login(Self::build_login(window, cx));

        Self {
            notification_list,
            settings,
            runtime,
            auth: AuthSession::new(),
            theme,
            screen,
            title_bar_should_move: false,
        }
    }

    fn build_login(window: &mut Window, cx: &mut Context<Self>) -> Entity<LoginView> {
        let login = cx.new(|cx| LoginView::new(window, cx));
        cx.subscribe_in(
            &login,
            window,
            |this, _, event: &LoginRequested, window, cx| {
                this.handle_login(event, window, cx);
            },
        )
        .detach();
        login
    }

    fn handle_login(&mut self, event: &LoginRequested, window: &mut Window, cx: &mut Context<Self>) {
        if let Err(error) = validate_credentials(&mut self.auth, &event.username, &event.password) {
            if let Screen::Login(login) = &self.screen {
                login.update(cx, |login, cx| login.set_error(error.to_string(), cx));
            }
            return;
        }

        let username = self.auth.username().to_string();
        let settings = self.settings.clone();
        let runtime = self.runtime.clone();
        let dashboard =
            cx.new(|cx| DashboardView::new(username, settings, runtime, window, cx));

        cx.subscribe_in(
            &dashboard,
            window,
            |this, _, _: &ThemeToggleClicked, window, cx| {
                this.toggle_theme(window, cx);
            },
        )
        .detach();
        cx.subscribe_in(
            &dashboard,
            window,
            |this, _, _: &LogoutClicked, window, cx| {
                this.logout(window, cx);
            },
        )
        .detach();

        self.screen = Screen::Dashboard(dashboard);
        cx.notify();
    }

    /// Drops the dashboard, and with it the session manager and any pending reply.
    fn logout(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.auth.logout();
        self.screen = Screen::Login(Self::build_login(window, cx));
        cx.notify();
    }

    fn toggle_theme(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.theme = self.theme.toggle();
        let theme = self.theme;
        if let Err(error) = self.settings.modify(|settings| settings.theme_mode = theme) {
            tracing::warn!(%error, "failed to persist theme");
        }
        apply_theme(theme, Some(window), cx);

        if let Screen::Dashboard(dashboard) = &self.screen {
            dashboard.update(cx, |dashboard, cx| dashboard.set_theme(theme, cx));
        }
        cx.notify();
    }

    fn new_chat(&mut self, cx: &mut Context<Self>) {
        if let Screen::Dashboard(dashboard) = &self.screen {
            dashboard.update(cx, |dashboard, cx| dashboard.new_chat(cx));
        }
    }

    fn toggle_sidebar(&mut self, cx: &mut Context<Self>) {
        if let Screen::Dashboard(dashboard) = &self.screen {
            dashboard.update(cx, |dashboard, cx| dashboard.toggle_sidebar(cx));
        }
    }

    fn render_top_bar(
        &self,
        window: &Window,
        toolbar_height: Pixels,
        cx: &Context<Self>,
    ) -> impl IntoElement {
        let theme = cx.theme();
        let signed_in_as = self
            .auth
            .is_authenticated()
            .then(|| SharedString::from(self.auth.username().to_string()));

        h_flex()
            .id("app-top-bar")
            .window_control_area(WindowControlArea::Drag)
            .on_mouse_down_out(cx.listener(|this, _, _window, _cx| {
                this.title_bar_should_move = false;
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, _, _window, _cx| {
                    this.title_bar_should_move = false;
                }),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _, _window, _cx| {
                    this.title_bar_should_move = true;
                }),
            )
            .on_mouse_move(cx.listener(|this, _, window, _cx| {
                if this.title_bar_should_move {
                    this.title_bar_should_move = false;
                    window.start_window_move();
                }
            }))
            .w_full()
            .h(toolbar_height)
            .flex_shrink_0()
            .pl(px(WINDOW_TOOLBAR_LEFT_SAFE_PADDING))
            .pr(px(WINDOW_TOOLBAR_RIGHT_SAFE_PADDING))
            .items_center()
            .justify_between()
            .bg(theme.background)
            .border_b_1()
            .border_color(theme.border)
            .child(
                div()
                    .text_sm()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(theme.foreground)
                    .child(LOGIN_TITLE),
            )
            .child(
                h_flex()
                    .gap_2()
                    .items_center()
                    .when_some(signed_in_as, |bar, username| {
                        bar.child(
                            div()
                                .id("top-bar-username")
                                .px_2()
                                .py_1()
                                .rounded_full()
                                .bg(theme.muted)
                                .border_1()
                                .border_color(theme.border)
                                .text_xs()
                                .text_color(theme.muted_foreground)
                                .child(username),
                        )
                    })
                    .child(self.render_linux_window_controls(window, cx)),
            )
            .when(
                cfg!(target_os = "linux") && window.window_controls().window_menu,
                |title_bar| {
                    title_bar.on_mouse_down(MouseButton::Right, |event, window, _| {
                        window.show_window_menu(event.position);
                    })
                },
            )
    }

    fn render_linux_window_controls(&self, window: &Window, cx: &Context<Self>) -> AnyElement {
        #[cfg(target_os = "linux")]
        {
            let maximize_icon = if window.is_maximized() {
                IconName::WindowRestore
            } else {
                IconName::WindowMaximize
            };

            h_flex()
                .id("linux-window-controls")
                .items_center()
                // Keep control clicks out of the title bar drag and double-click handling.
                .on_mouse_down(MouseButton::Left, |_, _, cx| cx.stop_propagation())
                .on_mouse_down(MouseButton::Right, |_, _, cx| cx.stop_propagation())
                .gap_2()
                .ml_2()
                .child(
                    Button::new("linux-window-minimize")
                        .ghost()
                        .small()
                        .icon(IconName::WindowMinimize)
                        .on_click(cx.listener(|_, _, window, _| {
                            window.minimize_window();
                        })),
                )
                .child(
                    Button::new("linux-window-maximize")
                        .ghost()
                        .small()
                        .icon(maximize_icon)
                        .on_click(cx.listener(|_, _, window, _| {
                            window.zoom_window();
                        })),
                )
                .child(
                    Button::new("linux-window-close")
                        .ghost()
                        .small()
                        .icon(IconName::WindowClose)
                        .on_click(cx.listener(|_, _, window, _| {
                            window.remove_window();
                        })),
                )
                .into_any_element()
        }

        #[cfg(not(target_os = "linux"))]
        {
            let _ = (window, cx);
            div().into_any_element()
        }
    }
}

impl Render for AppShell {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let toolbar_height = window_toolbar_height(window);
        let content = match &self.screen {
            Screen::Login(login) => login.clone().into_any_element(),
            Screen::Dashboard(dashboard) => dashboard.clone().into_any_element(),
        };

        div()
            .id("app-shell")
            .size_full()
            .relative()
            .bg(theme.background)
            .on_action(cx.listener(|this, _: &NewChat, _window, cx| {
                this.new_chat(cx);
            }))
            .on_action(cx.listener(|this, _: &ToggleSidebar, _window, cx| {
                this.toggle_sidebar(cx);
            }))
            .child(
                v_flex()
                    .size_full()
                    .pt(toolbar_height)
                    .min_h_0()
                    .overflow_hidden()
                    .child(content),
            )
            .child(
                div()
                    .absolute()
                    .top_0()
                    .left_0()
                    .right_0()
                    .child(self.render_top_bar(window, toolbar_height, cx)),
            )
            .child(self.notification_list.clone())
    }
}
