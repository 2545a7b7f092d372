use std::sync::Arc;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    v_flex,
};
use sdm_session::{SessionManager, SessionStore, SettingsStore, ThemePreference};
use tokio::runtime::Handle;

use crate::chat::sidebar::avatar;
use crate::chat::{
    ChatSidebar, ChatView, LogoutClicked, NewChatClicked, SessionSelected, SidebarToggleClicked,
    Submit, ThemeToggleClicked,
};

/// Default sidebar width when expanded.
pub const SIDEBAR_DEFAULT_WIDTH: f32 = 260.0;
/// Minimum allowed sidebar width.
pub const SIDEBAR_MIN_WIDTH: f32 = 200.0;
/// Maximum allowed sidebar width.
pub const SIDEBAR_MAX_WIDTH: f32 = 400.0;
pub const SIDEBAR_COLLAPSED_WIDTH: f32 = 56.0;
const _: () = {
    assert!(SIDEBAR_COLLAPSED_WIDTH > 0.0);
    assert!(SIDEBAR_MIN_WIDTH < SIDEBAR_DEFAULT_WIDTH);
    assert!(SIDEBAR_DEFAULT_WIDTH < SIDEBAR_MAX_WIDTH);
};

/// Clamps a drag position to the allowed sidebar width range.
pub fn compute_sidebar_width(drag_x: f32) -> f32 {
    drag_x.clamp(SIDEBAR_MIN_WIDTH, SIDEBAR_MAX_WIDTH)
}

#[derive(Clone)]
struct SidebarResizeDrag;

struct EmptyDragView;

impl Render for EmptyDragView {
    fn render(&mut self, _: &mut Window, _: &mut Context<Self>) -> impl IntoElement {
        div()
    }
}

/// Signed-in screen: sidebar plus chat pane, driven by one [`SessionManager`].
///
/// Dropping the view drops the manager, which cancels any pending reply.
pub struct DashboardView {
    manager: SessionManager,
    settings: Arc<SettingsStore>,
    sidebar: Entity<ChatSidebar>,
    chat_view: Entity<ChatView>,
    username: SharedString,
    theme: ThemePreference,
    sidebar_collapsed: bool,
    sidebar_width: f32,
    _store_task: Task<()>,
}

impl EventEmitter<ThemeToggleClicked> for DashboardView {}
impl EventEmitter<LogoutClicked> for DashboardView {}

impl DashboardView {
    pub fn new(
        username: impl Into<SharedString>,
        settings: Arc<SettingsStore>,
        runtime: Handle,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let username = username.into();
        let current = settings.settings();
        let manager = SessionManager::new(current.manager_config(), runtime);
        let theme = current.theme_mode;

        let sidebar = cx.new(|cx| ChatSidebar::new(username.clone(), theme, window, cx));
        let chat_view = cx.new(|cx| ChatView::new(window, cx));

        cx.subscribe(&sidebar, |this, _, event: &SessionSelected, cx| {
            this.select_session(*event, cx);
        })
        .detach();
        cx.subscribe(&sidebar, |this, _, _: &NewChatClicked, cx| {
            this.new_chat(cx);
        })
        .detach();
        cx.subscribe(&sidebar, |this, _, _: &SidebarToggleClicked, cx| {
            this.toggle_sidebar(cx);
        })
        .detach();
        cx.subscribe(&sidebar, |_, _, _: &ThemeToggleClicked, cx| {
            cx.emit(ThemeToggleClicked);
        })
        .detach();
        cx.subscribe(&sidebar, |_, _, _: &LogoutClicked, cx| {
            cx.emit(LogoutClicked);
        })
        .detach();
        cx.subscribe(&chat_view, |this, _, event: &Submit, cx| {
            this.send_message(&event.content, cx);
        })
        .detach();

        let mut updates = manager.subscribe();
        let store_task = cx.spawn(async move |this, cx| {
            while updates.changed().await.is_ok() {
                let snapshot = updates.borrow_and_update().clone();
                let applied = this.update(cx, |this, cx| {
                    this.apply_snapshot(&snapshot, cx);
                });
                if applied.is_err() {
                    break;
                }
            }
        });

        let mut this = Self {
            manager,
            settings,
            sidebar,
            chat_view,
            username,
            theme,
            sidebar_collapsed: current.sidebar_collapsed,
            sidebar_width: SIDEBAR_DEFAULT_WIDTH,
            _store_task: store_task,
        };
        let initial = this.manager.snapshot();
        this.apply_snapshot(&initial, cx);
        this
    }

    pub fn new_chat(&mut self, cx: &mut Context<Self>) {
        self.manager.create_session();
        self.refresh(cx);
    }

    pub fn toggle_sidebar(&mut self, cx: &mut Context<Self>) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        let collapsed = self.sidebar_collapsed;
        if let Err(error) = self
            .settings
            .modify(|settings| settings.sidebar_collapsed = collapsed)
        {
            tracing::warn!(%error, "failed to persist sidebar state");
        }
        cx.notify();
    }

    pub fn set_theme(&mut self, theme: ThemePreference, cx: &mut Context<Self>) {
        self.theme = theme;
        self.sidebar
            .update(cx, |sidebar, cx| sidebar.set_theme(theme, cx));
        cx.notify();
    }

    fn select_session(&mut self, event: SessionSelected, cx: &mut Context<Self>) {
        if let Err(error) = self.manager.select_session(event.session_id) {
            tracing::warn!(%error, "session selection rejected");
            return;
        }
        self.refresh(cx);
    }

    fn send_message(&mut self, content: &str, cx: &mut Context<Self>) {
        match self.manager.send_message(content) {
            Ok(receipt) => {
                tracing::debug!(session_id = %receipt.session_id, "prompt submitted");
                self.refresh(cx);
            }
            Err(error) => tracing::warn!(%error, "prompt rejected"),
        }
    }

    /// Applies the current state right away instead of waiting for the watch loop.
    fn refresh(&mut self, cx: &mut Context<Self>) {
        let snapshot = self.manager.snapshot();
        self.apply_snapshot(&snapshot, cx);
    }

    fn apply_snapshot(&mut self, store: &SessionStore, cx: &mut Context<Self>) {
        self.sidebar
            .update(cx, |sidebar, cx| sidebar.sync_from_store(store, cx));
        self.chat_view
            .update(cx, |chat_view, cx| chat_view.set_store(store, cx));
        cx.notify();
    }

    fn resize_sidebar(&mut self, new_width: f32, cx: &mut Context<Self>) {
        self.sidebar_width = compute_sidebar_width(new_width);
        cx.notify();
    }

    fn render_collapsed_sidebar(&self, cx: &Context<Self>) -> AnyElement {
        let theme_icon = if self.theme.is_dark() {
            IconName::Sun
        } else {
            IconName::Moon
        };

        v_flex()
            .id("collapsed-sidebar")
            .size_full()
            .items_center()
            .justify_between()
            .py_3()
            .px_2()
            .child(
                v_flex()
                    .items_center()
                    .gap_2()
                    .child(
                        Button::new("sidebar-expand")
                            .ghost()
                            .small()
                            .icon(IconName::PanelLeftOpen)
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.toggle_sidebar(cx);
                            })),
                    )
                    .child(
                        Button::new("new-chat-collapsed")
                            .ghost()
                            .small()
                            .icon(IconName::Plus)
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.new_chat(cx);
                            })),
                    ),
            )
            .child(
                v_flex()
                    .items_center()
                    .gap_2()
                    .child(
                        Button::new("theme-toggle-collapsed")
                            .ghost()
                            .small()
                            .icon(theme_icon)
                            .on_click(cx.listener(|_, _, _window, cx| {
                                cx.emit(ThemeToggleClicked);
                            })),
                    )
                    .child(avatar(&self.username, px(28.), cx))
                    .child(
                        Button::new("logout-collapsed")
                            .ghost()
                            .small()
                            .icon(IconName::ArrowLeft)
                            .on_click(cx.listener(|_, _, _window, cx| {
                                cx.emit(LogoutClicked);
                            })),
                    ),
            )
            .into_any_element()
    }

    fn render_sidebar(&self, cx: &Context<Self>) -> impl IntoElement {
        let sidebar_width = if self.sidebar_collapsed {
            SIDEBAR_COLLAPSED_WIDTH
        } else {
            self.sidebar_width
        };
        let sidebar_content = if self.sidebar_collapsed {
            self.render_collapsed_sidebar(cx)
        } else {
            self.sidebar.clone().into_any_element()
        };
        let theme = cx.theme();

        div()
            .id("sidebar-container")
            .h_full()
            .min_w_0()
            .flex_shrink_0()
            .w(px(sidebar_width))
            .overflow_hidden()
            .bg(theme.background)
            .border_r_1()
            .border_color(theme.border)
            .child(sidebar_content)
    }

    fn render_resize_handle(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let hover_color = theme.primary;

        div()
            .id("sidebar-resize-handle")
            .w(px(1.0))
            .h_full()
            .flex_shrink_0()
            .cursor(CursorStyle::ResizeLeftRight)
            .bg(theme.border)
            .hover(move |el| el.bg(hover_color))
            .on_drag(SidebarResizeDrag, |_, _, _, cx| cx.new(|_| EmptyDragView))
            .on_drag_move::<SidebarResizeDrag>(cx.listener(
                |this, event: &DragMoveEvent<SidebarResizeDrag>, _window, cx| {
                    let new_width: f32 = event.event.position.x.into();
                    this.resize_sidebar(new_width, cx);
                },
            ))
    }
}

impl Render for DashboardView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let collapsed = self.sidebar_collapsed;

        div()
            .id("dashboard-body")
            .flex()
            .flex_row()
            .size_full()
            .min_w_0()
            .min_h_0()
            .overflow_hidden()
            .child(self.render_sidebar(cx))
            .when(!collapsed, |el| el.child(self.render_resize_handle(cx)))
            .child(
                v_flex()
                    .id("main-content")
                    .flex_1()
                    .h_full()
                    .min_w_0()
                    .min_h_0()
                    .overflow_hidden()
                    .child(self.chat_view.clone()),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn sidebar_width_is_clamped() {
        assert_eq!(compute_sidebar_width(10.0), SIDEBAR_MIN_WIDTH);
        assert_eq!(compute_sidebar_width(300.0), 300.0);
        assert_eq!(compute_sidebar_width(9_000.0), SIDEBAR_MAX_WIDTH);
    }
}
