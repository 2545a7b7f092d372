use std::rc::Rc;

use gpui::*;
use gpui_component::{
    ActiveTheme, Icon, IconName, Sizable, VirtualListScrollHandle,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
    label::Label,
    list::ListItem,
    v_flex, v_virtual_list,
};
use sdm_session::types::unix_now_seconds;
use sdm_session::{SessionId, SessionStore, ThemePreference};

use crate::chat::events::{
    LogoutClicked, NewChatClicked, SessionSelected, SidebarToggleClicked, ThemeToggleClicked,
};

const GROUP_HEADER_HEIGHT: f32 = 26.0;
const SESSION_ROW_HEIGHT: f32 = 40.0;
const DAY_SECONDS: u64 = 60 * 60 * 24;
/// Longer titles are cut and suffixed with an ellipsis in the list.
pub const SIDEBAR_TITLE_MAX_CHARS: usize = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionAgeGroup {
    Today,
    Yesterday,
    Older,
}

/// What the sidebar needs from one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub title: String,
    pub created_at_unix_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SidebarListItem {
    GroupHeader(&'static str),
    Session(SessionSummary),
}

pub struct ChatSidebar {
    search_input: Entity<InputState>,
    search_query: String,
    sessions: Vec<SessionSummary>,
    active_session: Option<SessionId>,
    username: SharedString,
    theme: ThemePreference,
    flat_items: Vec<SidebarListItem>,
    item_sizes: Rc<Vec<Size<Pixels>>>,
    scroll_handle: VirtualListScrollHandle,
}

impl EventEmitter<SessionSelected> for ChatSidebar {}
impl EventEmitter<NewChatClicked> for ChatSidebar {}
impl EventEmitter<SidebarToggleClicked> for ChatSidebar {}
impl EventEmitter<ThemeToggleClicked> for ChatSidebar {}
impl EventEmitter<LogoutClicked> for ChatSidebar {}

impl ChatSidebar {
    pub fn new(
        username: impl Into<SharedString>,
        theme: ThemePreference,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let search_input = cx.new(|cx| InputState::new(window, cx).placeholder("Search chats"));

        cx.subscribe_in(
            &search_input,
            window,
            |this, _, _event: &InputEvent, _window, cx| {
                this.search_query = this.search_input.read(cx).value().to_string();
                this.rebuild_flat_items();
                cx.notify();
            },
        )
        .detach();

        Self {
            search_input,
            search_query: String::new(),
            sessions: Vec::new(),
            active_session: None,
            username: username.into(),
            theme,
            flat_items: Vec::new(),
            item_sizes: Rc::new(Vec::new()),
            scroll_handle: VirtualListScrollHandle::new(),
        }
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.active_session
    }

    /// Mirrors the session list of a store snapshot.
    pub fn sync_from_store(&mut self, store: &SessionStore, cx: &mut Context<Self>) {
        let sessions = store
            .sessions()
            .iter()
            .map(|session| SessionSummary {
                id: session.id,
                title: session.title.clone(),
                created_at_unix_seconds: session.created_at_unix_seconds,
            })
            .collect::<Vec<_>>();
        let active_session = store.active_session_id();

        if sessions == self.sessions && active_session == self.active_session {
            return;
        }

        self.sessions = sessions;
        self.active_session = active_session;
        self.rebuild_flat_items();
        cx.notify();
    }

    pub fn set_theme(&mut self, theme: ThemePreference, cx: &mut Context<Self>) {
        self.theme = theme;
        cx.notify();
    }

    fn select_session(&mut self, session_id: SessionId, cx: &mut Context<Self>) {
        cx.emit(SessionSelected { session_id });
    }

    fn rebuild_flat_items(&mut self) {
        let flat_items = group_sessions(&self.sessions, &self.search_query, unix_now_seconds());
        let item_sizes = flat_items
            .iter()
            .map(|item| match item {
                SidebarListItem::GroupHeader(_) => size(px(0.), px(GROUP_HEADER_HEIGHT)),
                SidebarListItem::Session(_) => size(px(0.), px(SESSION_ROW_HEIGHT)),
            })
            .collect();

        self.flat_items = flat_items;
        self.item_sizes = Rc::new(item_sizes);
    }

    fn render_header(&mut self, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .w_full()
            .min_w_0()
            .gap_2()
            .px_3()
            .pt(px(8.))
            .pb_2()
            .child(
                h_flex()
                    .w_full()
                    .items_center()
                    .justify_between()
                    .child(
                        h_flex()
                            .gap_2()
                            .items_center()
                            .child(
                                Icon::new(IconName::Star)
                                    .size(px(16.))
                                    .text_color(theme.primary),
                            )
                            .child(
                                div()
                                    .text_base()
                                    .font_weight(FontWeight::SEMIBOLD)
                                    .text_color(theme.foreground)
                                    .child("SDM AI"),
                            ),
                    )
                    .child(
                        Button::new("sidebar-toggle")
                            .ghost()
                            .small()
                            .icon(IconName::PanelLeftClose)
                            .on_click(cx.listener(|_, _, _, cx| {
                                cx.emit(SidebarToggleClicked);
                            })),
                    ),
            )
            .child(
                Button::new("new-chat")
                    .small()
                    .primary()
                    .w_full()
                    .icon(IconName::Plus)
                    .child("New Chat")
                    .on_click(cx.listener(|_, _, _window, cx| {
                        cx.emit(NewChatClicked);
                    })),
            )
            .child(Input::new(&self.search_input).w_full().small())
    }

    fn render_empty_state(&mut self, cx: &mut Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let message = if self.sessions.is_empty() {
            "No chats yet. Start a new conversation!"
        } else {
            "No chats match your search."
        };

        v_flex()
            .flex_1()
            .items_center()
            .justify_center()
            .px_4()
            .child(
                Label::new(message)
                    .text_sm()
                    .text_color(theme.foreground.opacity(0.55)),
            )
            .into_any_element()
    }

    fn render_history_list(&mut self, cx: &mut Context<Self>) -> AnyElement {
        if self.flat_items.is_empty() {
            return self.render_empty_state(cx);
        }

        let selected = self.active_session;
        let item_sizes = self.item_sizes.clone();
        let items = self.flat_items.clone();

        v_flex()
            .flex_1()
            .min_h_0()
            .child(
                v_virtual_list(
                    cx.entity().clone(),
                    "session-list",
                    item_sizes,
                    move |_this, visible_range, _window, cx| {
                        let theme = cx.theme();

                        visible_range
                            .map(|index| match &items[index] {
                                SidebarListItem::GroupHeader(name) => div()
                                    .w_full()
                                    .h(px(GROUP_HEADER_HEIGHT))
                                    .px_3()
                                    .flex()
                                    .items_center()
                                    .child(
                                        Label::new(*name)
                                            .text_xs()
                                            .text_color(theme.foreground.opacity(0.5)),
                                    )
                                    .into_any_element(),
                                SidebarListItem::Session(session) => {
                                    let session_id = session.id;
                                    let title = display_title(&session.title);
                                    let is_selected = selected == Some(session_id);

                                    div()
                                        .w_full()
                                        .h(px(SESSION_ROW_HEIGHT))
                                        .px_2()
                                        .child(
                                            ListItem::new(("session", index))
                                                .w_full()
                                                .h_full()
                                                .px_3()
                                                .py_2()
                                                .rounded_md()
                                                .selected(is_selected)
                                                .on_click(cx.listener(
                                                    move |this, _event: &ClickEvent, _window, cx| {
                                                        this.select_session(session_id, cx);
                                                    },
                                                ))
                                                .child(
                                                    h_flex()
                                                        .w_full()
                                                        .gap_2()
                                                        .items_center()
                                                        .child(
                                                            Icon::new(IconName::Inbox)
                                                                .size(px(14.))
                                                                .text_color(
                                                                    theme.muted_foreground,
                                                                ),
                                                        )
                                                        .child(
                                                            div()
                                                                .flex_1()
                                                                .min_w_0()
                                                                .truncate()
                                                                .child(
                                                                    Label::new(title).text_sm(),
                                                                ),
                                                        ),
                                                ),
                                        )
                                        .into_any_element()
                                }
                            })
                            .collect()
                    },
                )
                .w_full()
                .flex_1()
                .track_scroll(&self.scroll_handle),
            )
            .into_any_element()
    }

    fn render_footer(&mut self, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let theme_icon = if self.theme.is_dark() {
            IconName::Sun
        } else {
            IconName::Moon
        };

        v_flex()
            .w_full()
            .min_w_0()
            .gap_2()
            .px_3()
            .py_2()
            .border_t_1()
            .border_color(theme.border)
            .child(
                h_flex()
                    .w_full()
                    .min_w_0()
                    .gap_2()
                    .items_center()
                    .px_2()
                    .py_2()
                    .rounded_md()
                    .bg(theme.muted)
                    .child(avatar(&self.username, px(28.), cx))
                    .child(
                        div()
                            .flex_1()
                            .min_w_0()
                            .truncate()
                            .text_sm()
                            .text_color(theme.foreground)
                            .child(self.username.clone()),
                    ),
            )
            .child(
                h_flex()
                    .w_full()
                    .gap_2()
                    .child(
                        Button::new("sidebar-theme-toggle")
                            .ghost()
                            .small()
                            .flex_1()
                            .icon(theme_icon)
                            .child(self.theme.toggle_label())
                            .on_click(cx.listener(|_, _, _, cx| {
                                cx.emit(ThemeToggleClicked);
                            })),
                    )
                    .child(
                        Button::new("sidebar-logout")
                            .ghost()
                            .small()
                            .flex_1()
                            .icon(IconName::ArrowLeft)
                            .child("Logout")
                            .on_click(cx.listener(|_, _, _, cx| {
                                cx.emit(LogoutClicked);
                            })),
                    ),
            )
    }
}

impl Render for ChatSidebar {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .size_full()
            .min_w_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(self.render_header(cx))
            .child(self.render_history_list(cx))
            .child(self.render_footer(cx))
    }
}

/// Round badge with the upper-cased first letter of the username.
pub fn avatar(username: &str, diameter: Pixels, cx: &App) -> Div {
    let theme = cx.theme();

    div()
        .size(diameter)
        .flex_shrink_0()
        .rounded_full()
        .bg(theme.primary)
        .flex()
        .items_center()
        .justify_center()
        .text_xs()
        .font_weight(FontWeight::SEMIBOLD)
        .text_color(theme.primary_foreground)
        .child(username_initial(username))
}

pub fn username_initial(username: &str) -> String {
    username
        .chars()
        .next()
        .map(|initial| initial.to_uppercase().collect())
        .unwrap_or_default()
}

/// Title as listed: at most [`SIDEBAR_TITLE_MAX_CHARS`] characters, then `...`.
pub fn display_title(title: &str) -> String {
    if title.chars().count() <= SIDEBAR_TITLE_MAX_CHARS {
        return title.to_string();
    }

    let mut shortened: String = title.chars().take(SIDEBAR_TITLE_MAX_CHARS).collect();
    shortened.push_str("...");
    shortened
}

fn group_sessions(
    sessions: &[SessionSummary],
    query: &str,
    now_unix_seconds: u64,
) -> Vec<SidebarListItem> {
    let normalized_query = query.trim().to_lowercase();

    let mut today_items = Vec::new();
    let mut yesterday_items = Vec::new();
    let mut older_items = Vec::new();

    // Store order (newest first) is preserved within each group.
    for session in sessions {
        if !matches_query(session, &normalized_query) {
            continue;
        }

        match classify_group(session.created_at_unix_seconds, now_unix_seconds) {
            SessionAgeGroup::Today => today_items.push(session.clone()),
            SessionAgeGroup::Yesterday => yesterday_items.push(session.clone()),
            SessionAgeGroup::Older => older_items.push(session.clone()),
        }
    }

    let mut flat_items = Vec::new();
    append_group(&mut flat_items, "Today", today_items);
    append_group(&mut flat_items, "Yesterday", yesterday_items);
    append_group(&mut flat_items, "Older", older_items);
    flat_items
}

fn append_group(
    flat_items: &mut Vec<SidebarListItem>,
    title: &'static str,
    sessions: Vec<SessionSummary>,
) {
    if sessions.is_empty() {
        return;
    }

    flat_items.push(SidebarListItem::GroupHeader(title));
    flat_items.extend(sessions.into_iter().map(SidebarListItem::Session));
}

fn matches_query(session: &SessionSummary, normalized_query: &str) -> bool {
    if normalized_query.is_empty() {
        return true;
    }

    session.title.to_lowercase().contains(normalized_query)
}

fn classify_group(created_at_unix_seconds: u64, now_unix_seconds: u64) -> SessionAgeGroup {
    let age_seconds = now_unix_seconds.saturating_sub(created_at_unix_seconds);

    // Elapsed-time buckets keep grouping independent of the local timezone.
    if age_seconds < DAY_SECONDS {
        SessionAgeGroup::Today
    } else if age_seconds < DAY_SECONDS * 2 {
        SessionAgeGroup::Yesterday
    } else {
        SessionAgeGroup::Older
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(title: &str, created_at_unix_seconds: u64) -> SessionSummary {
        SessionSummary {
            id: SessionId::new_v7(),
            title: title.to_string(),
            created_at_unix_seconds,
        }
    }

    fn titles(items: &[SidebarListItem]) -> Vec<String> {
        items
            .iter()
            .map(|item| match item {
                SidebarListItem::GroupHeader(name) => format!("# {name}"),
                SidebarListItem::Session(session) => session.title.clone(),
            })
            .collect()
    }

    #[::core::prelude::v1::test]
    fn long_titles_get_an_ellipsis() {
        let title = "Give SDM PIE chart and bar graph for last annual maintenance";
        let shown = display_title(title);
        assert_eq!(shown, "Give SDM PIE chart and bar graph fo...");
        assert_eq!(display_title("Show me incident trends"), "Show me incident trends");
        assert_eq!(display_title(&"a".repeat(35)), "a".repeat(35));
    }

    #[::core::prelude::v1::test]
    fn sessions_are_grouped_by_age() {
        let now = 10 * DAY_SECONDS;
        let sessions = vec![
            summary("fresh", now - 10),
            summary("last night", now - DAY_SECONDS - 5),
            summary("ancient", now - 5 * DAY_SECONDS),
            summary("also fresh", now - 20),
        ];

        let items = group_sessions(&sessions, "", now);
        assert_eq!(
            titles(&items),
            vec![
                "# Today",
                "fresh",
                "also fresh",
                "# Yesterday",
                "last night",
                "# Older",
                "ancient"
            ]
        );
    }

    #[::core::prelude::v1::test]
    fn search_is_case_insensitive_and_drops_empty_groups() {
        let now = 10 * DAY_SECONDS;
        let sessions = vec![
            summary("Show me incident TRENDS", now),
            summary("What are the top issues?", now - 3 * DAY_SECONDS),
        ];

        let items = group_sessions(&sessions, "  trends ", now);
        assert_eq!(titles(&items), vec!["# Today", "Show me incident TRENDS"]);
        assert!(group_sessions(&sessions, "nothing like this", now).is_empty());
    }

    #[::core::prelude::v1::test]
    fn initial_is_uppercased() {
        assert_eq!(username_initial("alice"), "A");
        assert_eq!(username_initial(""), "");
    }
}
