use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::rc::Rc;

use gpui::*;
use gpui_component::{ActiveTheme, h_flex, label::Label, text::TextView, v_flex, v_virtual_list};
use sdm_session::{ChatMessage, MessageId, MessageRole};

use crate::chat::chart::render_chart_reply;
use crate::chat::scroll_follow::ScrollFollow;
use crate::chat::sidebar::avatar;

pub const ASSISTANT_LABEL: &str = "SDM AI Assistant";
pub const THINKING_LABEL: &str = "Analyzing your request...";

const DEFAULT_CONTENT_WIDTH: Pixels = px(720.);
const LIST_HORIZONTAL_PADDING: Pixels = px(16.);
const USER_BUBBLE_MAX_WIDTH: Pixels = px(560.);
const USER_BUBBLE_PADDING_X: Pixels = px(14.);
const USER_BUBBLE_PADDING_Y: Pixels = px(10.);
const ASSISTANT_HEADER_HEIGHT: Pixels = px(24.);
const ASSISTANT_HEADER_GAP: Pixels = px(8.);
const THINKING_ROW_HEIGHT: Pixels = px(56.);
const CHART_REPLY_HEIGHT: Pixels = px(760.);
const ESTIMATED_LINE_HEIGHT: Pixels = px(20.);
const ESTIMATED_CHAR_WIDTH: f32 = 7.0;
const WIDTH_CHANGE_EPSILON: f32 = 1.0;

/// One virtual-list row.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ListRow {
    Message(ChatMessage),
    Thinking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RowKey {
    Message(MessageId),
    Thinking,
}

impl ListRow {
    fn key(&self) -> RowKey {
        match self {
            Self::Message(message) => RowKey::Message(message.id),
            Self::Thinking => RowKey::Thinking,
        }
    }
}

struct MeasuredRow {
    width_bucket: u32,
    height: Pixels,
    measured: bool,
}

/// Transcript of the active session, plus the thinking row while a reply is pending.
pub struct MessageList {
    rows: Vec<ListRow>,
    item_sizes: Rc<Vec<Size<Pixels>>>,
    heights: HashMap<RowKey, MeasuredRow>,
    content_width: Option<Pixels>,
    scroll: ScrollFollow,
}

impl MessageList {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            rows: Vec::new(),
            item_sizes: Rc::new(Vec::new()),
            heights: HashMap::new(),
            content_width: None,
            scroll: ScrollFollow::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replaces the transcript. `session_changed` jumps to the tail unconditionally.
    pub fn set_messages(
        &mut self,
        messages: &[ChatMessage],
        thinking: bool,
        session_changed: bool,
        cx: &mut Context<Self>,
    ) {
        let rows = build_rows(messages, thinking);
        if rows == self.rows && !session_changed {
            return;
        }

        let grew = rows.len() > self.rows.len();
        self.rows = rows;
        self.rebuild_item_sizes();

        if session_changed {
            self.scroll.jump_to_bottom();
        } else if grew || thinking {
            self.scroll.follow_new_rows();
        }
        cx.notify();
    }

    fn current_width(&self) -> Pixels {
        self.content_width.unwrap_or(DEFAULT_CONTENT_WIDTH)
    }

    fn update_content_width(&mut self, cx: &mut Context<Self>) {
        let list_width = self.scroll.bounds().size.width;
        if list_width <= Pixels::ZERO {
            return;
        }

        let next = max_pixels(px(1.), list_width - LIST_HORIZONTAL_PADDING * 2);
        let unchanged = self.content_width.is_some_and(|current| {
            (f32::from(current) - f32::from(next)).abs() <= WIDTH_CHANGE_EPSILON
        });
        if unchanged {
            return;
        }
        self.content_width = Some(next);
        self.rebuild_item_sizes();
        cx.notify();
    }

    fn rebuild_item_sizes(&mut self) {
        let width = self.current_width();
        let bucket = width_bucket(width);
        let mut live = HashSet::with_capacity(self.rows.len());
        let mut sizes = Vec::with_capacity(self.rows.len());

        for row in &self.rows {
            let key = row.key();
            let entry = self.heights.entry(key).or_insert(MeasuredRow {
                width_bucket: bucket,
                height: estimate_row_height(row, width),
                measured: false,
            });
            // Messages are immutable, so only a width change invalidates a measurement.
            if entry.width_bucket != bucket {
                entry.width_bucket = bucket;
                entry.height = estimate_row_height(row, width);
                entry.measured = false;
            }

            sizes.push(size(px(0.), entry.height));
            live.insert(key);
        }

        self.heights.retain(|key, _| live.contains(key));
        self.item_sizes = Rc::new(sizes);
    }

    fn measure_visible_rows(
        &mut self,
        visible_range: Range<usize>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let available_space = size(
            AvailableSpace::Definite(self.current_width()),
            AvailableSpace::MinContent,
        );
        let mut changed = false;

        for index in visible_range {
            let Some(row) = self.rows.get(index).cloned() else {
                continue;
            };
            let already_measured = self
                .heights
                .get(&row.key())
                .is_some_and(|entry| entry.measured);
            if already_measured {
                continue;
            }

            let mut element = self.render_row(&row, index, cx);
            let measured = element.layout_as_root(available_space, window, cx).height;
            if let Some(entry) = self.heights.get_mut(&row.key()) {
                changed |= (f32::from(entry.height) - f32::from(measured)).abs() > 0.5;
                entry.height = measured;
                entry.measured = true;
            }
        }

        if changed {
            self.rebuild_item_sizes();
            cx.notify();
        }
    }

    fn render_row(&self, row: &ListRow, index: usize, cx: &App) -> AnyElement {
        match row {
            ListRow::Message(message) if message.role == MessageRole::User => {
                self.render_user_bubble(message, cx)
            }
            ListRow::Message(message) => self.render_assistant_reply(message, index, cx),
            ListRow::Thinking => self.render_thinking(cx),
        }
    }

    fn render_user_bubble(&self, message: &ChatMessage, cx: &App) -> AnyElement {
        let theme = cx.theme();

        v_flex()
            .w_full()
            .items_end()
            .child(
                div()
                    .max_w(USER_BUBBLE_MAX_WIDTH)
                    .px(USER_BUBBLE_PADDING_X)
                    .py(USER_BUBBLE_PADDING_Y)
                    .rounded_lg()
                    .bg(theme.primary)
                    .text_color(theme.primary_foreground)
                    .child(Label::new(message.content.clone()).text_sm()),
            )
            .into_any_element()
    }

    fn render_assistant_reply(
        &self,
        message: &ChatMessage,
        index: usize,
        cx: &App,
    ) -> AnyElement {
        let body = if message.has_charts {
            render_chart_reply(cx)
        } else {
            let markdown_id = ElementId::Name(SharedString::from(format!(
                "assistant-markdown-{}-{index}",
                message.id
            )));
            TextView::markdown(markdown_id, message.content.clone())
                .selectable(true)
                .into_any_element()
        };

        v_flex()
            .w_full()
            .gap(ASSISTANT_HEADER_GAP)
            .child(self.render_assistant_header(cx))
            .child(body)
            .into_any_element()
    }

    fn render_assistant_header(&self, cx: &App) -> Div {
        let theme = cx.theme();

        h_flex()
            .h(ASSISTANT_HEADER_HEIGHT)
            .gap_2()
            .items_center()
            .child(avatar("AI", px(24.), cx))
            .child(
                Label::new(ASSISTANT_LABEL)
                    .text_xs()
                    .text_color(theme.muted_foreground),
            )
    }

    fn render_thinking(&self, cx: &App) -> AnyElement {
        let theme = cx.theme();

        v_flex()
            .w_full()
            .gap(ASSISTANT_HEADER_GAP)
            .child(self.render_assistant_header(cx))
            .child(
                h_flex()
                    .gap_2()
                    .items_center()
                    .child(div().size(px(8.)).rounded_full().bg(theme.primary))
                    .child(
                        Label::new(THINKING_LABEL)
                            .text_sm()
                            .text_color(theme.muted_foreground),
                    ),
            )
            .into_any_element()
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.update_content_width(cx);
        self.scroll.sync();

        v_flex().size_full().min_h_0().child(
            v_virtual_list(
                cx.entity().clone(),
                "message-list",
                self.item_sizes.clone(),
                |this, visible_range, window, cx| {
                    this.update_content_width(cx);
                    this.measure_visible_rows(visible_range.clone(), window, cx);
                    visible_range
                        .filter_map(|index| {
                            this.rows
                                .get(index)
                                .cloned()
                                .map(|row| this.render_row(&row, index, cx))
                        })
                        .collect::<Vec<_>>()
                },
            )
            .size_full()
            .px_4()
            .py_3()
            .gap_4()
            .track_scroll(self.scroll.handle()),
        )
    }
}

fn build_rows(messages: &[ChatMessage], thinking: bool) -> Vec<ListRow> {
    let mut rows = messages
        .iter()
        .cloned()
        .map(ListRow::Message)
        .collect::<Vec<_>>();
    if thinking {
        rows.push(ListRow::Thinking);
    }
    rows
}

fn width_bucket(width: Pixels) -> u32 {
    f32::from(width).round() as u32
}

fn max_pixels(a: Pixels, b: Pixels) -> Pixels {
    if f32::from(a) >= f32::from(b) { a } else { b }
}

fn min_pixels(a: Pixels, b: Pixels) -> Pixels {
    if f32::from(a) <= f32::from(b) { a } else { b }
}

fn estimate_row_height(row: &ListRow, content_width: Pixels) -> Pixels {
    match row {
        ListRow::Thinking => THINKING_ROW_HEIGHT,
        ListRow::Message(message) if message.role == MessageRole::User => {
            let bubble_width = min_pixels(content_width, USER_BUBBLE_MAX_WIDTH);
            let text_width = max_pixels(px(1.), bubble_width - USER_BUBBLE_PADDING_X * 2);
            estimate_text_height(&message.content, text_width) + USER_BUBBLE_PADDING_Y * 2
        }
        ListRow::Message(message) if message.has_charts => {
            ASSISTANT_HEADER_HEIGHT + ASSISTANT_HEADER_GAP + CHART_REPLY_HEIGHT
        }
        ListRow::Message(message) => {
            ASSISTANT_HEADER_HEIGHT
                + ASSISTANT_HEADER_GAP
                + estimate_text_height(&message.content, content_width)
        }
    }
}

fn estimate_text_height(content: &str, width: Pixels) -> Pixels {
    let chars_per_line = (f32::from(width) / ESTIMATED_CHAR_WIDTH).floor().max(1.0) as usize;
    let line_count = content
        .lines()
        .map(|line| line.chars().count().max(1).div_ceil(chars_per_line))
        .sum::<usize>();
    ESTIMATED_LINE_HEIGHT * line_count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn thinking_row_trails_the_transcript() {
        let messages = vec![ChatMessage::user("Show me incident trends", 0)];

        let rows = build_rows(&messages, true);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], ListRow::Thinking);
        assert_eq!(build_rows(&messages, false).len(), 1);
    }

    #[::core::prelude::v1::test]
    fn chart_replies_reserve_chart_height() {
        let chart = ListRow::Message(ChatMessage::assistant("", true, 0));
        let text = ListRow::Message(ChatMessage::assistant("short", false, 0));

        assert!(estimate_row_height(&chart, px(680.)) > estimate_row_height(&text, px(680.)));
    }

    #[::core::prelude::v1::test]
    fn long_text_wraps_into_more_lines() {
        let short = estimate_text_height("hello", px(700.));
        let long = estimate_text_height(&"x".repeat(500), px(700.));

        assert_eq!(short, ESTIMATED_LINE_HEIGHT);
        assert!(long > short);
    }
}
