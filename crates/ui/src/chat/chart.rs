use gpui::*;
use gpui_component::{ActiveTheme, h_flex, label::Label, v_flex};
use sdm_session::charts::{
    CATEGORY_CHART_TITLE, CHART_INTRO, CategoryShare, INCIDENT_CATEGORIES, INCIDENTS_COLOR,
    INSIGHTS_HEADING, KEY_INSIGHTS, MONTHLY_CHART_TITLE, MONTHLY_INCIDENTS, MonthlyIncidents,
    RESOLVED_COLOR, category_total, monthly_peak, share_percent,
};

const SHARE_BAR_HEIGHT: Pixels = px(18.);
const LEGEND_SWATCH_SIZE: Pixels = px(10.);
const PLOT_HEIGHT: f32 = 180.0;
const BAR_WIDTH: Pixels = px(9.);

/// Static analytics card shown for chart-bearing assistant replies.
pub fn render_chart_reply(cx: &App) -> AnyElement {
    let theme = cx.theme();

    v_flex()
        .w_full()
        .gap_4()
        .child(
            Label::new(CHART_INTRO)
                .text_sm()
                .text_color(theme.muted_foreground),
        )
        .child(chart_card(CATEGORY_CHART_TITLE, render_category_share(cx), cx))
        .child(chart_card(MONTHLY_CHART_TITLE, render_monthly_bars(cx), cx))
        .child(render_insights(cx))
        .into_any_element()
}

fn chart_card(title: &'static str, body: AnyElement, cx: &App) -> AnyElement {
    let theme = cx.theme();

    v_flex()
        .w_full()
        .gap_3()
        .p_4()
        .rounded_lg()
        .border_1()
        .border_color(theme.border)
        .bg(theme.background)
        .child(
            div()
                .text_base()
                .font_weight(FontWeight::SEMIBOLD)
                .text_color(theme.primary)
                .child(title),
        )
        .child(body)
        .into_any_element()
}

fn render_category_share(cx: &App) -> AnyElement {
    let theme = cx.theme();
    let segments = INCIDENT_CATEGORIES.iter().map(|category| {
        div()
            .h_full()
            .w(relative(share_fraction(category)))
            .bg(rgb(category.color))
    });

    v_flex()
        .w_full()
        .gap_3()
        .child(
            h_flex()
                .w_full()
                .h(SHARE_BAR_HEIGHT)
                .rounded_md()
                .overflow_hidden()
                .children(segments),
        )
        .child(
            v_flex()
                .gap_1()
                .children(INCIDENT_CATEGORIES.iter().map(|category| {
                    h_flex()
                        .gap_2()
                        .items_center()
                        .child(
                            div()
                                .size(LEGEND_SWATCH_SIZE)
                                .rounded_sm()
                                .bg(rgb(category.color)),
                        )
                        .child(
                            div()
                                .flex_1()
                                .text_sm()
                                .text_color(theme.foreground)
                                .child(category.name),
                        )
                        .child(
                            div()
                                .text_sm()
                                .font_weight(FontWeight::MEDIUM)
                                .text_color(theme.muted_foreground)
                                .child(format!("{}%", share_percent(category))),
                        )
                })),
        )
        .into_any_element()
}

fn render_monthly_bars(cx: &App) -> AnyElement {
    let theme = cx.theme();
    let peak = monthly_peak();

    v_flex()
        .w_full()
        .gap_2()
        .child(
            h_flex()
                .w_full()
                .h(px(PLOT_HEIGHT))
                .items_end()
                .justify_between()
                .border_b_1()
                .border_color(theme.border)
                .children(
                    MONTHLY_INCIDENTS
                        .iter()
                        .map(|entry| render_month_column(entry, peak)),
                ),
        )
        .child(
            h_flex().w_full().justify_between().children(
                MONTHLY_INCIDENTS.iter().map(|entry| {
                    div()
                        .flex_1()
                        .flex()
                        .justify_center()
                        .text_xs()
                        .text_color(theme.muted_foreground)
                        .child(entry.month)
                }),
            ),
        )
        .child(
            h_flex()
                .gap_4()
                .justify_center()
                .child(legend_entry("Total Incidents", INCIDENTS_COLOR, cx))
                .child(legend_entry("Resolved", RESOLVED_COLOR, cx)),
        )
        .into_any_element()
}

fn render_month_column(entry: &MonthlyIncidents, peak: u32) -> Div {
    h_flex()
        .flex_1()
        .h_full()
        .items_end()
        .justify_center()
        .gap(px(2.))
        .child(
            div()
                .w(BAR_WIDTH)
                .h(px(bar_height(entry.incidents, peak, PLOT_HEIGHT)))
                .rounded_t(px(3.))
                .bg(rgb(INCIDENTS_COLOR)),
        )
        .child(
            div()
                .w(BAR_WIDTH)
                .h(px(bar_height(entry.resolved, peak, PLOT_HEIGHT)))
                .rounded_t(px(3.))
                .bg(rgb(RESOLVED_COLOR)),
        )
}

fn legend_entry(name: &'static str, color: u32, cx: &App) -> Div {
    let theme = cx.theme();

    h_flex()
        .gap_1()
        .items_center()
        .child(div().size(LEGEND_SWATCH_SIZE).rounded_sm().bg(rgb(color)))
        .child(
            div()
                .text_xs()
                .text_color(theme.muted_foreground)
                .child(name),
        )
}

fn render_insights(cx: &App) -> AnyElement {
    let theme = cx.theme();

    v_flex()
        .w_full()
        .gap_1()
        .child(
            div()
                .text_sm()
                .font_weight(FontWeight::SEMIBOLD)
                .text_color(theme.foreground)
                .mb_1()
                .child(INSIGHTS_HEADING),
        )
        .children(KEY_INSIGHTS.iter().map(|(label, detail)| {
            h_flex()
                .gap_1()
                .items_start()
                .text_sm()
                .child(div().text_color(theme.muted_foreground).child("•"))
                .child(
                    div()
                        .font_weight(FontWeight::SEMIBOLD)
                        .text_color(theme.foreground)
                        .child(format!("{label}:")),
                )
                .child(
                    div()
                        .flex_1()
                        .text_color(theme.muted_foreground)
                        .child(*detail),
                )
        }))
        .into_any_element()
}

fn share_fraction(category: &CategoryShare) -> f32 {
    let total = category_total();
    if total == 0 {
        return 0.0;
    }
    category.value as f32 / total as f32
}

/// Bar height scaled so the peak value fills the plot.
fn bar_height(value: u32, peak: u32, plot_height: f32) -> f32 {
    if peak == 0 {
        return 0.0;
    }
    plot_height * value.min(peak) as f32 / peak as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn share_fractions_fill_the_bar() {
        let total: f32 = INCIDENT_CATEGORIES.iter().map(share_fraction).sum();
        assert!((total - 1.0).abs() < f32::EPSILON * 8.0);
        assert!((share_fraction(&INCIDENT_CATEGORIES[0]) - 0.35).abs() < 1e-6);
    }

    #[::core::prelude::v1::test]
    fn bars_scale_against_the_peak() {
        let peak = monthly_peak();
        assert_eq!(bar_height(peak, peak, PLOT_HEIGHT), PLOT_HEIGHT);
        assert_eq!(bar_height(36, 72, 180.0), 90.0);
        assert_eq!(bar_height(10, 0, 180.0), 0.0);
    }
}
