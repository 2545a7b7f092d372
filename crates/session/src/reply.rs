//! Keyword classification of prompts into simulated assistant replies.

/// Any of these routes the prompt to the chart widget.
pub const CHART_KEYWORDS: &[&str] = &["chart", "graph", "pie", "bar", "annual", "maintenance"];
pub const TREND_KEYWORDS: &[&str] = &["trend", "pattern"];
pub const ISSUE_KEYWORDS: &[&str] = &["issue", "problem"];
pub const PERFORMANCE_KEYWORDS: &[&str] = &["resolution", "report", "performance"];

pub const TRENDS_REPLY: &str = "Based on the SDM data analysis, I've identified the following trends:

• **Increasing Volume**: Incident volume has grown by 15% year-over-year
• **Seasonal Pattern**: Peak periods occur during Q4 (October-December)
• **Resolution Time**: Average resolution time improved from 4.2 to 3.8 hours
• **Category Shifts**: Hardware issues remain the dominant category at 35%
• **User Satisfaction**: Overall satisfaction score improved to 4.2/5.0

The upward trend in Q4 correlates with increased business activity and system updates during year-end operations.";

pub const TOP_ISSUES_REPLY: &str = "Here are the top issues identified in the SDM analysis:

**Top 5 Issues by Volume:**
1. Hardware Failures (35%) - Desktop computers and peripherals
2. Software Bugs (25%) - Application crashes and performance issues
3. Network Connectivity (20%) - VPN and wireless connection problems
4. User Account Issues (15%) - Password resets and access permissions
5. Other Requests (5%) - Miscellaneous support needs

**Recommendations:**
• Implement preventive maintenance for hardware
• Update software to latest stable versions
• Enhance network infrastructure monitoring
• Deploy self-service password reset portal";

pub const RESOLUTION_PERFORMANCE_REPLY: &str = "**SDM Resolution Performance Report**

**Key Metrics:**
• Total Incidents: 714 (Annual)
• Resolution Rate: 97.3%
• Average Resolution Time: 3.8 hours
• First Contact Resolution: 68%
• Customer Satisfaction: 4.2/5.0

**Performance Highlights:**
✓ Exceeded target resolution rate of 95%
✓ Improved average resolution time by 10%
✓ Maintained high customer satisfaction above 4.0
✓ Successfully handled 15% increase in incident volume

**Areas for Improvement:**
• Increase first contact resolution to 75%
• Reduce escalations by 5%
• Enhance knowledge base documentation";

pub const GENERIC_REPLY: &str = "I'm here to help you with SDM (Service Desk Management) analytics and insights. I can provide information about:

• Incident trends and patterns
• Performance metrics and KPIs
• Category distributions
• Resolution statistics
• Custom reports and visualizations

Try asking me about charts, trends, issues, or performance reports!";

/// Which simulated reply a prompt earns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyPlan {
    Chart,
    Trends,
    TopIssues,
    ResolutionPerformance,
    Generic,
}

impl ReplyPlan {
    pub fn has_charts(self) -> bool {
        matches!(self, Self::Chart)
    }

    /// Text body of the assistant message. Chart replies carry no text.
    pub fn content(self) -> &'static str {
        match self {
            Self::Chart => "",
            Self::Trends => TRENDS_REPLY,
            Self::TopIssues => TOP_ISSUES_REPLY,
            Self::ResolutionPerformance => RESOLUTION_PERFORMANCE_REPLY,
            Self::Generic => GENERIC_REPLY,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Trends => "trends",
            Self::TopIssues => "top-issues",
            Self::ResolutionPerformance => "resolution-performance",
            Self::Generic => "generic",
        }
    }
}

/// Classifies a prompt by case-insensitive substring match.
///
/// Chart keywords win over everything; the text groups are then tried in order
/// trends, issues, performance, and the first hit decides.
pub fn classify(content: &str) -> ReplyPlan {
    let normalized = content.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|keyword| normalized.contains(keyword));

    if mentions(CHART_KEYWORDS) {
        ReplyPlan::Chart
    } else if mentions(TREND_KEYWORDS) {
        ReplyPlan::Trends
    } else if mentions(ISSUE_KEYWORDS) {
        ReplyPlan::TopIssues
    } else if mentions(PERFORMANCE_KEYWORDS) {
        ReplyPlan::ResolutionPerformance
    } else {
        ReplyPlan::Generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_keywords_match_case_insensitively() {
        for prompt in [
            "Give SDM PIE chart and bar graph for last annual maintenance",
            "show me a CHART",
            "Graph please",
            "annual numbers",
            "Maintenance window",
            "crowbar",
        ] {
            assert_eq!(classify(prompt), ReplyPlan::Chart, "prompt: {prompt}");
        }
    }

    #[test]
    fn chart_beats_text_groups() {
        assert_eq!(classify("trend chart of issues"), ReplyPlan::Chart);
        assert!(classify("performance graph").has_charts());
        assert_eq!(classify("performance graph").content(), "");
    }

    #[test]
    fn text_groups_follow_priority_order() {
        assert_eq!(classify("Show me incident trends"), ReplyPlan::Trends);
        assert_eq!(classify("any PATTERN here?"), ReplyPlan::Trends);
        assert_eq!(classify("What are the top issues?"), ReplyPlan::TopIssues);
        assert_eq!(classify("a problem with patterns"), ReplyPlan::Trends);
        assert_eq!(classify("problem report"), ReplyPlan::TopIssues);
        assert_eq!(
            classify("Generate resolution report"),
            ReplyPlan::ResolutionPerformance
        );
        assert_eq!(classify("how is performance"), ReplyPlan::ResolutionPerformance);
        assert_eq!(classify("hello"), ReplyPlan::Generic);
    }

    #[test]
    fn trends_reply_is_exact_canned_text() {
        let plan = classify("Show me incident trends");
        assert!(!plan.has_charts());
        assert_eq!(plan.content(), TRENDS_REPLY);
        assert!(plan.content().starts_with("Based on the SDM data analysis"));
    }

    #[test]
    fn classification_is_stable_across_calls() {
        let prompt = "What are the top issues?";
        assert_eq!(classify(prompt), classify(prompt));
    }
}
