/// Static chart card for chart-bearing replies.
pub mod chart;
/// Event contracts for chat module wiring.
pub mod events;
pub mod message_input;
pub mod message_list;
pub mod scroll_follow;
pub mod sidebar;
pub mod view;

pub use events::{
    LogoutClicked, NewChatClicked, SessionSelected, SidebarToggleClicked, Submit,
    ThemeToggleClicked,
};
pub use message_input::MessageInput;
pub use message_list::MessageList;
pub use sidebar::ChatSidebar;
pub use view::ChatView;
