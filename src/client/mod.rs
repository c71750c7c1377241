//! Client-side state synchronization: the reducer-driven state, view
//! filters, the subscription lifecycle, and the user action handlers.

pub mod action;
pub mod actions;
pub mod reducer;
pub mod session;
pub mod state;
pub mod view;

pub use action::Action;
pub use actions::TaskActions;
pub use reducer::reduce;
pub use session::{AuthPhase, Route, SessionController};
pub use state::{ClientState, StateHandle};
pub use view::{SidebarEntry, View, VisibleTasks, badge_count, sidebar, visible_tasks};
