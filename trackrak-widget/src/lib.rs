pub mod controller;
pub mod host;
pub mod lifecycle;
pub mod state;
pub mod transition;
pub mod view;

pub use controller::{ControllerError, ControllerSettings, WidgetFlowController};
pub use host::{ControlSignal, WidgetHost};
pub use lifecycle::{Lifecycle, MountToken};
pub use state::{
    completion_message, Completion, Effect, EntryContext, FlowEvent, FlowState, IdentityGap,
    LoginNotice, LoginOutcome, PageContext,
};
pub use transition::{transition, Transition};
pub use view::{PanelAction, PanelView};
