pub mod poller;
pub mod view_model;

pub use poller::{DashboardPoller, DashboardState};
pub use view_model::{
    build_squad_view, build_view_state, Badges, FactionView, MemberRow, PlayerRow, SnapshotMaxima,
    SortDirection, SortKey, SquadGroup, SquadView, TeamFilter, TeamTotals, ViewControls, ViewMode,
    ViewState,
};
