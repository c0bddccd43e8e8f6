mod command_input;
mod confirm;
mod date_filter;
mod filter_bar;
mod input;
mod key_result;
mod search_input;
mod value_filter;

pub use command_input::{CommandEvent, CommandInput};
pub use confirm::{ConfirmDialog, ConfirmEvent};
pub use date_filter::{DateFilterEvent, DateFilterPopup};
pub use filter_bar::render_filter_bar;
pub use key_result::KeyResult;
pub use search_input::{SearchEvent, SearchInput};
pub use value_filter::{ValueFilterEvent, ValueFilterPopup};
